use std::fs;
use std::path::{Path, PathBuf};

/// File name every backfill archive is saved under, whatever `outputFile` says.
pub const ARCHIVE_FILE_NAME: &str = "backfill_results.zip";

/// In-memory archive bytes held until the user saves them or the panel moves on.
///
/// Call [`DownloadHandle::release`] when the handle is superseded. Dropping an
/// unreleased handle also frees the buffer, but logs it.
#[derive(Debug)]
pub struct DownloadHandle {
    bytes: Vec<u8>,
    file_name: &'static str,
    released: bool,
}

impl DownloadHandle {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: ARCHIVE_FILE_NAME,
            released: false,
        }
    }

    pub fn file_name(&self) -> &str {
        self.file_name
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the archive into `dir`. May be called more than once.
    pub fn save_to(&self, dir: &Path) -> Result<PathBuf, String> {
        fs::create_dir_all(dir)
            .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
        let path = dir.join(self.file_name);
        fs::write(&path, &self.bytes)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "archive saved");
        Ok(path)
    }

    /// Free the buffer. Returns the number of bytes released.
    pub fn release(mut self) -> usize {
        self.free()
    }

    fn free(&mut self) -> usize {
        let freed = self.bytes.len();
        self.bytes = Vec::new();
        self.released = true;
        freed
    }
}

impl Drop for DownloadHandle {
    fn drop(&mut self) {
        if !self.released {
            let freed = self.free();
            tracing::debug!(bytes = freed, "download handle dropped without release");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_is_fixed() {
        let handle = DownloadHandle::new(vec![1, 2, 3]);
        assert_eq!(handle.file_name(), "backfill_results.zip");
        assert_eq!(handle.len(), 3);
        assert!(!handle.is_empty());
    }

    #[test]
    fn test_save_to_writes_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let handle = DownloadHandle::new(b"PK\x03\x04data".to_vec());
        let path = handle.save_to(dir.path()).unwrap();
        assert_eq!(path, dir.path().join(ARCHIVE_FILE_NAME));
        assert_eq!(fs::read(&path).unwrap(), b"PK\x03\x04data");
    }

    #[test]
    fn test_save_twice_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let handle = DownloadHandle::new(vec![9; 16]);
        handle.save_to(dir.path()).unwrap();
        let path = handle.save_to(dir.path()).unwrap();
        assert_eq!(fs::read(path).unwrap().len(), 16);
    }

    #[test]
    fn test_save_creates_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let handle = DownloadHandle::new(vec![0]);
        let path = handle.save_to(&nested).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_release_reports_size() {
        let handle = DownloadHandle::new(vec![0; 1024]);
        assert_eq!(handle.release(), 1024);
    }
}
