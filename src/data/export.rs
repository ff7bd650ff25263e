use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name the ABI panel exports to.
pub const ABI_EXPORT_FILE_NAME: &str = "abi.json";

/// Export a retrieved ABI as pretty JSON into `dir/abi.json`.
pub fn export_abi_json(abi: &serde_json::Value, dir: &Path) -> Result<PathBuf, String> {
    let formatted = serde_json::to_string_pretty(abi)
        .map_err(|e| format!("Failed to serialize JSON: {e}"))?;

    fs::create_dir_all(dir).map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
    let path = dir.join(ABI_EXPORT_FILE_NAME);

    let mut file = fs::File::create(&path).map_err(|e| format!("Failed to create file: {e}"))?;
    file.write_all(formatted.as_bytes())
        .map_err(|e| format!("Failed to write file: {e}"))?;
    file.write_all(b"\n")
        .map_err(|e| format!("Failed to write file: {e}"))?;

    Ok(path)
}

/// Where `fetch-file` stores a backend file when no explicit target is given:
/// the last path component of `remote` inside `dir`.
pub fn local_path_for(remote: &str, dir: &Path) -> PathBuf {
    let name = Path::new(remote)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "download.bin".to_string());
    dir.join(name)
}

/// Write raw bytes to `path`, creating parent directories.
pub fn write_bytes(bytes: &[u8], path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    fs::write(path, bytes).map_err(|e| format!("Failed to write {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_abi_json() {
        let dir = tempfile::tempdir().unwrap();
        let abi = serde_json::json!([{ "type": "function", "name": "balance_of" }]);
        let path = export_abi_json(&abi, dir.path()).unwrap();

        assert!(path.ends_with("abi.json"));
        let contents = fs::read_to_string(&path).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, abi);
        assert!(contents.contains("\n  "));
    }

    #[test]
    fn test_local_path_for() {
        let dir = Path::new("/downloads");
        assert_eq!(
            local_path_for("out/block_details.csv", dir),
            PathBuf::from("/downloads/block_details.csv")
        );
        assert_eq!(local_path_for("", dir), PathBuf::from("/downloads/download.bin"));
        assert_eq!(local_path_for("..", dir), PathBuf::from("/downloads/download.bin"));
    }

    #[test]
    fn test_write_bytes_creates_parent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("file.csv");
        write_bytes(b"a,b\n", &path).unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"a,b\n");
    }
}
