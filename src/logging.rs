//! Logging setup.
//!
//! The interactive UI owns the terminal, so its logs go to a file. Headless
//! commands log to stderr. Both honor `RUST_LOG` and default to `info`.
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Append logs to `path`, creating its directory if needed.
pub fn setup_file_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .wrap_err_with(|| format!("creating log directory {}", parent.display()))?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("opening log file {}", path.display()))?;

    setup_logging_with_writer(Mutex::new(file), false)
}

pub fn setup_stderr_logging() -> Result<()> {
    setup_logging_with_writer(std::io::stderr, true)
}

fn setup_logging_with_writer<W>(writer: W, ansi: bool) -> Result<()>
where
    W: for<'writer> fmt::MakeWriter<'writer> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(env_filter())
        .with(
            fmt::layer()
                .with_writer(writer)
                .with_ansi(ansi)
                .with_target(true)
                .compact(),
        )
        .try_init()
        .wrap_err("installing tracing subscriber")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_logging_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("athena-tui.log");
        // A global subscriber may already be installed by another test; the
        // file must exist either way.
        let _ = setup_file_logging(&path);
        assert!(path.exists());
    }
}
