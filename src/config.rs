use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::data::api::DEFAULT_API_URL;

const APP_DIR: &str = "athena-tui";
const LOG_FILE: &str = "athena-tui.log";

#[derive(Parser, Debug)]
#[command(name = "athena-tui", about = "Terminal front-end for the Athena ABI and backfill service")]
pub struct Config {
    /// Base URL of the backend serving /api/abi and /api/backfill
    #[arg(long, env = "ATHENA_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Directory downloads and exports are written to
    #[arg(long, env = "ATHENA_DOWNLOAD_DIR")]
    pub download_dir: Option<PathBuf>,

    /// Tick rate in milliseconds for UI refresh
    #[arg(long, default_value = "100")]
    pub tick_rate_ms: u64,

    /// Give up on a backend request after this many seconds (no limit by default)
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Log file for the interactive UI (headless commands log to stderr)
    #[arg(long, env = "ATHENA_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// One-shot commands that skip the interactive UI.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch a contract ABI and print it as indented JSON
    Abi {
        #[arg(long)]
        class_hash: String,
        #[arg(long)]
        json_rpc_url: String,
    },
    /// Run a backfill and save backfill_results.zip to the download directory
    Backfill {
        #[arg(long)]
        from: u64,
        #[arg(long)]
        to: u64,
        #[arg(long)]
        rpc_url: String,
        #[arg(long, default_value = "block_details.csv")]
        output_file: String,
        #[arg(long)]
        transaction_hashes: bool,
    },
    /// Download a file the backend wrote, by its path on the backend host
    FetchFile {
        path: String,
        /// Local destination (default: the file's name in the download directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

impl Config {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Configured download directory, else the user's Downloads, else the working directory.
    pub fn download_dir(&self) -> PathBuf {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|dir| dir.join(APP_DIR))
                .unwrap_or_else(|| PathBuf::from("."))
                .join(LOG_FILE)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["athena-tui"]).unwrap();
        assert_eq!(config.tick_rate_ms, 100);
        assert!(config.request_timeout().is_none());
        assert!(config.command.is_none());
        assert!(config.log_file().ends_with("athena-tui.log"));
    }

    #[test]
    fn test_explicit_dirs() {
        let config = Config::try_parse_from([
            "athena-tui",
            "--api-url",
            "http://backend:9000",
            "--download-dir",
            "/tmp/out",
            "--request-timeout-secs",
            "30",
        ])
        .unwrap();
        assert_eq!(config.api_url, "http://backend:9000");
        assert_eq!(config.download_dir(), PathBuf::from("/tmp/out"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_abi_subcommand() {
        let config = Config::try_parse_from([
            "athena-tui",
            "abi",
            "--class-hash",
            "0x1",
            "--json-rpc-url",
            "http://node",
        ])
        .unwrap();
        assert_eq!(
            config.command,
            Some(Command::Abi {
                class_hash: "0x1".to_string(),
                json_rpc_url: "http://node".to_string(),
            })
        );
    }

    #[test]
    fn test_backfill_subcommand_defaults() {
        let config = Config::try_parse_from([
            "athena-tui",
            "backfill",
            "--from",
            "100",
            "--to",
            "200",
            "--rpc-url",
            "http://node",
        ])
        .unwrap();
        match config.command {
            Some(Command::Backfill {
                from,
                to,
                output_file,
                transaction_hashes,
                ..
            }) => {
                assert_eq!((from, to), (100, 200));
                assert_eq!(output_file, "block_details.csv");
                assert!(!transaction_hashes);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_backfill_rejects_non_numeric_block() {
        let result = Config::try_parse_from([
            "athena-tui",
            "backfill",
            "--from",
            "abc",
            "--to",
            "1",
            "--rpc-url",
            "x",
        ]);
        assert!(result.is_err());
    }
}
