use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, eyre};

use crate::config::Command;
use crate::data::api::ApiClient;
use crate::data::download::DownloadHandle;
use crate::data::export;
use crate::data::types::{AbiRequest, BackfillRequest};

/// Run a one-shot command and return what should be printed on success.
pub async fn run(command: Command, api: &ApiClient, download_dir: &Path) -> Result<String> {
    match command {
        Command::Abi {
            class_hash,
            json_rpc_url,
        } => {
            let request = AbiRequest {
                class_hash,
                json_rpc_url,
            };
            let abi = api.fetch_abi(&request).await?;
            Ok(serde_json::to_string_pretty(&abi)?)
        }
        Command::Backfill {
            from,
            to,
            rpc_url,
            output_file,
            transaction_hashes,
        } => {
            let request = BackfillRequest {
                from_block: from,
                to_block: to,
                rpc_url,
                output_file,
                include_transaction_hashes: transaction_hashes,
            };
            let bytes = api.backfill(&request).await?;
            let handle = DownloadHandle::new(bytes);
            let saved = handle.save_to(download_dir).map_err(|e| eyre!(e));
            handle.release();
            Ok(saved?.display().to_string())
        }
        Command::FetchFile { path, out } => {
            let bytes = api.download_file(&path).await?;
            let target: PathBuf = out.unwrap_or_else(|| export::local_path_for(&path, download_dir));
            export::write_bytes(&bytes, &target).map_err(|e| eyre!(e))?;
            tracing::info!(remote = %path, local = %target.display(), bytes = bytes.len(), "file fetched");
            Ok(target.display().to_string())
        }
    }
}
