use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::data::download::DownloadHandle;

/// Identifier assigned to each submission, used to drop superseded responses.
pub type RequestId = u64;

/// Body of `POST /api/abi`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbiRequest {
    pub class_hash: String,
    pub json_rpc_url: String,
}

/// Body of `POST /api/backfill`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackfillRequest {
    pub from_block: u64,
    pub to_block: u64,
    pub rpc_url: String,
    pub output_file: String,
    #[serde(rename = "transactionHashFlag")]
    pub include_transaction_hashes: bool,
}

/// What a panel is currently displaying. Exactly one of the three at a time.
#[derive(Debug)]
pub enum Outcome<T> {
    Idle,
    Success(T),
    Error(String),
}

impl<T> Outcome<T> {
    pub fn is_idle(&self) -> bool {
        matches!(self, Outcome::Idle)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Error(msg) => Some(msg),
            _ => None,
        }
    }
}

impl<T> Default for Outcome<T> {
    fn default() -> Self {
        Outcome::Idle
    }
}

/// A retrieved contract interface along with the time it arrived.
#[derive(Debug, Clone)]
pub struct AbiResult {
    pub abi: serde_json::Value,
    pub pretty: String,
    pub received_at: DateTime<Local>,
}

impl AbiResult {
    pub fn new(abi: serde_json::Value) -> Self {
        let pretty = serde_json::to_string_pretty(&abi).unwrap_or_else(|_| abi.to_string());
        Self {
            abi,
            pretty,
            received_at: Local::now(),
        }
    }
}

/// A finished backfill: the archive awaiting download.
#[derive(Debug)]
pub struct BackfillResult {
    pub download: DownloadHandle,
    pub received_at: DateTime<Local>,
}
