use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

use crate::data::types::{AbiRequest, BackfillRequest};

/// Backend address used when none is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

const ABI_PATH: &str = "/api/abi";
const BACKFILL_PATH: &str = "/api/backfill";
const DOWNLOAD_PATH: &str = "/api/download";

/// Failure of a single backend call. `Display` is the text shown to the user.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Invalid JSON in response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Message for a non-2xx response: the body if it is non-empty, otherwise
/// `HTTP error <status>`. Surrounding whitespace is dropped unless the body
/// has nothing else.
pub fn status_error_message(status: u16, body: &str) -> String {
    if body.is_empty() {
        return format!("HTTP error {status}");
    }
    match body.trim() {
        "" => body.to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// HTTP client for the backend's `/api` endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POST /api/abi. Returns the contract interface exactly as the backend sent it.
    pub async fn fetch_abi(&self, request: &AbiRequest) -> Result<serde_json::Value, ApiError> {
        tracing::debug!(class_hash = %request.class_hash, "requesting abi");
        let response = self
            .client
            .post(self.url(ABI_PATH))
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// POST /api/backfill. Returns the archive bytes without inspecting them.
    pub async fn backfill(&self, request: &BackfillRequest) -> Result<Vec<u8>, ApiError> {
        tracing::debug!(
            from = request.from_block,
            to = request.to_block,
            tx_hashes = request.include_transaction_hashes,
            "requesting backfill"
        );
        let response = self
            .client
            .post(self.url(BACKFILL_PATH))
            .json(request)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }

    /// GET /api/download?file=<path>. Returns the raw file contents.
    pub async fn download_file(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        let response = self
            .client
            .get(self.url(DOWNLOAD_PATH))
            .query(&[("file", path)])
            .send()
            .await?;
        let response = ensure_success(response).await?;
        Ok(response.bytes().await?.to_vec())
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status: StatusCode = response.status();
    if status.is_success() {
        return Ok(response);
    }
    // An unreadable error body falls back to the status message.
    let body = response.text().await.unwrap_or_default();
    let message = status_error_message(status.as_u16(), &body);
    tracing::warn!(status = status.as_u16(), %message, "backend returned an error");
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::AbiResult;
    use mockito::Matcher;
    use serde_json::json;

    fn abi_request(class_hash: &str, url: &str) -> AbiRequest {
        AbiRequest {
            class_hash: class_hash.to_string(),
            json_rpc_url: url.to_string(),
        }
    }

    fn backfill_request() -> BackfillRequest {
        BackfillRequest {
            from_block: 100,
            to_block: 200,
            rpc_url: "http://node.example/rpc".to_string(),
            output_file: "custom.csv".to_string(),
            include_transaction_hashes: true,
        }
    }

    #[test]
    fn test_status_error_message() {
        assert_eq!(status_error_message(500, ""), "HTTP error 500");
        assert_eq!(status_error_message(404, "  \n"), "  \n");
        assert_eq!(status_error_message(400, "bad hash\n"), "bad hash");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = ApiClient::new("http://localhost:8080/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(client.url(ABI_PATH), "http://localhost:8080/api/abi");
    }

    #[tokio::test]
    async fn test_fetch_abi_success_returns_body_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let abi = json!([
            { "type": "function", "name": "transfer", "inputs": [], "outputs": [] },
            { "type": "event", "name": "Transfer", "keys": [], "data": [] }
        ]);
        let mock = server
            .mock("POST", "/api/abi")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "classHash": "0xabc",
                "jsonRpcUrl": "http://node.example/rpc"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(abi.to_string())
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let result = client
            .fetch_abi(&abi_request("0xabc", "http://node.example/rpc"))
            .await
            .unwrap();

        assert_eq!(result, abi);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_abi_empty_fields_still_sent() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/abi")
            .match_body(Matcher::Json(json!({ "classHash": "", "jsonRpcUrl": "" })))
            .with_status(500)
            .with_body("error running CLI tool: exit status 1")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let err = client.fetch_abi(&abi_request("", "")).await.unwrap_err();

        assert_eq!(err.to_string(), "error running CLI tool: exit status 1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_abi_error_without_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/abi")
            .with_status(502)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let err = client.fetch_abi(&abi_request("0x1", "x")).await.unwrap_err();

        assert!(matches!(err, ApiError::Status { status: 502, .. }));
        assert_eq!(err.to_string(), "HTTP error 502");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_abi_invalid_json() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/abi")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let err = client.fetch_abi(&abi_request("0x1", "x")).await.unwrap_err();

        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_backfill_sends_numeric_blocks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/backfill")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({
                "fromBlock": 100,
                "toBlock": 200,
                "rpcUrl": "http://node.example/rpc",
                "outputFile": "custom.csv",
                "transactionHashFlag": true
            })))
            .with_status(200)
            .with_header("content-type", "application/zip")
            .with_body(b"PK\x03\x04archive")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let bytes = client.backfill(&backfill_request()).await.unwrap();

        assert_eq!(bytes, b"PK\x03\x04archive");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_backfill_error_body_is_message() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/backfill")
            .with_status(500)
            .with_body("Expected file not found: transaction_hashes_block_details.csv\n")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let err = client.backfill(&backfill_request()).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Expected file not found: transaction_hashes_block_details.csv"
        );
    }

    #[tokio::test]
    async fn test_backfill_error_empty_body_falls_back() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/backfill")
            .with_status(400)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let err = client.backfill(&backfill_request()).await.unwrap_err();

        assert_eq!(err.to_string(), "HTTP error 400");
    }

    #[tokio::test]
    async fn test_backfill_error_whitespace_body_is_kept() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/backfill")
            .with_status(500)
            .with_body(" \n")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let err = client.backfill(&backfill_request()).await.unwrap_err();

        assert_eq!(err.to_string(), " \n");
    }

    #[tokio::test]
    async fn test_fetch_abi_keeps_key_order() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/abi")
            .with_status(200)
            .with_body(r#"[{"type":"function","name":"transfer","inputs":[]}]"#)
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let abi = client.fetch_abi(&abi_request("0x1", "http://n")).await.unwrap();

        assert_eq!(
            AbiResult::new(abi).pretty,
            "[\n  {\n    \"type\": \"function\",\n    \"name\": \"transfer\",\n    \"inputs\": []\n  }\n]"
        );
    }

    #[tokio::test]
    async fn test_download_file_passes_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/download")
            .match_query(Matcher::UrlEncoded("file".into(), "out/blocks.csv".into()))
            .with_status(200)
            .with_body("block,hash\n1,0x1\n")
            .create_async()
            .await;

        let client = ApiClient::new(&server.url(), None).unwrap();
        let bytes = client.download_file("out/blocks.csv").await.unwrap();

        assert_eq!(bytes, b"block,hash\n1,0x1\n");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_error_when_unreachable() {
        // Port 9 (discard) on localhost is not served in test environments.
        let client = ApiClient::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
        let err = client.fetch_abi(&abi_request("0x1", "x")).await.unwrap_err();

        assert!(matches!(err, ApiError::Transport(_)));
        assert!(!err.to_string().is_empty());
    }
}
