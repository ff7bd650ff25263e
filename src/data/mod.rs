pub mod api;
pub mod download;
pub mod export;
pub mod types;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::data::api::ApiClient;
use crate::data::types::{AbiRequest, BackfillRequest, RequestId};
use crate::events::AppEvent;

/// Runs backend calls off the UI loop and reports results as `AppEvent`s.
///
/// Each panel has at most one request in flight. Submitting again aborts the
/// previous task before spawning the new one.
pub struct DataService {
    api: Arc<ApiClient>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    next_id: AtomicU64,
    abi_task: Mutex<Option<JoinHandle<()>>>,
    backfill_task: Mutex<Option<JoinHandle<()>>>,
}

impl DataService {
    pub fn new(api: ApiClient, event_tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            api: Arc::new(api),
            event_tx,
            next_id: AtomicU64::new(1),
            abi_task: Mutex::new(None),
            backfill_task: Mutex::new(None),
        }
    }

    pub fn api_url(&self) -> &str {
        self.api.base_url()
    }

    fn next_request_id(&self) -> RequestId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Fetch an ABI. Returns the id the response event will carry.
    pub fn fetch_abi(&self, request: AbiRequest) -> RequestId {
        let id = self.next_request_id();
        let api = Arc::clone(&self.api);
        let tx = self.event_tx.clone();

        let handle = tokio::spawn(async move {
            let result = match api.fetch_abi(&request).await {
                Ok(abi) => {
                    tracing::info!(id, "abi request succeeded");
                    Ok(abi)
                }
                Err(e) => {
                    tracing::warn!(id, error = %e, "abi request failed");
                    Err(e.to_string())
                }
            };
            let _ = tx.send(AppEvent::AbiResponse { id, result });
        });

        replace_task(&self.abi_task, handle, "abi");
        id
    }

    /// Run a backfill. Returns the id the response event will carry.
    pub fn backfill(&self, request: BackfillRequest) -> RequestId {
        let id = self.next_request_id();
        let api = Arc::clone(&self.api);
        let tx = self.event_tx.clone();

        let handle = tokio::spawn(async move {
            let result = match api.backfill(&request).await {
                Ok(bytes) => {
                    tracing::info!(id, bytes = bytes.len(), "backfill request succeeded");
                    Ok(bytes)
                }
                Err(e) => {
                    tracing::warn!(id, error = %e, "backfill request failed");
                    Err(e.to_string())
                }
            };
            let _ = tx.send(AppEvent::BackfillResponse { id, result });
        });

        replace_task(&self.backfill_task, handle, "backfill");
        id
    }

    /// Abort the backfill in flight, if any. Returns whether one was running.
    pub fn cancel_backfill(&self) -> bool {
        let cancelled = abort_slot(&self.backfill_task);
        if cancelled {
            tracing::info!("cancelled backfill request");
        }
        cancelled
    }

    /// Abort whatever is still running. Called on shutdown.
    pub fn cancel_all(&self) {
        abort_slot(&self.abi_task);
        abort_slot(&self.backfill_task);
    }
}

fn abort_slot(slot: &Mutex<Option<JoinHandle<()>>>) -> bool {
    let handle = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
    match handle {
        Some(handle) if !handle.is_finished() => {
            handle.abort();
            true
        }
        _ => false,
    }
}

fn replace_task(slot: &Mutex<Option<JoinHandle<()>>>, handle: JoinHandle<()>, kind: &str) {
    let mut slot = slot.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(previous) = slot.replace(handle) {
        if !previous.is_finished() {
            tracing::info!(kind, "cancelling superseded request");
            previous.abort();
        }
    }
}
