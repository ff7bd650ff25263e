use crate::data::types::{AbiRequest, BackfillRequest, RequestId};

/// The two panels shown side by side. The focused one receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelFocus {
    Abi,
    Backfill,
}

impl PanelFocus {
    pub fn toggle(self) -> Self {
        match self {
            PanelFocus::Abi => PanelFocus::Backfill,
            PanelFocus::Backfill => PanelFocus::Abi,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PanelFocus::Abi => 0,
            PanelFocus::Backfill => 1,
        }
    }
}

/// Events flowing into the main app loop, from components and background tasks.
#[derive(Debug)]
pub enum AppEvent {
    // Requests raised by panels
    SubmitAbi(AbiRequest),
    SubmitBackfill(BackfillRequest),
    CancelBackfill,
    ExportAbi,
    SaveArchive,

    // Responses from background tasks
    AbiResponse {
        id: RequestId,
        result: Result<serde_json::Value, String>,
    },
    BackfillResponse {
        id: RequestId,
        result: Result<Vec<u8>, String>,
    },

    // Local actions finished
    Saved(String),

    // Status
    Error(String),
}
