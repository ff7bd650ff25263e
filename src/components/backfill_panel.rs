use std::path::{Path, PathBuf};

use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::components::input::{TextInput, button_line, checkbox_line};
use crate::data::download::DownloadHandle;
use crate::data::types::{BackfillRequest, BackfillResult, Outcome, RequestId};
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::utils;

const FIELD_FROM: usize = 0;
const FIELD_TO: usize = 1;
const FIELD_RPC_URL: usize = 2;
const FIELD_OUTPUT: usize = 3;
const FIELD_TX_HASHES: usize = 4;
const FIELD_SUBMIT: usize = 5;
const FIELD_COUNT: usize = 6;

/// Output file name the form starts with.
pub const DEFAULT_OUTPUT_FILE: &str = "block_details.csv";

/// Parse a block number field. Empty means block 0.
pub fn parse_block_number(label: &str, text: &str) -> Result<u64, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(0);
    }
    text.parse::<u64>()
        .map_err(|_| format!("{label} must be a whole number no larger than {}", u64::MAX))
}

/// Form that runs a block backfill and holds the resulting archive for saving.
pub struct BackfillPanel {
    pub focused: bool,
    from_block: TextInput,
    to_block: TextInput,
    rpc_url: TextInput,
    output_file: TextInput,
    include_transaction_hashes: bool,
    selected: usize,
    editing: bool,
    pending: Option<RequestId>,
    outcome: Outcome<BackfillResult>,
}

impl BackfillPanel {
    pub fn new() -> Self {
        Self {
            focused: false,
            from_block: TextInput::numeric("From Block Number", "Enter starting block number"),
            to_block: TextInput::numeric("To Block Number", "Enter ending block number"),
            rpc_url: TextInput::new("RPC URL", "Enter the RPC URL"),
            output_file: TextInput::new("Output File", "Enter the output file name")
                .with_value(DEFAULT_OUTPUT_FILE),
            include_transaction_hashes: false,
            selected: FIELD_FROM,
            editing: false,
            pending: None,
            outcome: Outcome::Idle,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn outcome(&self) -> &Outcome<BackfillResult> {
        &self.outcome
    }

    /// Build the request from the form, coercing the block fields to numbers.
    pub fn request(&self) -> Result<BackfillRequest, String> {
        Ok(BackfillRequest {
            from_block: parse_block_number(self.from_block.label, self.from_block.value())?,
            to_block: parse_block_number(self.to_block.label, self.to_block.value())?,
            rpc_url: self.rpc_url.value().to_string(),
            output_file: self.output_file.value().to_string(),
            include_transaction_hashes: self.include_transaction_hashes,
        })
    }

    /// A new submission went out: release the previous archive and reset.
    pub fn begin_request(&mut self, id: RequestId) {
        self.release_download();
        self.pending = Some(id);
    }

    /// Apply a response. Responses for anything but the latest submission are
    /// dropped; returns whether it was applied.
    pub fn finish_request(&mut self, id: RequestId, result: Result<Vec<u8>, String>) -> bool {
        if self.pending != Some(id) {
            tracing::debug!(id, pending = ?self.pending, "ignoring superseded backfill response");
            return false;
        }
        self.pending = None;
        self.release_download();
        self.outcome = match result {
            Ok(bytes) => Outcome::Success(BackfillResult {
                download: DownloadHandle::new(bytes),
                received_at: Local::now(),
            }),
            Err(msg) => Outcome::Error(msg),
        };
        true
    }

    /// Record a form error that stopped the request from being sent.
    pub fn fail_locally(&mut self, msg: String) {
        self.release_download();
        self.pending = None;
        self.outcome = Outcome::Error(msg);
    }

    /// Save the held archive into `dir`. `None` when there is nothing to save.
    pub fn save_archive(&self, dir: &Path) -> Option<Result<PathBuf, String>> {
        self.outcome
            .success()
            .map(|result| result.download.save_to(dir))
    }

    /// Free the held archive, if any, and return to idle.
    pub fn release_download(&mut self) {
        if let Outcome::Success(result) = std::mem::take(&mut self.outcome) {
            let freed = result.download.release();
            tracing::debug!(bytes = freed, "released backfill archive");
        }
    }

    fn submit(&mut self) -> Option<AppEvent> {
        self.editing = false;
        match self.request() {
            Ok(request) => Some(AppEvent::SubmitBackfill(request)),
            Err(msg) => {
                self.fail_locally(msg);
                Some(AppEvent::CancelBackfill)
            }
        }
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.selected {
            FIELD_FROM => Some(&mut self.from_block),
            FIELD_TO => Some(&mut self.to_block),
            FIELD_RPC_URL => Some(&mut self.rpc_url),
            FIELD_OUTPUT => Some(&mut self.output_file),
            _ => None,
        }
    }

    fn select_next(&mut self) {
        self.selected = (self.selected + 1) % FIELD_COUNT;
    }

    fn select_prev(&mut self) {
        self.selected = (self.selected + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    fn render_result(&self, frame: &mut Frame, area: Rect) {
        match &self.outcome {
            Outcome::Success(result) => {
                let block = Block::default()
                    .title(" Success ")
                    .borders(Borders::ALL)
                    .border_style(THEME.success_style());
                let lines = vec![
                    Line::from(Span::styled(
                        "Backfill successful! Press [d] to download results.",
                        THEME.success_style().add_modifier(Modifier::BOLD),
                    )),
                    Line::from(""),
                    Line::from(vec![
                        Span::styled("  File:     ", THEME.muted_style()),
                        Span::styled(result.download.file_name(), THEME.accent_style()),
                    ]),
                    Line::from(vec![
                        Span::styled("  Size:     ", THEME.muted_style()),
                        Span::styled(
                            utils::format_bytes(result.download.len()),
                            Style::default().fg(THEME.text),
                        ),
                    ]),
                    Line::from(vec![
                        Span::styled("  Received: ", THEME.muted_style()),
                        Span::styled(
                            utils::format_clock(&result.received_at),
                            Style::default().fg(THEME.text),
                        ),
                    ]),
                ];
                frame.render_widget(Paragraph::new(lines).block(block), area);
            }
            Outcome::Error(msg) => {
                let block = Block::default()
                    .title(" Error ")
                    .borders(Borders::ALL)
                    .border_style(THEME.error_style());
                let paragraph = Paragraph::new(Span::styled(msg.as_str(), THEME.error_style()))
                    .block(block)
                    .wrap(Wrap { trim: false });
                frame.render_widget(paragraph, area);
            }
            Outcome::Idle => {
                let msg = if self.is_loading() {
                    "Running backfill..."
                } else {
                    "Fill in the block range and submit to run a backfill"
                };
                let paragraph = Paragraph::new(msg)
                    .style(THEME.muted_style())
                    .alignment(Alignment::Center);
                frame.render_widget(paragraph, area);
            }
        }
    }
}

impl Default for BackfillPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for BackfillPanel {
    fn drop(&mut self) {
        self.release_download();
    }
}

impl Component for BackfillPanel {
    fn handle_key(&mut self, key: KeyEvent) -> Option<AppEvent> {
        if self.editing {
            match key.code {
                KeyCode::Esc => {
                    self.editing = false;
                    None
                }
                KeyCode::Enter => {
                    self.editing = false;
                    self.select_next();
                    None
                }
                KeyCode::Tab | KeyCode::Down => {
                    self.select_next();
                    if self.focused_input().is_none() {
                        self.editing = false;
                    }
                    None
                }
                KeyCode::BackTab | KeyCode::Up => {
                    self.select_prev();
                    if self.focused_input().is_none() {
                        self.editing = false;
                    }
                    None
                }
                _ => {
                    if let Some(input) = self.focused_input() {
                        input.handle_key(key);
                    }
                    None
                }
            }
        } else {
            match key.code {
                KeyCode::Char('j') | KeyCode::Down => {
                    self.select_next();
                    None
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    self.select_prev();
                    None
                }
                KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Char('i') => match self.selected {
                    FIELD_TX_HASHES => {
                        self.include_transaction_hashes = !self.include_transaction_hashes;
                        None
                    }
                    FIELD_SUBMIT => {
                        if key.code == KeyCode::Enter {
                            self.submit()
                        } else {
                            None
                        }
                    }
                    _ => {
                        self.editing = true;
                        None
                    }
                },
                KeyCode::Char('s') => self.submit(),
                KeyCode::Char('d') => self.outcome.success().map(|_| AppEvent::SaveArchive),
                _ => None,
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let outer_block = Block::default()
            .title(" Backfill Starknet Block Data ")
            .borders(Borders::ALL)
            .border_style(THEME.panel_border(self.focused));

        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(3)])
            .split(inner);

        let sel = |field: usize| self.focused && self.selected == field;
        let edit = |field: usize| self.editing && self.selected == field;

        let form = vec![
            Line::from(""),
            self.from_block.line(sel(FIELD_FROM), edit(FIELD_FROM)),
            self.to_block.line(sel(FIELD_TO), edit(FIELD_TO)),
            self.rpc_url.line(sel(FIELD_RPC_URL), edit(FIELD_RPC_URL)),
            self.output_file.line(sel(FIELD_OUTPUT), edit(FIELD_OUTPUT)),
            checkbox_line(
                "Include Transaction Hashes",
                self.include_transaction_hashes,
                sel(FIELD_TX_HASHES),
            ),
            Line::from(""),
            button_line(
                if self.is_loading() { "Running..." } else { "Fetch Block Data" },
                sel(FIELD_SUBMIT),
            ),
        ];
        frame.render_widget(Paragraph::new(form), chunks[0]);

        self.render_result(frame, chunks[1]);
    }
}
