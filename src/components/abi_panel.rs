use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::components::Component;
use crate::components::input::{TextInput, button_line};
use crate::data::types::{AbiRequest, AbiResult, Outcome, RequestId};
use crate::events::AppEvent;
use crate::theme::THEME;
use crate::utils;

const FIELD_CLASS_HASH: usize = 0;
const FIELD_RPC_URL: usize = 1;
const FIELD_SUBMIT: usize = 2;
const FIELD_COUNT: usize = 3;

/// Form that fetches a contract ABI by class hash and shows it as indented JSON.
pub struct AbiPanel {
    pub focused: bool,
    class_hash: TextInput,
    json_rpc_url: TextInput,
    selected: usize,
    editing: bool,
    pending: Option<RequestId>,
    outcome: Outcome<AbiResult>,
    scroll: u16,
}

impl AbiPanel {
    pub fn new() -> Self {
        Self {
            focused: true,
            class_hash: TextInput::new("Contract Class Hash", "Enter the contract class hash"),
            json_rpc_url: TextInput::new("JSON-RPC URL", "Enter the JSON-RPC URL"),
            selected: FIELD_CLASS_HASH,
            editing: false,
            pending: None,
            outcome: Outcome::Idle,
            scroll: 0,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn outcome(&self) -> &Outcome<AbiResult> {
        &self.outcome
    }

    /// The request the form currently describes. Fields are sent as typed.
    pub fn request(&self) -> AbiRequest {
        AbiRequest {
            class_hash: self.class_hash.value().to_string(),
            json_rpc_url: self.json_rpc_url.value().to_string(),
        }
    }

    /// A new submission went out: forget the previous outcome.
    pub fn begin_request(&mut self, id: RequestId) {
        self.outcome = Outcome::Idle;
        self.pending = Some(id);
        self.scroll = 0;
    }

    /// Apply a response. Responses for anything but the latest submission are
    /// dropped; returns whether it was applied.
    pub fn finish_request(&mut self, id: RequestId, result: Result<serde_json::Value, String>) -> bool {
        if self.pending != Some(id) {
            tracing::debug!(id, pending = ?self.pending, "ignoring superseded abi response");
            return false;
        }
        self.pending = None;
        self.outcome = match result {
            Ok(abi) => Outcome::Success(AbiResult::new(abi)),
            Err(msg) => Outcome::Error(msg),
        };
        true
    }

    fn submit(&mut self) -> Option<AppEvent> {
        self.editing = false;
        Some(AppEvent::SubmitAbi(self.request()))
    }

    fn focused_input(&mut self) -> Option<&mut TextInput> {
        match self.selected {
            FIELD_CLASS_HASH => Some(&mut self.class_hash),
            FIELD_RPC_URL => Some(&mut self.json_rpc_url),
            _ => None,
        }
    }

    fn select_next(&mut self) {
        self.selected = (self.selected + 1) % FIELD_COUNT;
    }

    fn select_prev(&mut self) {
        self.selected = (self.selected + FIELD_COUNT - 1) % FIELD_COUNT;
    }

    fn result_line_count(&self) -> u16 {
        self.outcome
            .success()
            .map(|r| r.pretty.lines().count())
            .unwrap_or(0)
            .min(u16::MAX as usize) as u16
    }

    fn scroll_by(&mut self, delta: i32) {
        let max = self.result_line_count().saturating_sub(1);
        let next = (self.scroll as i32 + delta).clamp(0, max as i32);
        self.scroll = next as u16;
    }

    fn render_result(&self, frame: &mut Frame, area: Rect) {
        match &self.outcome {
            Outcome::Success(result) => {
                let block = Block::default()
                    .title(format!(
                        " ABI Data ({} lines, {}) ",
                        result.pretty.lines().count(),
                        utils::format_clock(&result.received_at)
                    ))
                    .borders(Borders::ALL)
                    .border_style(THEME.success_style());
                let paragraph = Paragraph::new(result.pretty.as_str())
                    .style(THEME.json_style())
                    .block(block)
                    .scroll((self.scroll, 0));
                frame.render_widget(paragraph, area);
            }
            Outcome::Error(msg) => {
                let block = Block::default()
                    .title(" Error ")
                    .borders(Borders::ALL)
                    .border_style(THEME.error_style());
                let paragraph = Paragraph::new(Line::from(vec![
                    Span::styled(
                        "Error: ",
                        THEME.error_style().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(msg.as_str(), THEME.error_style()),
                ]))
                .block(block)
                .wrap(Wrap { trim: false });
                frame.render_widget(paragraph, area);
            }
            Outcome::Idle => {
                let msg = if self.is_loading() {
                    "Fetching ABI..."
                } else {
                    "Fill in the form and submit to fetch an ABI"
                };
                let paragraph = Paragraph::new(msg)
                    .style(THEME.muted_style())
                    .alignment(Alignment::Center);
                frame.render_widget(paragraph, area);
            }
        }
    }
}

impl Default for AbiPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for AbiPanel {
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
                KeyCode::Enter | KeyCode::Char('i') => {
                    if self.selected == FIELD_SUBMIT {
                        if key.code == KeyCode::Enter {
                            return self.submit();
                        }
                        return None;
                    }
                    self.editing = true;
                    None
                }
                KeyCode::Char('s') => self.submit(),
                KeyCode::Char('e') => self.outcome.success().map(|_| AppEvent::ExportAbi),
                KeyCode::PageDown => {
                    self.scroll_by(10);
                    None
                }
                KeyCode::PageUp => {
                    self.scroll_by(-10);
                    None
                }
                KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.scroll_by(10);
                    None
                }
                KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.scroll_by(-10);
                    None
                }
                KeyCode::Char('g') => {
                    self.scroll = 0;
                    None
                }
                KeyCode::Char('G') => {
                    self.scroll = self.result_line_count().saturating_sub(1);
                    None
                }
                _ => None,
            }
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let outer_block = Block::default()
            .title(" Fetch Starknet ABI ")
            .borders(Borders::ALL)
            .border_style(THEME.panel_border(self.focused));

        let inner = outer_block.inner(area);
        frame.render_widget(outer_block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(3)])
            .split(inner);

        let show_selection = self.focused;
        let form = vec![
            Line::from(""),
            self.class_hash.line(
                show_selection && self.selected == FIELD_CLASS_HASH,
                self.editing && self.selected == FIELD_CLASS_HASH,
            ),
            self.json_rpc_url.line(
                show_selection && self.selected == FIELD_RPC_URL,
                self.editing && self.selected == FIELD_RPC_URL,
            ),
            Line::from(""),
            button_line(
                if self.is_loading() { "Fetching..." } else { "Fetch ABI" },
                show_selection && self.selected == FIELD_SUBMIT,
            ),
        ];
        frame.render_widget(Paragraph::new(form), chunks[0]);

        self.render_result(frame, chunks[1]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_into(panel: &mut AbiPanel, s: &str) {
        panel.handle_key(key(KeyCode::Enter));
        for c in s.chars() {
            panel.handle_key(key(KeyCode::Char(c)));
        }
        panel.handle_key(key(KeyCode::Enter));
    }

    #[test]
    fn test_form_fills_request() {
        let mut panel = AbiPanel::new();
        type_into(&mut panel, "0x0123");
        type_into(&mut panel, "http://node.example/rpc");
        assert_eq!(
            panel.request(),
            AbiRequest {
                class_hash: "0x0123".to_string(),
                json_rpc_url: "http://node.example/rpc".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_form_still_submits() {
        let mut panel = AbiPanel::new();
        match panel.handle_key(key(KeyCode::Char('s'))) {
            Some(AppEvent::SubmitAbi(req)) => {
                assert_eq!(req.class_hash, "");
                assert_eq!(req.json_rpc_url, "");
            }
            other => panic!("expected submit, got {other:?}"),
        }
    }

    #[test]
    fn test_enter_on_button_submits() {
        let mut panel = AbiPanel::new();
        panel.handle_key(key(KeyCode::Down));
        panel.handle_key(key(KeyCode::Down));
        assert!(matches!(
            panel.handle_key(key(KeyCode::Enter)),
            Some(AppEvent::SubmitAbi(_))
        ));
    }

    #[test]
    fn test_editing_swallows_global_letters() {
        let mut panel = AbiPanel::new();
        panel.handle_key(key(KeyCode::Enter));
        assert!(panel.is_editing());
        assert!(panel.handle_key(key(KeyCode::Char('s'))).is_none());
        assert_eq!(panel.request().class_hash, "s");
        panel.handle_key(key(KeyCode::Esc));
        assert!(!panel.is_editing());
    }

    #[test]
    fn test_success_shows_exact_json_and_clears_error() {
        let mut panel = AbiPanel::new();
        panel.begin_request(1);
        panel.finish_request(1, Err("HTTP error 500".to_string()));
        assert_eq!(panel.outcome().error(), Some("HTTP error 500"));

        let abi = json!([{ "type": "function", "name": "get_balance", "inputs": [] }]);
        panel.begin_request(2);
        assert!(panel.finish_request(2, Ok(abi.clone())));

        let result = panel.outcome().success().unwrap();
        assert_eq!(result.abi, abi);
        assert_eq!(result.pretty, serde_json::to_string_pretty(&abi).unwrap());
        assert!(panel.outcome().error().is_none());
    }

    #[test]
    fn test_error_clears_prior_result() {
        let mut panel = AbiPanel::new();
        panel.begin_request(1);
        panel.finish_request(1, Ok(json!({ "abi": [] })));
        panel.begin_request(2);
        panel.finish_request(2, Err("class hash not found".to_string()));
        assert!(panel.outcome().success().is_none());
        assert_eq!(panel.outcome().error(), Some("class hash not found"));
    }

    #[test]
    fn test_new_submit_resets_to_idle() {
        let mut panel = AbiPanel::new();
        panel.begin_request(1);
        panel.finish_request(1, Err("boom".to_string()));
        panel.begin_request(2);
        assert!(panel.outcome().is_idle());
        assert!(panel.is_loading());
    }

    #[test]
    fn test_superseded_response_is_ignored() {
        let mut panel = AbiPanel::new();
        panel.begin_request(1);
        panel.begin_request(2);

        // The second submission settles first, then the stale first one arrives.
        assert!(panel.finish_request(2, Ok(json!({ "from": "second" }))));
        assert!(!panel.finish_request(1, Ok(json!({ "from": "first" }))));

        assert_eq!(
            panel.outcome().success().unwrap().abi,
            json!({ "from": "second" })
        );
    }

    #[test]
    fn test_export_only_with_result() {
        let mut panel = AbiPanel::new();
        assert!(panel.handle_key(key(KeyCode::Char('e'))).is_none());
        panel.begin_request(1);
        panel.finish_request(1, Ok(json!([])));
        assert!(matches!(
            panel.handle_key(key(KeyCode::Char('e'))),
            Some(AppEvent::ExportAbi)
        ));
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut panel = AbiPanel::new();
        panel.begin_request(1);
        panel.finish_request(1, Ok(json!({ "a": 1, "b": 2 })));
        // "{", two members, "}" => 4 lines
        panel.handle_key(key(KeyCode::PageDown));
        assert_eq!(panel.scroll, 3);
        panel.handle_key(key(KeyCode::PageUp));
        assert_eq!(panel.scroll, 0);
    }
}
