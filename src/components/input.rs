use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;

use crate::theme::THEME;

/// Width the field labels are padded to so values line up.
const LABEL_WIDTH: usize = 22;

/// Single-line text field. The cursor is a char index, not a byte index.
pub struct TextInput {
    pub label: &'static str,
    pub placeholder: &'static str,
    value: String,
    cursor: usize,
    numeric: bool,
}

impl TextInput {
    pub fn new(label: &'static str, placeholder: &'static str) -> Self {
        Self {
            label,
            placeholder,
            value: String::new(),
            cursor: 0,
            numeric: false,
        }
    }

    /// A field that only accepts ASCII digits.
    pub fn numeric(label: &'static str, placeholder: &'static str) -> Self {
        Self {
            numeric: true,
            ..Self::new(label, placeholder)
        }
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        let numeric = self.numeric;
        self.value = value
            .chars()
            .filter(|c| !numeric || c.is_ascii_digit())
            .collect();
        self.cursor = self.value.chars().count();
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    /// Apply an editing key. Returns true if the key was consumed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Delete => {
                if self.cursor < self.char_count() {
                    let at = self.byte_index(self.cursor);
                    self.value.remove(at);
                }
                true
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                true
            }
            KeyCode::Right => {
                if self.cursor < self.char_count() {
                    self.cursor += 1;
                }
                true
            }
            KeyCode::Home => {
                self.cursor = 0;
                true
            }
            KeyCode::End => {
                self.cursor = self.char_count();
                true
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.clear();
                self.cursor = 0;
                true
            }
            KeyCode::Char(_) if key.modifiers.contains(KeyModifiers::CONTROL) => false,
            KeyCode::Char(c) => {
                if self.numeric && !c.is_ascii_digit() {
                    return true;
                }
                let at = self.byte_index(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
                true
            }
            _ => false,
        }
    }

    /// One form row: selection marker, padded label, then the value.
    pub fn line(&self, selected: bool, editing: bool) -> Line<'_> {
        let mut spans = vec![
            selection_marker(selected),
            Span::styled(
                format!("{:<width$}", self.label, width = LABEL_WIDTH),
                label_style(selected),
            ),
        ];

        if editing {
            let split = self.byte_index(self.cursor);
            let (before, after) = self.value.split_at(split);
            let mut rest = after.chars();
            let under_cursor = rest.next().map(String::from).unwrap_or_else(|| " ".to_string());
            spans.push(Span::styled(before, Style::default().fg(THEME.text)));
            spans.push(Span::styled(
                under_cursor,
                Style::default().fg(THEME.bg).bg(THEME.text_accent),
            ));
            spans.push(Span::styled(rest.as_str(), Style::default().fg(THEME.text)));
        } else if self.value.is_empty() {
            spans.push(Span::styled(self.placeholder, THEME.muted_style()));
        } else {
            spans.push(Span::styled(self.value.as_str(), Style::default().fg(THEME.text)));
        }

        Line::from(spans)
    }
}

pub fn selection_marker(selected: bool) -> Span<'static> {
    if selected {
        Span::styled(" > ", THEME.accent_style())
    } else {
        Span::raw("   ")
    }
}

fn label_style(selected: bool) -> Style {
    if selected {
        Style::default().fg(THEME.text).add_modifier(Modifier::BOLD)
    } else {
        THEME.muted_style()
    }
}

/// A `[x] label` row for boolean fields.
pub fn checkbox_line(label: &str, checked: bool, selected: bool) -> Line<'_> {
    let mark = if checked { "[x] " } else { "[ ] " };
    Line::from(vec![
        selection_marker(selected),
        Span::styled(mark, THEME.accent_style()),
        Span::styled(label, label_style(selected)),
    ])
}

/// A `[ label ]` action row.
pub fn button_line(label: &str, selected: bool) -> Line<'_> {
    let style = if selected {
        THEME.selected_style()
    } else {
        Style::default().fg(THEME.text_accent)
    };
    Line::from(vec![
        selection_marker(selected),
        Span::styled(format!("[ {label} ]"), style),
    ])
}
