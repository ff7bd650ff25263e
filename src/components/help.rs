use crossterm::event::KeyEvent;
use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

pub struct HelpOverlay {
    pub visible: bool,
}

fn section(title: &str) -> Line<'_> {
    Line::from(Span::styled(
        title,
        Style::default()
            .fg(THEME.text_accent)
            .add_modifier(Modifier::BOLD),
    ))
}

fn binding<'a>(keys: &'a str, action: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {keys:<10}"), Style::default().fg(THEME.text_accent)),
        Span::styled(action, Style::default().fg(THEME.text)),
    ])
}

impl HelpOverlay {
    pub fn new() -> Self {
        Self { visible: false }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// Returns true if it consumed the event
    pub fn handle_key(&mut self, _key: KeyEvent) -> bool {
        if self.visible {
            self.visible = false;
            true
        } else {
            false
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        let popup_width = area.width * 60 / 100;
        let popup_height = area.height * 80 / 100;
        let x = area.x + (area.width - popup_width) / 2;
        let y = area.y + (area.height - popup_height) / 2;
        let popup_area = Rect::new(x, y, popup_width, popup_height);

        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .borders(Borders::ALL)
            .border_style(THEME.border_focused_style())
            .style(Style::default().bg(THEME.surface));

        let help_text = vec![
            section("Panels"),
            binding("Tab", "Switch panel"),
            binding("1 / 2", "Focus ABI / Backfill panel"),
            Line::from(""),
            section("Form"),
            binding("\u{2191}/k \u{2193}/j", "Move between fields"),
            binding("Enter / i", "Edit field, toggle checkbox, press button"),
            binding("Space", "Toggle checkbox"),
            binding("s", "Submit the form"),
            Line::from(""),
            section("While editing"),
            binding("Enter", "Finish and move to next field"),
            binding("Tab", "Next field"),
            binding("Esc", "Stop editing"),
            binding("Ctrl+U", "Clear field"),
            Line::from(""),
            section("Results"),
            binding("PgDn/PgUp", "Scroll ABI"),
            binding("Ctrl+D/U", "Scroll ABI"),
            binding("g / G", "Top / bottom of ABI"),
            binding("e", "Export ABI to abi.json"),
            binding("d", "Download backfill_results.zip"),
            Line::from(""),
            section("Other"),
            binding("?", "Toggle this help"),
            binding("q", "Quit"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(block)
            .wrap(Wrap { trim: false });

        frame.render_widget(paragraph, popup_area);
    }
}
