use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::events::PanelFocus;
use crate::theme::THEME;
use crate::utils;

pub struct Header {
    pub focus: PanelFocus,
    pub api_url: String,
}

const TABS: &[&str] = &["ABI [1]", "Backfill [2]"];

impl Header {
    pub fn new(api_url: &str) -> Self {
        Self {
            focus: PanelFocus::Abi,
            api_url: api_url.to_string(),
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let header_block = Block::default().style(THEME.header_style());
        frame.render_widget(header_block, area);

        // Title | panel tabs | backend address
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(12),
                Constraint::Min(0),
                Constraint::Length(40),
            ])
            .split(area);

        let title = Paragraph::new(Span::styled(
            " athena",
            Style::default()
                .fg(THEME.text_accent)
                .add_modifier(Modifier::BOLD),
        ))
        .style(THEME.header_style());
        frame.render_widget(title, chunks[0]);

        let tab_titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
        let tabs = Tabs::new(tab_titles)
            .select(self.focus.index())
            .style(THEME.muted_style())
            .highlight_style(THEME.accent_style().add_modifier(Modifier::BOLD))
            .divider(Span::raw(" | "));
        frame.render_widget(tabs, chunks[1]);

        let backend = Line::from(vec![
            Span::styled("backend ", THEME.muted_style()),
            Span::styled(
                utils::truncate_middle(&self.api_url, 30),
                Style::default().fg(THEME.text),
            ),
            Span::raw(" "),
        ]);
        let backend_paragraph = Paragraph::new(backend)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(backend_paragraph, chunks[2]);
    }
}
