use ratatui::prelude::*;
use ratatui::widgets::*;

use crate::theme::THEME;

pub struct StatusBar {
    pub loading: bool,
    pub error_message: Option<String>,
    pub info_message: Option<String>,
    pub download_dir: String,
}

impl StatusBar {
    pub fn new(download_dir: &str) -> Self {
        Self {
            loading: false,
            error_message: None,
            info_message: None,
            download_dir: download_dir.to_string(),
        }
    }

    pub fn set_error(&mut self, msg: String) {
        self.info_message = None;
        self.error_message = Some(msg);
    }

    pub fn set_info(&mut self, msg: String) {
        self.error_message = None;
        self.info_message = Some(msg);
    }

    pub fn clear(&mut self) {
        self.error_message = None;
        self.info_message = None;
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let bg = Block::default().style(THEME.header_style());
        frame.render_widget(bg, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(40)])
            .split(area);

        // --- Left side ---
        let left_content = if let Some(ref err) = self.error_message {
            Line::from(vec![
                Span::styled(
                    " ! ",
                    Style::default()
                        .fg(THEME.error)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(err.as_str(), Style::default().fg(THEME.warning)),
            ])
        } else if let Some(ref info) = self.info_message {
            Line::from(vec![
                Span::styled(" \u{2713} ", THEME.success_style()),
                Span::styled(info.as_str(), Style::default().fg(THEME.text)),
            ])
        } else if self.loading {
            Line::from(Span::styled(
                " Waiting for backend...",
                Style::default().fg(THEME.text_accent),
            ))
        } else {
            Line::from(vec![
                Span::styled(" \u{2191}\u{2193}", Style::default().fg(THEME.text_accent)),
                Span::styled(":Field  ", Style::default().fg(THEME.text_muted)),
                Span::styled("Enter", Style::default().fg(THEME.text_accent)),
                Span::styled(":Edit  ", Style::default().fg(THEME.text_muted)),
                Span::styled("s", Style::default().fg(THEME.text_accent)),
                Span::styled(":Submit  ", Style::default().fg(THEME.text_muted)),
                Span::styled("Tab", Style::default().fg(THEME.text_accent)),
                Span::styled(":Panel  ", Style::default().fg(THEME.text_muted)),
                Span::styled("?", Style::default().fg(THEME.text_accent)),
                Span::styled(":Help  ", Style::default().fg(THEME.text_muted)),
                Span::styled("q", Style::default().fg(THEME.text_accent)),
                Span::styled(":Quit", Style::default().fg(THEME.text_muted)),
            ])
        };

        let left = Paragraph::new(left_content).style(THEME.header_style());
        frame.render_widget(left, chunks[0]);

        // --- Right side: where files are saved ---
        let right_content = Line::from(vec![
            Span::styled("saves to ", THEME.muted_style()),
            Span::styled(
                crate::utils::truncate_middle(&self.download_dir, 28),
                THEME.accent_style(),
            ),
            Span::raw(" "),
        ]);

        let right = Paragraph::new(right_content)
            .alignment(Alignment::Right)
            .style(THEME.header_style());
        frame.render_widget(right, chunks[1]);
    }
}
