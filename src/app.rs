use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::*;
use tokio::sync::mpsc;

use crate::components::Component;
use crate::components::abi_panel::AbiPanel;
use crate::components::backfill_panel::BackfillPanel;
use crate::components::header::Header;
use crate::components::help::HelpOverlay;
use crate::components::status_bar::StatusBar;
use crate::data::DataService;
use crate::data::export;
use crate::events::{AppEvent, PanelFocus};
use crate::theme::THEME;

pub struct App {
    focus: PanelFocus,

    // Components
    header: Header,
    abi_panel: AbiPanel,
    backfill_panel: BackfillPanel,
    status_bar: StatusBar,
    help: HelpOverlay,

    // Data
    data_service: Arc<DataService>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    download_dir: PathBuf,

    // State
    should_quit: bool,
    tick_rate: Duration,
}

impl App {
    pub fn with_service(
        data_service: Arc<DataService>,
        event_rx: mpsc::UnboundedReceiver<AppEvent>,
        download_dir: PathBuf,
        tick_rate_ms: u64,
    ) -> Self {
        Self {
            focus: PanelFocus::Abi,
            header: Header::new(data_service.api_url()),
            abi_panel: AbiPanel::new(),
            backfill_panel: BackfillPanel::new(),
            status_bar: StatusBar::new(&download_dir.display().to_string()),
            help: HelpOverlay::new(),
            data_service,
            event_rx,
            download_dir,
            should_quit: false,
            tick_rate: Duration::from_millis(tick_rate_ms),
        }
    }

    pub async fn run(&mut self, mut terminal: ratatui::DefaultTerminal) -> color_eyre::Result<()> {
        let mut interval = tokio::time::interval(self.tick_rate);
        let mut events = EventStream::new();

        while !self.should_quit {
            tokio::select! {
                _ = interval.tick() => {
                    terminal.draw(|frame| self.render(frame))?;
                }
                Some(Ok(event)) = events.next() => {
                    self.handle_terminal_event(event);
                }
                Some(app_event) = self.event_rx.recv() => {
                    self.handle_app_event(app_event);
                }
            }
        }

        self.shutdown();
        Ok(())
    }

    /// Abort in-flight requests and free the held archive.
    fn shutdown(&mut self) {
        self.data_service.cancel_all();
        self.backfill_panel.release_download();
        tracing::info!("shutting down");
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        frame.render_widget(
            Block::default().style(Style::default().bg(THEME.bg)),
            area,
        );

        // Layout: header (1) | panels (fill) | status bar (1)
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.header.render(frame, chunks[0]);

        // The two panels side by side
        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);
        self.abi_panel.render(frame, panels[0]);
        self.backfill_panel.render(frame, panels[1]);

        self.status_bar.loading = self.abi_panel.is_loading() || self.backfill_panel.is_loading();
        self.status_bar.render(frame, chunks[2]);

        self.help.render(frame, area);
    }

    fn is_editing(&self) -> bool {
        match self.focus {
            PanelFocus::Abi => self.abi_panel.is_editing(),
            PanelFocus::Backfill => self.backfill_panel.is_editing(),
        }
    }

    fn handle_terminal_event(&mut self, event: Event) {
        if let Event::Key(key) = event {
            // Only handle key press events (not release/repeat) for cross-platform compat
            if key.kind != KeyEventKind::Press {
                return;
            }
            self.handle_key(key);
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        // Help overlay consumes all keys when visible
        if self.help.handle_key(key) {
            return;
        }

        // Global keys only apply outside of field editing
        if !self.is_editing() {
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return;
                }
                KeyCode::Char('?') => {
                    self.help.toggle();
                    return;
                }
                KeyCode::Tab | KeyCode::BackTab => {
                    self.set_focus(self.focus.toggle());
                    return;
                }
                KeyCode::Char('1') => {
                    self.set_focus(PanelFocus::Abi);
                    return;
                }
                KeyCode::Char('2') => {
                    self.set_focus(PanelFocus::Backfill);
                    return;
                }
                KeyCode::Esc => {
                    self.status_bar.clear();
                    return;
                }
                _ => {}
            }
        }

        let app_event = match self.focus {
            PanelFocus::Abi => self.abi_panel.handle_key(key),
            PanelFocus::Backfill => self.backfill_panel.handle_key(key),
        };

        if let Some(event) = app_event {
            self.handle_app_event(event);
        }
    }

    fn set_focus(&mut self, focus: PanelFocus) {
        self.focus = focus;
        self.header.focus = focus;
        self.abi_panel.focused = focus == PanelFocus::Abi;
        self.backfill_panel.focused = focus == PanelFocus::Backfill;
    }

    fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SubmitAbi(request) => {
                self.status_bar.clear();
                let id = self.data_service.fetch_abi(request);
                self.abi_panel.begin_request(id);
            }
            AppEvent::SubmitBackfill(request) => {
                self.status_bar.clear();
                let id = self.data_service.backfill(request);
                self.backfill_panel.begin_request(id);
            }
            AppEvent::CancelBackfill => {
                self.data_service.cancel_backfill();
            }
            AppEvent::AbiResponse { id, result } => {
                self.abi_panel.finish_request(id, result);
            }
            AppEvent::BackfillResponse { id, result } => {
                self.backfill_panel.finish_request(id, result);
            }
            AppEvent::ExportAbi => {
                let exported = self
                    .abi_panel
                    .outcome()
                    .success()
                    .map(|result| export::export_abi_json(&result.abi, &self.download_dir));
                match exported {
                    Some(Ok(path)) => {
                        tracing::info!(path = %path.display(), "abi exported");
                        self.handle_app_event(AppEvent::Saved(format!(
                            "Exported ABI to {}",
                            path.display()
                        )));
                    }
                    Some(Err(e)) => self.handle_app_event(AppEvent::Error(e)),
                    None => {}
                }
            }
            AppEvent::SaveArchive => match self.backfill_panel.save_archive(&self.download_dir) {
                Some(Ok(path)) => {
                    self.handle_app_event(AppEvent::Saved(format!("Saved {}", path.display())));
                }
                Some(Err(e)) => self.handle_app_event(AppEvent::Error(e)),
                None => {}
            },
            AppEvent::Saved(msg) => {
                self.status_bar.set_info(msg);
            }
            AppEvent::Error(msg) => {
                tracing::warn!(%msg, "local action failed");
                self.status_bar.set_error(msg);
            }
        }
    }
}
