mod app;
mod components;
mod config;
mod data;
mod events;
mod headless;
mod logging;
mod theme;
mod utils;

use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio::sync::mpsc;

use crate::app::App;
use crate::config::Config;
use crate::data::DataService;
use crate::data::api::ApiClient;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::parse();
    let download_dir = config.download_dir();
    let api = ApiClient::new(&config.api_url, config.request_timeout())?;

    // One-shot commands print their result and exit without the UI
    if let Some(command) = config.command.clone() {
        logging::setup_stderr_logging()?;
        let output = headless::run(command, &api, &download_dir).await?;
        println!("{output}");
        return Ok(());
    }

    let log_file = config.log_file();
    logging::setup_file_logging(&log_file)?;
    tracing::info!(
        api_url = %config.api_url,
        download_dir = %download_dir.display(),
        "starting athena-tui"
    );
    eprintln!("Logging to {}", log_file.display());

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let data_service = Arc::new(DataService::new(api, event_tx));

    let mut app = App::with_service(data_service, event_rx, download_dir, config.tick_rate_ms);

    // Initialize terminal
    let terminal = ratatui::init();
    let result = app.run(terminal).await;

    // Restore terminal
    ratatui::restore();

    result
}
