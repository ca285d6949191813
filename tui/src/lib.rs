// Forbid accidental stdout/stderr writes in the *library* portion of the TUI.
// The terminal belongs to ratatui; logs go to a file.
#![deny(clippy::print_stdout, clippy::print_stderr)]

use std::sync::Arc;

use edu_core::HttpTransport;
use edu_core::UiController;
use edu_store::FileStorage;
use tracing::error;
use tracing_appender::non_blocking;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod app;
mod cli;
mod page;
mod screen;
mod slash_command;
mod tui;
mod views;

pub use cli::Cli;
pub use cli::ConfigArgs;
pub use page::Page;

/// File the TUI logs to, under `<home>/log/`.
pub const LOG_FILE_NAME: &str = "edu-tui.log";

pub async fn run_main(cli: Cli) -> anyhow::Result<()> {
    let config = cli.config.load_config()?;

    let log_dir = config.edu_home.join("log");
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::never(&log_dir, LOG_FILE_NAME);
    let (non_blocking, _guard) = non_blocking(file_appender);

    // use RUST_LOG env var, default to info for edu crates.
    let env_filter = || {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("edu_core=info,edu_tui=info,edu_store=info"))
    };
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter());
    let _ = tracing_subscriber::registry().with(file_layer).try_init();

    let transport = Arc::new(HttpTransport::new(&config)?);
    let store = Arc::new(FileStorage::new(&config.edu_home));
    let controller = UiController::spawn(config, transport, store);

    let mut terminal = tui::init()?;
    let result = app::App::new(controller, cli.endpoint).run(&mut terminal).await;
    if let Err(e) = tui::restore() {
        error!("failed to restore terminal: {e}");
    }
    result
}
