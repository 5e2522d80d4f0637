mod app;

use anyhow::Result;
use std::fs::{self, OpenOptions};

use chrono::Utc;
use jamtrack_core::{
    config::{self, AppConfig},
    fetch::JamFetcher,
    list::JamList,
    prefs::{self, FilePrefs},
};
use tokio::sync::mpsc;
use tracing_subscriber::{prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    init_logging()?;

    config::ensure_default_config()?;
    let config = AppConfig::load()?;

    let store = FilePrefs::open(&config.prefs_path)?;
    let list = JamList::new();
    if let Some(jam) = prefs::load_selection(&store) {
        tracing::info!(id = jam.id, title = %jam.title, "Restored persisted selection");
        list.restore_selection(jam, Utc::now());
    }
    list.set_loading(true);

    let fetcher = JamFetcher::new(config.clone())?;
    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, event_rx) = mpsc::channel(8);
    tokio::spawn(async move {
        if let Err(err) = fetcher.run(command_rx, event_tx).await {
            tracing::error!("Jam fetch task error: {err}");
        }
    });

    let mut app = app::JamTrackerApp::new(&config, list, Box::new(store), command_tx);
    app.attach_fetch(event_rx);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join("jamtrack.log");

    let env_filter = EnvFilter::from_default_env();

    let stdout_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .compact()
        .with_writer(std::io::stdout);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .compact()
        .with_writer(move || {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(&log_path)
                .expect("failed to open log file")
        });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(())
}
