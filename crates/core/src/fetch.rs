//! Background retrieval of the itch.io jam calendar.

use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::time;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::models::GameJam;
use crate::parser;

/// Events emitted by the background fetch task.
#[derive(Debug)]
pub enum FetchEvent {
    /// A calendar snapshot was retrieved and parsed.
    Loaded {
        /// Jams in calendar order, ready for the repository.
        jams: Vec<GameJam>,
        /// When the snapshot was taken.
        fetched_at: DateTime<Utc>,
    },
    /// The download or the parse failed.
    Error(anyhow::Error),
}

/// Commands accepted by the background fetch task.
#[derive(Debug)]
pub enum FetchCommand {
    /// Fetch a fresh snapshot now instead of waiting for the next interval.
    Refresh,
}

/// Downloads and parses the public jam calendar.
pub struct JamFetcher {
    config: AppConfig,
    client: Client,
}

impl JamFetcher {
    /// Build a fetcher with the configured user agent and timeout.
    pub fn new(config: AppConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .gzip(true)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    /// Download the calendar once and parse it into jams.
    pub async fn fetch(&self, now: DateTime<Utc>) -> Result<Vec<GameJam>> {
        let response = self
            .client
            .get(&self.config.jams_url)
            .send()
            .await
            .with_context(|| format!("failed to request {}", self.config.jams_url))?
            .error_for_status()
            .context("calendar request rejected")?;
        let body = response
            .text()
            .await
            .context("failed to read calendar body")?;
        if body.is_empty() {
            anyhow::bail!("calendar response was empty");
        }
        let jams = parser::parse_jams(&body, now).context("failed to parse calendar payload")?;
        info!(count = jams.len(), "Fetched jam calendar");
        Ok(jams)
    }

    /// Fetch on startup and then on every interval or explicit refresh.
    ///
    /// One event is emitted per attempt; a failed attempt becomes
    /// [`FetchEvent::Error`] and the task keeps running. The task stops when
    /// the command channel closes.
    pub async fn run(
        self,
        mut commands: mpsc::Receiver<FetchCommand>,
        events: mpsc::Sender<FetchEvent>,
    ) -> Result<()> {
        let interval = Duration::from_secs(self.config.refresh_interval_secs.max(1));
        loop {
            self.fetch_and_report(&events).await?;
            tokio::select! {
                _ = time::sleep(interval) => {}
                command = commands.recv() => match command {
                    Some(FetchCommand::Refresh) => {}
                    None => return Ok(()),
                },
            }
        }
    }

    async fn fetch_and_report(&self, events: &mpsc::Sender<FetchEvent>) -> Result<()> {
        let now = Utc::now();
        let event = match self.fetch(now).await {
            Ok(jams) => FetchEvent::Loaded {
                jams,
                fetched_at: now,
            },
            Err(err) => {
                warn!("Jam fetch failed: {err:#}");
                FetchEvent::Error(err)
            }
        };
        events
            .send(event)
            .await
            .context("failed to send fetch event")
    }
}
