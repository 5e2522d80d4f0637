//! Application configuration loading.
//!
//! Built-in defaults are overridden by `config.toml` in the user's config
//! directory, which in turn is overridden by `JAMTRACK_`-prefixed environment
//! variables.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use tracing::info;

use crate::prefs::FilePrefs;

/// URL of the public itch.io jam calendar.
pub const DEFAULT_JAMS_URL: &str = "https://itch.io/jams";

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

const DEFAULT_CONFIG_TOML: &str = r#"# jamtrack configuration
#
# Values set here override the built-in defaults; environment variables
# prefixed with JAMTRACK_ override both.

# jams_url = "https://itch.io/jams"
# request_timeout_secs = 15
# refresh_interval_secs = 300
# page_size = 10
# prefs_path = "/path/to/prefs.json"
"#;

/// Runtime configuration for the tracker.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// URL of the jam calendar to scrape.
    pub jams_url: String,
    /// User-Agent header presented to itch.io.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
    /// Seconds between automatic calendar refreshes.
    pub refresh_interval_secs: u64,
    /// Number of jams shown per page.
    pub page_size: usize,
    /// Location of the preferences file.
    pub prefs_path: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            jams_url: DEFAULT_JAMS_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout_secs: 15,
            refresh_interval_secs: 300,
            page_size: 10,
            prefs_path: FilePrefs::default_path(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file, and the environment.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();
        let mut builder = Config::builder()
            .set_default("jams_url", defaults.jams_url)?
            .set_default("user_agent", defaults.user_agent)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs)?
            .set_default("refresh_interval_secs", defaults.refresh_interval_secs)?
            .set_default("page_size", defaults.page_size as u64)?
            .set_default(
                "prefs_path",
                defaults.prefs_path.to_string_lossy().to_string(),
            )?;
        if let Some(path) = Self::config_file() {
            builder = builder.add_source(File::from(path).required(false));
        }
        let mut config: Self = builder
            .add_source(Environment::with_prefix("JAMTRACK"))
            .build()
            .context("failed to load configuration")?
            .try_deserialize()
            .context("failed to parse configuration")?;
        config.page_size = config.page_size.max(1);
        Ok(config)
    }

    fn config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("jamtrack").join("config.toml"))
    }
}

/// Write a commented starter config when none exists yet.
pub fn ensure_default_config() -> Result<()> {
    let Some(path) = AppConfig::config_file() else {
        return Ok(());
    };
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&path, DEFAULT_CONFIG_TOML)
        .with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote default configuration to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.jams_url, "https://itch.io/jams");
        assert!(config.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.request_timeout_secs, 15);
        assert_eq!(config.refresh_interval_secs, 300);
        assert_eq!(config.page_size, 10);
        assert_eq!(
            config.prefs_path.file_name().and_then(|name| name.to_str()),
            Some("prefs.json")
        );
    }
}
