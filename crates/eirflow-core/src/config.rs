//! Application configuration management.
//!
//! Configuration is stored at `~/.config/eirflow/config.json`. Environment
//! variables (also read from a `.env` file by the binary) override the
//! stored backend URLs for a single run:
//! - `EIRFLOW_API_URL`
//! - `EIRFLOW_GEOCODER_URL`

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::{DEFAULT_API_BASE_URL, DEFAULT_GEOCODER_URL};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "eirflow";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const ENV_API_URL: &str = "EIRFLOW_API_URL";
pub const ENV_GEOCODER_URL: &str = "EIRFLOW_GEOCODER_URL";
pub const ENV_USERNAME: &str = "EIRFLOW_USERNAME";
pub const ENV_PASSWORD: &str = "EIRFLOW_PASSWORD";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;

/// The poller never runs faster than this.
const MIN_POLL_INTERVAL_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_base_url: String,
    pub geocoder_base_url: String,
    pub last_username: Option<String>,
    pub remember_me: bool,
    pub poll_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            geocoder_base_url: DEFAULT_GEOCODER_URL.to_string(),
            last_username: None,
            remember_me: false,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from `lookup` (normally the process environment).
    /// Blank values are ignored.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = get(ENV_API_URL) {
            debug!(url = %url, "API URL overridden from environment");
            self.api_base_url = url;
        }
        if let Some(url) = get(ENV_GEOCODER_URL) {
            self.geocoder_base_url = url;
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(MIN_POLL_INTERVAL_SECS))
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir =
            dirs::cache_dir().ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }

    pub fn log_dir(&self) -> Result<PathBuf> {
        Ok(self.cache_dir()?.join("logs"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://localhost:5000");
        assert_eq!(config.geocoder_base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert!(!config.remember_me);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"last_username": "aoife"}"#).unwrap();
        assert_eq!(config.last_username.as_deref(), Some("aoife"));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.poll_interval_secs, 30);
    }

    #[test]
    fn test_overrides() {
        let mut config = Config::default();
        config.apply_overrides(|name| match name {
            ENV_API_URL => Some("http://api.example:8080".to_string()),
            ENV_GEOCODER_URL => Some("   ".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "http://api.example:8080");
        assert_eq!(config.geocoder_base_url, DEFAULT_GEOCODER_URL);
    }

    #[test]
    fn test_poll_interval_floor() {
        let config = Config {
            poll_interval_secs: 0,
            ..Default::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }
}
