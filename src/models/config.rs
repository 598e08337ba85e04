// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::grid::World;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP client behavior settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Watch loop settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Per-world feed endpoints
    #[serde(default)]
    pub feeds: FeedsConfig,

    /// Error log destination
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::config("http.user_agent is empty"));
        }
        if self.http.timeout_secs == 0 {
            return Err(AppError::config("http.timeout_secs must be > 0"));
        }
        if self.watch.interval_secs == 0 {
            return Err(AppError::config("watch.interval_secs must be > 0"));
        }
        if self.watch.surge_threshold <= 0 {
            return Err(AppError::config("watch.surge_threshold must be > 0"));
        }
        url::Url::parse(&self.feeds.na_url)?;
        url::Url::parse(&self.feeds.eu_url)?;
        if self.logging.error_log.trim().is_empty() {
            return Err(AppError::config("logging.error_log is empty"));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Watch loop settings: starting values for the runtime watch state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// World whose feed is polled
    #[serde(default = "defaults::world")]
    pub world: World,

    /// Seconds between polls
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    /// Population delta that triggers a surge alert
    #[serde(default = "defaults::surge_threshold")]
    pub surge_threshold: i64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            world: defaults::world(),
            interval_secs: defaults::interval(),
            surge_threshold: defaults::surge_threshold(),
        }
    }
}

/// Feed endpoint per world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedsConfig {
    #[serde(default = "defaults::na_url")]
    pub na_url: String,

    #[serde(default = "defaults::eu_url")]
    pub eu_url: String,
}

impl FeedsConfig {
    /// Endpoint for the given world.
    pub fn url_for(&self, world: World) -> &str {
        match world {
            World::Na => &self.na_url,
            World::Eu => &self.eu_url,
        }
    }
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            na_url: defaults::na_url(),
            eu_url: defaults::eu_url(),
        }
    }
}

/// Error log destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Path of the append-only error log file
    #[serde(default = "defaults::error_log")]
    pub error_log: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            error_log: defaults::error_log(),
        }
    }
}

mod defaults {
    use crate::models::grid::World;

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; gridwatch/1.0)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Watch defaults
    pub fn world() -> World {
        World::Na
    }
    pub fn interval() -> u64 {
        60
    }
    pub fn surge_threshold() -> i64 {
        3
    }

    // Feed defaults
    pub fn na_url() -> String {
        "https://atlas.example.com/api/na/grids.json".into()
    }
    pub fn eu_url() -> String {
        "https://atlas.example.com/api/eu/grids.json".into()
    }

    // Logging defaults
    pub fn error_log() -> String {
        "gridwatch-errors.log".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.http.user_agent = "  ".to_string();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));
    }

    #[test]
    fn validate_rejects_unparseable_feed_url() {
        let mut config = Config::default();
        config.feeds.eu_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_interval() {
        let mut config = Config::default();
        config.watch.interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [watch]
            world = "EU"
            "#,
        )
        .unwrap();
        assert_eq!(config.watch.world, World::Eu);
        assert_eq!(config.watch.interval_secs, 60);
        assert_eq!(config.http.timeout_secs, 30);
        assert!(config.feeds.url_for(World::Eu).contains("/eu/"));
    }
}
