//! Monitor configuration - deployment-tunable settings as TOML values.
//!
//! Every struct implements `Default` with values matching the built-in
//! constants, ensuring zero-change behavior when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults::{DEFAULT_BASE_URL, DEFAULT_POLL_INTERVAL_MS};

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a monitor deployment.
///
/// Load with `MonitorConfig::load()` which searches:
/// 1. `$TRAFFICWATCH_CONFIG` env var
/// 2. `./monitor_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Classification service endpoint
    #[serde(default)]
    pub service: ServiceConfig,

    /// Polling cadence
    #[serde(default)]
    pub poller: PollerConfig,
}

/// Classification service endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the classification service (no trailing slash needed)
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Polling cadence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollerConfig {
    /// Milliseconds between ticks
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    DEFAULT_POLL_INTERVAL_MS
}

// ============================================================================
// Loading
// ============================================================================

/// Configuration loading and validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl MonitorConfig {
    /// Load configuration using the standard search order:
    /// 1. `$TRAFFICWATCH_CONFIG` environment variable
    /// 2. `./monitor_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        // 1. Check env var
        if let Ok(path) = std::env::var("TRAFFICWATCH_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), service = %config.service.base_url, "Loaded monitor config from TRAFFICWATCH_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from TRAFFICWATCH_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "TRAFFICWATCH_CONFIG points to non-existent file, falling back");
            }
        }

        // 2. Check ./monitor_config.toml
        let local = PathBuf::from("monitor_config.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!(service = %config.service.base_url, "Loaded monitor config from ./monitor_config.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./monitor_config.toml, using defaults");
                }
            }
        }

        // 3. Defaults
        info!("No monitor_config.toml found — using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path and validate.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        let config: MonitorConfig = toml::from_str(&contents)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.poller.interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "poller.interval_ms must be greater than zero".to_string(),
            ));
        }
        let url = self.service.base_url.trim();
        if url.is_empty() {
            return Err(ConfigError::Invalid(
                "service.base_url must not be empty".to_string(),
            ));
        }
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::Invalid(format!(
                "service.base_url must be an http(s) URL, got '{}'",
                url
            )));
        }
        Ok(())
    }
}
