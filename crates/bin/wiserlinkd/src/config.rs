//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `wiserlink.toml` in the working directory. Every field has a
//! sensible default so the file is optional. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use wiserlink_adapter_memory_hub::MemoryHubConfig;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Daemon loop settings.
    pub daemon: DaemonConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Simulated hub and the devices it is seeded with.
    pub hub: MemoryHubConfig,
}

/// Daemon loop configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Seconds between unforced hub refreshes.
    pub poll_interval_secs: u64,
    /// Unread events buffered per event bus subscriber.
    pub event_bus_capacity: usize,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `wiserlink.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_file("wiserlink.toml")?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("WISERLINK_SYSTEM_NAME") {
            self.hub.system_name = val;
        }
        if let Ok(val) = std::env::var("WISERLINK_POLL_INTERVAL_SECS")
            && let Ok(secs) = val.parse()
        {
            self.daemon.poll_interval_secs = secs;
        }
        if let Ok(val) = std::env::var("WISERLINK_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.daemon.poll_interval_secs == 0 {
            return Err(ConfigError::Validation(
                "poll interval must be non-zero".to_string(),
            ));
        }
        if self.daemon.event_bus_capacity == 0 || self.hub.bus_capacity == 0 {
            return Err(ConfigError::Validation(
                "bus capacity must be non-zero".to_string(),
            ));
        }
        if self.hub.system_name.is_empty() {
            return Err(ConfigError::Validation(
                "system name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Time between unforced hub refreshes.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.daemon.poll_interval_secs)
    }
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 30,
            event_bus_capacity: 256,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "wiserlink=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
