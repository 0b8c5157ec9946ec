//! Simulated hub configuration.

use std::time::Duration;

use serde::Deserialize;

use wiserlink_domain::snapshot::{LightSnapshot, Room, ShutterSnapshot};

/// Configuration of the simulated hub, usually the `[hub]` table of
/// `wiserlink.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MemoryHubConfig {
    /// Name of the hub system, scoping every entity id.
    pub system_name: String,
    /// Unforced refreshes closer together than this are skipped, in seconds.
    pub min_refresh_interval_secs: u64,
    /// Unread updates buffered per subscriber before it lags.
    pub bus_capacity: usize,
    pub rooms: Vec<Room>,
    pub shutters: Vec<ShutterSnapshot>,
    pub lights: Vec<LightSnapshot>,
}

impl MemoryHubConfig {
    #[must_use]
    pub fn min_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.min_refresh_interval_secs)
    }
}

impl Default for MemoryHubConfig {
    fn default() -> Self {
        Self {
            system_name: "WiserHub".to_string(),
            min_refresh_interval_secs: 5,
            bus_capacity: 64,
            rooms: Vec::new(),
            shutters: Vec::new(),
            lights: Vec::new(),
        }
    }
}
