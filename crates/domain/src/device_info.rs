//! Device metadata and entity identity.
//!
//! Unique ids and device identifiers are scoped by the hub's system name so
//! that two hubs reporting the same device ids never collide.

use serde::{Deserialize, Serialize};

use crate::id::DeviceId;

/// Integration domain used in device identifiers.
pub const DOMAIN: &str = "wiser";

/// Manufacturer reported for every hub device.
pub const MANUFACTURER: &str = "Schneider Electric";

/// Registry metadata describing the physical device behind an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub name: String,
    /// `(domain, identifier)` pairs.
    pub identifiers: Vec<(String, String)>,
    pub manufacturer: String,
    pub model: String,
    pub sw_version: String,
    /// The hub the device is reached through.
    pub via_device: (String, String),
}

impl DeviceInfo {
    /// Describe device `id` reached through hub `system_name`.
    #[must_use]
    pub fn new(
        system_name: &str,
        id: DeviceId,
        name: String,
        model: impl Into<String>,
        sw_version: impl Into<String>,
    ) -> Self {
        Self {
            name,
            identifiers: vec![(DOMAIN.to_string(), identifier(system_name, id))],
            manufacturer: MANUFACTURER.to_string(),
            model: model.into(),
            sw_version: sw_version.into(),
            via_device: (DOMAIN.to_string(), system_name.to_string()),
        }
    }
}

/// Registry identifier of a hub device.
#[must_use]
pub fn identifier(system_name: &str, id: DeviceId) -> String {
    format!("{system_name}-{id}")
}

/// Display name of a hub device.
#[must_use]
pub fn device_name(device_name: &str) -> String {
    format!("Wiser {device_name}")
}

/// Unique id of a shutter entity.
#[must_use]
pub fn shutter_unique_id(system_name: &str, id: DeviceId, name: &str) -> String {
    format!("{system_name}-Wisershutter-{id}-{name}")
}

/// Unique id of a light entity.
#[must_use]
pub fn light_unique_id(system_name: &str, name: &str) -> String {
    format!("{system_name}-device-light-{name}")
}
