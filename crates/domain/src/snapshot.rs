//! Snapshots: point-in-time reads of hub objects.
//!
//! The hub client owns the live object graph; adapters only ever see one of
//! these immutable copies, fetched afresh on each refresh.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{DeviceId, RoomId, ScheduleId};
use crate::time::Timestamp;

/// Operating mode reported for a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceMode {
    /// Follows its schedule.
    #[default]
    Auto,
    /// Driven by hand or by direct commands.
    Manual,
}

impl fmt::Display for DeviceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str("Auto"),
            Self::Manual => f.write_str("Manual"),
        }
    }
}

/// On/off state of a light output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SwitchState {
    On,
    #[default]
    Off,
}

impl fmt::Display for SwitchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::On => f.write_str("On"),
            Self::Off => f.write_str("Off"),
        }
    }
}

/// Direction the shutter motor is currently driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LiftMovement {
    #[default]
    Stopped,
    Up,
    Down,
}

impl fmt::Display for LiftMovement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("Stopped"),
            Self::Up => f.write_str("Up"),
            Self::Down => f.write_str("Down"),
        }
    }
}

/// Travel times configured on a shutter drive, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    pub open_time: u16,
    pub close_time: u16,
}

/// The next transition of a device schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextScheduleChange {
    pub time: Timestamp,
    /// Lift for shutters, output percentage for lights.
    pub setting: u8,
}

/// Reference to the schedule a device follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRef {
    pub id: ScheduleId,
    #[serde(default)]
    pub next: Option<NextScheduleChange>,
}

/// A room of the hub's object graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
}

/// Read of a shutter as reported by the hub.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutterSnapshot {
    pub id: DeviceId,
    pub name: String,
    pub product_type: String,
    pub firmware_version: String,
    pub room_id: Option<RoomId>,
    /// Current lift, 0 (closed) to 100 (open).
    pub current_lift: u8,
    pub manual_lift: u8,
    pub target_lift: u8,
    pub scheduled_lift: u8,
    pub lift_movement: LiftMovement,
    pub is_open: bool,
    pub is_closed: bool,
    pub is_opening: bool,
    pub is_closing: bool,
    pub mode: DeviceMode,
    pub control_source: String,
    pub drive_config: DriveConfig,
    pub schedule: Option<ScheduleRef>,
}

/// Output range a dimmer is calibrated to, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputRange {
    pub min: u8,
    pub max: u8,
}

impl Default for OutputRange {
    fn default() -> Self {
        Self { min: 0, max: 100 }
    }
}

/// Read of a light as reported by the hub.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LightSnapshot {
    pub id: DeviceId,
    pub name: String,
    pub room_id: Option<RoomId>,
    pub is_dimmable: bool,
    pub current_state: SwitchState,
    pub target_state: SwitchState,
    /// Output level, 0 to 100.
    pub current_percentage: u8,
    pub target_percentage: u8,
    pub current_level: u16,
    pub output_range: OutputRange,
    pub mode: DeviceMode,
    pub control_source: String,
    pub schedule: Option<ScheduleRef>,
}

impl LightSnapshot {
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.current_state == SwitchState::On
    }
}
