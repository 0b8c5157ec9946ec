//! Shutter projection.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::attribute_value::Attributes;
use crate::snapshot::{NextScheduleChange, Room, ShutterSnapshot};
use crate::time::to_attribute_string;

use super::room_name;

const ICON_CLOSED: &str = "mdi:window-shutter";
const ICON_OPEN: &str = "mdi:window-shutter-open";

/// Resting status of a shutter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShutterStatus {
    Open,
    Closed,
    /// Neither fully open nor fully closed.
    Middle,
}

impl ShutterStatus {
    /// Three-way derivation from the hub's independent open/closed flags.
    ///
    /// `is_open` wins when the hub reports both.
    #[must_use]
    pub fn derive(is_open: bool, is_closed: bool) -> Self {
        if is_open {
            Self::Open
        } else if is_closed {
            Self::Closed
        } else {
            Self::Middle
        }
    }
}

impl fmt::Display for ShutterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("Open"),
            Self::Closed => f.write_str("Closed"),
            Self::Middle => f.write_str("Middle"),
        }
    }
}

/// Cover state as the host framework models it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoverState {
    Open,
    Closed,
    Opening,
    Closing,
}

impl CoverState {
    /// Motion flags take precedence over the resting position.
    #[must_use]
    pub fn derive(is_opening: bool, is_closing: bool, is_closed: bool) -> Self {
        if is_opening {
            Self::Opening
        } else if is_closing {
            Self::Closing
        } else if is_closed {
            Self::Closed
        } else {
            Self::Open
        }
    }
}

/// Normalized view of a shutter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShutterView {
    /// Current lift, 0 (closed) to 100 (open).
    pub position: u8,
    pub status: ShutterStatus,
    pub state: CoverState,
    pub is_closed: bool,
    pub is_opening: bool,
    pub is_closing: bool,
    pub icon: String,
    pub room: String,
    pub next_schedule_change: Option<NextScheduleChange>,
}

/// Derive the view of `snapshot`, resolving its room from `room`.
#[must_use]
pub fn project_shutter(snapshot: &ShutterSnapshot, room: Option<&Room>) -> ShutterView {
    let icon = if snapshot.is_closed { ICON_CLOSED } else { ICON_OPEN };
    ShutterView {
        position: snapshot.current_lift,
        status: ShutterStatus::derive(snapshot.is_open, snapshot.is_closed),
        state: CoverState::derive(snapshot.is_opening, snapshot.is_closing, snapshot.is_closed),
        is_closed: snapshot.is_closed,
        is_opening: snapshot.is_opening,
        is_closing: snapshot.is_closing,
        icon: icon.to_string(),
        room: room_name(room),
        next_schedule_change: snapshot.schedule.and_then(|s| s.next),
    }
}

/// Extended attribute map of a shutter.
#[must_use]
pub fn shutter_attributes(snapshot: &ShutterSnapshot, room: Option<&Room>) -> Attributes {
    let mut attrs = Attributes::new();
    let mut put = |key: &str, value: crate::attribute_value::AttributeValue| {
        attrs.insert(key.to_string(), value);
    };

    put("name", snapshot.name.as_str().into());
    put("shutter_id", snapshot.id.get().into());
    put("mode", snapshot.mode.to_string().into());
    put("control_source", snapshot.control_source.as_str().into());
    put("is_open", snapshot.is_open.into());
    put("is_closed", snapshot.is_closed.into());
    put(
        "current_state",
        ShutterStatus::derive(snapshot.is_open, snapshot.is_closed)
            .to_string()
            .into(),
    );
    put("current_lift", snapshot.current_lift.into());
    put("manual_lift", snapshot.manual_lift.into());
    put("target_lift", snapshot.target_lift.into());
    put("scheduled_lift", snapshot.scheduled_lift.into());
    put("lift_movement", snapshot.lift_movement.to_string().into());
    put("lift_open_time", snapshot.drive_config.open_time.into());
    put("lift_close_time", snapshot.drive_config.close_time.into());
    put("room", room_name(room).into());

    if let Some(schedule) = snapshot.schedule {
        put("schedule_id", schedule.id.get().into());
        if let Some(next) = schedule.next {
            put("next_schedule_change", to_attribute_string(next.time).into());
            put("next_schedule_state", next.setting.into());
        }
    }

    attrs
}
