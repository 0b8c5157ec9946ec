//! Light projection and the brightness scale conversion.
//!
//! The hub reports output as a 0-100 percentage while the host works in
//! 0-255 brightness. Both directions round to nearest with ties to even, so
//! converting back and forth stays within one step of the starting value.

use serde::{Deserialize, Serialize};

use crate::attribute_value::{AttributeValue, Attributes};
use crate::snapshot::{DeviceMode, LightSnapshot, NextScheduleChange, Room};
use crate::time::to_attribute_string;

use super::room_name;

/// Highest host brightness value.
pub const MAX_BRIGHTNESS: u8 = u8::MAX;

/// Scale a hub percentage (0-100) to host brightness (0-255).
///
/// Percentages above 100 saturate. Ties round to even, so 30% is 76.
#[must_use]
pub fn to_brightness(percentage: u8) -> u8 {
    let scaled = u32::from(percentage.min(100)) * 255;
    let (whole, rest) = (scaled / 100, scaled % 100);
    let rounded = if rest > 50 || (rest == 50 && whole % 2 == 1) {
        whole + 1
    } else {
        whole
    };
    u8::try_from(rounded).unwrap_or(MAX_BRIGHTNESS)
}

/// Scale host brightness (0-255) to a hub percentage (0-100).
///
/// No brightness lands exactly halfway between two percentages, so plain
/// half-up rounding matches ties-to-even here.
#[must_use]
pub fn to_percentage(brightness: u8) -> u8 {
    u8::try_from((u32::from(brightness) * 100 + 127) / 255).unwrap_or(100)
}

/// Normalized view of a dimmable light.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightView {
    pub is_on: bool,
    pub brightness: u8,
    pub icon: String,
    pub room: String,
    pub next_schedule_change: Option<NextScheduleChange>,
}

fn icon(mode: DeviceMode, is_on: bool) -> &'static str {
    match (mode, is_on) {
        (DeviceMode::Auto, true) => "mdi:lightbulb-auto",
        (DeviceMode::Auto, false) => "mdi:lightbulb-auto-outline",
        (DeviceMode::Manual, true) => "mdi:lightbulb",
        (DeviceMode::Manual, false) => "mdi:lightbulb-outline",
    }
}

/// Derive the view of `snapshot`, resolving its room from `room`.
#[must_use]
pub fn project_light(snapshot: &LightSnapshot, room: Option<&Room>) -> LightView {
    let is_on = snapshot.is_on();
    LightView {
        is_on,
        brightness: to_brightness(snapshot.current_percentage),
        icon: icon(snapshot.mode, is_on).to_string(),
        room: room_name(room),
        next_schedule_change: snapshot.schedule.and_then(|s| s.next),
    }
}

/// Extended attribute map of a light.
#[must_use]
pub fn light_attributes(snapshot: &LightSnapshot, room: Option<&Room>) -> Attributes {
    let mut attrs: Attributes = [
        ("name", AttributeValue::from(snapshot.name.as_str())),
        ("mode", snapshot.mode.to_string().into()),
        ("current_state", snapshot.current_state.to_string().into()),
        ("control_source", snapshot.control_source.as_str().into()),
        ("current_percentage", snapshot.current_percentage.into()),
        ("current_level", snapshot.current_level.into()),
        ("is_dimmable", snapshot.is_dimmable.into()),
        ("output_range_min", snapshot.output_range.min.into()),
        ("output_range_max", snapshot.output_range.max.into()),
        ("room", room_name(room).into()),
        ("target_state", snapshot.target_state.to_string().into()),
        ("target_percentage", snapshot.target_percentage.into()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    if let Some(schedule) = snapshot.schedule {
        attrs.insert("schedule_id".to_string(), schedule.id.get().into());
        if let Some(next) = schedule.next {
            attrs.insert(
                "next_schedule_change".to_string(),
                to_attribute_string(next.time).into(),
            );
            attrs.insert(
                "next_schedule_percentage".to_string(),
                next.setting.into(),
            );
        }
    }

    attrs
}
