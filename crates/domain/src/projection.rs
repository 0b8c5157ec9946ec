//! Projection: the normalized view derived from a device snapshot.
//!
//! Every function here is pure: the same snapshot (and resolved room) always
//! yields the same view. Adapters recompute the view on each refresh instead
//! of caching derived fields.

pub mod light;
pub mod shutter;

pub use light::{LightView, light_attributes, project_light, to_brightness, to_percentage};
pub use shutter::{CoverState, ShutterStatus, ShutterView, project_shutter, shutter_attributes};

use serde::{Deserialize, Serialize};

use crate::snapshot::Room;

/// Room label used when a device is not assigned to any room.
pub const UNASSIGNED_ROOM: &str = "Unassigned";

/// Resolve the display name of the room a device sits in.
#[must_use]
pub fn room_name(room: Option<&Room>) -> String {
    room.map_or_else(|| UNASSIGNED_ROOM.to_string(), |r| r.name.clone())
}

/// The normalized view of any projected device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EntityView {
    Shutter(ShutterView),
    Light(LightView),
}

impl From<ShutterView> for EntityView {
    fn from(view: ShutterView) -> Self {
        Self::Shutter(view)
    }
}

impl From<LightView> for EntityView {
    fn from(view: LightView) -> Self {
        Self::Light(view)
    }
}
