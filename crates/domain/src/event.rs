//! Event: a notification delivered to the host consumer of an entity.

use serde::{Deserialize, Serialize};

use crate::id::EventId;
use crate::projection::EntityView;
use crate::time::{Timestamp, now};

/// What happened to the entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A refresh produced a new view.
    StateChanged { view: EntityView },
    /// The device is no longer present on the hub.
    Unavailable,
    /// A command was forwarded to the hub and failed.
    CommandFailed { command: String, reason: String },
}

/// An immutable record addressed to one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub timestamp: Timestamp,
    pub unique_id: String,
    pub kind: EventKind,
}

impl Event {
    /// Create an event stamped with a fresh id and the current time.
    #[must_use]
    pub fn new(unique_id: impl Into<String>, kind: EventKind) -> Self {
        Self {
            id: EventId::new(),
            timestamp: now(),
            unique_id: unique_id.into(),
            kind,
        }
    }

    #[must_use]
    pub fn state_changed(unique_id: impl Into<String>, view: impl Into<EntityView>) -> Self {
        Self::new(unique_id, EventKind::StateChanged { view: view.into() })
    }

    #[must_use]
    pub fn unavailable(unique_id: impl Into<String>) -> Self {
        Self::new(unique_id, EventKind::Unavailable)
    }

    #[must_use]
    pub fn command_failed(
        unique_id: impl Into<String>,
        command: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            unique_id,
            EventKind::CommandFailed {
                command: command.into(),
                reason: reason.into(),
            },
        )
    }
}
