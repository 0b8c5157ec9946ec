//! Hub update: the "state may have changed" signal a hub client broadcasts.
//!
//! The signal is typed and travels on a channel owned by a single hub client,
//! so there is no topic key to match on.

use serde::{Deserialize, Serialize};

use crate::time::{Timestamp, now};

/// Broadcast after the hub client reloaded its object graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubUpdate {
    pub at: Timestamp,
    /// Whether the reload bypassed the polling throttle.
    pub forced: bool,
}

impl HubUpdate {
    #[must_use]
    pub fn new(forced: bool) -> Self {
        Self { at: now(), forced }
    }
}
