//! Hub-scoped broadcast of [`HubUpdate`] signals.
//!
//! A hub client owns exactly one bus; adapters subscribe through
//! [`HubClient::subscribe_updates`](crate::ports::HubClient::subscribe_updates).

use tokio::sync::broadcast;

use wiserlink_domain::hub_update::HubUpdate;

/// Typed publish/subscribe channel for one hub instance.
pub struct HubUpdateBus {
    sender: broadcast::Sender<HubUpdate>,
}

impl HubUpdateBus {
    /// Create a bus that buffers up to `capacity` unread updates per receiver.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every update published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<HubUpdate> {
        self.sender.subscribe()
    }

    /// Broadcast `update`, returning how many receivers it reached.
    pub fn publish(&self, update: HubUpdate) -> usize {
        self.sender.send(update).unwrap_or(0)
    }

    /// Number of live receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
