//! Entity events fanned out to in-process consumers.

use std::future::{Future, ready};

use tokio::sync::broadcast;
use tracing::trace;

use wiserlink_domain::error::WiserError;
use wiserlink_domain::event::Event;

use crate::ports::EventPublisher;

/// [`EventPublisher`] delivering every event to each live subscriber.
///
/// Events published while nobody subscribes are dropped. A subscriber that
/// falls more than `capacity` events behind loses the oldest ones.
pub struct InProcessEventBus {
    sender: broadcast::Sender<Event>,
}

impl InProcessEventBus {
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Receive every event published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), WiserError>> + Send {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            trace!(unique_id = %event.unique_id, "no event subscriber");
        }
        ready(Ok(()))
    }
}
