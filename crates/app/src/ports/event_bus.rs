//! Event bus port: notifications to the host consumer.

use std::future::Future;

use wiserlink_domain::error::WiserError;
use wiserlink_domain::event::Event;

/// Publishes entity events to the host consumer.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), WiserError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), WiserError>> + Send {
        (**self).publish(event)
    }
}
