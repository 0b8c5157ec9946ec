//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the entity adapters and the outside
//! world: the hub client on one side, the host consumer on the other.

pub mod event_bus;
pub mod hub_client;

pub use event_bus::EventPublisher;
pub use hub_client::{BlockingHubClient, HubClient};
