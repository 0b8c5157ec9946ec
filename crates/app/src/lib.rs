//! # wiserlink-app
//!
//! Application layer: entity adapters and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** at the boundaries:
//!   - `HubClient`: the hub object graph, device actions, forced refresh
//!   - `BlockingHubClient`: the same surface for synchronous clients
//!   - `EventPublisher`: notifications to the host consumer
//! - Project hub snapshots into normalized views (`ShutterEntity`, `DimmerLight`)
//! - Keep projections fresh through hub-scoped subscriptions
//! - Forward consumer commands to the hub, then force a refresh
//! - Discover entities and route service calls (`WiserIntegration`)
//!
//! ## Dependency rule
//! Depends on `wiserlink-domain` only (plus `tokio` for channels and tasks).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod capability;
pub mod entities;
pub mod event_bus;
pub mod integration;
pub mod offload;
pub mod ports;
pub mod subscription;
pub mod update_bus;

#[cfg(test)]
pub(crate) mod testing;
