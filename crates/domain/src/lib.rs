//! # wiserlink-domain
//!
//! Pure domain model for the wiserlink hub bridge.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **snapshots** (point-in-time reads of hub shutters, lights, rooms)
//! - Define **projections** (the normalized views derived from snapshots)
//! - Define **commands** a consumer sends and **events** it receives
//! - Define the **hub update** signal broadcast by a hub client
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod attribute_value;
pub mod command;
pub mod device_info;
pub mod event;
pub mod hub_update;
pub mod projection;
pub mod snapshot;
