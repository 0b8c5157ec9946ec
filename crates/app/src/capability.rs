//! Capability traits: the host-facing surface each adapter opts into.
//!
//! Adapters implement only the capabilities their device supports; the
//! integration routes commands by checking which adapter kind it holds.

use std::future::Future;

use wiserlink_domain::attribute_value::Attributes;
use wiserlink_domain::device_info::DeviceInfo;
use wiserlink_domain::error::WiserError;
use wiserlink_domain::projection::EntityView;

/// Identity and state common to every adapter.
pub trait HubEntity: Send + Sync {
    fn unique_id(&self) -> &str;

    fn name(&self) -> &str;

    fn device_info(&self) -> DeviceInfo;

    /// `false` once the device disappeared from the hub.
    fn is_available(&self) -> bool;

    /// View of the latest snapshot, `None` while unavailable.
    fn view(&self) -> Option<EntityView>;

    /// Extended attributes of the latest snapshot.
    fn extra_attributes(&self) -> Attributes;

    /// Re-read the device from the hub and notify the consumer.
    fn refresh(&self) -> impl Future<Output = Result<EntityView, WiserError>> + Send;
}

/// Devices that travel between an open and a closed end stop.
pub trait Openable: HubEntity {
    fn is_closed(&self) -> Option<bool>;

    fn is_opening(&self) -> Option<bool>;

    fn is_closing(&self) -> Option<bool>;

    /// Open fully, then force a refresh.
    fn open(&self) -> impl Future<Output = Result<EntityView, WiserError>> + Send;

    /// Close fully, then force a refresh.
    fn close(&self) -> impl Future<Output = Result<EntityView, WiserError>> + Send;

    /// Halt travel. No refresh follows.
    fn stop(&self) -> impl Future<Output = Result<(), WiserError>> + Send;
}

/// Devices with an addressable position in `0..=100`.
pub trait Positionable: HubEntity {
    fn position(&self) -> Option<u8>;

    /// Move to `position`. No refresh follows.
    fn set_position(&self, position: u8) -> impl Future<Output = Result<(), WiserError>> + Send;
}

/// Lights with an on/off state and a `0..=255` brightness.
pub trait Dimmable: HubEntity {
    fn is_on(&self) -> Option<bool>;

    fn brightness(&self) -> Option<u8>;

    /// Switch on, at `brightness` when given, then force a refresh.
    fn turn_on(
        &self,
        brightness: Option<u16>,
    ) -> impl Future<Output = Result<EntityView, WiserError>> + Send;

    /// Switch off, then force a refresh.
    fn turn_off(&self) -> impl Future<Output = Result<EntityView, WiserError>> + Send;
}
