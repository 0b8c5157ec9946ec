//! Hub client port: the external library that owns the hub connection.
//!
//! The client keeps the device object graph current (polling happens on its
//! side), performs device actions, and broadcasts a [`HubUpdate`] whenever it
//! reloads. It is the sole mutator of device state; implementations must be
//! internally serialized so that concurrent adapters can share one instance.
//!
//! A write that has completed must be visible to any read issued after a
//! subsequent `refresh(true)`.

use std::future::Future;

use tokio::sync::broadcast;

use wiserlink_domain::error::WiserError;
use wiserlink_domain::hub_update::HubUpdate;
use wiserlink_domain::id::{DeviceId, RoomId};
use wiserlink_domain::snapshot::{LightSnapshot, Room, ShutterSnapshot};

/// Asynchronous hub client.
///
/// Reads return `Ok(None)` when the id is not part of the object graph; any
/// failure to talk to the hub is a [`WiserError::Communication`].
pub trait HubClient: Send + Sync {
    /// Name of the hub system, used to scope entity identity.
    fn system_name(&self) -> &str;

    /// Receive every [`HubUpdate`] broadcast after this call.
    fn subscribe_updates(&self) -> broadcast::Receiver<HubUpdate>;

    fn shutters(&self) -> impl Future<Output = Result<Vec<ShutterSnapshot>, WiserError>> + Send;

    fn lights(&self) -> impl Future<Output = Result<Vec<LightSnapshot>, WiserError>> + Send;

    fn shutter(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<ShutterSnapshot>, WiserError>> + Send;

    fn light(
        &self,
        id: DeviceId,
    ) -> impl Future<Output = Result<Option<LightSnapshot>, WiserError>> + Send;

    fn room(&self, id: RoomId) -> impl Future<Output = Result<Option<Room>, WiserError>> + Send;

    fn open_shutter(&self, id: DeviceId) -> impl Future<Output = Result<(), WiserError>> + Send;

    fn close_shutter(&self, id: DeviceId) -> impl Future<Output = Result<(), WiserError>> + Send;

    fn stop_shutter(&self, id: DeviceId) -> impl Future<Output = Result<(), WiserError>> + Send;

    /// Drive the shutter to `lift` (0-100).
    fn set_shutter_lift(
        &self,
        id: DeviceId,
        lift: u8,
    ) -> impl Future<Output = Result<(), WiserError>> + Send;

    fn turn_on_light(&self, id: DeviceId) -> impl Future<Output = Result<(), WiserError>> + Send;

    fn turn_off_light(&self, id: DeviceId) -> impl Future<Output = Result<(), WiserError>> + Send;

    /// Set the light output to `percentage` (0-100).
    fn set_light_percentage(
        &self,
        id: DeviceId,
        percentage: u8,
    ) -> impl Future<Output = Result<(), WiserError>> + Send;

    /// Reload the object graph from the hub and broadcast a [`HubUpdate`].
    ///
    /// With `no_throttle` unset the client may skip the reload when the last
    /// one is recent enough.
    fn refresh(&self, no_throttle: bool) -> impl Future<Output = Result<(), WiserError>> + Send;
}

/// Synchronous hub client whose calls may block on network IO.
///
/// Wrap it in [`Offloaded`](crate::offload::Offloaded) to obtain a
/// [`HubClient`] that runs every call on the blocking thread pool.
pub trait BlockingHubClient: Send + Sync + 'static {
    fn system_name(&self) -> &str;

    fn subscribe_updates(&self) -> broadcast::Receiver<HubUpdate>;

    /// # Errors
    ///
    /// Returns a communication error when the hub cannot be reached.
    fn shutters(&self) -> Result<Vec<ShutterSnapshot>, WiserError>;

    /// # Errors
    ///
    /// Returns a communication error when the hub cannot be reached.
    fn lights(&self) -> Result<Vec<LightSnapshot>, WiserError>;

    /// # Errors
    ///
    /// Returns a communication error when the hub cannot be reached.
    fn shutter(&self, id: DeviceId) -> Result<Option<ShutterSnapshot>, WiserError>;

    /// # Errors
    ///
    /// Returns a communication error when the hub cannot be reached.
    fn light(&self, id: DeviceId) -> Result<Option<LightSnapshot>, WiserError>;

    /// # Errors
    ///
    /// Returns a communication error when the hub cannot be reached.
    fn room(&self, id: RoomId) -> Result<Option<Room>, WiserError>;

    /// # Errors
    ///
    /// Returns not-found for an unknown shutter or a communication error.
    fn open_shutter(&self, id: DeviceId) -> Result<(), WiserError>;

    /// # Errors
    ///
    /// Returns not-found for an unknown shutter or a communication error.
    fn close_shutter(&self, id: DeviceId) -> Result<(), WiserError>;

    /// # Errors
    ///
    /// Returns not-found for an unknown shutter or a communication error.
    fn stop_shutter(&self, id: DeviceId) -> Result<(), WiserError>;

    /// # Errors
    ///
    /// Returns not-found for an unknown shutter or a communication error.
    fn set_shutter_lift(&self, id: DeviceId, lift: u8) -> Result<(), WiserError>;

    /// # Errors
    ///
    /// Returns not-found for an unknown light or a communication error.
    fn turn_on_light(&self, id: DeviceId) -> Result<(), WiserError>;

    /// # Errors
    ///
    /// Returns not-found for an unknown light or a communication error.
    fn turn_off_light(&self, id: DeviceId) -> Result<(), WiserError>;

    /// # Errors
    ///
    /// Returns not-found for an unknown light or a communication error.
    fn set_light_percentage(&self, id: DeviceId, percentage: u8) -> Result<(), WiserError>;

    /// # Errors
    ///
    /// Returns a communication error when the hub cannot be reached.
    fn refresh(&self, no_throttle: bool) -> Result<(), WiserError>;
}
