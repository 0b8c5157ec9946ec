//! Run a synchronous hub client off the async executor.

use std::sync::Arc;

use tokio::sync::broadcast;

use wiserlink_domain::error::{CommunicationError, WiserError};
use wiserlink_domain::hub_update::HubUpdate;
use wiserlink_domain::id::{DeviceId, RoomId};
use wiserlink_domain::snapshot::{LightSnapshot, Room, ShutterSnapshot};

use crate::ports::{BlockingHubClient, HubClient};

/// [`HubClient`] that dispatches every call of a [`BlockingHubClient`] to
/// tokio's blocking thread pool and awaits its completion.
pub struct Offloaded<C> {
    inner: Arc<C>,
}

impl<C> Offloaded<C> {
    pub fn new(inner: C) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Access the wrapped client.
    #[must_use]
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

impl<C: BlockingHubClient> Offloaded<C> {
    async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T, WiserError>
    where
        T: Send + 'static,
        F: FnOnce(&C) -> Result<T, WiserError> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || call(&inner))
            .await
            .map_err(|err| CommunicationError::new(operation, err))?
    }
}

impl<C: BlockingHubClient> HubClient for Offloaded<C> {
    fn system_name(&self) -> &str {
        self.inner.system_name()
    }

    fn subscribe_updates(&self) -> broadcast::Receiver<HubUpdate> {
        self.inner.subscribe_updates()
    }

    async fn shutters(&self) -> Result<Vec<ShutterSnapshot>, WiserError> {
        self.run("shutters", C::shutters).await
    }

    async fn lights(&self) -> Result<Vec<LightSnapshot>, WiserError> {
        self.run("lights", C::lights).await
    }

    async fn shutter(&self, id: DeviceId) -> Result<Option<ShutterSnapshot>, WiserError> {
        self.run("shutter", move |hub| hub.shutter(id)).await
    }

    async fn light(&self, id: DeviceId) -> Result<Option<LightSnapshot>, WiserError> {
        self.run("light", move |hub| hub.light(id)).await
    }

    async fn room(&self, id: RoomId) -> Result<Option<Room>, WiserError> {
        self.run("room", move |hub| hub.room(id)).await
    }

    async fn open_shutter(&self, id: DeviceId) -> Result<(), WiserError> {
        self.run("open_shutter", move |hub| hub.open_shutter(id)).await
    }

    async fn close_shutter(&self, id: DeviceId) -> Result<(), WiserError> {
        self.run("close_shutter", move |hub| hub.close_shutter(id)).await
    }

    async fn stop_shutter(&self, id: DeviceId) -> Result<(), WiserError> {
        self.run("stop_shutter", move |hub| hub.stop_shutter(id)).await
    }

    async fn set_shutter_lift(&self, id: DeviceId, lift: u8) -> Result<(), WiserError> {
        self.run("set_shutter_lift", move |hub| hub.set_shutter_lift(id, lift)).await
    }

    async fn turn_on_light(&self, id: DeviceId) -> Result<(), WiserError> {
        self.run("turn_on_light", move |hub| hub.turn_on_light(id)).await
    }

    async fn turn_off_light(&self, id: DeviceId) -> Result<(), WiserError> {
        self.run("turn_off_light", move |hub| hub.turn_off_light(id)).await
    }

    async fn set_light_percentage(&self, id: DeviceId, percentage: u8) -> Result<(), WiserError> {
        self.run("set_light_percentage", move |hub| {
            hub.set_light_percentage(id, percentage)
        })
        .await
    }

    async fn refresh(&self, no_throttle: bool) -> Result<(), WiserError> {
        self.run("refresh", move |hub| hub.refresh(no_throttle)).await
    }
}
