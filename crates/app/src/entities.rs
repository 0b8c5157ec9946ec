//! Entity adapters, one per hub device.
//!
//! Each adapter keeps the latest snapshot of its device (and the room it is
//! in), derives its view from that snapshot on demand, and re-reads the hub
//! whenever the hub broadcasts an update or a command completes.
//!
//! Refreshes and commands of one adapter are serialized by an async
//! operation lock: a command and the forced refresh that follows it run
//! under a single hold of that lock.

pub mod light;
pub mod shutter;

pub use light::DimmerLight;
pub use shutter::ShutterEntity;

use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tracing::{debug, error, warn};

use wiserlink_domain::command::Command;
use wiserlink_domain::error::{InvalidArgumentError, NotFoundError, WiserError};
use wiserlink_domain::event::Event;
use wiserlink_domain::id::{DeviceId, RoomId};
use wiserlink_domain::projection::EntityView;
use wiserlink_domain::snapshot::Room;

use crate::capability::{Dimmable, HubEntity, Openable, Positionable};
use crate::ports::{EventPublisher, HubClient};
use crate::subscription::Subscription;

/// Latest snapshot of a device and its resolved room.
struct Projection<S> {
    snapshot: Option<S>,
    room: Option<Room>,
}

/// Who an adapter is, fixed at construction.
pub(crate) struct Identity {
    pub(crate) device_id: DeviceId,
    pub(crate) unique_id: String,
    pub(crate) name: String,
}

/// State and plumbing shared by every adapter kind.
pub(crate) struct EntityCore<C, P, S> {
    pub(crate) hub: Arc<C>,
    publisher: P,
    pub(crate) device_id: DeviceId,
    kind: &'static str,
    pub(crate) unique_id: String,
    pub(crate) name: String,
    state: Mutex<Projection<S>>,
    pub(crate) op_lock: tokio::sync::Mutex<()>,
    subscription: Mutex<Option<Subscription>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<C, P, S> EntityCore<C, P, S>
where
    C: HubClient + 'static,
    P: EventPublisher + Send + Sync + 'static,
    S: Send,
{
    pub(crate) fn new(
        hub: Arc<C>,
        publisher: P,
        kind: &'static str,
        identity: Identity,
        initial: S,
    ) -> Self {
        Self {
            hub,
            publisher,
            device_id: identity.device_id,
            kind,
            unique_id: identity.unique_id,
            name: identity.name,
            state: Mutex::new(Projection {
                snapshot: Some(initial),
                room: None,
            }),
            op_lock: tokio::sync::Mutex::new(()),
            subscription: Mutex::new(None),
        }
    }

    /// Apply `f` to the latest snapshot, `None` while unavailable.
    pub(crate) fn project<T>(&self, f: impl FnOnce(&S, Option<&Room>) -> T) -> Option<T> {
        let state = lock(&self.state);
        state.snapshot.as_ref().map(|s| f(s, state.room.as_ref()))
    }

    pub(crate) fn is_available(&self) -> bool {
        lock(&self.state).snapshot.is_some()
    }

    pub(crate) async fn resolve_room(&self, id: Option<RoomId>) -> Result<Option<Room>, WiserError> {
        match id {
            Some(id) => self.hub.room(id).await,
            None => Ok(None),
        }
    }

    /// Replace the stored snapshot and publish the new view.
    pub(crate) async fn store(&self, snapshot: S, room: Option<Room>, view: EntityView) {
        {
            let mut state = lock(&self.state);
            state.snapshot = Some(snapshot);
            state.room = room;
        }
        self.notify(Event::state_changed(&self.unique_id, view)).await;
    }

    /// Forget the snapshot of a device the hub no longer reports.
    pub(crate) async fn went_missing(&self) -> WiserError {
        let was_available = lock(&self.state).snapshot.take().is_some();
        if was_available {
            warn!(unique_id = %self.unique_id, device_id = %self.device_id, "device no longer on hub");
            self.notify(Event::unavailable(&self.unique_id)).await;
        }
        NotFoundError {
            kind: self.kind,
            id: self.device_id.to_string(),
        }
        .into()
    }

    /// Log a failed refresh, keeping the previous snapshot.
    pub(crate) fn refresh_failed(&self, err: &WiserError) {
        if !err.is_not_found() {
            warn!(unique_id = %self.unique_id, error = %err, "refresh failed");
        }
    }

    /// Ask the hub to reload now, bypassing its throttle.
    pub(crate) async fn force_hub_update(&self) -> Result<(), WiserError> {
        debug!(unique_id = %self.unique_id, "requested hub update");
        self.hub.refresh(true).await
    }

    /// Run a command against the hub, reporting failures to the consumer.
    pub(crate) async fn forward<T>(
        &self,
        command: Command,
        call: impl Future<Output = Result<T, WiserError>>,
    ) -> Result<T, WiserError> {
        debug!(unique_id = %self.unique_id, command = command.name(), "forwarding command");
        match call.await {
            Ok(value) => Ok(value),
            Err(err) => {
                error!(unique_id = %self.unique_id, command = command.name(), error = %err, "command failed");
                self.notify(Event::command_failed(
                    &self.unique_id,
                    command.name(),
                    error_chain(&err),
                ))
                .await;
                Err(err)
            }
        }
    }

    async fn notify(&self, event: Event) {
        if let Err(err) = self.publisher.publish(event).await {
            warn!(unique_id = %self.unique_id, error = %err, "failed to publish entity event");
        }
    }

    /// Register `refresh` against the hub's updates unless already attached.
    pub(crate) fn attach<E, F, Fut>(&self, entity: Weak<E>, refresh: F) -> bool
    where
        E: Send + Sync + 'static,
        F: Fn(Arc<E>) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut slot = lock(&self.subscription);
        if slot.is_some() {
            debug!(unique_id = %self.unique_id, "already attached");
            return false;
        }
        let subscription = Subscription::attach(self.hub.subscribe_updates(), move |_update| {
            let pending = entity.upgrade().map(&refresh);
            async move {
                if let Some(pending) = pending {
                    pending.await;
                }
            }
        });
        *slot = Some(subscription);
        true
    }

    pub(crate) fn is_attached(&self) -> bool {
        lock(&self.subscription).is_some()
    }

    pub(crate) async fn detach(&self) {
        let subscription = lock(&self.subscription).take();
        if let Some(subscription) = subscription {
            subscription.detach().await;
            debug!(unique_id = %self.unique_id, "detached");
        }
    }
}

/// Render an error with its sources, outermost first.
fn error_chain(err: &WiserError) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Any adapter the integration manages.
pub enum WiserEntity<C, P> {
    Shutter(Arc<ShutterEntity<C, P>>),
    Light(Arc<DimmerLight<C, P>>),
}

impl<C, P> Clone for WiserEntity<C, P> {
    fn clone(&self) -> Self {
        match self {
            Self::Shutter(s) => Self::Shutter(Arc::clone(s)),
            Self::Light(l) => Self::Light(Arc::clone(l)),
        }
    }
}

impl<C, P> WiserEntity<C, P>
where
    C: HubClient + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    #[must_use]
    pub fn unique_id(&self) -> &str {
        match self {
            Self::Shutter(s) => s.unique_id(),
            Self::Light(l) => l.unique_id(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Shutter(s) => s.name(),
            Self::Light(l) => l.name(),
        }
    }

    #[must_use]
    pub fn view(&self) -> Option<EntityView> {
        match self {
            Self::Shutter(s) => s.view(),
            Self::Light(l) => l.view(),
        }
    }

    /// Re-read the device from the hub.
    ///
    /// # Errors
    ///
    /// Returns [`WiserError::NotFound`] if the device left the hub, or a
    /// communication error.
    pub async fn refresh(&self) -> Result<EntityView, WiserError> {
        match self {
            Self::Shutter(s) => s.refresh().await,
            Self::Light(l) => l.refresh().await,
        }
    }

    /// Subscribe to hub updates. Returns `false` if already attached.
    pub fn attach(&self) -> bool {
        match self {
            Self::Shutter(s) => ShutterEntity::attach(s),
            Self::Light(l) => DimmerLight::attach(l),
        }
    }

    pub async fn detach(&self) {
        match self {
            Self::Shutter(s) => s.detach().await,
            Self::Light(l) => l.detach().await,
        }
    }

    /// Run `command` if this adapter supports it, returning the resulting view.
    ///
    /// Commands that do not force a refresh return the last known view.
    ///
    /// # Errors
    ///
    /// Returns [`WiserError::InvalidArgument`] for a command the device does
    /// not support or an out-of-range argument, otherwise whatever the
    /// command itself fails with.
    pub async fn execute(&self, command: Command) -> Result<EntityView, WiserError> {
        match (self, command) {
            (Self::Shutter(s), Command::Open) => s.open().await,
            (Self::Shutter(s), Command::Close) => s.close().await,
            (Self::Shutter(s), Command::Stop) => {
                s.stop().await?;
                self.last_view()
            }
            (Self::Shutter(s), Command::SetPosition(position)) => {
                s.set_position(position).await?;
                self.last_view()
            }
            (Self::Light(l), Command::TurnOn { brightness }) => l.turn_on(brightness).await,
            (Self::Light(l), Command::TurnOff) => l.turn_off().await,
            (_, command) => Err(InvalidArgumentError::UnsupportedService {
                unique_id: self.unique_id().to_string(),
                service: command.name().to_string(),
            }
            .into()),
        }
    }

    fn last_view(&self) -> Result<EntityView, WiserError> {
        self.view().ok_or_else(|| {
            NotFoundError {
                kind: "Entity",
                id: self.unique_id().to_string(),
            }
            .into()
        })
    }
}
