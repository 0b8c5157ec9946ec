//! Shutter adapter.

use std::sync::Arc;

use tracing::{info, warn};

use wiserlink_domain::attribute_value::Attributes;
use wiserlink_domain::command::{Command, validate_position};
use wiserlink_domain::device_info::{DeviceInfo, device_name, shutter_unique_id};
use wiserlink_domain::error::WiserError;
use wiserlink_domain::id::DeviceId;
use wiserlink_domain::projection::{EntityView, ShutterView, project_shutter, shutter_attributes};
use wiserlink_domain::snapshot::ShutterSnapshot;

use super::{EntityCore, Identity};
use crate::capability::{HubEntity, Openable, Positionable};
use crate::ports::{EventPublisher, HubClient};

/// A hub shutter exposed as an openable, positionable cover.
pub struct ShutterEntity<C, P> {
    core: EntityCore<C, P, ShutterSnapshot>,
}

impl<C, P> ShutterEntity<C, P>
where
    C: HubClient + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Build the adapter from the snapshot the hub listed it with.
    pub fn new(hub: Arc<C>, publisher: P, snapshot: ShutterSnapshot) -> Self {
        let name = device_name(&snapshot.name);
        let unique_id = shutter_unique_id(hub.system_name(), snapshot.id, &name);
        info!(system = hub.system_name(), name = %name, "shutter init");
        let identity = Identity {
            device_id: snapshot.id,
            unique_id,
            name,
        };
        Self {
            core: EntityCore::new(hub, publisher, "Shutter", identity, snapshot),
        }
    }

    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.core.device_id
    }

    /// Refresh on every hub update. Returns `false` if already attached.
    pub fn attach(self: &Arc<Self>) -> bool {
        self.core.attach(Arc::downgrade(self), |shutter: Arc<Self>| async move {
            // failures are logged and surfaced as events by the refresh itself
            let _ = shutter.refresh().await;
        })
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.core.is_attached()
    }

    /// Stop refreshing on hub updates.
    pub async fn detach(&self) {
        self.core.detach().await;
    }

    /// Re-read the shutter; caller holds the operation lock.
    async fn reload(&self) -> Result<ShutterView, WiserError> {
        let result = self.read_and_store().await;
        if let Err(err) = &result {
            self.core.refresh_failed(err);
        }
        result
    }

    async fn read_and_store(&self) -> Result<ShutterView, WiserError> {
        let Some(snapshot) = self.core.hub.shutter(self.core.device_id).await? else {
            return Err(self.core.went_missing().await);
        };
        let room = self.core.resolve_room(snapshot.room_id).await?;
        let view = project_shutter(&snapshot, room.as_ref());
        self.core
            .store(snapshot, room, EntityView::Shutter(view.clone()))
            .await;
        Ok(view)
    }

    /// Force a hub reload, then re-read; caller holds the operation lock.
    async fn force_update(&self) -> Result<EntityView, WiserError> {
        self.core.force_hub_update().await?;
        self.reload().await.map(EntityView::from)
    }
}

impl<C, P> HubEntity for ShutterEntity<C, P>
where
    C: HubClient + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    fn unique_id(&self) -> &str {
        &self.core.unique_id
    }

    fn name(&self) -> &str {
        &self.core.name
    }

    fn device_info(&self) -> DeviceInfo {
        let (model, sw_version) = self
            .core
            .project(|s, _| (s.product_type.clone(), s.firmware_version.clone()))
            .unwrap_or_default();
        DeviceInfo::new(
            self.core.hub.system_name(),
            self.core.device_id,
            self.core.name.clone(),
            model,
            sw_version,
        )
    }

    fn is_available(&self) -> bool {
        self.core.is_available()
    }

    fn view(&self) -> Option<EntityView> {
        self.core.project(project_shutter).map(EntityView::from)
    }

    fn extra_attributes(&self) -> Attributes {
        self.core.project(shutter_attributes).unwrap_or_default()
    }

    async fn refresh(&self) -> Result<EntityView, WiserError> {
        let _op = self.core.op_lock.lock().await;
        self.reload().await.map(EntityView::from)
    }
}

impl<C, P> Openable for ShutterEntity<C, P>
where
    C: HubClient + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    fn is_closed(&self) -> Option<bool> {
        self.core.project(|s, _| s.is_closed)
    }

    fn is_opening(&self) -> Option<bool> {
        self.core.project(|s, _| s.is_opening)
    }

    fn is_closing(&self) -> Option<bool> {
        self.core.project(|s, _| s.is_closing)
    }

    async fn open(&self) -> Result<EntityView, WiserError> {
        let _op = self.core.op_lock.lock().await;
        self.core
            .forward(Command::Open, async {
                self.core.hub.open_shutter(self.core.device_id).await?;
                self.force_update().await
            })
            .await
    }

    async fn close(&self) -> Result<EntityView, WiserError> {
        let _op = self.core.op_lock.lock().await;
        self.core
            .forward(Command::Close, async {
                self.core.hub.close_shutter(self.core.device_id).await?;
                self.force_update().await
            })
            .await
    }

    async fn stop(&self) -> Result<(), WiserError> {
        let _op = self.core.op_lock.lock().await;
        self.core
            .forward(
                Command::Stop,
                self.core.hub.stop_shutter(self.core.device_id),
            )
            .await
    }
}

impl<C, P> Positionable for ShutterEntity<C, P>
where
    C: HubClient + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    fn position(&self) -> Option<u8> {
        self.core.project(|s, _| s.current_lift)
    }

    async fn set_position(&self, position: u8) -> Result<(), WiserError> {
        let position = validate_position(position).inspect_err(|err| {
            warn!(unique_id = %self.core.unique_id, error = %err, "rejected position");
        })?;
        let _op = self.core.op_lock.lock().await;
        self.core
            .forward(
                Command::SetPosition(position),
                self.core.hub.set_shutter_lift(self.core.device_id, position),
            )
            .await
    }
}
