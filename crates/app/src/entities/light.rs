//! Dimmable light adapter.

use std::sync::Arc;

use tracing::{info, warn};

use wiserlink_domain::attribute_value::Attributes;
use wiserlink_domain::command::{Command, validate_brightness};
use wiserlink_domain::device_info::{DeviceInfo, device_name, light_unique_id};
use wiserlink_domain::error::WiserError;
use wiserlink_domain::id::DeviceId;
use wiserlink_domain::projection::{
    EntityView, LightView, light_attributes, project_light, to_brightness, to_percentage,
};
use wiserlink_domain::snapshot::LightSnapshot;

use super::{EntityCore, Identity};
use crate::capability::{Dimmable, HubEntity};
use crate::ports::{EventPublisher, HubClient};

const MODEL: &str = "NHPDimmer";
const SW_VERSION: &str = "020519ff";

/// A dimmable hub light.
pub struct DimmerLight<C, P> {
    core: EntityCore<C, P, LightSnapshot>,
    device_name: String,
}

impl<C, P> DimmerLight<C, P>
where
    C: HubClient + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    pub fn new(hub: Arc<C>, publisher: P, snapshot: LightSnapshot) -> Self {
        let device_name = device_name(&snapshot.name);
        let name = format!("{device_name} {}", snapshot.name);
        let unique_id = light_unique_id(hub.system_name(), &name);
        info!(system = hub.system_name(), name = %name, "light init");
        let identity = Identity {
            device_id: snapshot.id,
            unique_id,
            name,
        };
        Self {
            core: EntityCore::new(hub, publisher, "Light", identity, snapshot),
            device_name,
        }
    }

    #[must_use]
    pub fn device_id(&self) -> DeviceId {
        self.core.device_id
    }

    /// Refresh on every hub update. Returns `false` if already attached.
    pub fn attach(self: &Arc<Self>) -> bool {
        self.core.attach(Arc::downgrade(self), |light: Arc<Self>| async move {
            // failures are logged and surfaced as events by the refresh itself
            let _ = light.refresh().await;
        })
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.core.is_attached()
    }

    pub async fn detach(&self) {
        self.core.detach().await;
    }

    async fn reload(&self) -> Result<LightView, WiserError> {
        let result = self.read_and_store().await;
        if let Err(err) = &result {
            self.core.refresh_failed(err);
        }
        result
    }

    async fn read_and_store(&self) -> Result<LightView, WiserError> {
        let Some(snapshot) = self.core.hub.light(self.core.device_id).await? else {
            return Err(self.core.went_missing().await);
        };
        let room = self.core.resolve_room(snapshot.room_id).await?;
        let view = project_light(&snapshot, room.as_ref());
        self.core
            .store(snapshot, room, EntityView::Light(view.clone()))
            .await;
        Ok(view)
    }

    async fn force_update(&self) -> Result<EntityView, WiserError> {
        self.core.force_hub_update().await?;
        self.reload().await.map(EntityView::from)
    }
}

impl<C, P> HubEntity for DimmerLight<C, P>
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
        DeviceInfo::new(
            self.core.hub.system_name(),
            self.core.device_id,
            self.device_name.clone(),
            MODEL,
            SW_VERSION,
        )
    }

    fn is_available(&self) -> bool {
        self.core.is_available()
    }

    fn view(&self) -> Option<EntityView> {
        self.core.project(project_light).map(EntityView::from)
    }

    fn extra_attributes(&self) -> Attributes {
        self.core.project(light_attributes).unwrap_or_default()
    }

    async fn refresh(&self) -> Result<EntityView, WiserError> {
        let _op = self.core.op_lock.lock().await;
        self.reload().await.map(EntityView::from)
    }
}

impl<C, P> Dimmable for DimmerLight<C, P>
where
    C: HubClient + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    fn is_on(&self) -> Option<bool> {
        self.core.project(|s, _| s.is_on())
    }

    fn brightness(&self) -> Option<u8> {
        self.core
            .project(|s, _| to_brightness(s.current_percentage))
    }

    async fn turn_on(&self, brightness: Option<u16>) -> Result<EntityView, WiserError> {
        let percentage = brightness
            .map(validate_brightness)
            .transpose()
            .inspect_err(|err| {
                warn!(unique_id = %self.core.unique_id, error = %err, "rejected brightness");
            })?
            .map(to_percentage);
        let _op = self.core.op_lock.lock().await;
        self.core
            .forward(Command::TurnOn { brightness }, async {
                match percentage {
                    Some(percentage) => {
                        self.core
                            .hub
                            .set_light_percentage(self.core.device_id, percentage)
                            .await?;
                    }
                    None => self.core.hub.turn_on_light(self.core.device_id).await?,
                }
                self.force_update().await
            })
            .await
    }

    async fn turn_off(&self) -> Result<EntityView, WiserError> {
        let _op = self.core.op_lock.lock().await;
        self.core
            .forward(Command::TurnOff, async {
                self.core.hub.turn_off_light(self.core.device_id).await?;
                self.force_update().await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiserlink_domain::error::InvalidArgumentError;
    use wiserlink_domain::event::EventKind;
    use wiserlink_domain::snapshot::DeviceMode;

    use crate::testing::{FakeHub, RecordingPublisher, light_snapshot};

    type Light = DimmerLight<FakeHub, Arc<RecordingPublisher>>;

    fn setup(snapshot: LightSnapshot) -> (Arc<FakeHub>, Arc<RecordingPublisher>, Arc<Light>) {
        let hub = Arc::new(FakeHub::default());
        hub.put_light(snapshot.clone());
        let publisher = Arc::new(RecordingPublisher::default());
        let light = Arc::new(DimmerLight::new(
            Arc::clone(&hub),
            Arc::clone(&publisher),
            snapshot,
        ));
        (hub, publisher, light)
    }

    fn light_view(view: EntityView) -> LightView {
        match view {
            EntityView::Light(v) => v,
            EntityView::Shutter(_) => panic!("expected a light view"),
        }
    }

    #[tokio::test]
    async fn should_scale_hub_percentage_to_brightness() {
        let (_, _, light) = setup(light_snapshot(2, 50, true));

        let view = light_view(light.refresh().await.unwrap());

        assert!(view.is_on);
        assert_eq!(view.brightness, 128);
        assert_eq!(light.brightness(), Some(128));
        assert_eq!(light.is_on(), Some(true));
    }

    #[tokio::test]
    async fn should_pick_icon_from_mode_and_state() {
        let mut snapshot = light_snapshot(2, 0, false);
        snapshot.mode = DeviceMode::Manual;
        let (_, _, light) = setup(snapshot);

        let view = light_view(light.view().unwrap());

        assert_eq!(view.icon, "mdi:lightbulb-outline");
    }

    #[tokio::test]
    async fn should_write_percentage_when_turning_on_with_brightness() {
        let (hub, _, light) = setup(light_snapshot(2, 0, false));

        let view = light_view(light.turn_on(Some(255)).await.unwrap());

        assert_eq!(
            hub.calls(),
            vec!["set_light_percentage 2 100", "refresh true", "light 2"]
        );
        assert!(view.is_on);
        assert_eq!(view.brightness, 255);
    }

    #[tokio::test]
    async fn should_switch_on_without_brightness() {
        let (hub, _, light) = setup(light_snapshot(2, 0, false));

        light.turn_on(None).await.unwrap();

        assert_eq!(hub.calls(), vec!["turn_on_light 2", "refresh true", "light 2"]);
    }

    #[tokio::test]
    async fn should_force_refresh_after_turn_off() {
        let (hub, _, light) = setup(light_snapshot(2, 80, true));

        let view = light_view(light.turn_off().await.unwrap());

        assert!(!view.is_on);
        assert_eq!(hub.calls(), vec!["turn_off_light 2", "refresh true", "light 2"]);
    }

    #[tokio::test]
    async fn should_reject_brightness_above_range_without_hub_call() {
        let (hub, publisher, light) = setup(light_snapshot(2, 0, false));

        let result = light.turn_on(Some(300)).await;

        assert!(matches!(
            result,
            Err(WiserError::InvalidArgument(
                InvalidArgumentError::BrightnessOutOfRange(300)
            ))
        ));
        assert!(hub.calls().is_empty());
        assert!(publisher.events().is_empty());
    }

    #[tokio::test]
    async fn should_become_unavailable_when_light_leaves_hub() {
        let (hub, publisher, light) = setup(light_snapshot(2, 0, false));
        hub.remove(DeviceId::new(2));

        assert!(light.refresh().await.unwrap_err().is_not_found());
        assert!(!light.is_available());
        assert_eq!(light.brightness(), None);
        let kinds: Vec<EventKind> = publisher.events().into_iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EventKind::Unavailable]);
    }

    #[tokio::test]
    async fn should_name_light_after_device() {
        let (_, _, light) = setup(light_snapshot(2, 0, false));

        assert_eq!(light.name(), "Wiser Lamp 2 Lamp 2");
        assert_eq!(light.unique_id(), "FakeHub-device-light-Wiser Lamp 2 Lamp 2");
        let info = light.device_info();
        assert_eq!(info.name, "Wiser Lamp 2");
        assert_eq!(info.model, "NHPDimmer");
        assert_eq!(info.identifiers, vec![("wiser".to_string(), "FakeHub-2".to_string())]);
    }

    #[tokio::test]
    async fn should_expose_extended_attributes() {
        let (_, _, light) = setup(light_snapshot(2, 30, true));

        let attrs = light.extra_attributes();

        assert_eq!(attrs["current_percentage"], 30u8.into());
        assert_eq!(attrs["room"], "Unassigned".into());
    }
}
