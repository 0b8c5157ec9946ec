//! Integration: discovers hub devices and manages one adapter per device.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tracing::{debug, info, warn};

use wiserlink_domain::command::Command;
use wiserlink_domain::error::{NotFoundError, WiserError};
use wiserlink_domain::projection::EntityView;

use crate::entities::{DimmerLight, ShutterEntity, WiserEntity};
use crate::ports::{EventPublisher, HubClient};

/// Product type of hub devices exposed as shutters.
pub const SHUTTER_PRODUCT_TYPE: &str = "Shutter";

/// Every adapter of one hub, keyed by unique id.
pub struct WiserIntegration<C, P> {
    hub: Arc<C>,
    publisher: P,
    entities: Mutex<BTreeMap<String, WiserEntity<C, P>>>,
}

impl<C, P> WiserIntegration<C, P>
where
    C: HubClient + 'static,
    P: EventPublisher + Clone + Send + Sync + 'static,
{
    pub fn new(hub: Arc<C>, publisher: P) -> Self {
        Self {
            hub,
            publisher,
            entities: Mutex::new(BTreeMap::new()),
        }
    }

    fn entities_lock(&self) -> MutexGuard<'_, BTreeMap<String, WiserEntity<C, P>>> {
        self.entities.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create adapters for shutters and dimmable lights not yet managed,
    /// refresh each once, and attach them to hub updates.
    ///
    /// A device whose first refresh fails is skipped until the next setup.
    /// Returns how many adapters were added.
    ///
    /// # Errors
    ///
    /// Returns an error if the hub cannot list its devices.
    pub async fn setup(&self) -> Result<usize, WiserError> {
        let shutters = self.hub.shutters().await?;
        let lights = self.hub.lights().await?;

        let mut discovered = Vec::new();
        for snapshot in shutters {
            if snapshot.product_type != SHUTTER_PRODUCT_TYPE {
                debug!(device_id = %snapshot.id, product_type = %snapshot.product_type, "skipping non shutter device");
                continue;
            }
            discovered.push(WiserEntity::Shutter(Arc::new(ShutterEntity::new(
                Arc::clone(&self.hub),
                self.publisher.clone(),
                snapshot,
            ))));
        }
        for snapshot in lights {
            if !snapshot.is_dimmable {
                debug!(device_id = %snapshot.id, "skipping non dimmable light");
                continue;
            }
            discovered.push(WiserEntity::Light(Arc::new(DimmerLight::new(
                Arc::clone(&self.hub),
                self.publisher.clone(),
                snapshot,
            ))));
        }

        {
            let known = self.entities_lock();
            discovered.retain(|entity| !known.contains_key(entity.unique_id()));
        }

        let mut ready = Vec::with_capacity(discovered.len());
        for entity in discovered {
            match entity.refresh().await {
                Ok(_) => {
                    entity.attach();
                    ready.push(entity);
                }
                Err(err) => {
                    warn!(unique_id = entity.unique_id(), error = %err, "initial refresh failed, skipping device");
                }
            }
        }

        let added = ready.len();
        let mut entities = self.entities_lock();
        for entity in ready {
            entities.insert(entity.unique_id().to_string(), entity);
        }
        info!(
            system = self.hub.system_name(),
            added,
            total = entities.len(),
            "integration set up"
        );
        Ok(added)
    }

    #[must_use]
    pub fn entity(&self, unique_id: &str) -> Option<WiserEntity<C, P>> {
        self.entities_lock().get(unique_id).cloned()
    }

    /// All managed adapters, ordered by unique id.
    #[must_use]
    pub fn entities(&self) -> Vec<WiserEntity<C, P>> {
        self.entities_lock().values().cloned().collect()
    }

    /// Route a host service call to the adapter `unique_id`.
    ///
    /// # Errors
    ///
    /// Returns [`WiserError::NotFound`] for an unknown adapter,
    /// [`WiserError::InvalidArgument`] for an unknown service, a malformed
    /// payload, or a service the adapter does not support, otherwise
    /// whatever the command fails with.
    pub async fn handle_service_call(
        &self,
        unique_id: &str,
        service: &str,
        data: &Value,
    ) -> Result<EntityView, WiserError> {
        let entity = self.entity(unique_id).ok_or_else(|| NotFoundError {
            kind: "Entity",
            id: unique_id.to_string(),
        })?;
        let command = Command::from_service_call(unique_id, service, data)?;
        entity.execute(command).await
    }

    /// Detach and drop every adapter.
    pub async fn teardown(&self) {
        let entities = std::mem::take(&mut *self.entities_lock());
        for entity in entities.values() {
            entity.detach().await;
        }
        info!(
            system = self.hub.system_name(),
            removed = entities.len(),
            "integration torn down"
        );
    }
}
