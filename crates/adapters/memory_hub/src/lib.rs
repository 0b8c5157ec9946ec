//! # wiserlink-adapter-memory-hub
//!
//! Simulated hub holding its object graph in memory.
//!
//! Commands settle immediately: `open` drives the lift to 100, `close` to 0,
//! `stop` clears any movement. Lights switch and dim the same way. Every
//! reload broadcasts a [`HubUpdate`]; unforced reloads closer together than
//! the configured interval are skipped.
//!
//! The hub can be taken offline and devices removed, to exercise how
//! adapters react to a failing or shrinking hub.
//!
//! ## Dependency rule
//!
//! Depends on `wiserlink-app` (port traits) and `wiserlink-domain` only.

pub mod config;
pub mod error;

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tracing::{debug, info};

use wiserlink_app::ports::BlockingHubClient;
use wiserlink_app::update_bus::HubUpdateBus;
use wiserlink_domain::error::WiserError;
use wiserlink_domain::hub_update::HubUpdate;
use wiserlink_domain::id::{DeviceId, RoomId};
use wiserlink_domain::snapshot::{LiftMovement, LightSnapshot, Room, ShutterSnapshot, SwitchState};

pub use config::MemoryHubConfig;
pub use error::MemoryHubError;

struct HubState {
    rooms: BTreeMap<RoomId, Room>,
    shutters: BTreeMap<DeviceId, ShutterSnapshot>,
    lights: BTreeMap<DeviceId, LightSnapshot>,
    offline: bool,
    last_reload: Option<Instant>,
}

/// In-memory [`BlockingHubClient`].
pub struct MemoryHub {
    system_name: String,
    min_refresh_interval: Duration,
    state: Mutex<HubState>,
    bus: HubUpdateBus,
}

impl MemoryHub {
    #[must_use]
    pub fn new(config: MemoryHubConfig) -> Self {
        let min_refresh_interval = config.min_refresh_interval();
        let state = HubState {
            rooms: config.rooms.into_iter().map(|r| (r.id, r)).collect(),
            shutters: config.shutters.into_iter().map(|s| (s.id, s)).collect(),
            lights: config.lights.into_iter().map(|l| (l.id, l)).collect(),
            offline: false,
            last_reload: None,
        };
        info!(
            system = %config.system_name,
            rooms = state.rooms.len(),
            shutters = state.shutters.len(),
            lights = state.lights.len(),
            "memory hub seeded"
        );
        Self {
            system_name: config.system_name,
            min_refresh_interval,
            state: Mutex::new(state),
            bus: HubUpdateBus::new(config.bus_capacity),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HubState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock the state unless the hub is offline.
    fn online(
        &self,
        operation: &'static str,
    ) -> Result<MutexGuard<'_, HubState>, MemoryHubError> {
        let state = self.lock();
        if state.offline {
            return Err(MemoryHubError::Offline { operation });
        }
        Ok(state)
    }

    fn update_shutter(
        &self,
        operation: &'static str,
        id: DeviceId,
        f: impl FnOnce(&mut ShutterSnapshot),
    ) -> Result<(), MemoryHubError> {
        let mut state = self.online(operation)?;
        let shutter = state
            .shutters
            .get_mut(&id)
            .ok_or(MemoryHubError::UnknownDevice(id))?;
        f(shutter);
        debug!(operation, device_id = %id, "shutter updated");
        Ok(())
    }

    fn update_light(
        &self,
        operation: &'static str,
        id: DeviceId,
        f: impl FnOnce(&mut LightSnapshot),
    ) -> Result<(), MemoryHubError> {
        let mut state = self.online(operation)?;
        let light = state
            .lights
            .get_mut(&id)
            .ok_or(MemoryHubError::UnknownDevice(id))?;
        f(light);
        debug!(operation, device_id = %id, "light updated");
        Ok(())
    }

    /// Make every following call fail as if the hub were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
        info!(system = %self.system_name, offline, "memory hub connectivity changed");
    }

    /// Drop a shutter or light from the object graph.
    ///
    /// Returns `false` if no device had this id.
    pub fn remove_device(&self, id: DeviceId) -> bool {
        let mut state = self.lock();
        let removed = state.shutters.remove(&id).is_some() | state.lights.remove(&id).is_some();
        if removed {
            info!(system = %self.system_name, device_id = %id, "device removed");
        }
        removed
    }

    /// Insert or replace a shutter.
    pub fn put_shutter(&self, snapshot: ShutterSnapshot) {
        self.lock().shutters.insert(snapshot.id, snapshot);
    }
}

fn settle_lift(shutter: &mut ShutterSnapshot, lift: u8) {
    shutter.current_lift = lift;
    shutter.manual_lift = lift;
    shutter.target_lift = lift;
    shutter.lift_movement = LiftMovement::Stopped;
    shutter.is_open = lift == 100;
    shutter.is_closed = lift == 0;
    shutter.is_opening = false;
    shutter.is_closing = false;
}

fn settle_light(light: &mut LightSnapshot, percentage: u8) {
    let state = if percentage > 0 {
        SwitchState::On
    } else {
        SwitchState::Off
    };
    light.current_state = state;
    light.target_state = state;
    light.current_percentage = percentage;
    light.target_percentage = percentage;
    light.current_level = u16::from(percentage) * 10;
}

impl BlockingHubClient for MemoryHub {
    fn system_name(&self) -> &str {
        &self.system_name
    }

    fn subscribe_updates(&self) -> broadcast::Receiver<HubUpdate> {
        self.bus.subscribe()
    }

    fn shutters(&self) -> Result<Vec<ShutterSnapshot>, WiserError> {
        Ok(self.online("shutters")?.shutters.values().cloned().collect())
    }

    fn lights(&self) -> Result<Vec<LightSnapshot>, WiserError> {
        Ok(self.online("lights")?.lights.values().cloned().collect())
    }

    fn shutter(&self, id: DeviceId) -> Result<Option<ShutterSnapshot>, WiserError> {
        Ok(self.online("shutter")?.shutters.get(&id).cloned())
    }

    fn light(&self, id: DeviceId) -> Result<Option<LightSnapshot>, WiserError> {
        Ok(self.online("light")?.lights.get(&id).cloned())
    }

    fn room(&self, id: RoomId) -> Result<Option<Room>, WiserError> {
        Ok(self.online("room")?.rooms.get(&id).cloned())
    }

    fn open_shutter(&self, id: DeviceId) -> Result<(), WiserError> {
        Ok(self.update_shutter("open_shutter", id, |s| settle_lift(s, 100))?)
    }

    fn close_shutter(&self, id: DeviceId) -> Result<(), WiserError> {
        Ok(self.update_shutter("close_shutter", id, |s| settle_lift(s, 0))?)
    }

    fn stop_shutter(&self, id: DeviceId) -> Result<(), WiserError> {
        Ok(self.update_shutter("stop_shutter", id, |s| {
            s.lift_movement = LiftMovement::Stopped;
            s.is_opening = false;
            s.is_closing = false;
            s.target_lift = s.current_lift;
        })?)
    }

    fn set_shutter_lift(&self, id: DeviceId, lift: u8) -> Result<(), WiserError> {
        if lift > 100 {
            return Err(MemoryHubError::LiftOutOfRange(lift).into());
        }
        Ok(self.update_shutter("set_shutter_lift", id, |s| settle_lift(s, lift))?)
    }

    fn turn_on_light(&self, id: DeviceId) -> Result<(), WiserError> {
        Ok(self.update_light("turn_on_light", id, |l| settle_light(l, 100))?)
    }

    fn turn_off_light(&self, id: DeviceId) -> Result<(), WiserError> {
        Ok(self.update_light("turn_off_light", id, |l| settle_light(l, 0))?)
    }

    fn set_light_percentage(&self, id: DeviceId, percentage: u8) -> Result<(), WiserError> {
        if percentage > 100 {
            return Err(MemoryHubError::PercentageOutOfRange(percentage).into());
        }
        Ok(self.update_light("set_light_percentage", id, |l| {
            settle_light(l, percentage);
        })?)
    }

    fn refresh(&self, no_throttle: bool) -> Result<(), WiserError> {
        let mut state = self.online("refresh")?;
        let now = Instant::now();
        let recent = state
            .last_reload
            .is_some_and(|at| now.duration_since(at) < self.min_refresh_interval);
        if recent && !no_throttle {
            debug!(system = %self.system_name, "refresh throttled");
            return Ok(());
        }
        state.last_reload = Some(now);
        drop(state);
        let reached = self.bus.publish(HubUpdate::new(no_throttle));
        debug!(system = %self.system_name, forced = no_throttle, reached, "hub reloaded");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use wiserlink_app::offload::Offloaded;
    use wiserlink_app::ports::HubClient;
    use wiserlink_domain::error::InvalidArgumentError;
    use wiserlink_domain::projection::{ShutterStatus, project_shutter};

    fn seeded(min_refresh_interval_secs: u64) -> MemoryHub {
        MemoryHub::new(MemoryHubConfig {
            system_name: "Test".to_string(),
            min_refresh_interval_secs,
            rooms: vec![Room {
                id: RoomId::new(1),
                name: "Lounge".to_string(),
            }],
            shutters: vec![ShutterSnapshot {
                id: DeviceId::new(10),
                name: "Lounge Blind".to_string(),
                product_type: "Shutter".to_string(),
                room_id: Some(RoomId::new(1)),
                current_lift: 45,
                ..ShutterSnapshot::default()
            }],
            lights: vec![LightSnapshot {
                id: DeviceId::new(20),
                name: "Lounge Lamp".to_string(),
                is_dimmable: true,
                ..LightSnapshot::default()
            }],
            ..MemoryHubConfig::default()
        })
    }

    #[test]
    fn should_serve_seeded_object_graph() {
        let hub = seeded(5);

        assert_eq!(hub.system_name(), "Test");
        assert_eq!(hub.shutters().unwrap().len(), 1);
        assert_eq!(hub.lights().unwrap().len(), 1);
        assert_eq!(hub.room(RoomId::new(1)).unwrap().unwrap().name, "Lounge");
        assert!(hub.shutter(DeviceId::new(99)).unwrap().is_none());
    }

    #[test]
    fn should_open_and_close_shutter() {
        let hub = seeded(5);
        let id = DeviceId::new(10);

        hub.open_shutter(id).unwrap();
        let open = hub.shutter(id).unwrap().unwrap();
        assert_eq!(open.current_lift, 100);
        assert_eq!(project_shutter(&open, None).status, ShutterStatus::Open);

        hub.close_shutter(id).unwrap();
        let closed = hub.shutter(id).unwrap().unwrap();
        assert_eq!(closed.current_lift, 0);
        assert!(closed.is_closed);
    }

    #[test]
    fn should_clear_movement_on_stop() {
        let hub = seeded(5);
        let id = DeviceId::new(10);
        hub.put_shutter(ShutterSnapshot {
            id,
            current_lift: 30,
            target_lift: 100,
            is_opening: true,
            lift_movement: LiftMovement::Up,
            ..ShutterSnapshot::default()
        });

        hub.stop_shutter(id).unwrap();

        let stopped = hub.shutter(id).unwrap().unwrap();
        assert_eq!(stopped.lift_movement, LiftMovement::Stopped);
        assert!(!stopped.is_opening);
        assert_eq!(stopped.target_lift, 30);
    }

    #[test]
    fn should_set_light_percentage() {
        let hub = seeded(5);
        let id = DeviceId::new(20);

        hub.set_light_percentage(id, 60).unwrap();
        let light = hub.light(id).unwrap().unwrap();
        assert!(light.is_on());
        assert_eq!(light.current_percentage, 60);

        hub.turn_off_light(id).unwrap();
        assert!(!hub.light(id).unwrap().unwrap().is_on());
    }

    #[test]
    fn should_reject_out_of_range_lift() {
        let hub = seeded(5);

        let err = hub.set_shutter_lift(DeviceId::new(10), 101).unwrap_err();

        assert!(matches!(err, WiserError::InvalidArgument(_)));
        assert_eq!(hub.shutter(DeviceId::new(10)).unwrap().unwrap().current_lift, 45);
    }

    #[test]
    fn should_reject_out_of_range_percentage() {
        let hub = seeded(5);

        let err = hub.set_light_percentage(DeviceId::new(20), 120).unwrap_err();

        assert!(matches!(
            err,
            WiserError::InvalidArgument(InvalidArgumentError::PercentageOutOfRange(120))
        ));
        assert_eq!(hub.light(DeviceId::new(20)).unwrap().unwrap().current_percentage, 0);
    }

    #[test]
    fn should_report_unknown_device_as_not_found() {
        let hub = seeded(5);

        assert!(hub.open_shutter(DeviceId::new(20)).unwrap_err().is_not_found());
        assert!(hub.turn_on_light(DeviceId::new(10)).unwrap_err().is_not_found());
    }

    #[test]
    fn should_fail_every_call_while_offline() {
        let hub = seeded(5);
        hub.set_offline(true);

        assert!(matches!(hub.shutters(), Err(WiserError::Communication(_))));
        assert!(matches!(
            hub.open_shutter(DeviceId::new(10)),
            Err(WiserError::Communication(_))
        ));
        assert!(matches!(hub.refresh(true), Err(WiserError::Communication(_))));

        hub.set_offline(false);
        assert!(hub.shutters().is_ok());
    }

    #[test]
    fn should_forget_removed_device() {
        let hub = seeded(5);

        assert!(hub.remove_device(DeviceId::new(10)));
        assert!(!hub.remove_device(DeviceId::new(10)));
        assert!(hub.shutter(DeviceId::new(10)).unwrap().is_none());
    }

    #[test]
    fn should_throttle_unforced_refresh() {
        let hub = seeded(60);
        let mut updates = hub.subscribe_updates();

        hub.refresh(false).unwrap();
        hub.refresh(false).unwrap();

        assert!(!updates.try_recv().unwrap().forced);
        assert!(updates.try_recv().is_err());
    }

    #[test]
    fn should_always_broadcast_forced_refresh() {
        let hub = seeded(60);
        let mut updates = hub.subscribe_updates();

        hub.refresh(false).unwrap();
        hub.refresh(true).unwrap();
        hub.refresh(true).unwrap();

        assert!(!updates.try_recv().unwrap().forced);
        assert!(updates.try_recv().unwrap().forced);
        assert!(updates.try_recv().unwrap().forced);
    }

    #[test]
    fn should_not_throttle_without_interval() {
        let hub = seeded(0);
        let mut updates = hub.subscribe_updates();

        hub.refresh(false).unwrap();
        hub.refresh(false).unwrap();

        assert!(updates.try_recv().is_ok());
        assert!(updates.try_recv().is_ok());
    }

    #[tokio::test]
    async fn should_serve_async_adapters_through_offload() {
        let hub = Offloaded::new(seeded(5));
        let id = DeviceId::new(10);

        hub.open_shutter(id).await.unwrap();
        hub.refresh(true).await.unwrap();

        let shutter = hub.shutter(id).await.unwrap().unwrap();
        assert!(shutter.is_open);
    }
}
