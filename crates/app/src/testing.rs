//! In-memory doubles shared by the adapter and integration tests.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{Notify, broadcast};

use wiserlink_domain::error::{CommunicationError, WiserError};
use wiserlink_domain::event::Event;
use wiserlink_domain::hub_update::HubUpdate;
use wiserlink_domain::id::{DeviceId, RoomId};
use wiserlink_domain::snapshot::{LightSnapshot, Room, ShutterSnapshot, SwitchState};

use crate::ports::{EventPublisher, HubClient};
use crate::update_bus::HubUpdateBus;

pub(crate) fn shutter_snapshot(
    id: u32,
    current_lift: u8,
    is_open: bool,
    is_closed: bool,
) -> ShutterSnapshot {
    ShutterSnapshot {
        id: DeviceId::new(id),
        name: format!("Blind {id}"),
        product_type: "Shutter".to_string(),
        current_lift,
        is_open,
        is_closed,
        ..ShutterSnapshot::default()
    }
}

pub(crate) fn light_snapshot(id: u32, current_percentage: u8, on: bool) -> LightSnapshot {
    let state = if on { SwitchState::On } else { SwitchState::Off };
    LightSnapshot {
        id: DeviceId::new(id),
        name: format!("Lamp {id}"),
        is_dimmable: true,
        current_state: state,
        target_state: state,
        current_percentage,
        target_percentage: current_percentage,
        ..LightSnapshot::default()
    }
}

#[derive(Default)]
struct FakeState {
    shutters: BTreeMap<DeviceId, ShutterSnapshot>,
    lights: BTreeMap<DeviceId, LightSnapshot>,
    rooms: BTreeMap<RoomId, Room>,
    calls: Vec<String>,
    offline: bool,
}

/// Hub double applying commands to its snapshots the way a real hub settles.
pub(crate) struct FakeHub {
    state: Mutex<FakeState>,
    bus: HubUpdateBus,
}

impl Default for FakeHub {
    fn default() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
            bus: HubUpdateBus::new(16),
        }
    }
}

impl FakeHub {
    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn put_shutter(&self, snapshot: ShutterSnapshot) {
        self.lock().shutters.insert(snapshot.id, snapshot);
    }

    pub(crate) fn put_light(&self, snapshot: LightSnapshot) {
        self.lock().lights.insert(snapshot.id, snapshot);
    }

    pub(crate) fn put_room(&self, id: RoomId, name: &str) {
        self.lock().rooms.insert(
            id,
            Room {
                id,
                name: name.to_string(),
            },
        );
    }

    pub(crate) fn remove(&self, id: DeviceId) {
        let mut state = self.lock();
        state.shutters.remove(&id);
        state.lights.remove(&id);
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Every hub call recorded so far, oldest first.
    pub(crate) fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Broadcast an update without reloading anything.
    pub(crate) fn broadcast(&self) {
        self.bus.publish(HubUpdate::new(false));
    }

    pub(crate) fn update_receivers(&self) -> usize {
        self.bus.receiver_count()
    }

    /// Record `call`, then run `f` against the state unless offline.
    fn call<T>(
        &self,
        call: String,
        f: impl FnOnce(&mut FakeState) -> T,
    ) -> Result<T, WiserError> {
        let mut state = self.lock();
        if state.offline {
            return Err(CommunicationError::new("fake", "hub offline").into());
        }
        state.calls.push(call);
        Ok(f(&mut state))
    }

    fn with_shutter(
        &self,
        call: String,
        id: DeviceId,
        f: impl FnOnce(&mut ShutterSnapshot),
    ) -> Result<(), WiserError> {
        self.call(call, |state| {
            if let Some(shutter) = state.shutters.get_mut(&id) {
                f(shutter);
            }
        })
    }

    fn with_light(
        &self,
        call: String,
        id: DeviceId,
        f: impl FnOnce(&mut LightSnapshot),
    ) -> Result<(), WiserError> {
        self.call(call, |state| {
            if let Some(light) = state.lights.get_mut(&id) {
                f(light);
            }
        })
    }
}

fn settle_lift(shutter: &mut ShutterSnapshot, lift: u8) {
    shutter.current_lift = lift;
    shutter.target_lift = lift;
    shutter.is_open = lift == 100;
    shutter.is_closed = lift == 0;
}

fn settle_light(light: &mut LightSnapshot, state: SwitchState, percentage: u8) {
    light.current_state = state;
    light.target_state = state;
    light.current_percentage = percentage;
    light.target_percentage = percentage;
}

impl HubClient for FakeHub {
    fn system_name(&self) -> &str {
        "FakeHub"
    }

    fn subscribe_updates(&self) -> broadcast::Receiver<HubUpdate> {
        self.bus.subscribe()
    }

    async fn shutters(&self) -> Result<Vec<ShutterSnapshot>, WiserError> {
        self.call("shutters".to_string(), |s| s.shutters.values().cloned().collect())
    }

    async fn lights(&self) -> Result<Vec<LightSnapshot>, WiserError> {
        self.call("lights".to_string(), |s| s.lights.values().cloned().collect())
    }

    async fn shutter(&self, id: DeviceId) -> Result<Option<ShutterSnapshot>, WiserError> {
        self.call(format!("shutter {id}"), |s| s.shutters.get(&id).cloned())
    }

    async fn light(&self, id: DeviceId) -> Result<Option<LightSnapshot>, WiserError> {
        self.call(format!("light {id}"), |s| s.lights.get(&id).cloned())
    }

    async fn room(&self, id: RoomId) -> Result<Option<Room>, WiserError> {
        self.call(format!("room {id}"), |s| s.rooms.get(&id).cloned())
    }

    async fn open_shutter(&self, id: DeviceId) -> Result<(), WiserError> {
        self.with_shutter(format!("open_shutter {id}"), id, |s| settle_lift(s, 100))
    }

    async fn close_shutter(&self, id: DeviceId) -> Result<(), WiserError> {
        self.with_shutter(format!("close_shutter {id}"), id, |s| settle_lift(s, 0))
    }

    async fn stop_shutter(&self, id: DeviceId) -> Result<(), WiserError> {
        self.with_shutter(format!("stop_shutter {id}"), id, |_| ())
    }

    async fn set_shutter_lift(&self, id: DeviceId, lift: u8) -> Result<(), WiserError> {
        self.with_shutter(format!("set_shutter_lift {id} {lift}"), id, |s| {
            settle_lift(s, lift);
        })
    }

    async fn turn_on_light(&self, id: DeviceId) -> Result<(), WiserError> {
        self.with_light(format!("turn_on_light {id}"), id, |l| {
            settle_light(l, SwitchState::On, 100);
        })
    }

    async fn turn_off_light(&self, id: DeviceId) -> Result<(), WiserError> {
        self.with_light(format!("turn_off_light {id}"), id, |l| {
            settle_light(l, SwitchState::Off, 0);
        })
    }

    async fn set_light_percentage(&self, id: DeviceId, percentage: u8) -> Result<(), WiserError> {
        self.with_light(format!("set_light_percentage {id} {percentage}"), id, |l| {
            let state = if percentage > 0 {
                SwitchState::On
            } else {
                SwitchState::Off
            };
            settle_light(l, state, percentage);
        })
    }

    async fn refresh(&self, no_throttle: bool) -> Result<(), WiserError> {
        self.call(format!("refresh {no_throttle}"), |_| ())?;
        self.bus.publish(HubUpdate::new(no_throttle));
        Ok(())
    }
}

/// Publisher keeping every event it is handed.
#[derive(Default)]
pub(crate) struct RecordingPublisher {
    events: Mutex<Vec<Event>>,
    read: Mutex<usize>,
    published: Notify,
}

impl RecordingPublisher {
    pub(crate) fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    fn take_unread(&self) -> Option<Event> {
        let events = self.events.lock().unwrap();
        let mut read = self.read.lock().unwrap();
        let event = events.get(*read).cloned()?;
        *read += 1;
        Some(event)
    }

    /// Wait for the first event not yet returned by this method.
    pub(crate) async fn next_event(&self, timeout: Duration) -> Event {
        tokio::time::timeout(timeout, async {
            loop {
                let published = self.published.notified();
                if let Some(event) = self.take_unread() {
                    return event;
                }
                published.await;
            }
        })
        .await
        .expect("no event published in time")
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), WiserError>> + Send {
        self.events.lock().unwrap().push(event);
        self.published.notify_waiters();
        std::future::ready(Ok(()))
    }
}
