//! # wiserlinkd: wiserlink daemon
//!
//! Composition root that wires the hub client, the entity adapters and the
//! event log together.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Seed the simulated hub and run it on the blocking thread pool
//! - Discover entities and attach them to hub updates
//! - Poll the hub on an interval; adapters refresh on every broadcast
//! - Log every entity event
//! - Detach everything on ctrl-c
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use wiserlink_adapter_memory_hub::MemoryHub;
use wiserlink_app::event_bus::InProcessEventBus;
use wiserlink_app::integration::WiserIntegration;
use wiserlink_app::offload::Offloaded;
use wiserlink_app::ports::HubClient;
use wiserlink_domain::event::{Event, EventKind};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = config::Config::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Hub
    let poll_interval = config.poll_interval();
    let hub = Arc::new(Offloaded::new(MemoryHub::new(config.hub)));

    // Event bus
    let event_bus = Arc::new(InProcessEventBus::new(config.daemon.event_bus_capacity));
    let event_log = tokio::spawn(log_events(event_bus.subscribe()));

    // Entities
    let integration = WiserIntegration::new(Arc::clone(&hub), Arc::clone(&event_bus));
    let added = integration.setup().await?;
    if added == 0 {
        warn!(system = hub.system_name(), "no shutter or dimmable light on the hub");
    }
    info!(
        system = hub.system_name(),
        entities = added,
        poll_interval_secs = poll_interval.as_secs(),
        "wiserlinkd running"
    );

    let mut poll = tokio::time::interval(poll_interval);
    loop {
        tokio::select! {
            _ = poll.tick() => {
                if let Err(err) = hub.refresh(false).await {
                    warn!(error = %err, "hub poll failed");
                }
            }
            signal = tokio::signal::ctrl_c() => {
                signal?;
                info!("shutting down");
                break;
            }
        }
    }

    integration.teardown().await;
    event_log.abort();
    Ok(())
}

async fn log_events(mut events: broadcast::Receiver<Event>) {
    loop {
        match events.recv().await {
            Ok(event) => match &event.kind {
                EventKind::StateChanged { view } => {
                    info!(unique_id = %event.unique_id, view = ?view, "state changed");
                }
                EventKind::Unavailable => {
                    warn!(unique_id = %event.unique_id, "entity unavailable");
                }
                EventKind::CommandFailed { command, reason } => {
                    error!(unique_id = %event.unique_id, command, reason, "command failed");
                }
            },
            Err(RecvError::Lagged(skipped)) => warn!(skipped, "event log lagged"),
            Err(RecvError::Closed) => break,
        }
    }
}
