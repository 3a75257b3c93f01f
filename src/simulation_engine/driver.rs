//! Periodic tick driver and snapshot fan-out.
//!
//! A single task ticks the controller at a fixed cadence and publishes the
//! resulting [`StateSnapshot`] on a broadcast channel. Subscribers that fall
//! behind lose the oldest snapshots and resume from the newest one.

use crate::communication::messages::ClientCommand;
use crate::control_system::clock::Clock;
use crate::control_system::config::MAX_BROADCAST_CAPACITY;
use crate::control_system::phase::PhaseChange;
use crate::control_system::traffic_light_controller::TrafficLightController;
use crate::monitoring::traffic_monitoring_system::{TransitionLog, TransitionRecord};
use crate::shared_data::StateSnapshot;
use log::{debug, error};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

/// Publish side of the snapshot channel.
#[derive(Debug, Clone)]
pub struct SnapshotBroadcaster {
    tx: broadcast::Sender<StateSnapshot>,
}

impl SnapshotBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.clamp(1, MAX_BROADCAST_CAPACITY));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateSnapshot> {
        self.tx.subscribe()
    }

    /// Sends to every current subscriber; returns how many received it.
    pub fn publish(&self, snapshot: StateSnapshot) -> usize {
        self.tx.send(snapshot).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

fn record_change(log: Option<&TransitionLog>, change: &PhaseChange, snapshot: &StateSnapshot) {
    if let Some(log) = log {
        if let Err(e) = log.append(&TransitionRecord::new(change, snapshot)) {
            error!("Failed to record phase transition: {}", e);
        }
    }
}

/// Ticks the controller every `period` and publishes each snapshot. Runs until
/// the task is aborted; timing drift is not corrected.
pub async fn run_update_loop<C: Clock>(
    controller: TrafficLightController<C>,
    broadcaster: SnapshotBroadcaster,
    period: Duration,
    log: Option<TransitionLog>,
) {
    loop {
        let (change, snapshot) = controller.tick_and_snapshot();
        if let Some(change) = change {
            record_change(log.as_ref(), &change, &snapshot);
        }
        broadcaster.publish(snapshot);
        sleep(period).await;
    }
}

pub fn spawn_update_loop<C: Clock + 'static>(
    controller: TrafficLightController<C>,
    broadcaster: SnapshotBroadcaster,
    period: Duration,
    log: Option<TransitionLog>,
) -> JoinHandle<()> {
    tokio::spawn(run_update_loop(controller, broadcaster, period, log))
}

/// Applies a client command and publishes the new state right away instead of
/// waiting for the next tick.
pub fn handle_command<C: Clock>(
    controller: &TrafficLightController<C>,
    broadcaster: &SnapshotBroadcaster,
    command: &ClientCommand,
    log: Option<&TransitionLog>,
) -> StateSnapshot {
    debug!("Applying command {:?}", command);
    let (change, snapshot) = controller.dispatch(command);
    if let Some(change) = change {
        record_change(log, &change, &snapshot);
    }
    broadcaster.publish(snapshot.clone());
    snapshot
}
