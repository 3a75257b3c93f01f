use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::communication::messages::ClientCommand;
use crate::control_system::clock::{Clock, SystemClock};
use crate::control_system::config::ControllerConfig;
use crate::control_system::phase::PhaseChange;
use crate::control_system::signal_controller::SignalController;
use crate::shared_data::{Approach, StateSnapshot};

/// Cloneable handle to one intersection's [`SignalController`].
///
/// Every operation runs under a single lock, so a snapshot never observes a
/// half-applied tick or event.
pub struct TrafficLightController<C: Clock = SystemClock> {
    inner: Arc<Mutex<SignalController<C>>>,
}

impl<C: Clock> Clone for TrafficLightController<C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl TrafficLightController<SystemClock> {
    pub fn new(config: ControllerConfig) -> Self {
        Self::from_controller(SignalController::new(config))
    }
}

impl<C: Clock> TrafficLightController<C> {
    pub fn from_controller(controller: SignalController<C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(controller)),
        }
    }

    // State is consistent between operations, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, SignalController<C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn tick(&self) -> Option<PhaseChange> {
        self.lock().tick()
    }

    /// Ticks and snapshots under one lock, as the periodic driver needs.
    pub fn tick_and_snapshot(&self) -> (Option<PhaseChange>, StateSnapshot) {
        let mut controller = self.lock();
        let change = controller.tick();
        (change, controller.snapshot())
    }

    pub fn add_vehicle(&self, approach: Approach) {
        self.lock().add_vehicle(approach);
    }

    pub fn request_pedestrian(&self, approach: Approach) -> bool {
        self.lock().request_pedestrian(approach)
    }

    pub fn toggle_night_mode(&self) -> PhaseChange {
        self.lock().toggle_night_mode()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.lock().snapshot()
    }

    /// Applies a client command and returns the state right after it.
    pub fn dispatch(&self, command: &ClientCommand) -> (Option<PhaseChange>, StateSnapshot) {
        let mut controller = self.lock();
        let change = match *command {
            ClientCommand::AddCar { direction } => {
                controller.add_vehicle(direction);
                None
            }
            ClientCommand::PedestrianRequest { direction } => {
                controller.request_pedestrian(direction);
                None
            }
            ClientCommand::ToggleNightMode => Some(controller.toggle_night_mode()),
        };
        (change, controller.snapshot())
    }
}
