use crate::control_system::clock::{Clock, SystemClock};
use crate::control_system::config::ControllerConfig;
use crate::control_system::phase::{Phase, PhaseChange};
use crate::shared_data::{Approach, PedestrianLight, PerApproach, StateSnapshot};
use log::{debug, info, warn};
use std::time::Duration;

/// Phase sequencer for one intersection: two conflicting approaches, two
/// pedestrian crossings and a flashing-amber night mode.
///
/// The controller does no I/O and never blocks. The host calls [`tick`] at a
/// steady cadence and injects events whenever they happen; calling `tick` more
/// often only changes queue drain granularity and transition latency.
///
/// [`tick`]: SignalController::tick
pub struct SignalController<C: Clock = SystemClock> {
    config: ControllerConfig,
    clock: C,
    phase: Phase,
    phase_started: Duration,
    phase_duration: Duration,
    queues: PerApproach<f64>,
    demands: PerApproach<bool>,
    night_mode: bool,
    /// Approach that most recently held a green.
    last_main: Approach,
    /// Crossing currently showing WALK.
    pedestrian_grant: Option<Approach>,
}

impl SignalController<SystemClock> {
    pub fn new(config: ControllerConfig) -> Self {
        Self::with_clock(config, SystemClock::new())
    }
}

impl<C: Clock> SignalController<C> {
    /// Starts in priority green with empty queues. `last_main` is primed to
    /// non-priority so the first clearance hands the green back to the priority road.
    pub fn with_clock(config: ControllerConfig, clock: C) -> Self {
        let phase = Phase::PriorityGreen;
        let phase_started = clock.now();
        let phase_duration = config.timings.dwell(phase);
        Self {
            config,
            clock,
            phase,
            phase_started,
            phase_duration,
            queues: PerApproach::default(),
            demands: PerApproach::default(),
            night_mode: false,
            last_main: Approach::NonPriority,
            pedestrian_grant: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn night_mode(&self) -> bool {
        self.night_mode
    }

    pub fn last_main(&self) -> Approach {
        self.last_main
    }

    pub fn queue(&self, approach: Approach) -> f64 {
        self.queues[approach]
    }

    pub fn demand_pending(&self, crossing: Approach) -> bool {
        self.demands[crossing]
    }

    /// Time spent in the current phase.
    pub fn phase_elapsed(&self) -> Duration {
        self.clock.now().saturating_sub(self.phase_started)
    }

    /// Drains green queues, then makes at most one phase transition.
    pub fn tick(&mut self) -> Option<PhaseChange> {
        self.drain_queues();

        let dwell_elapsed = self.phase_elapsed() >= self.phase_duration;
        let next = if self.night_mode {
            self.next_night_phase(dwell_elapsed)
        } else {
            self.next_day_phase(dwell_elapsed)
        };
        next.map(|phase| self.transition_to(phase))
    }

    /// One more vehicle waiting on `approach`.
    pub fn add_vehicle(&mut self, approach: Approach) {
        self.queues[approach] += 1.0;
        debug!(
            "Vehicle arrived on {} approach (queue {:.1})",
            approach, self.queues[approach]
        );
    }

    /// Registers pedestrian demand for the crossing. Returns `false` when a
    /// demand was already pending.
    pub fn request_pedestrian(&mut self, approach: Approach) -> bool {
        if self.demands[approach] {
            return false;
        }
        self.demands[approach] = true;
        info!("Pedestrian demand registered on {} crossing", approach);
        true
    }

    /// Flips night mode and clears the intersection immediately, whatever the
    /// current phase or its remaining dwell.
    pub fn toggle_night_mode(&mut self) -> PhaseChange {
        self.night_mode = !self.night_mode;
        info!(
            "Night mode {}",
            if self.night_mode { "enabled" } else { "disabled" }
        );
        self.transition_to(Phase::AllRed)
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            phase: self.phase,
            night_mode: self.night_mode,
            lights: PerApproach::new(
                self.phase.vehicle_light(Approach::Priority),
                self.phase.vehicle_light(Approach::NonPriority),
            ),
            pedestrian_lights: PerApproach::new(
                self.pedestrian_light(Approach::Priority),
                self.pedestrian_light(Approach::NonPriority),
            ),
            queues: self.queues.map(|q| q.round().max(0.0) as u32),
            demands: self.demands,
        }
    }

    fn pedestrian_light(&self, crossing: Approach) -> PedestrianLight {
        if self.pedestrian_grant == Some(crossing) {
            PedestrianLight::Green
        } else {
            PedestrianLight::Red
        }
    }

    fn drain_queues(&mut self) {
        if let Some(approach) = self.phase.green_approach() {
            let queue = &mut self.queues[approach];
            *queue = (*queue - self.config.drain_per_tick).max(0.0);
        }
    }

    fn has_competing_demand(&self) -> bool {
        self.queues[Approach::NonPriority] > 0.0 || self.demands[Approach::NonPriority]
    }

    fn next_night_phase(&self, dwell_elapsed: bool) -> Option<Phase> {
        match self.phase {
            Phase::AllRed if dwell_elapsed => Some(Phase::FlashingYellow),
            Phase::FlashingYellow if dwell_elapsed => Some(Phase::AllRed),
            phase if phase.is_night_phase() => None,
            illegal => {
                warn!("Phase {} is illegal in night mode, forcing ALL_RED", illegal);
                Some(Phase::AllRed)
            }
        }
    }

    fn next_day_phase(&mut self, dwell_elapsed: bool) -> Option<Phase> {
        match self.phase {
            // Priority green only ends on competing demand; the dwell is a minimum.
            Phase::PriorityGreen => {
                (dwell_elapsed && self.has_competing_demand()).then_some(Phase::PriorityYellow)
            }
            Phase::PriorityYellow if dwell_elapsed => {
                self.last_main = Approach::Priority;
                Some(Phase::AllRed)
            }
            Phase::NonPriorityGreen if dwell_elapsed => {
                self.last_main = Approach::NonPriority;
                Some(Phase::NonPriorityYellow)
            }
            Phase::NonPriorityYellow if dwell_elapsed => Some(Phase::AllRed),
            Phase::AllRed if dwell_elapsed => Some(Phase::green_for(self.last_main.opposite())),
            Phase::FlashingYellow => {
                warn!("Phase {} is illegal in day mode, forcing ALL_RED", self.phase);
                Some(Phase::AllRed)
            }
            Phase::PriorityYellow
            | Phase::NonPriorityGreen
            | Phase::NonPriorityYellow
            | Phase::AllRed => None,
        }
    }

    fn transition_to(&mut self, next: Phase) -> PhaseChange {
        let now = self.clock.now();
        let change = PhaseChange {
            from: self.phase,
            to: next,
            at: now,
            night_mode: self.night_mode,
        };

        self.phase = next;
        self.phase_started = now;
        self.phase_duration = self.config.timings.dwell(next);

        // Entering a green opens the crossing parallel to the approach now held
        // at red and consumes its demand. Any other phase closes both crossings.
        self.pedestrian_grant = next.green_approach().map(Approach::opposite);
        if let Some(crossing) = self.pedestrian_grant {
            if std::mem::take(&mut self.demands[crossing]) {
                info!("Pedestrian demand served on {} crossing", crossing);
            }
        }

        debug!(
            "Phase {} -> {} (night mode: {}, queues {:.1}/{:.1})",
            change.from,
            change.to,
            self.night_mode,
            self.queues.priority,
            self.queues.non_priority
        );
        change
    }

    #[cfg(test)]
    pub(crate) fn force_phase(&mut self, phase: Phase) {
        self.phase = phase;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control_system::clock::ManualClock;
    use crate::shared_data::LightColor;

    const TICK: Duration = Duration::from_millis(100);

    fn controller() -> (SignalController<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let controller = SignalController::with_clock(ControllerConfig::default(), clock.clone());
        (controller, clock)
    }

    fn run_for(
        controller: &mut SignalController<ManualClock>,
        clock: &ManualClock,
        span: Duration,
    ) -> Vec<PhaseChange> {
        let ticks = (span.as_millis() / TICK.as_millis()) as usize;
        let mut changes = Vec::new();
        for _ in 0..ticks {
            clock.advance(TICK);
            changes.extend(controller.tick());
        }
        changes
    }

    #[test]
    fn fresh_controller_shows_priority_green() {
        let (controller, _) = controller();
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.phase, Phase::PriorityGreen);
        assert_eq!(snapshot.lights.priority, LightColor::Green);
        assert_eq!(snapshot.lights.non_priority, LightColor::Red);
        assert_eq!(snapshot.queues, PerApproach::new(0, 0));
        assert_eq!(snapshot.pedestrian_lights.priority, PedestrianLight::Red);
        assert_eq!(snapshot.pedestrian_lights.non_priority, PedestrianLight::Red);
        assert!(!snapshot.night_mode);
    }

    #[test]
    fn priority_green_holds_without_competing_demand() {
        let (mut controller, clock) = controller();
        controller.add_vehicle(Approach::Priority);
        let changes = run_for(&mut controller, &clock, Duration::from_secs(60));
        assert!(changes.is_empty());
        assert_eq!(controller.phase(), Phase::PriorityGreen);
    }

    #[test]
    fn competing_vehicles_end_priority_green_after_minimum() {
        let (mut controller, clock) = controller();
        for _ in 0..3 {
            controller.add_vehicle(Approach::NonPriority);
        }

        run_for(&mut controller, &clock, Duration::from_millis(9_900));
        assert_eq!(controller.phase(), Phase::PriorityGreen);

        let changes = run_for(&mut controller, &clock, Duration::from_millis(200));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].to, Phase::PriorityYellow);
    }

    #[test]
    fn demand_arriving_late_ends_green_on_next_tick() {
        let (mut controller, clock) = controller();
        run_for(&mut controller, &clock, Duration::from_secs(30));
        assert_eq!(controller.phase(), Phase::PriorityGreen);

        controller.request_pedestrian(Approach::NonPriority);
        clock.advance(TICK);
        assert_eq!(controller.tick().map(|c| c.to), Some(Phase::PriorityYellow));
    }

    #[test]
    fn full_cycle_alternates_approaches() {
        let (mut controller, clock) = controller();
        controller.add_vehicle(Approach::NonPriority);

        let changes = run_for(&mut controller, &clock, Duration::from_secs(40));
        let phases: Vec<Phase> = changes.iter().map(|c| c.to).collect();
        assert_eq!(
            &phases[..5],
            &[
                Phase::PriorityYellow,
                Phase::AllRed,
                Phase::NonPriorityGreen,
                Phase::NonPriorityYellow,
                Phase::AllRed,
            ]
        );
        assert_eq!(phases[5], Phase::PriorityGreen);
        assert_eq!(controller.last_main(), Approach::NonPriority);
    }

    #[test]
    fn non_priority_queue_drains_during_its_green() {
        let (mut controller, clock) = controller();
        for _ in 0..5 {
            controller.add_vehicle(Approach::NonPriority);
        }
        run_for(&mut controller, &clock, Duration::from_secs(15));
        assert_eq!(controller.phase(), Phase::NonPriorityGreen);
        assert_eq!(controller.queue(Approach::NonPriority), 0.0);
    }

    #[test]
    fn queue_drain_is_capped_at_zero() {
        let config = ControllerConfig {
            drain_per_tick: 0.75,
            ..ControllerConfig::default()
        };
        let clock = ManualClock::new();
        let mut controller = SignalController::with_clock(config, clock.clone());
        controller.add_vehicle(Approach::Priority);
        controller.tick();
        assert_eq!(controller.queue(Approach::Priority), 0.25);
        controller.tick();
        assert_eq!(controller.queue(Approach::Priority), 0.0);
    }

    #[test]
    fn pedestrian_request_is_idempotent() {
        let (mut controller, _) = controller();
        assert!(controller.request_pedestrian(Approach::Priority));
        assert!(!controller.request_pedestrian(Approach::Priority));
        assert!(controller.snapshot().demands.priority);
    }

    #[test]
    fn green_grants_opposing_crossing_and_consumes_its_demand() {
        let (mut controller, clock) = controller();
        controller.request_pedestrian(Approach::NonPriority);
        controller.request_pedestrian(Approach::Priority);

        let changes = run_for(&mut controller, &clock, Duration::from_secs(15));
        assert_eq!(changes.last().map(|c| c.to), Some(Phase::NonPriorityGreen));

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.pedestrian_lights.priority, PedestrianLight::Green);
        assert_eq!(snapshot.pedestrian_lights.non_priority, PedestrianLight::Red);
        assert!(!snapshot.demands.priority);
        // Non-priority crossing is served on the next priority green.
        assert!(snapshot.demands.non_priority);
    }

    #[test]
    fn crossing_returns_to_red_on_yellow() {
        let (mut controller, clock) = controller();
        controller.add_vehicle(Approach::NonPriority);
        run_for(&mut controller, &clock, Duration::from_secs(15));
        assert_eq!(controller.phase(), Phase::NonPriorityGreen);

        run_for(&mut controller, &clock, Duration::from_millis(5_100));
        assert_eq!(controller.phase(), Phase::NonPriorityYellow);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.pedestrian_lights.priority, PedestrianLight::Red);
        assert_eq!(snapshot.pedestrian_lights.non_priority, PedestrianLight::Red);
    }

    #[test]
    fn toggle_forces_all_red_mid_phase() {
        let (mut controller, clock) = controller();
        controller.add_vehicle(Approach::NonPriority);
        run_for(&mut controller, &clock, Duration::from_millis(10_500));
        assert_eq!(controller.phase(), Phase::PriorityYellow);

        let change = controller.toggle_night_mode();
        assert_eq!(change.from, Phase::PriorityYellow);
        assert_eq!(change.to, Phase::AllRed);
        assert!(change.night_mode);
        assert_eq!(controller.phase(), Phase::AllRed);
    }

    #[test]
    fn night_mode_alternates_all_red_and_flashing() {
        let (mut controller, clock) = controller();
        controller.toggle_night_mode();

        let changes = run_for(&mut controller, &clock, Duration::from_millis(8_500));
        let phases: Vec<Phase> = changes.iter().map(|c| c.to).collect();
        assert_eq!(
            phases,
            vec![
                Phase::FlashingYellow,
                Phase::AllRed,
                Phase::FlashingYellow,
                Phase::AllRed,
            ]
        );
        for pair in changes.windows(2) {
            assert_eq!(pair[1].at - pair[0].at, Duration::from_secs(2));
        }
    }

    #[test]
    fn night_mode_ignores_demand() {
        let (mut controller, clock) = controller();
        controller.toggle_night_mode();
        controller.add_vehicle(Approach::NonPriority);
        controller.request_pedestrian(Approach::Priority);
        let changes = run_for(&mut controller, &clock, Duration::from_secs(20));
        assert!(changes.iter().all(|c| c.to.is_night_phase()));
        assert!(controller.snapshot().demands.priority);
    }

    #[test]
    fn leaving_night_mode_resumes_day_cycle() {
        let (mut controller, clock) = controller();
        controller.toggle_night_mode();
        run_for(&mut controller, &clock, Duration::from_secs(3));
        assert_eq!(controller.phase(), Phase::FlashingYellow);

        let change = controller.toggle_night_mode();
        assert_eq!(change.to, Phase::AllRed);
        assert!(!controller.night_mode());

        let changes = run_for(&mut controller, &clock, Duration::from_millis(2_100));
        assert_eq!(changes.last().map(|c| c.to), Some(Phase::PriorityGreen));
    }

    #[test]
    fn illegal_day_phase_is_forced_to_all_red() {
        let (mut controller, _) = controller();
        controller.force_phase(Phase::FlashingYellow);
        let change = controller.tick().expect("illegal phase must be corrected");
        assert_eq!(change.to, Phase::AllRed);
    }

    #[test]
    fn illegal_night_phase_is_forced_to_all_red() {
        let (mut controller, _) = controller();
        controller.toggle_night_mode();
        controller.force_phase(Phase::NonPriorityGreen);
        assert_eq!(controller.tick().map(|c| c.to), Some(Phase::AllRed));
    }

    #[test]
    fn oversized_dwell_holds_phase_without_panicking() {
        let clock = ManualClock::new();
        let mut config = ControllerConfig::default();
        config.timings.all_red = 1e300;
        let mut controller = SignalController::with_clock(config, clock.clone());

        assert_eq!(controller.toggle_night_mode().to, Phase::AllRed);
        clock.advance(Duration::from_secs(3_600));
        assert_eq!(controller.tick(), None);
        assert_eq!(controller.phase(), Phase::AllRed);
    }
}
