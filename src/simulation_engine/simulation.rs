// simulation.rs
use crate::control_system::clock::{Clock, ManualClock};
use crate::control_system::config::ControllerConfig;
use crate::control_system::signal_controller::SignalController;
use crate::monitoring::traffic_monitoring_system::{
    TransitionLog, TransitionLogError, TransitionRecord,
};
use crate::shared_data::{Approach, PerApproach, StateSnapshot};
use crate::simulation_engine::stimulation::{inject_random_events, StimulusRates};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

/// Parameters of an unattended, fast-forwarded run.
#[derive(Debug, Clone)]
pub struct HeadlessRun {
    /// Simulated time to cover.
    pub duration: Duration,
    pub seed: u64,
    /// Random arrivals; `None` runs the controller with no stimulus at all.
    pub stimulus: Option<StimulusRates>,
    /// Simulated instants at which night mode is toggled.
    pub night_toggles: Vec<Duration>,
    /// Vehicles already waiting when the run starts.
    pub initial_queues: PerApproach<u32>,
}

impl Default for HeadlessRun {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(300),
            seed: 1,
            stimulus: Some(StimulusRates::default()),
            night_toggles: Vec::new(),
            initial_queues: PerApproach::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    pub ticks: u64,
    pub transitions: usize,
    pub greens: PerApproach<u32>,
    pub cars_injected: PerApproach<u32>,
    pub pedestrians_injected: PerApproach<u32>,
    pub peak_queues: PerApproach<u32>,
    /// Ticks on which the snapshot showed a conflicting signal.
    pub conflicts: u64,
    pub final_snapshot: StateSnapshot,
}

impl SimulationSummary {
    pub fn print(&self) {
        println!("Simulation Summary:");
        println!("Ticks: {}", self.ticks);
        println!("Phase transitions: {}", self.transitions);
        for approach in Approach::ALL {
            println!(
                "  {:<13} greens {:>4}  cars {:>4}  pedestrians {:>4}  peak queue {:>4}",
                approach.to_string(),
                self.greens[approach],
                self.cars_injected[approach],
                self.pedestrians_injected[approach],
                self.peak_queues[approach]
            );
        }
        println!("Conflicting signals observed: {}", self.conflicts);
        println!("Final phase: {}", self.final_snapshot.phase);
    }
}

/// Drives a controller on a manual clock, one tick interval per step, as
/// fast as the CPU allows.
pub fn run_headless(
    config: ControllerConfig,
    run: &HeadlessRun,
    log: Option<&TransitionLog>,
) -> Result<SimulationSummary, TransitionLogError> {
    let interval = config.tick_interval();
    let clock = ManualClock::new();
    let mut controller = SignalController::with_clock(config, clock.clone());
    let mut rng = StdRng::seed_from_u64(run.seed);

    for approach in Approach::ALL {
        for _ in 0..run.initial_queues[approach] {
            controller.add_vehicle(approach);
        }
    }

    let total_ticks = (run.duration.as_micros() / interval.as_micros().max(1)) as u64;
    let mut toggles = run.night_toggles.clone();
    toggles.sort();
    let mut toggles = toggles.into_iter().peekable();

    let mut transitions = 0;
    let mut greens = PerApproach::<u32>::default();
    let mut cars_injected = PerApproach::<u32>::default();
    let mut pedestrians_injected = PerApproach::<u32>::default();
    let mut peak_queues = PerApproach::<u32>::default();
    let mut conflicts = 0;

    for _ in 0..total_ticks {
        clock.advance(interval);

        let mut changes = Vec::with_capacity(2);
        while toggles.peek().is_some_and(|&at| at <= clock.now()) {
            toggles.next();
            changes.push(controller.toggle_night_mode());
        }

        if let Some(rates) = &run.stimulus {
            let injected = inject_random_events(&mut controller, &mut rng, rates);
            for approach in Approach::ALL {
                cars_injected[approach] += injected.cars[approach];
                pedestrians_injected[approach] += injected.pedestrians[approach];
            }
        }

        changes.extend(controller.tick());

        let snapshot = controller.snapshot();
        if !snapshot.is_conflict_free() {
            conflicts += 1;
        }
        for approach in Approach::ALL {
            peak_queues[approach] = peak_queues[approach].max(snapshot.queues[approach]);
        }
        for change in &changes {
            transitions += 1;
            if let Some(approach) = change.to.green_approach() {
                greens[approach] += 1;
            }
            if let Some(log) = log {
                log.append(&TransitionRecord::new(change, &snapshot))?;
            }
        }
    }

    Ok(SimulationSummary {
        ticks: total_ticks,
        transitions,
        greens,
        cars_injected,
        pedestrians_injected,
        peak_queues,
        conflicts,
        final_snapshot: controller.snapshot(),
    })
}
