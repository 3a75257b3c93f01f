// Phase dwell times (seconds)
pub const PRIORITY_GREEN_SECS: f64 = 10.0; // minimum, extended while no competing demand
pub const PRIORITY_YELLOW_SECS: f64 = 2.0;
pub const NON_PRIORITY_GREEN_SECS: f64 = 5.0;
pub const NON_PRIORITY_YELLOW_SECS: f64 = 2.0;
pub const ALL_RED_SECS: f64 = 2.0;
pub const FLASHING_YELLOW_SECS: f64 = 2.0;

// Driver cadence
pub const TICK_INTERVAL_MS: u64 = 100;

// Vehicle-units leaving a green approach per tick
pub const DRAIN_PER_TICK: f64 = 1.0;

// Snapshots buffered per subscriber before it starts lagging
pub const BROADCAST_CAPACITY: usize = 64;

// Random stimulus probabilities per tick
pub const CAR_PROBABILITY_PRIORITY: f64 = 0.02;
pub const CAR_PROBABILITY_NON_PRIORITY: f64 = 0.015;
pub const PEDESTRIAN_PROBABILITY: f64 = 0.005;

// Environment / files
pub const CONFIG_PATH_ENV: &str = "INTERSECTION_CONFIG";
pub const TRANSITIONS_CSV: &str = "phase_transitions.csv";
