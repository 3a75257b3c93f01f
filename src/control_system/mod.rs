// control_system/mod.rs
pub mod clock;
pub mod config;
pub mod phase;
pub mod signal_controller;
pub mod traffic_light_controller;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, ControllerConfig, PhaseTimings};
pub use phase::{Phase, PhaseChange};
pub use signal_controller::SignalController;
pub use traffic_light_controller::TrafficLightController;
