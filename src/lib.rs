//! Signal controller for a two-approach intersection with pedestrian crossings
//! and a flashing-amber night mode, plus the glue that drives it: a periodic
//! tick loop with snapshot broadcast, a command codec, a random stimulus
//! generator and a CSV transition log.

pub mod communication;
pub mod control_system;
pub mod global_variables;
pub mod monitoring;
pub mod shared_data;
pub mod simulation_engine;
