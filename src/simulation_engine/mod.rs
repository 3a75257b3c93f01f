// simulation_engine/mod.rs
pub mod driver;
pub mod simulation;
pub mod stimulation;
