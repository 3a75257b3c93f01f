// simulation_main.rs
use intersection_controller::control_system::ControllerConfig;
use intersection_controller::global_variables::TRANSITIONS_CSV;
use intersection_controller::monitoring::traffic_monitoring_system::TransitionLog;
use intersection_controller::simulation_engine::simulation::{run_headless, HeadlessRun};
use std::error::Error;
use std::time::Duration;

// Usage: simulation_main [simulated seconds] [seed]
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seconds = args.next().and_then(|s| s.parse::<u64>().ok()).unwrap_or(600);
    let seed = args.next().and_then(|s| s.parse::<u64>().ok()).unwrap_or(1);

    let config = ControllerConfig::from_env()?;
    let run = HeadlessRun {
        duration: Duration::from_secs(seconds),
        seed,
        ..HeadlessRun::default()
    };
    let log = TransitionLog::new(TRANSITIONS_CSV);

    println!(
        "Simulating {} s of traffic (seed {}), logging transitions to {}...",
        seconds, seed, TRANSITIONS_CSV
    );
    let summary = run_headless(config, &run, Some(&log))?;
    summary.print();
    Ok(())
}
