use intersection_controller::communication::messages::ClientCommand;
use intersection_controller::control_system::{ControllerConfig, TrafficLightController};
use intersection_controller::global_variables::TRANSITIONS_CSV;
use intersection_controller::monitoring::traffic_monitoring_system::TransitionLog;
use intersection_controller::simulation_engine::driver::{
    handle_command, spawn_update_loop, SnapshotBroadcaster,
};
use log::{debug, warn};
use std::error::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = ControllerConfig::from_env()?;
    let controller = TrafficLightController::new(config.clone());
    let broadcaster = SnapshotBroadcaster::new(config.broadcast_capacity);
    let log = TransitionLog::new(TRANSITIONS_CSV);
    println!(
        "Starting traffic light controller (tick every {} ms, transitions logged to {})...",
        config.tick_interval_ms, TRANSITIONS_CSV
    );

    // Print every distinct state as one JSON line.
    let mut rx = broadcaster.subscribe();
    let printer = tokio::spawn(async move {
        let mut last = None;
        loop {
            match rx.recv().await {
                Ok(snapshot) => {
                    if last.as_ref() == Some(&snapshot) {
                        continue;
                    }
                    match serde_json::to_string(&snapshot) {
                        Ok(json) => println!("{}", json),
                        Err(e) => warn!("Failed to serialize snapshot: {}", e),
                    }
                    last = Some(snapshot);
                }
                Err(RecvError::Lagged(skipped)) => {
                    debug!("Snapshot printer lagged, skipped {} snapshots", skipped)
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let ticker = spawn_update_loop(
        controller.clone(),
        broadcaster.clone(),
        config.tick_interval(),
        Some(log.clone()),
    );

    // Commands arrive one JSON object per line, e.g. {"action": "add_car", "direction": "EW"}
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        match ClientCommand::parse(&line) {
            Ok(command) => {
                handle_command(&controller, &broadcaster, &command, Some(&log));
            }
            Err(e) => eprintln!("Ignoring command: {}", e),
        }
    }

    println!("Input closed, stopping controller.");
    ticker.abort();
    printer.abort();
    Ok(())
}
