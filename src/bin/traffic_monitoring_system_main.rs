use intersection_controller::global_variables::TRANSITIONS_CSV;
use intersection_controller::monitoring::traffic_monitoring_system::{
    TransitionLog, TransitionReport,
};

fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| TRANSITIONS_CSV.to_string());
    println!("Generating report from {}...", path);

    match TransitionReport::from_log(&TransitionLog::new(path)) {
        Ok(report) => report.print(),
        Err(e) => eprintln!("Error generating report: {}", e),
    }
}
