// benches/bench_simulation.rs
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use intersection_controller::control_system::ControllerConfig;
use intersection_controller::simulation_engine::simulation::{run_headless, HeadlessRun};
use std::time::Duration;

fn bench_headless_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("headless_run");
    group.sample_size(20);

    // Simulated minutes of random traffic, each at 10 ticks per second.
    for &minutes in [1u64, 10, 60].iter() {
        group.bench_function(format!("minutes_{}", minutes), |b| {
            let run = HeadlessRun {
                duration: Duration::from_secs(minutes * 60),
                seed: 3,
                ..HeadlessRun::default()
            };
            b.iter(|| {
                let summary = run_headless(ControllerConfig::default(), &run, None)
                    .expect("headless run without a log cannot fail");
                black_box(summary);
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_headless_run);
criterion_main!(benches);
