//! Load tests for dispatch_core: validate performance under realistic load.

use std::time::Instant;

use bevy_ecs::prelude::World;
use dispatch_core::runner::{run_trials, simulation_schedule};
use dispatch_core::scenario::{build_simulation, SimulationParams};
use dispatch_core::telemetry::TrialResults;

#[test]
#[ignore] // Only run explicitly: cargo test --package dispatch_core --test load_tests -- --ignored
fn sustained_city_scale_trials() {
    let params = SimulationParams::default()
        .with_seed(42)
        .with_staffing(200, 8)
        .with_incident_volume(2000, 0, 500);
    let mut world = World::new();
    build_simulation(&mut world, params).expect("valid params");
    let mut schedule = simulation_schedule();

    let start = Instant::now();
    run_trials(&mut world, &mut schedule, 3).expect("trials");
    let duration = start.elapsed();

    let rows = world.resource::<TrialResults>().rows.len();
    assert_eq!(rows, 6);

    // Two tick events per simulated second, plus completions.
    let events = 3 * 6 * 3600 * 2;
    let events_per_sec = events as f64 / duration.as_secs_f64();
    println!(
        "Sustained load: ~{} events in {:.2}s ({:.0} events/sec)",
        events,
        duration.as_secs_f64(),
        events_per_sec
    );

    assert!(
        events_per_sec > 1000.0,
        "Should process >1000 events/sec, got {:.0}",
        events_per_sec
    );
}

#[test]
#[ignore]
fn dense_population_sweeps() {
    // Large responder population with frequent self-completion sweeps pushes
    // the grid queries hard.
    let params = SimulationParams::default()
        .with_seed(42)
        .with_staffing(2000, 4)
        .with_incident_volume(3000, 0, 0)
        .with_self_completion(30, 1.0, 0.001);
    let mut world = World::new();
    build_simulation(&mut world, params).expect("valid params");
    let mut schedule = simulation_schedule();

    let start = Instant::now();
    run_trials(&mut world, &mut schedule, 1).expect("trial");
    let duration = start.elapsed();

    let events = 6 * 3600 * 2;
    let events_per_sec = events as f64 / duration.as_secs_f64();
    println!(
        "Dense population: ~{} events in {:.2}s ({:.0} events/sec)",
        events,
        duration.as_secs_f64(),
        events_per_sec
    );

    assert!(
        events_per_sec > 500.0,
        "Should process >500 events/sec under dense sweeps, got {:.0}",
        events_per_sec
    );
}
