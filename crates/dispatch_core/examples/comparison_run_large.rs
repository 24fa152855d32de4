//! Large-scale comparison: thousands of responders and incidents.
//!
//! Demonstrates simulation performance at scale and reports throughput
//! alongside the per-trial result rows.
//!
//! Run with: cargo run -p dispatch_core --example comparison_run_large --release

use std::time::Instant;

use bevy_ecs::prelude::World;
use dispatch_core::pipeline::PipelineKind;
use dispatch_core::runner::{run_trial, simulation_schedule};
use dispatch_core::scenario::{build_simulation, SimulationParams};
use dispatch_core::telemetry::TrialResults;
use dispatch_core::trial::start_trial;

fn main() {
    const RESPONDERS: usize = 2_000;
    const OPERATORS: usize = 12;
    const BASE_INCIDENTS: u64 = 5_000;
    const HORIZON_HOURS: u64 = 6;
    const TRIALS: u64 = 3;

    println!(
        "=== Large-Scale Comparison ({} responders, {} operators, ~{} incidents, {}h, {} trials) ===\n",
        RESPONDERS, OPERATORS, BASE_INCIDENTS, HORIZON_HOURS, TRIALS
    );

    // --- Build phase ---
    let build_start = Instant::now();
    let mut world = World::new();
    let params = SimulationParams::default()
        .with_seed(42)
        .with_staffing(RESPONDERS, OPERATORS)
        .with_horizon_hours(HORIZON_HOURS)
        .with_incident_volume(BASE_INCIDENTS, 0, 1_000);
    if let Err(err) = build_simulation(&mut world, params) {
        eprintln!("Invalid parameters: {err}");
        return;
    }
    println!("Build time: {:.2}s", build_start.elapsed().as_secs_f64());

    // --- Run phase ---
    let mut schedule = simulation_schedule();
    let run_start = Instant::now();
    let mut total_steps = 0usize;
    for _ in 0..TRIALS {
        let trial_start = Instant::now();
        let trial = match start_trial(&mut world) {
            Ok(trial) => trial,
            Err(err) => {
                eprintln!("Failed to start trial: {err}");
                return;
            }
        };
        let steps = run_trial(&mut world, &mut schedule);
        total_steps += steps;
        let elapsed = trial_start.elapsed().as_secs_f64();
        println!(
            "Trial {}: {} steps in {:.2}s ({:.0} events/sec)",
            trial,
            steps,
            elapsed,
            steps as f64 / elapsed
        );
    }
    let run_elapsed = run_start.elapsed();

    println!("\n--- Throughput ---");
    println!("Steps executed:      {}", total_steps);
    println!(
        "Simulated time:      {} s per trial ({} trials)",
        HORIZON_HOURS * 3600,
        TRIALS
    );
    println!("Wall-clock time:     {:.2}s", run_elapsed.as_secs_f64());
    println!(
        "Events per second:   {:.0}",
        total_steps as f64 / run_elapsed.as_secs_f64()
    );

    // --- Result rows ---
    let results = world.resource::<TrialResults>();
    println!("\n--- Result rows ---");
    println!(
        "{:>5}  {:>8}  {:>9}  {:>8}  {:>9}  {:>12}  {:>12}",
        "trial", "pipeline", "completed", "canceled", "self-done", "avg wait (s)", "avg proc (s)"
    );
    for row in &results.rows {
        println!(
            "{:>5}  {:>8}  {:>9}  {:>8}  {:>9}  {:>12.1}  {:>12.1}",
            row.trial,
            row.pipeline.label(),
            row.completed,
            row.canceled,
            row.self_completed,
            row.avg_resolution_secs,
            row.avg_processing_secs,
        );
    }

    println!("\n--- Pipeline aggregates over {} trials ---", TRIALS);
    for kind in [PipelineKind::Call, PipelineKind::Report] {
        let rows: Vec<_> = results.rows.iter().filter(|r| r.pipeline == kind).collect();
        if rows.is_empty() {
            continue;
        }
        let completed: u64 = rows.iter().map(|r| r.completed).sum();
        let canceled: u64 = rows.iter().map(|r| r.canceled).sum();
        let self_done: u64 = rows.iter().map(|r| r.self_completed).sum();
        let mean_resolution: f64 =
            rows.iter().map(|r| r.avg_resolution_secs).sum::<f64>() / rows.len() as f64;
        println!(
            "{:>8}: {:>7} completed  {:>6} canceled  {:>6} self-done  {:>8.1}s mean resolution",
            kind.label(),
            completed,
            canceled,
            self_done,
            mean_resolution,
        );
    }

    println!("\n=== Done ===");
}
