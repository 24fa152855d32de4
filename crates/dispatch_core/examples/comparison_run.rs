//! Run a handful of trials and print the call-vs-report result rows.
//!
//! Run with: cargo run -p dispatch_core --example comparison_run

use bevy_ecs::prelude::World;
use dispatch_core::pipeline::PipelineKind;
use dispatch_core::runner::{run_trials, simulation_schedule};
use dispatch_core::scenario::{build_simulation, SimulationParams};
use dispatch_core::telemetry::TrialResults;

fn main() {
    const RESPONDERS: usize = 100;
    const OPERATORS: usize = 4;
    const BASE_INCIDENTS: u64 = 600;
    const TRIALS: u64 = 5;

    let mut world = World::new();
    let params = SimulationParams::default()
        .with_seed(123)
        .with_staffing(RESPONDERS, OPERATORS)
        .with_incident_volume(BASE_INCIDENTS, 50, 150);
    if let Err(err) = build_simulation(&mut world, params) {
        eprintln!("Invalid parameters: {err}");
        return;
    }

    let mut schedule = simulation_schedule();
    if let Err(err) = run_trials(&mut world, &mut schedule, TRIALS) {
        eprintln!("Trial failed: {err}");
        return;
    }

    let results = world.resource::<TrialResults>();

    println!(
        "--- Comparison run ({} responders, {} operators, ~{} incidents, {} trials, seed 123) ---",
        RESPONDERS, OPERATORS, BASE_INCIDENTS, TRIALS
    );
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

    for kind in [PipelineKind::Call, PipelineKind::Report] {
        let rows: Vec<_> = results.rows.iter().filter(|r| r.pipeline == kind).collect();
        if rows.is_empty() {
            continue;
        }
        let completed: u64 = rows.iter().map(|r| r.completed).sum();
        let canceled: u64 = rows.iter().map(|r| r.canceled).sum();
        let avg_wait: f64 =
            rows.iter().map(|r| r.avg_resolution_secs).sum::<f64>() / rows.len() as f64;
        println!(
            "\n{} pipeline over {} trials: {} completed, {} canceled, {:.1}s mean resolution",
            kind.label(),
            rows.len(),
            completed,
            canceled,
            avg_wait,
        );
    }
}
