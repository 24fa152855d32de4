//! Example: Staffing sweep comparing the two dispatch pipelines.
//!
//! This example demonstrates how to:
//! 1. Select a pre-defined parameter space
//! 2. Run the sweep in parallel
//! 3. Compare the call and report pipelines per configuration
//! 4. Find the best-performing configuration
//! 5. Export results to CSV
//!
//! To use a different parameter space, change the function call in main().

use dispatch_core::pipeline::PipelineKind;
use dispatch_experiments::{
    export_to_csv, find_best_outcome_index, run_parallel_experiments, ComparisonWeights,
    MechanismComparison,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Starting staffing sweep...");

    // Other pre-defined spaces:
    // - minimal_space(): quick smoke run
    // - demand_space(): incident volume vs. caller patience and report range
    let space = dispatch_experiments::parameter_spaces::staffing_space();

    println!("Generating parameter sets...");
    let parameter_sets = space.generate();
    println!("Generated {} parameter combinations", parameter_sets.len());

    // Uses all available CPU cores by default.
    println!("Running simulations in parallel...");
    let outcomes = run_parallel_experiments(parameter_sets.clone(), None)?;
    println!("Completed {} experiments", outcomes.len());

    let weights = ComparisonWeights::default();

    println!("\n=== Call vs. Report per Configuration ===");
    for (set, outcome) in parameter_sets.iter().zip(&outcomes) {
        let comparison = MechanismComparison::from_summary(&outcome.summary, &weights);
        let winner = match comparison.winner() {
            Some(PipelineKind::Report) => "report",
            Some(PipelineKind::Call) => "call",
            None => "tie",
        };
        println!(
            "{} run {} (responders {}, operators {}): score {:+.3}, winner {}",
            set.experiment_id,
            set.run_id,
            set.params.responder_count,
            set.params.operator_count,
            comparison.score,
            winner,
        );
    }

    let best_idx = find_best_outcome_index(&outcomes, &weights).expect("No outcomes to analyze");
    let best_set = &parameter_sets[best_idx];
    let best = &outcomes[best_idx];

    println!("\n=== Best Configuration ===");
    println!(
        "Experiment: {} run {} (seed {})",
        best_set.experiment_id, best_set.run_id, best_set.seed
    );
    println!("Responders: {}", best_set.params.responder_count);
    println!("Operators: {}", best_set.params.operator_count);
    println!("Call completions: {}", best.summary.call.completed);
    println!("Report completions: {}", best.summary.report.completed);
    println!(
        "Avg resolution: call {:.1}s, report {:.1}s",
        best.summary.call.avg_resolution_secs, best.summary.report.avg_resolution_secs
    );
    println!(
        "Cancellations: call {}, report {}",
        best.summary.call.canceled, best.summary.report.canceled
    );

    println!("\nExporting results...");
    export_to_csv(&outcomes, &parameter_sets, "staffing_sweep.csv")?;
    println!("Exported to staffing_sweep.csv");

    println!("\nSweep complete!");

    Ok(())
}
