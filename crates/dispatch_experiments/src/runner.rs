//! Experiment execution using rayon.
//!
//! This module runs single parameter sets to completion and fans whole
//! parameter spaces out across available CPU cores. Every experiment gets a
//! fresh world; nothing is shared between parallel runs.

use bevy_ecs::prelude::World;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use dispatch_core::runner::{run_trials, simulation_schedule};
use dispatch_core::scenario::build_simulation;
use dispatch_core::telemetry::TrialResults;
use dispatch_core::trial::CommandError;

use crate::metrics::ExperimentOutcome;
use crate::parameters::ParameterSet;

/// Run a single experiment with the given parameter set.
///
/// Creates a new world, builds the simulation, runs the configured number of
/// consecutive trials, and collects every result row.
pub fn run_experiment(param_set: &ParameterSet) -> Result<ExperimentOutcome, CommandError> {
    let mut world = World::new();
    build_simulation(&mut world, param_set.simulation_params())?;

    let mut schedule = simulation_schedule();
    run_trials(&mut world, &mut schedule, param_set.trials)?;

    let rows = world.resource::<TrialResults>().rows.clone();
    Ok(ExperimentOutcome::from_rows(rows))
}

/// Run multiple experiments in parallel.
///
/// Uses rayon to execute experiments concurrently across available CPU
/// cores. Results come back in the same order as the input parameter sets;
/// the first failed run aborts the sweep.
pub fn run_parallel_experiments(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
) -> Result<Vec<ExperimentOutcome>, CommandError> {
    run_parallel_experiments_with_progress(parameter_sets, num_threads, true)
}

/// Run multiple experiments in parallel with an optional progress bar.
pub fn run_parallel_experiments_with_progress(
    parameter_sets: Vec<ParameterSet>,
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<ExperimentOutcome>, CommandError> {
    let total = parameter_sets.len();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let pool = match num_threads {
        Some(threads) => rayon::ThreadPoolBuilder::new().num_threads(threads).build(),
        None => rayon::ThreadPoolBuilder::new().build(),
    }
    .expect("Failed to create thread pool");

    let pb_clone = pb.clone();
    let results = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let result = run_experiment(param_set);
                if let Some(ref progress_bar) = pb_clone {
                    progress_bar.inc(1);
                }
                result
            })
            .collect::<Result<Vec<_>, _>>()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parameters::ParameterSpace;
    use dispatch_core::scenario::SimulationParams;

    fn quick_base() -> SimulationParams {
        SimulationParams::default()
            .with_horizon_hours(1)
            .with_incident_volume(20, 0, 5)
    }

    #[test]
    fn test_single_experiment() {
        let space = ParameterSpace::grid()
            .with_base(quick_base())
            .with_trials(2)
            .responder_counts(vec![10])
            .operator_counts(vec![1]);
        let sets = space.generate();
        let outcome = run_experiment(&sets[0]).unwrap();

        // One call row and one report row per trial.
        assert_eq!(outcome.rows.len(), 4);
        assert_eq!(outcome.summary.call.trials, 2);
        assert_eq!(outcome.summary.report.trials, 2);
        assert!(outcome.summary.call.completed + outcome.summary.call.canceled > 0);
    }

    #[test]
    fn test_parallel_experiments() {
        let space = ParameterSpace::grid()
            .with_base(quick_base())
            .with_trials(1)
            .responder_counts(vec![10, 20])
            .operator_counts(vec![1, 2]);
        let sets = space.generate();
        let outcomes = run_parallel_experiments_with_progress(sets, Some(2), false).unwrap();

        assert_eq!(outcomes.len(), 4); // 2 * 2 = 4 combinations
        for outcome in &outcomes {
            assert_eq!(outcome.rows.len(), 2);
        }
    }

    #[test]
    fn test_invalid_parameters_surface_the_error() {
        let space = ParameterSpace::grid().with_base(quick_base().with_horizon_hours(0));
        let sets = space.generate();
        assert!(matches!(
            run_experiment(&sets[0]),
            Err(CommandError::InvalidHorizon(0))
        ));
    }
}
