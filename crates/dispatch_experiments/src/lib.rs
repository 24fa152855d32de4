//! Parallel experimentation framework for dispatch simulation parameter sweeps.
//!
//! This crate runs many dispatch simulations in parallel with varying parameters,
//! summarizes how the centralized call pipeline and the decentralized report
//! pipeline fare under each configuration, and exports the results for offline
//! analysis.
//!
//! # Quick Start
//!
//! ```no_run
//! use dispatch_experiments::{
//!     find_best_outcome_index, run_parallel_experiments, ComparisonWeights, ParameterSpace,
//! };
//!
//! # fn main() -> Result<(), dispatch_core::trial::CommandError> {
//! // Define parameter space (grid search)
//! let space = ParameterSpace::grid()
//!     .responder_counts(vec![40, 80, 160])
//!     .operator_counts(vec![2, 4])
//!     .seeds(vec![7, 11]);
//!
//! // Generate parameter sets
//! let parameter_sets = space.generate();
//!
//! // Run experiments in parallel
//! let outcomes = run_parallel_experiments(parameter_sets, None)?;
//!
//! // Rank configurations and find the best one
//! let weights = ComparisonWeights::default();
//! let best_idx = find_best_outcome_index(&outcomes, &weights).unwrap();
//! # let _ = best_idx;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`parameters`]: Parameter variation framework (grid search, random sampling)
//! - [`parameter_spaces`]: Pre-defined spaces for common sweeps
//! - [`runner`]: Parallel simulation execution using rayon
//! - [`metrics`]: Per-pipeline summaries of simulation result rows
//! - [`comparison`]: Call-vs-report scoring and configuration ranking
//! - [`export`]: Result export to CSV/JSON/Parquet

pub mod comparison;
pub mod export;
pub mod metrics;
pub mod parameter_spaces;
pub mod parameters;
pub mod runner;

pub use comparison::{find_best_outcome_index, ComparisonWeights, MechanismComparison};
pub use export::{export_to_csv, export_to_json, export_to_parquet};
pub use metrics::{ExperimentOutcome, ExperimentSummary, PipelineSummary};
pub use parameters::{ParameterSet, ParameterSpace};
pub use runner::{run_experiment, run_parallel_experiments};
