//! Result export utilities.
//!
//! This module writes experiment outcomes to CSV, JSON, and Parquet. CSV and
//! Parquet flatten the per-trial result rows and join them with the
//! parameters that produced them; JSON serializes the outcomes as-is,
//! summaries included.

use std::path::Path;

use crate::metrics::ExperimentOutcome;
use crate::parameters::ParameterSet;

#[path = "export/csv.rs"]
mod csv;
#[path = "export/json.rs"]
mod json;
#[path = "export/parquet.rs"]
mod parquet;
#[path = "export/writer_utils.rs"]
mod writer_utils;

/// One exported line: a per-trial result row joined with the parameters of
/// the run that produced it.
pub(crate) struct FlatRow<'a> {
    pub(crate) experiment_id: &'a str,
    pub(crate) run_id: usize,
    pub(crate) seed: u64,
    pub(crate) trials: u64,
    pub(crate) responders: usize,
    pub(crate) operators: usize,
    pub(crate) base_incidents: u64,
    pub(crate) hangup_threshold_secs: u64,
    pub(crate) report_range_km: f64,
    pub(crate) trial: u64,
    pub(crate) pipeline: &'static str,
    pub(crate) completed: u64,
    pub(crate) canceled: u64,
    pub(crate) self_completed: u64,
    pub(crate) avg_resolution_secs: f64,
    pub(crate) avg_processing_secs: f64,
    pub(crate) total_resolution_secs: u64,
}

fn flatten<'a>(
    outcomes: &'a [ExperimentOutcome],
    parameter_sets: &'a [ParameterSet],
) -> Result<Vec<FlatRow<'a>>, Box<dyn std::error::Error>> {
    if outcomes.len() != parameter_sets.len() {
        return Err(format!(
            "Outcomes length ({}) doesn't match parameter_sets length ({})",
            outcomes.len(),
            parameter_sets.len()
        )
        .into());
    }

    let mut flat = Vec::new();
    for (outcome, set) in outcomes.iter().zip(parameter_sets) {
        for row in &outcome.rows {
            flat.push(FlatRow {
                experiment_id: &set.experiment_id,
                run_id: set.run_id,
                seed: set.seed,
                trials: set.trials,
                responders: set.params.responder_count,
                operators: set.params.operator_count,
                base_incidents: set.params.base_incidents,
                hangup_threshold_secs: set.params.hangup.threshold_secs,
                report_range_km: set.params.report_max_range_km,
                trial: row.trial,
                pipeline: row.pipeline.label(),
                completed: row.completed,
                canceled: row.canceled,
                self_completed: row.self_completed,
                avg_resolution_secs: row.avg_resolution_secs,
                avg_processing_secs: row.avg_processing_secs,
                total_resolution_secs: row.total_resolution_secs,
            });
        }
    }
    Ok(flat)
}

/// Export experiment outcomes with their parameters to CSV.
///
/// Writes one line per (experiment, trial, pipeline). Outcomes and parameter
/// sets are paired by index.
///
/// # Errors
///
/// Returns an error if the outcomes are empty, the lengths don't match, or
/// file creation / CSV writing fails.
pub fn export_to_csv(
    outcomes: &[ExperimentOutcome],
    parameter_sets: &[ParameterSet],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(outcomes)?;
    let rows = flatten(outcomes, parameter_sets)?;
    let file = writer_utils::create_output_file(path)?;
    csv::export_to_csv_impl(&rows, file)
}

/// Export experiment outcomes to JSON.
///
/// Writes an array of outcomes, each carrying its summary and all per-trial
/// result rows.
///
/// # Errors
///
/// Returns an error if file creation or JSON serialization fails.
pub fn export_to_json(
    outcomes: &[ExperimentOutcome],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let file = writer_utils::create_output_file(path)?;
    json::export_to_json_impl(outcomes, file)
}

/// Export experiment outcomes with their parameters to Parquet.
///
/// Same flattened layout as [export_to_csv], one record per (experiment,
/// trial, pipeline).
///
/// # Errors
///
/// Returns an error if the outcomes are empty, the lengths don't match, or
/// file creation / Parquet writing fails.
pub fn export_to_parquet(
    outcomes: &[ExperimentOutcome],
    parameter_sets: &[ParameterSet],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    writer_utils::ensure_not_empty(outcomes)?;
    let rows = flatten(outcomes, parameter_sets)?;
    let file = writer_utils::create_output_file(path)?;
    parquet::export_to_parquet_impl(&rows, file)
}
