//! Cross-trial aggregation of result rows into experiment summaries.
//!
//! The engine emits one result row per (trial, pipeline); this module folds
//! the rows of an experiment into per-pipeline totals, rates, and resolution
//! time statistics.

use dispatch_core::pipeline::PipelineKind;
use dispatch_core::telemetry::SimulationResult;

/// Aggregated outcomes for one pipeline across every trial of an experiment.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct PipelineSummary {
    /// Trials aggregated into this summary.
    pub trials: usize,
    pub completed: u64,
    pub canceled: u64,
    pub self_completed: u64,
    /// Completed share of terminal outcomes (completed + canceled).
    pub completion_share: f64,
    /// Self-completed share of completions.
    pub self_completed_share: f64,
    /// Mean of the per-trial average resolution times, seconds.
    pub avg_resolution_secs: f64,
    /// Median of the per-trial average resolution times, seconds.
    pub median_resolution_secs: f64,
    /// P90 of the per-trial average resolution times, seconds.
    pub p90_resolution_secs: f64,
    /// Mean of the per-trial average service durations, seconds.
    pub avg_processing_secs: f64,
}

impl PipelineSummary {
    fn from_rows(rows: &[&SimulationResult]) -> Self {
        let completed: u64 = rows.iter().map(|r| r.completed).sum();
        let canceled: u64 = rows.iter().map(|r| r.canceled).sum();
        let self_completed: u64 = rows.iter().map(|r| r.self_completed).sum();

        let terminal = completed + canceled;
        let completion_share = if terminal > 0 {
            completed as f64 / terminal as f64
        } else {
            0.0
        };
        let self_completed_share = if completed > 0 {
            self_completed as f64 / completed as f64
        } else {
            0.0
        };

        let resolutions: Vec<f64> = rows.iter().map(|r| r.avg_resolution_secs).collect();
        let (avg_resolution_secs, median_resolution_secs, p90_resolution_secs) =
            calculate_stats(&resolutions);
        let processing: Vec<f64> = rows.iter().map(|r| r.avg_processing_secs).collect();
        let (avg_processing_secs, _, _) = calculate_stats(&processing);

        Self {
            trials: rows.len(),
            completed,
            canceled,
            self_completed,
            completion_share,
            self_completed_share,
            avg_resolution_secs,
            median_resolution_secs,
            p90_resolution_secs,
            avg_processing_secs,
        }
    }
}

/// Side-by-side pipeline summaries for one experiment.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ExperimentSummary {
    pub call: PipelineSummary,
    pub report: PipelineSummary,
}

impl ExperimentSummary {
    pub fn from_rows(rows: &[SimulationResult]) -> Self {
        let split = |kind: PipelineKind| -> Vec<&SimulationResult> {
            rows.iter().filter(|r| r.pipeline == kind).collect()
        };
        Self {
            call: PipelineSummary::from_rows(&split(PipelineKind::Call)),
            report: PipelineSummary::from_rows(&split(PipelineKind::Report)),
        }
    }
}

/// All result rows of one experiment run plus their summary.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ExperimentOutcome {
    pub summary: ExperimentSummary,
    pub rows: Vec<SimulationResult>,
}

impl ExperimentOutcome {
    pub fn from_rows(rows: Vec<SimulationResult>) -> Self {
        Self {
            summary: ExperimentSummary::from_rows(&rows),
            rows,
        }
    }
}

/// (mean, median, p90) of `values`. All zero when `values` is empty.
pub(crate) fn calculate_stats(values: &[f64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let avg = sorted.iter().sum::<f64>() / sorted.len() as f64;
    let median = if sorted.len() % 2 == 0 {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    } else {
        sorted[sorted.len() / 2]
    };
    let p90_idx = ((sorted.len() - 1) as f64 * 0.9) as usize;
    let p90 = sorted[p90_idx.min(sorted.len() - 1)];

    (avg, median, p90)
}
