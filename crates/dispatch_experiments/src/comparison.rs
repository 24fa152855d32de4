//! Head-to-head scoring of the two dispatch mechanisms.
//!
//! A [MechanismComparison] condenses one experiment's summary into outcome
//! deltas and a single weighted score, and quality scores rank whole
//! configurations against each other across a sweep.

use dispatch_core::pipeline::PipelineKind;

use crate::metrics::{ExperimentOutcome, ExperimentSummary};

/// Configurable weights for mechanism scoring.
///
/// Each weight sets how much a metric contributes to the overall score.
///
/// # Default Weights
///
/// - Completions: 0.5 (50%, higher is better)
/// - Resolution time: 0.3 (30%, lower is better)
/// - Cancellations: 0.2 (20%, lower is better)
#[derive(Debug, Clone, Copy)]
pub struct ComparisonWeights {
    /// Weight for completed emergencies (higher is better).
    pub completion_weight: f64,
    /// Weight for average resolution time (lower is better).
    pub resolution_weight: f64,
    /// Weight for canceled emergencies (lower is better).
    pub cancellation_weight: f64,
}

impl Default for ComparisonWeights {
    fn default() -> Self {
        Self {
            completion_weight: 0.5,
            resolution_weight: 0.3,
            cancellation_weight: 0.2,
        }
    }
}

impl ComparisonWeights {
    pub fn new(completion_weight: f64, resolution_weight: f64, cancellation_weight: f64) -> Self {
        Self {
            completion_weight,
            resolution_weight,
            cancellation_weight,
        }
    }
}

/// Outcome deltas between the two mechanisms of one experiment, plus a
/// weighted score. Positive values of `score` favor the report pipeline,
/// negative values the call pipeline.
#[derive(Debug, Clone, Copy)]
pub struct MechanismComparison {
    /// Report completions minus call completions.
    pub completed_delta: i64,
    /// Report cancellations minus call cancellations.
    pub canceled_delta: i64,
    /// Report mean resolution minus call mean resolution, seconds.
    pub resolution_delta_secs: f64,
    /// Weighted score over all outcome advantages.
    pub score: f64,
}

impl MechanismComparison {
    pub fn from_summary(summary: &ExperimentSummary, weights: &ComparisonWeights) -> Self {
        let call = &summary.call;
        let report = &summary.report;

        let score = weights.completion_weight
            * advantage(report.completed as f64, call.completed as f64)
            + weights.resolution_weight
                * advantage(call.avg_resolution_secs, report.avg_resolution_secs)
            + weights.cancellation_weight * advantage(call.canceled as f64, report.canceled as f64);

        Self {
            completed_delta: report.completed as i64 - call.completed as i64,
            canceled_delta: report.canceled as i64 - call.canceled as i64,
            resolution_delta_secs: report.avg_resolution_secs - call.avg_resolution_secs,
            score,
        }
    }

    /// The mechanism the score favors, or `None` on an exact tie.
    pub fn winner(&self) -> Option<PipelineKind> {
        if self.score > 0.0 {
            Some(PipelineKind::Report)
        } else if self.score < 0.0 {
            Some(PipelineKind::Call)
        } else {
            None
        }
    }
}

/// Normalized advantage in [-1, 1]: positive when `report_favoring`
/// dominates, zero when both sides are zero.
fn advantage(report_favoring: f64, call_favoring: f64) -> f64 {
    let total = report_favoring + call_favoring;
    if total <= 0.0 {
        0.0
    } else {
        (report_favoring - call_favoring) / total
    }
}

/// Normalize a metric value to [0, 1] via min-max. Returns 0.5 when the
/// range is degenerate.
fn normalize_metric(value: f64, min: f64, max: f64) -> f64 {
    if max == min {
        0.5
    } else {
        ((value - min) / (max - min)).clamp(0.0, 1.0)
    }
}

fn min_max<F>(outcomes: &[ExperimentOutcome], metric: F) -> (f64, f64)
where
    F: Fn(&ExperimentOutcome) -> f64,
{
    outcomes
        .iter()
        .map(metric)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), v| {
            (min.min(v), max.max(v))
        })
}

fn total_completed(outcome: &ExperimentOutcome) -> f64 {
    (outcome.summary.call.completed + outcome.summary.report.completed) as f64
}

fn total_canceled(outcome: &ExperimentOutcome) -> f64 {
    (outcome.summary.call.canceled + outcome.summary.report.canceled) as f64
}

fn mean_resolution(outcome: &ExperimentOutcome) -> f64 {
    (outcome.summary.call.avg_resolution_secs + outcome.summary.report.avg_resolution_secs) / 2.0
}

/// Quality score per outcome, mechanism-agnostic: completions up, resolution
/// time and cancellations down, each min-max normalized across the sweep.
/// Higher scores indicate better overall service.
pub fn calculate_quality_scores(
    outcomes: &[ExperimentOutcome],
    weights: &ComparisonWeights,
) -> Vec<f64> {
    if outcomes.is_empty() {
        return vec![];
    }

    let (completed_min, completed_max) = min_max(outcomes, total_completed);
    let (canceled_min, canceled_max) = min_max(outcomes, total_canceled);
    let (resolution_min, resolution_max) = min_max(outcomes, mean_resolution);

    outcomes
        .iter()
        .map(|outcome| {
            let completed_norm =
                normalize_metric(total_completed(outcome), completed_min, completed_max);
            let canceled_norm =
                1.0 - normalize_metric(total_canceled(outcome), canceled_min, canceled_max);
            let resolution_norm =
                1.0 - normalize_metric(mean_resolution(outcome), resolution_min, resolution_max);

            completed_norm * weights.completion_weight
                + resolution_norm * weights.resolution_weight
                + canceled_norm * weights.cancellation_weight
        })
        .collect()
}

/// Index of the outcome with the highest quality score, or `None` when
/// `outcomes` is empty.
pub fn find_best_outcome_index(
    outcomes: &[ExperimentOutcome],
    weights: &ComparisonWeights,
) -> Option<usize> {
    let scores = calculate_quality_scores(outcomes, weights);
    scores
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(idx, _)| idx)
}
