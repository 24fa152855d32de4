//! Telemetry / KPIs: per-pipeline counters, end-of-trial result rows, and
//! point-in-time snapshots for presentation layers.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Resource, World};

use crate::clock::{SimulationClock, TrialId};
use crate::entities::{Coordinates, EmergencyId, EmergencyStatus, ResponderId};
use crate::pipeline::{CallPipeline, PipelineKind, ReportPipeline};

/// Running counters for one pipeline within one trial.
///
/// Invariants: `self_completed <= completed`; `completed + canceled <=
/// generated`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineStats {
    pub generated: u64,
    pub completed: u64,
    pub canceled: u64,
    /// Subset of `completed` resolved outside the formal dispatch path.
    pub self_completed: u64,
    /// Cumulative seconds from report to completion.
    pub total_wait_secs: u64,
    /// Cumulative drawn service durations of completed emergencies.
    pub total_processing_secs: u64,
}

impl PipelineStats {
    pub fn record_generated(&mut self) {
        self.generated += 1;
    }

    pub fn record_completion(&mut self, wait_secs: u64, processing_secs: u64, self_completed: bool) {
        self.completed += 1;
        if self_completed {
            self.self_completed += 1;
        }
        self.total_wait_secs += wait_secs;
        self.total_processing_secs += processing_secs;
    }

    pub fn record_cancellation(&mut self) {
        self.canceled += 1;
    }
}

/// Immutable result row for one (trial, pipeline), derived once at trial end
/// from the pipeline's stats and never mutated thereafter.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SimulationResult {
    pub trial: u64,
    pub pipeline: PipelineKind,
    /// Mean seconds from report to completion, over completed emergencies.
    pub avg_resolution_secs: f64,
    /// Mean drawn service duration, over completed emergencies.
    pub avg_processing_secs: f64,
    /// Cumulative report-to-completion seconds for the whole trial.
    pub total_resolution_secs: u64,
    pub self_completed: u64,
    pub canceled: u64,
    pub completed: u64,
}

impl SimulationResult {
    pub fn from_stats(trial: TrialId, pipeline: PipelineKind, stats: &PipelineStats) -> Self {
        let completed = stats.completed;
        let divide = |total: u64| {
            if completed == 0 {
                0.0
            } else {
                total as f64 / completed as f64
            }
        };
        Self {
            trial: trial.0,
            pipeline,
            avg_resolution_secs: divide(stats.total_wait_secs),
            avg_processing_secs: divide(stats.total_processing_secs),
            total_resolution_secs: stats.total_wait_secs,
            self_completed: stats.self_completed,
            canceled: stats.canceled,
            completed,
        }
    }
}

/// Result rows accumulated across all trials run in this world.
#[derive(Debug, Default, Resource)]
pub struct TrialResults {
    pub rows: Vec<SimulationResult>,
    last_captured: Option<TrialId>,
}

impl TrialResults {
    /// Appends both pipeline rows for `trial` unless that trial was already
    /// captured. Returns whether the rows were recorded.
    pub fn try_capture(&mut self, trial: TrialId, rows: [SimulationResult; 2]) -> bool {
        if self.last_captured == Some(trial) {
            return false;
        }
        self.last_captured = Some(trial);
        self.rows.extend(rows);
        true
    }

    pub fn last_captured(&self) -> Option<TrialId> {
        self.last_captured
    }
}

/// Snapshot of one emergency for visualization.
#[derive(Debug, Clone)]
pub struct EmergencySnapshot {
    pub id: EmergencyId,
    pub coords: Coordinates,
    pub status: EmergencyStatus,
}

/// Snapshot of one responder for visualization.
#[derive(Debug, Clone)]
pub struct ResponderSnapshot {
    pub id: ResponderId,
    pub coords: Coordinates,
    pub busy: bool,
}

/// Live counters for one pipeline at a point in time.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineCounts {
    pub generated: u64,
    pub pending: usize,
    pub assigned: usize,
    pub completed: u64,
    pub canceled: u64,
    pub self_completed: u64,
    /// Call pipeline only; zero for the report pipeline.
    pub queue_len: usize,
    /// Call pipeline only; zero for the report pipeline.
    pub free_operators: usize,
    pub free_responders: usize,
}

impl PipelineCounts {
    pub fn add_emergency(&mut self, status: EmergencyStatus) {
        match status {
            EmergencyStatus::Pending => self.pending += 1,
            EmergencyStatus::Assigned => self.assigned += 1,
            // Terminal states are tracked by the stats counters.
            EmergencyStatus::Completed | EmergencyStatus::Canceled => {}
        }
    }
}

/// Snapshot of one pipeline: counters plus full entity lists.
#[derive(Debug, Clone)]
pub struct PipelineSnapshot {
    pub counts: PipelineCounts,
    pub emergencies: Vec<EmergencySnapshot>,
    pub responders: Vec<ResponderSnapshot>,
}

/// Snapshot of the whole simulation at a specific simulated second.
#[derive(Debug, Clone)]
pub struct SimSnapshot {
    pub timestamp_secs: u64,
    pub call: PipelineSnapshot,
    pub report: PipelineSnapshot,
}

/// Snapshot capture configuration.
#[derive(Debug, Clone, Copy, Resource)]
pub struct SimSnapshotConfig {
    pub interval_secs: u64,
    pub max_snapshots: usize,
}

impl Default for SimSnapshotConfig {
    fn default() -> Self {
        Self {
            interval_secs: 1,
            max_snapshots: 10_000,
        }
    }
}

/// Rolling snapshot buffer.
#[derive(Debug, Default, Resource)]
pub struct SimSnapshots {
    pub snapshots: VecDeque<SimSnapshot>,
    pub last_snapshot_at: Option<u64>,
}

impl SimSnapshots {
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.last_snapshot_at = None;
    }
}

/// On-demand snapshot for pull-based presentation, independent of the
/// captured ring buffer.
pub fn snapshot_now(world: &World) -> SimSnapshot {
    let now = world.resource::<SimulationClock>().now();
    SimSnapshot {
        timestamp_secs: now,
        call: world.resource::<CallPipeline>().snapshot(now),
        report: world.resource::<ReportPipeline>().snapshot(now),
    }
}
