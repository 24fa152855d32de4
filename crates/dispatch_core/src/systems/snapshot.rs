use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::SimulationClock;
use crate::pipeline::{CallPipeline, ReportPipeline};
use crate::telemetry::{SimSnapshot, SimSnapshotConfig, SimSnapshots};

/// Captures a snapshot of both pipelines into the rolling buffer.
pub fn capture_snapshot_system(
    clock: Res<SimulationClock>,
    config: Res<SimSnapshotConfig>,
    mut snapshots: ResMut<SimSnapshots>,
    call: Res<CallPipeline>,
    report: Res<ReportPipeline>,
) {
    // The schedule condition already gates on the interval; keep the check
    // for direct invocations.
    let now = clock.now();
    let due = match snapshots.last_snapshot_at {
        None => true,
        Some(last) => now.saturating_sub(last) >= config.interval_secs,
    };
    if !due {
        return;
    }

    snapshots.last_snapshot_at = Some(now);
    snapshots.snapshots.push_back(SimSnapshot {
        timestamp_secs: now,
        call: call.snapshot(now),
        report: report.snapshot(now),
    });

    if snapshots.snapshots.len() > config.max_snapshots {
        snapshots.snapshots.pop_front();
    }
}
