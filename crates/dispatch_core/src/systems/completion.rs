use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::pipeline::{CallPipeline, ReportPipeline};

/// Deferred completion of an operator-handled call. A firing for an already
/// finalized emergency is a no-op; the clock has already dropped firings
/// from superseded trials.
pub fn complete_call_system(
    event: Res<CurrentEvent>,
    clock: Res<SimulationClock>,
    mut call: ResMut<CallPipeline>,
) {
    if event.0.kind != EventKind::CompleteCall {
        return;
    }
    let Some(EventSubject::Emergency(id)) = event.0.subject else {
        return;
    };

    let now = clock.now();
    let call = &mut *call;
    let Some(emergency) = call.emergencies.get_mut(id.0 as usize) else {
        return;
    };
    if !emergency.try_complete() {
        return;
    }
    let wait = emergency.age(now);
    let processing = emergency.processing_secs.unwrap_or(0);
    call.stats.record_completion(wait, processing, false);
}

/// Deferred completion of a responder-claimed report. Every report
/// resolution is a self-completion: the responder handled it without any
/// central coordination.
pub fn complete_report_system(
    event: Res<CurrentEvent>,
    clock: Res<SimulationClock>,
    mut report: ResMut<ReportPipeline>,
) {
    if event.0.kind != EventKind::CompleteReport {
        return;
    }
    let Some(EventSubject::Emergency(id)) = event.0.subject else {
        return;
    };

    let now = clock.now();
    let report = &mut *report;
    let Some(emergency) = report.emergencies.get_mut(id.0 as usize) else {
        return;
    };
    if !emergency.try_complete() {
        return;
    }
    let wait = emergency.age(now);
    let processing = emergency.processing_secs.unwrap_or(0);
    report.stats.record_completion(wait, processing, true);
}
