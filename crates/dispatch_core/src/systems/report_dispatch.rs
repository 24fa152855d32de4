use std::collections::HashSet;

use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::entities::{EmergencyId, EmergencyStatus, ResponderId};
use crate::pipeline::ReportPipeline;
use crate::scenario::SimulationParams;

/// Greedy self-dispatch: each free responder scans the pending reports and
/// claims the nearest one within range. A report claimed earlier in the same
/// tick is invisible to later responders, so no report is ever claimed twice.
pub fn report_dispatch_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    params: Res<SimulationParams>,
    mut report: ResMut<ReportPipeline>,
) {
    if event.0.kind != EventKind::ProcessingTick {
        return;
    }

    let now = clock.now();
    let max_range = params.report_max_range_km;
    let report = &mut *report;

    let free: Vec<ResponderId> = report
        .responders
        .iter()
        .filter(|r| r.is_free(now))
        .map(|r| r.id)
        .collect();
    let mut claimed: HashSet<EmergencyId> = HashSet::new();

    for responder_id in free {
        let mut best: Option<(EmergencyId, f64)> = None;
        for emergency in &report.emergencies {
            if emergency.status != EmergencyStatus::Pending || claimed.contains(&emergency.id) {
                continue;
            }
            let distance = report.distances.distance_km(
                emergency.id,
                emergency.coords,
                &report.responders[responder_id.0 as usize],
            );
            if distance > max_range {
                continue;
            }
            // Strict comparison keeps the first report at the minimal distance.
            if best.map_or(true, |(_, best_distance)| distance < best_distance) {
                best = Some((emergency.id, distance));
            }
        }

        let Some((emergency_id, _)) = best else {
            continue;
        };
        claimed.insert(emergency_id);
        let processing = params.report_processing.sample(&mut report.rng);
        let assigned = report.emergencies[emergency_id.0 as usize].try_assign(
            now,
            processing,
            Some(responder_id),
        );
        debug_assert!(assigned, "pending status checked above");
        report.responders[responder_id.0 as usize].busy_until = now + processing;
        clock.schedule_in(
            processing,
            EventKind::CompleteReport,
            Some(EventSubject::Emergency(emergency_id)),
        );
    }
}
