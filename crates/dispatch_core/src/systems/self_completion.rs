use bevy_ecs::prelude::{Res, ResMut};
use rand::Rng;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::entities::{EmergencyId, EmergencyStatus};
use crate::pipeline::CallPipeline;
use crate::scenario::SimulationParams;
use crate::spatial::nearby_responders;

/// Opportunistic resolution sweep for the call pipeline: a pending call can
/// be resolved by a free responder who happens to be near the scene, without
/// an operator ever handling it. Runs at the configured interval; each nearby
/// responder gets one roll and the first hit finalizes the call immediately.
pub fn self_completion_system(
    event: Res<CurrentEvent>,
    clock: Res<SimulationClock>,
    params: Res<SimulationParams>,
    mut call: ResMut<CallPipeline>,
) {
    if event.0.kind != EventKind::ProcessingTick {
        return;
    }

    let now = clock.now();
    let config = params.self_completion;
    let call = &mut *call;
    if now.saturating_sub(call.last_self_check) < config.check_interval_secs {
        return;
    }
    call.last_self_check = now;

    let pending: Vec<EmergencyId> = call
        .emergencies
        .iter()
        .filter(|e| e.status == EmergencyStatus::Pending)
        .map(|e| e.id)
        .collect();

    for id in pending {
        let coords = call.emergencies[id.0 as usize].coords;
        let nearby = nearby_responders(
            id,
            coords,
            &call.responders,
            &call.grid,
            config.radius_km,
            now,
            &mut call.distances,
        );

        let mut resolved = false;
        for _ in &nearby {
            if call.rng.gen::<f64>() < config.prob_per_responder {
                resolved = true;
                break;
            }
        }
        if !resolved {
            continue;
        }

        if call.emergencies[id.0 as usize].try_complete() {
            let wait = call.emergencies[id.0 as usize].age(now);
            // No service duration: the call never reached an operator.
            call.stats.record_completion(wait, 0, true);
            call.queue.retain(|&queued| queued != id);
        }
    }
}
