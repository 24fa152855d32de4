use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::entities::EmergencyStatus;
use crate::pipeline::CallPipeline;
use crate::scenario::SimulationParams;

/// Pairs free operators with queued calls, oldest first. Each pairing draws a
/// service duration, claims an operator for it, and schedules the deferred
/// completion. Stops when the queue or the pool runs dry.
pub fn call_dispatch_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    params: Res<SimulationParams>,
    mut call: ResMut<CallPipeline>,
) {
    if event.0.kind != EventKind::ProcessingTick {
        return;
    }

    let now = clock.now();
    let call = &mut *call;
    while call.operators.free_count(now) > 0 {
        let Some(id) = call.queue.pop_front() else {
            break;
        };
        if call.emergencies[id.0 as usize].status != EmergencyStatus::Pending {
            // Finalized while queued; drop it without consuming an operator.
            continue;
        }
        let processing = params.call_processing.sample(&mut call.rng);
        let assigned = call.emergencies[id.0 as usize].try_assign(now, processing, None);
        debug_assert!(assigned, "pending status checked above");
        let claimed = call.operators.try_claim(now, now + processing);
        debug_assert!(claimed, "free_count checked above");
        clock.schedule_in(
            processing,
            EventKind::CompleteCall,
            Some(EventSubject::Emergency(id)),
        );
    }
}
