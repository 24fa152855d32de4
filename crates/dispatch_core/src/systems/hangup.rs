use bevy_ecs::prelude::{Res, ResMut};
use rand::Rng;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::pipeline::CallPipeline;
use crate::scenario::SimulationParams;

/// Ages the call queue after dispatch has taken its share. A call queued
/// strictly longer than the threshold rolls the per-second abandonment
/// probability once per tick; a hit cancels it and drops it from the queue.
pub fn hangup_system(
    event: Res<CurrentEvent>,
    clock: Res<SimulationClock>,
    params: Res<SimulationParams>,
    mut call: ResMut<CallPipeline>,
) {
    if event.0.kind != EventKind::ProcessingTick {
        return;
    }

    let now = clock.now();
    let threshold = params.hangup.threshold_secs;
    let probability = params.hangup.prob_per_sec;
    let call = &mut *call;

    let mut hung_up = Vec::new();
    for &id in &call.queue {
        if call.emergencies[id.0 as usize].age(now) <= threshold {
            continue;
        }
        if call.rng.gen::<f64>() < probability {
            hung_up.push(id);
        }
    }

    for id in hung_up {
        if call.emergencies[id.0 as usize].try_cancel() {
            call.stats.record_cancellation();
        }
        call.queue.retain(|&queued| queued != id);
    }
}
