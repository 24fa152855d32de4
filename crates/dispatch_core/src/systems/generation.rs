use bevy_ecs::prelude::{Res, ResMut};
use rand::Rng;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::pipeline::{CallPipeline, ReportPipeline};
use crate::scenario::SimulationParams;
use crate::spawner::random_coordinates;
use crate::trial::TrialState;

/// Mints emergencies from the trial's incident stream. One uniform draw per
/// generation tick against the trial's fixed probability; a success admits
/// the same incident into both pipelines as two independent records.
pub fn emergency_generation_system(
    event: Res<CurrentEvent>,
    clock: Res<SimulationClock>,
    params: Res<SimulationParams>,
    mut trial: ResMut<TrialState>,
    mut call: ResMut<CallPipeline>,
    mut report: ResMut<ReportPipeline>,
) {
    if event.0.kind != EventKind::GenerationTick {
        return;
    }

    let probability = trial.generation_probability();
    if trial.rng_mut().gen::<f64>() >= probability {
        return;
    }

    let coords = random_coordinates(trial.rng_mut(), &params.bounds);
    let now = clock.now();
    call.admit(coords, now);
    report.admit(coords, now);
}
