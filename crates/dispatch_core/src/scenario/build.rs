use bevy_ecs::prelude::World;

use crate::clock::SimulationClock;
use crate::pipeline::{CallPipeline, ReportPipeline};
use crate::scenario::params::{SimulationParams, SpeedMultiplier};
use crate::telemetry::{SimSnapshotConfig, SimSnapshots, TrialResults};
use crate::trial::{CommandError, TrialState};

/// Builds a simulation world: validates the parameters and inserts every
/// resource a trial needs. The world starts Idle with empty pipelines; call
/// [`crate::trial::start_trial`] to begin.
pub fn build_simulation(world: &mut World, params: SimulationParams) -> Result<(), CommandError> {
    params.validate()?;
    let seed = params.seed.unwrap_or(0);

    world.insert_resource(SimulationClock::default());
    world.insert_resource(TrialState::new(seed));
    world.insert_resource(SpeedMultiplier::default());
    world.insert_resource(TrialResults::default());
    world.insert_resource(SimSnapshotConfig::default());
    world.insert_resource(SimSnapshots::default());
    // Pipeline rngs are reseeded per trial; the build seed only covers the
    // idle world before the first start_trial.
    world.insert_resource(CallPipeline::new(params.cell_size_deg, seed));
    world.insert_resource(ReportPipeline::new(params.cell_size_deg, seed));
    world.insert_resource(params);
    Ok(())
}
