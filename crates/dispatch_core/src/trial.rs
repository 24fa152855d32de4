//! Trial lifecycle: the orchestrator state machine and the command boundary
//! exposed to presentation layers.
//!
//! Commands are free functions over `&mut World`. A rejected command returns
//! an error and leaves the running trial untouched.

use std::fmt;

use bevy_ecs::prelude::{Resource, World};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::clock::{EventKind, SimulationClock, TrialId};
use crate::entities::{Coordinates, EmergencyId};
use crate::pipeline::{CallPipeline, PipelineKind, ReportPipeline};
use crate::scenario::{SimulationParams, SpeedMultiplier};
use crate::telemetry::{SimSnapshots, SimulationResult, TrialResults};

/// Golden-ratio mix for per-trial seed derivation.
const TRIAL_SEED_MIX: u64 = 0x9e37_79b9_7f4a_7c15;
const CALL_SEED_SALT: u64 = 0xca11;
const REPORT_SEED_SALT: u64 = 0x5e1f;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialPhase {
    Idle,
    Running,
    Paused,
    Finished,
}

/// Orchestrator state. The trial id is a monotonically increasing generation
/// counter starting at 1; the volume, horizon, and per-tick generation
/// probability are fixed for the trial's duration at `start_trial`.
#[derive(Resource)]
pub struct TrialState {
    phase: TrialPhase,
    trial: TrialId,
    master_seed: u64,
    horizon_secs: u64,
    total_incidents: u64,
    generation_probability: f64,
    rng: StdRng,
}

impl TrialState {
    pub fn new(master_seed: u64) -> Self {
        Self {
            phase: TrialPhase::Idle,
            trial: TrialId(0),
            master_seed,
            horizon_secs: 0,
            total_incidents: 0,
            generation_probability: 0.0,
            rng: StdRng::seed_from_u64(master_seed),
        }
    }

    pub fn phase(&self) -> TrialPhase {
        self.phase
    }

    pub fn trial(&self) -> TrialId {
        self.trial
    }

    pub fn trial_number(&self) -> u64 {
        self.trial.0
    }

    pub fn horizon_secs(&self) -> u64 {
        self.horizon_secs
    }

    /// Total incident volume drawn for this trial.
    pub fn total_incidents(&self) -> u64 {
        self.total_incidents
    }

    /// Chance of minting one emergency on each generation tick. Can exceed
    /// 1.0 when the drawn volume outstrips one-per-second; generation still
    /// mints at most one per tick.
    pub fn generation_probability(&self) -> f64 {
        self.generation_probability
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}

fn derive_seed(master: u64, trial: u64, salt: u64) -> u64 {
    master
        .wrapping_add(trial.wrapping_mul(TRIAL_SEED_MIX))
        .wrapping_add(salt)
}

/// Errors raised at the command boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// Speed multiplier outside 1..=1000.
    SpeedOutOfRange(u32),
    /// `start_trial` while a trial is Running or Paused.
    TrialInProgress,
    /// Command requires a Running trial.
    NotRunning,
    /// `resume` while not Paused.
    NotPaused,
    /// `finish_trial` after the trial's rows were already captured.
    ResultsAlreadyCaptured(u64),
    /// Coordinate outside the configured region.
    OutOfBounds { lat: f64, lng: f64 },
    InvalidBounds {
        lat_min: f64,
        lat_max: f64,
        lng_min: f64,
        lng_max: f64,
    },
    InvalidHorizon(u64),
    InvalidProcessingRange { min_secs: u64, max_secs: u64 },
    InvalidIncidentRange { min_extra: u64, max_extra: u64 },
    InvalidCellSize(f64),
    InvalidProbability(f64),
    InvalidRadius(f64),
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::SpeedOutOfRange(m) => {
                write!(
                    f,
                    "speed multiplier {m} outside {}..={}",
                    SpeedMultiplier::MIN,
                    SpeedMultiplier::MAX
                )
            }
            CommandError::TrialInProgress => write!(f, "a trial is already in progress"),
            CommandError::NotRunning => write!(f, "no trial is running"),
            CommandError::NotPaused => write!(f, "trial is not paused"),
            CommandError::ResultsAlreadyCaptured(trial) => {
                write!(f, "results for trial {trial} were already captured")
            }
            CommandError::OutOfBounds { lat, lng } => {
                write!(f, "coordinates ({lat}, {lng}) outside configured bounds")
            }
            CommandError::InvalidBounds {
                lat_min,
                lat_max,
                lng_min,
                lng_max,
            } => write!(
                f,
                "invalid bounds: lat [{lat_min}, {lat_max}], lng [{lng_min}, {lng_max}]"
            ),
            CommandError::InvalidHorizon(hours) => {
                write!(f, "horizon must be at least one hour, got {hours}")
            }
            CommandError::InvalidProcessingRange { min_secs, max_secs } => {
                write!(f, "processing range [{min_secs}, {max_secs}] is inverted")
            }
            CommandError::InvalidIncidentRange {
                min_extra,
                max_extra,
            } => write!(
                f,
                "extra incident range [{min_extra}, {max_extra}] is inverted"
            ),
            CommandError::InvalidCellSize(size) => {
                write!(f, "grid cell size must be positive, got {size}")
            }
            CommandError::InvalidProbability(p) => {
                write!(f, "probability {p} outside [0, 1]")
            }
            CommandError::InvalidRadius(r) => {
                write!(f, "radius {r} must be finite and non-negative")
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// Starts a new trial: Idle/Finished -> Running. Resets the clock under a
/// fresh trial id, respawns both pipelines, draws the trial's incident
/// volume, and schedules the first generation and processing ticks at t = 0.
/// Returns the new trial number.
pub fn start_trial(world: &mut World) -> Result<u64, CommandError> {
    let params = world.resource::<SimulationParams>().clone();
    params.validate()?;

    match world.resource::<TrialState>().phase {
        TrialPhase::Idle | TrialPhase::Finished => {}
        TrialPhase::Running | TrialPhase::Paused => return Err(CommandError::TrialInProgress),
    }

    let horizon_secs = params.horizon_secs();
    let (trial, call_seed, report_seed) = {
        let mut state = world.resource_mut::<TrialState>();
        let trial = TrialId(state.trial.0 + 1);
        let master = state.master_seed;
        state.trial = trial;
        state.rng = StdRng::seed_from_u64(derive_seed(master, trial.0, 0));
        let extra = state
            .rng
            .gen_range(params.min_extra_incidents..=params.max_extra_incidents);
        state.total_incidents = params.base_incidents + extra;
        state.horizon_secs = horizon_secs;
        state.generation_probability = state.total_incidents as f64 / horizon_secs as f64;
        (
            trial,
            derive_seed(master, trial.0, CALL_SEED_SALT),
            derive_seed(master, trial.0, REPORT_SEED_SALT),
        )
    };

    world.resource_mut::<SimulationClock>().begin_trial(trial);
    world.resource_mut::<CallPipeline>().reset(&params, call_seed);
    world
        .resource_mut::<ReportPipeline>()
        .reset(&params, report_seed);
    world.resource_mut::<SimSnapshots>().clear();

    {
        let mut clock = world.resource_mut::<SimulationClock>();
        clock.schedule_at(0, EventKind::GenerationTick, None);
        clock.schedule_at(0, EventKind::ProcessingTick, None);
    }

    world.resource_mut::<TrialState>().phase = TrialPhase::Running;
    Ok(trial.0)
}

/// Running -> Paused. Freezes the event clock; scheduled completions deliver
/// after resume at their original simulated timestamps.
pub fn pause(world: &mut World) -> Result<(), CommandError> {
    let mut state = world.resource_mut::<TrialState>();
    if state.phase != TrialPhase::Running {
        return Err(CommandError::NotRunning);
    }
    state.phase = TrialPhase::Paused;
    Ok(())
}

/// Paused -> Running.
pub fn resume(world: &mut World) -> Result<(), CommandError> {
    let mut state = world.resource_mut::<TrialState>();
    if state.phase != TrialPhase::Paused {
        return Err(CommandError::NotPaused);
    }
    state.phase = TrialPhase::Running;
    Ok(())
}

/// Updates wall-clock pacing. Accepts 1..=1000. Simulated durations already
/// scheduled are unchanged; only the host driver's tick interval moves.
pub fn set_speed(world: &mut World, multiplier: u32) -> Result<(), CommandError> {
    if !(SpeedMultiplier::MIN..=SpeedMultiplier::MAX).contains(&multiplier) {
        return Err(CommandError::SpeedOutOfRange(multiplier));
    }
    world.insert_resource(SpeedMultiplier(multiplier));
    Ok(())
}

/// Ends the current trial and captures one result row per pipeline. The
/// runner invokes this when the clock reaches the horizon; calling it
/// directly cuts a trial short. Capturing an already-Finished trial again is
/// rejected.
pub fn finish_trial(world: &mut World) -> Result<(), CommandError> {
    match world.resource::<TrialState>().phase {
        TrialPhase::Running | TrialPhase::Paused => {
            finish(world);
            Ok(())
        }
        TrialPhase::Finished => Err(CommandError::ResultsAlreadyCaptured(
            world.resource::<TrialState>().trial_number(),
        )),
        TrialPhase::Idle => Err(CommandError::NotRunning),
    }
}

pub(crate) fn finish(world: &mut World) {
    let trial = world.resource::<TrialState>().trial;
    let call_row = SimulationResult::from_stats(
        trial,
        PipelineKind::Call,
        &world.resource::<CallPipeline>().stats,
    );
    let report_row = SimulationResult::from_stats(
        trial,
        PipelineKind::Report,
        &world.resource::<ReportPipeline>().stats,
    );
    world
        .resource_mut::<TrialResults>()
        .try_capture(trial, [call_row, report_row]);
    world.resource_mut::<TrialState>().phase = TrialPhase::Finished;
}

/// External incident entry, used by report forms and tests. Admits one
/// logical incident into both pipelines exactly as the stochastic generator
/// does, returning the per-pipeline ids.
pub fn report_incident(
    world: &mut World,
    coords: Coordinates,
) -> Result<(EmergencyId, EmergencyId), CommandError> {
    if !world.resource::<SimulationParams>().bounds.contains(coords) {
        return Err(CommandError::OutOfBounds {
            lat: coords.lat,
            lng: coords.lng,
        });
    }
    if world.resource::<TrialState>().phase != TrialPhase::Running {
        return Err(CommandError::NotRunning);
    }
    let now = world.resource::<SimulationClock>().now();
    let call_id = world.resource_mut::<CallPipeline>().admit(coords, now);
    let report_id = world.resource_mut::<ReportPipeline>().admit(coords, now);
    Ok((call_id, report_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_seeds_differ_per_stream_and_trial() {
        let master = 42;
        let t1_call = derive_seed(master, 1, CALL_SEED_SALT);
        let t1_report = derive_seed(master, 1, REPORT_SEED_SALT);
        let t2_call = derive_seed(master, 2, CALL_SEED_SALT);
        assert_ne!(t1_call, t1_report);
        assert_ne!(t1_call, t2_call);
    }

    #[test]
    fn command_errors_format_with_context() {
        let err = CommandError::SpeedOutOfRange(0);
        assert!(err.to_string().contains("1..=1000"));

        let err = CommandError::OutOfBounds {
            lat: 10.0,
            lng: 20.0,
        };
        assert!(err.to_string().contains("(10, 20)"));
    }
}
