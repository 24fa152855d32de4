//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each
//! step pops the next event from [SimulationClock], inserts it as
//! [CurrentEvent], then runs the schedule. The generation and processing
//! ticks re-arm here at one-second cadence, so systems never schedule their
//! own heartbeat.

use bevy_ecs::prelude::Res;
use bevy_ecs::prelude::{Schedule, World};
use bevy_ecs::schedule::IntoSystemConfigs;

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::systems::{
    call_dispatch_system, capture_snapshot_system, complete_call_system, complete_report_system,
    emergency_generation_system, hangup_system, report_dispatch_system, self_completion_system,
};
use crate::trial::{self, start_trial, CommandError, TrialPhase, TrialState};

// Condition functions for each event kind
fn is_generation_tick(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::GenerationTick)
        .unwrap_or(false)
}

fn is_processing_tick(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ProcessingTick)
        .unwrap_or(false)
}

fn is_complete_call(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::CompleteCall)
        .unwrap_or(false)
}

fn is_complete_report(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::CompleteReport)
        .unwrap_or(false)
}

/// Condition: telemetry snapshot interval has elapsed.
fn should_capture_snapshot(
    clock: Option<Res<SimulationClock>>,
    config: Option<Res<crate::telemetry::SimSnapshotConfig>>,
    snapshots: Option<Res<crate::telemetry::SimSnapshots>>,
) -> bool {
    let Some(clock) = clock else {
        return false;
    };
    let Some(config) = config else {
        return false;
    };
    let Some(snapshots) = snapshots else {
        return false;
    };

    let now = clock.now();
    match snapshots.last_snapshot_at {
        None => true,
        Some(last) => now.saturating_sub(last) >= config.interval_secs,
    }
}

/// Runs one simulation step: pops the next event, inserts it as
/// [CurrentEvent], then runs the schedule. Returns `false` without stepping
/// when the trial is not Running, and when the next event would land at or
/// past the trial horizon; in the latter case the trial is finished and its
/// result rows captured before returning.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> bool {
    let (phase, horizon) = {
        let Some(state) = world.get_resource::<TrialState>() else {
            return false;
        };
        (state.phase(), state.horizon_secs())
    };
    if phase != TrialPhase::Running {
        return false;
    }

    let next_ts = world
        .get_resource_mut::<SimulationClock>()
        .and_then(|mut c| c.next_event_time());
    let Some(ts) = next_ts else {
        return false;
    };
    if ts >= horizon {
        trial::finish(world);
        return false;
    }

    let event = match world.resource_mut::<SimulationClock>().pop_next() {
        Some(e) => e,
        None => return false,
    };
    if matches!(
        event.kind,
        EventKind::GenerationTick | EventKind::ProcessingTick
    ) {
        world
            .resource_mut::<SimulationClock>()
            .schedule_in(1, event.kind, None);
    }
    world.insert_resource(CurrentEvent(event));

    schedule.run(world);
    true
}

/// Runs steps until the clock has advanced `secs` simulated seconds past the
/// current time, the trial finishes, or the trial stops being Running.
/// Returns the number of steps executed.
pub fn advance_secs(world: &mut World, schedule: &mut Schedule, secs: u64) -> usize {
    let target = world
        .resource::<SimulationClock>()
        .now()
        .saturating_add(secs);
    let mut steps = 0;
    loop {
        let next = world
            .get_resource_mut::<SimulationClock>()
            .and_then(|mut c| c.next_event_time());
        match next {
            Some(ts) if ts <= target => {}
            _ => break,
        }
        if !run_next_event(world, schedule) {
            break;
        }
        steps += 1;
    }
    steps
}

/// Runs the current trial to its horizon. Returns the number of steps
/// executed; on return the trial is Finished and its rows are captured.
pub fn run_trial(world: &mut World, schedule: &mut Schedule) -> usize {
    let mut steps = 0;
    while run_next_event(world, schedule) {
        steps += 1;
    }
    steps
}

/// Starts and runs `trials` consecutive trials to completion.
pub fn run_trials(
    world: &mut World,
    schedule: &mut Schedule,
    trials: u64,
) -> Result<(), CommandError> {
    for _ in 0..trials {
        start_trial(world)?;
        run_trial(world, schedule);
    }
    Ok(())
}

/// Builds the default simulation schedule. Systems are conditionally executed
/// based on event type; the four processing-tick systems are chained so
/// operator dispatch always sees the queue before hangups and self-completion
/// prune it.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();

    schedule.add_systems((
        // GenerationTick
        emergency_generation_system.run_if(is_generation_tick),
        // ProcessingTick, in queue-priority order
        (
            call_dispatch_system,
            hangup_system,
            report_dispatch_system,
            self_completion_system,
        )
            .chain()
            .run_if(is_processing_tick),
        // CompleteCall
        complete_call_system.run_if(is_complete_call),
        // CompleteReport
        complete_report_system.run_if(is_complete_report),
    ));

    // Telemetry snapshot runs conditionally based on interval to avoid overhead
    schedule.add_systems(capture_snapshot_system.run_if(should_capture_snapshot));

    schedule
}
