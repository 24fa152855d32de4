#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use dispatch_core::runner::{advance_secs, run_next_event, run_trial, simulation_schedule};

/// Helper that owns a reusable `Schedule` so tests can step the clock by
/// single events or by simulated seconds.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    /// Create a runner with the default simulation schedule.
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run a single event (returns `true` if an event was processed).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_event(world, &mut self.schedule)
    }

    /// Advance the clock by `secs` simulated seconds, returning the number of
    /// events processed.
    pub fn advance(&mut self, world: &mut World, secs: u64) -> usize {
        advance_secs(world, &mut self.schedule, secs)
    }

    /// Drive the current trial to its horizon.
    pub fn run_trial(&mut self, world: &mut World) -> usize {
        run_trial(world, &mut self.schedule)
    }
}
