//! Test helpers for common test setup and utilities.
//!
//! This module provides shared test utilities to reduce duplication across
//! test files.

use bevy_ecs::prelude::World;

use crate::scenario::{build_simulation, SimulationParams};

/// Parameters with no stochastic generation, hangups, or self-completions.
/// Tests inject incidents by hand and enable one mechanism at a time on top
/// of this base.
pub fn quiet_params() -> SimulationParams {
    SimulationParams::default()
        .with_seed(1)
        .with_horizon_hours(1)
        .with_incident_volume(0, 0, 0)
        .with_hangup(300, 0.0)
        .with_self_completion(60, 0.8, 0.0)
}

/// World with all simulation resources inserted, still Idle.
///
/// # Panics
///
/// Panics if `params` fails validation; test parameters are expected to be
/// well formed.
pub fn create_test_world(params: SimulationParams) -> World {
    let mut world = World::new();
    build_simulation(&mut world, params).expect("test params should be valid");
    world
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::{TrialPhase, TrialState};

    #[test]
    fn quiet_params_are_valid() {
        assert!(quiet_params().validate().is_ok());
    }

    #[test]
    fn test_world_starts_idle() {
        let world = create_test_world(quiet_params());
        assert_eq!(world.resource::<TrialState>().phase(), TrialPhase::Idle);
    }
}
