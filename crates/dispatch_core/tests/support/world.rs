#![allow(dead_code)]

use bevy_ecs::prelude::World;
use dispatch_core::entities::{Coordinates, EmergencyId};
use dispatch_core::pipeline::{CallPipeline, ReportPipeline};
use dispatch_core::scenario::SimulationParams;
use dispatch_core::spatial::{cell_of, ResponderGrid};
use dispatch_core::test_helpers::{create_test_world, quiet_params};
use dispatch_core::trial;

/// Builder over quiet parameters: no stochastic generation, and hangups and
/// self-completion disabled until a test turns them on.
pub struct TestWorldBuilder {
    params: SimulationParams,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self {
            params: quiet_params(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.params = self.params.with_seed(seed);
        self
    }

    pub fn with_staffing(mut self, responders: usize, operators: usize) -> Self {
        self.params = self.params.with_staffing(responders, operators);
        self
    }

    pub fn with_horizon_hours(mut self, hours: u64) -> Self {
        self.params = self.params.with_horizon_hours(hours);
        self
    }

    pub fn with_incident_volume(mut self, base: u64, min_extra: u64, max_extra: u64) -> Self {
        self.params = self.params.with_incident_volume(base, min_extra, max_extra);
        self
    }

    pub fn with_call_processing(mut self, min_secs: u64, max_secs: u64) -> Self {
        self.params = self.params.with_call_processing(min_secs, max_secs);
        self
    }

    pub fn with_report_processing(mut self, min_secs: u64, max_secs: u64) -> Self {
        self.params = self.params.with_report_processing(min_secs, max_secs);
        self
    }

    pub fn with_report_max_range_km(mut self, km: f64) -> Self {
        self.params = self.params.with_report_max_range_km(km);
        self
    }

    pub fn with_hangup(mut self, threshold_secs: u64, prob_per_sec: f64) -> Self {
        self.params = self.params.with_hangup(threshold_secs, prob_per_sec);
        self
    }

    pub fn with_self_completion(
        mut self,
        check_interval_secs: u64,
        radius_km: f64,
        prob_per_responder: f64,
    ) -> Self {
        self.params =
            self.params
                .with_self_completion(check_interval_secs, radius_km, prob_per_responder);
        self
    }

    /// Build the world with all resources inserted, still Idle.
    pub fn build(self) -> World {
        create_test_world(self.params)
    }

    /// Build the world and start its first trial.
    pub fn build_running(self) -> World {
        let mut world = self.build();
        trial::start_trial(&mut world).expect("trial should start");
        world
    }
}

/// Injects one incident into both pipelines at the current simulated time.
pub fn inject(world: &mut World, lat: f64, lng: f64) -> (EmergencyId, EmergencyId) {
    trial::report_incident(world, Coordinates::new(lat, lng)).expect("incident inside bounds")
}

/// Repositions the call pipeline's responders and rebuilds its grid. Lengths
/// must match the spawned population.
pub fn place_call_responders(world: &mut World, coords: &[(f64, f64)]) {
    let cell_size = world.resource::<SimulationParams>().cell_size_deg;
    let mut call = world.resource_mut::<CallPipeline>();
    let call = &mut *call;
    assert_eq!(
        call.responders.len(),
        coords.len(),
        "population size mismatch"
    );
    for (responder, &(lat, lng)) in call.responders.iter_mut().zip(coords) {
        responder.coords = Coordinates::new(lat, lng);
        responder.cell = cell_of(responder.coords, cell_size);
    }
    call.grid = ResponderGrid::build(&call.responders, cell_size);
    call.distances.clear();
}

/// Repositions the report pipeline's responders and rebuilds its grid.
/// Lengths must match the spawned population.
pub fn place_report_responders(world: &mut World, coords: &[(f64, f64)]) {
    let cell_size = world.resource::<SimulationParams>().cell_size_deg;
    let mut report = world.resource_mut::<ReportPipeline>();
    let report = &mut *report;
    assert_eq!(
        report.responders.len(),
        coords.len(),
        "population size mismatch"
    );
    for (responder, &(lat, lng)) in report.responders.iter_mut().zip(coords) {
        responder.coords = Coordinates::new(lat, lng);
        responder.cell = cell_of(responder.coords, cell_size);
    }
    report.grid = ResponderGrid::build(&report.responders, cell_size);
    report.distances.clear();
}
