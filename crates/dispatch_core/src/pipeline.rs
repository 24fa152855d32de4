//! Per-trial state owned by each dispatch pipeline.
//!
//! The call and report pipelines observe the same incident stream but own
//! fully disjoint copies of emergencies, responders, and bookkeeping. Nothing
//! is shared, so the two mechanisms can be advanced in any order without
//! cross-pipeline locking.

use std::collections::VecDeque;

use bevy_ecs::prelude::Resource;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::entities::{Coordinates, Emergency, EmergencyId, OperatorPool, Responder};
use crate::scenario::SimulationParams;
use crate::spatial::{cell_of, DistanceCache, ResponderGrid};
use crate::spawner::spawn_responders;
use crate::telemetry::{
    EmergencySnapshot, PipelineCounts, PipelineSnapshot, PipelineStats, ResponderSnapshot,
};

/// Which dispatch mechanism a record or result row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum PipelineKind {
    Call,
    Report,
}

impl PipelineKind {
    pub fn label(&self) -> &'static str {
        match self {
            PipelineKind::Call => "call",
            PipelineKind::Report => "report",
        }
    }
}

/// Centralized pipeline: a FIFO queue feeding a bounded operator pool, with
/// hangups and an opportunistic self-completion side channel.
#[derive(Resource)]
pub struct CallPipeline {
    pub emergencies: Vec<Emergency>,
    /// Ids awaiting an operator, oldest first. Holds Pending emergencies only.
    pub queue: VecDeque<EmergencyId>,
    pub operators: OperatorPool,
    pub responders: Vec<Responder>,
    pub grid: ResponderGrid,
    pub stats: PipelineStats,
    pub distances: DistanceCache,
    pub rng: StdRng,
    /// Simulated time of the last self-completion sweep.
    pub last_self_check: u64,
}

impl CallPipeline {
    pub fn new(cell_size_deg: f64, seed: u64) -> Self {
        Self {
            emergencies: Vec::new(),
            queue: VecDeque::new(),
            operators: OperatorPool::default(),
            responders: Vec::new(),
            grid: ResponderGrid::empty(cell_size_deg),
            stats: PipelineStats::default(),
            distances: DistanceCache::new(),
            rng: StdRng::seed_from_u64(seed),
            last_self_check: 0,
        }
    }

    /// Clears all trial state and respawns the population under `seed`.
    pub fn reset(&mut self, params: &SimulationParams, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.emergencies.clear();
        self.queue.clear();
        self.operators.reset(params.operator_count);
        self.responders = spawn_responders(
            &mut self.rng,
            params.responder_count,
            &params.bounds,
            params.cell_size_deg,
        );
        self.grid = ResponderGrid::build(&self.responders, params.cell_size_deg);
        self.stats = PipelineStats::default();
        self.distances.clear();
        self.last_self_check = 0;
    }

    /// Admits one incident: creates the record, counts it, and queues it for
    /// dispatch.
    pub fn admit(&mut self, coords: Coordinates, now: u64) -> EmergencyId {
        let id = EmergencyId(self.emergencies.len() as u32);
        let cell = cell_of(coords, self.grid.cell_size_deg());
        self.emergencies.push(Emergency::new(id, coords, now, cell));
        self.stats.record_generated();
        self.queue.push_back(id);
        id
    }

    pub fn emergency(&self, id: EmergencyId) -> Option<&Emergency> {
        self.emergencies.get(id.0 as usize)
    }

    pub fn snapshot(&self, now: u64) -> PipelineSnapshot {
        population_snapshot(
            &self.emergencies,
            &self.responders,
            &self.stats,
            now,
            self.queue.len(),
            self.operators.free_count(now),
        )
    }
}

/// Decentralized pipeline: free responders directly observe and claim the
/// nearest pending incident within range. No queue, no operators.
#[derive(Resource)]
pub struct ReportPipeline {
    pub emergencies: Vec<Emergency>,
    pub responders: Vec<Responder>,
    pub grid: ResponderGrid,
    pub stats: PipelineStats,
    pub distances: DistanceCache,
    pub rng: StdRng,
}

impl ReportPipeline {
    pub fn new(cell_size_deg: f64, seed: u64) -> Self {
        Self {
            emergencies: Vec::new(),
            responders: Vec::new(),
            grid: ResponderGrid::empty(cell_size_deg),
            stats: PipelineStats::default(),
            distances: DistanceCache::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Clears all trial state and respawns the population under `seed`.
    pub fn reset(&mut self, params: &SimulationParams, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
        self.emergencies.clear();
        self.responders = spawn_responders(
            &mut self.rng,
            params.responder_count,
            &params.bounds,
            params.cell_size_deg,
        );
        self.grid = ResponderGrid::build(&self.responders, params.cell_size_deg);
        self.stats = PipelineStats::default();
        self.distances.clear();
    }

    /// Admits one incident as a directly observable pending report.
    pub fn admit(&mut self, coords: Coordinates, now: u64) -> EmergencyId {
        let id = EmergencyId(self.emergencies.len() as u32);
        let cell = cell_of(coords, self.grid.cell_size_deg());
        self.emergencies.push(Emergency::new(id, coords, now, cell));
        self.stats.record_generated();
        id
    }

    pub fn emergency(&self, id: EmergencyId) -> Option<&Emergency> {
        self.emergencies.get(id.0 as usize)
    }

    pub fn snapshot(&self, now: u64) -> PipelineSnapshot {
        population_snapshot(&self.emergencies, &self.responders, &self.stats, now, 0, 0)
    }
}

fn population_snapshot(
    emergencies: &[Emergency],
    responders: &[Responder],
    stats: &PipelineStats,
    now: u64,
    queue_len: usize,
    free_operators: usize,
) -> PipelineSnapshot {
    let mut counts = PipelineCounts {
        generated: stats.generated,
        completed: stats.completed,
        canceled: stats.canceled,
        self_completed: stats.self_completed,
        queue_len,
        free_operators,
        free_responders: responders.iter().filter(|r| r.is_free(now)).count(),
        ..Default::default()
    };
    let emergencies = emergencies
        .iter()
        .map(|e| {
            counts.add_emergency(e.status);
            EmergencySnapshot {
                id: e.id,
                coords: e.coords,
                status: e.status,
            }
        })
        .collect();
    let responders = responders
        .iter()
        .map(|r| ResponderSnapshot {
            id: r.id,
            coords: r.coords,
            busy: !r.is_free(now),
        })
        .collect();
    PipelineSnapshot {
        counts,
        emergencies,
        responders,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SimulationParams {
        SimulationParams {
            responder_count: 25,
            operator_count: 3,
            ..Default::default()
        }
    }

    #[test]
    fn call_admit_assigns_sequential_ids_and_queues() {
        let params = params();
        let mut call = CallPipeline::new(params.cell_size_deg, 1);
        call.reset(&params, 1);

        let a = call.admit(Coordinates::new(42.65, 23.30), 5);
        let b = call.admit(Coordinates::new(42.66, 23.31), 9);
        assert_eq!(a, EmergencyId(0));
        assert_eq!(b, EmergencyId(1));
        assert_eq!(call.queue.len(), 2);
        assert_eq!(call.stats.generated, 2);
        assert_eq!(call.emergency(a).map(|e| e.created_at), Some(5));
    }

    #[test]
    fn reset_respawns_population_and_clears_state() {
        let params = params();
        let mut call = CallPipeline::new(params.cell_size_deg, 42);
        call.reset(&params, 42);
        call.admit(Coordinates::new(42.65, 23.30), 0);

        call.reset(&params, 43);
        assert!(call.emergencies.is_empty());
        assert!(call.queue.is_empty());
        assert_eq!(call.stats.generated, 0);
        assert_eq!(call.responders.len(), 25);
        assert_eq!(call.operators.len(), 3);
        for r in &call.responders {
            assert!(params.bounds.contains(r.coords));
            assert!(call.grid.responders_in(r.cell).contains(&r.id));
        }
    }

    #[test]
    fn pipeline_populations_are_independent() {
        let params = params();
        let mut call = CallPipeline::new(params.cell_size_deg, 7);
        let mut report = ReportPipeline::new(params.cell_size_deg, 8);
        call.reset(&params, 7);
        report.reset(&params, 8);

        // Same sizes, independently drawn positions.
        assert_eq!(call.responders.len(), report.responders.len());
        let identical = call
            .responders
            .iter()
            .zip(&report.responders)
            .all(|(a, b)| a.coords == b.coords);
        assert!(!identical);
    }

    #[test]
    fn snapshot_reports_live_counts() {
        let params = params();
        let mut call = CallPipeline::new(params.cell_size_deg, 3);
        call.reset(&params, 3);
        call.admit(Coordinates::new(42.65, 23.30), 0);

        let snap = call.snapshot(0);
        assert_eq!(snap.counts.generated, 1);
        assert_eq!(snap.counts.pending, 1);
        assert_eq!(snap.counts.queue_len, 1);
        assert_eq!(snap.counts.free_operators, 3);
        assert_eq!(snap.counts.free_responders, 25);
        assert_eq!(snap.emergencies.len(), 1);
        assert_eq!(snap.responders.len(), 25);
    }
}
