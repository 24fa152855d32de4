//! Emergency, responder, and operator records shared by both dispatch
//! pipelines. Terminal status changes go through check-and-set methods so an
//! emergency is finalized at most once no matter which path reaches it first.

use crate::spatial::GridCell;

/// Geographic point in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Emergency identifier, scoped to one pipeline within one trial. Doubles as
/// the index into the owning pipeline's emergency vec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmergencyId(pub u32);

/// Responder identifier, scoped to one pipeline within one trial. Doubles as
/// the index into the owning pipeline's responder vec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResponderId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmergencyStatus {
    Pending,
    Assigned,
    Completed,
    Canceled,
}

impl EmergencyStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EmergencyStatus::Completed | EmergencyStatus::Canceled)
    }
}

/// One emergency as seen by one pipeline. The call and report pipelines each
/// hold their own instance for the same real-world incident: identical
/// coordinates and creation time, distinct identity.
#[derive(Debug, Clone)]
pub struct Emergency {
    pub id: EmergencyId,
    pub coords: Coordinates,
    /// Simulated second the incident was reported, counted from trial start.
    pub created_at: u64,
    pub status: EmergencyStatus,
    /// Set only on Assigned; stays `None` for opportunistic completions.
    pub assigned_responder: Option<ResponderId>,
    pub cell: GridCell,
    pub assigned_at: Option<u64>,
    /// Drawn service duration in simulated seconds, set on assignment.
    pub processing_secs: Option<u64>,
}

impl Emergency {
    pub fn new(id: EmergencyId, coords: Coordinates, created_at: u64, cell: GridCell) -> Self {
        Self {
            id,
            coords,
            created_at,
            status: EmergencyStatus::Pending,
            assigned_responder: None,
            cell,
            assigned_at: None,
            processing_secs: None,
        }
    }

    /// Seconds since the incident was reported.
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.created_at)
    }

    /// Pending -> Assigned. Returns `false` (without touching anything) when
    /// the emergency is no longer Pending.
    pub fn try_assign(
        &mut self,
        now: u64,
        processing_secs: u64,
        responder: Option<ResponderId>,
    ) -> bool {
        if self.status != EmergencyStatus::Pending {
            return false;
        }
        self.status = EmergencyStatus::Assigned;
        self.assigned_responder = responder;
        self.assigned_at = Some(now);
        self.processing_secs = Some(processing_secs);
        true
    }

    /// Pending/Assigned -> Completed. Returns `false` when already finalized,
    /// so duplicate completion firings are no-ops.
    pub fn try_complete(&mut self) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = EmergencyStatus::Completed;
        true
    }

    /// Pending -> Canceled. Assigned emergencies are never canceled.
    pub fn try_cancel(&mut self) -> bool {
        if self.status != EmergencyStatus::Pending {
            return false;
        }
        self.status = EmergencyStatus::Canceled;
        true
    }
}

/// One responder. Position is fixed for the trial's duration, so the grid
/// cell is computed once at creation.
#[derive(Debug, Clone)]
pub struct Responder {
    pub id: ResponderId,
    pub coords: Coordinates,
    /// Free when current time >= busy_until.
    pub busy_until: u64,
    pub cell: GridCell,
}

impl Responder {
    pub fn new(id: ResponderId, coords: Coordinates, cell: GridCell) -> Self {
        Self {
            id,
            coords,
            busy_until: 0,
            cell,
        }
    }

    pub fn is_free(&self, now: u64) -> bool {
        now >= self.busy_until
    }
}

/// Call-taking capacity: a fixed-size pool of busy-until horizons. Operators
/// have no position.
#[derive(Debug, Clone, Default)]
pub struct OperatorPool {
    busy_until: Vec<u64>,
}

impl OperatorPool {
    pub fn new(size: usize) -> Self {
        Self {
            busy_until: vec![0; size],
        }
    }

    pub fn len(&self) -> usize {
        self.busy_until.len()
    }

    pub fn is_empty(&self) -> bool {
        self.busy_until.is_empty()
    }

    pub fn free_count(&self, now: u64) -> usize {
        self.busy_until.iter().filter(|&&b| now >= b).count()
    }

    /// Claims any free operator until `until`. Returns `false` when the pool
    /// is saturated.
    pub fn try_claim(&mut self, now: u64, until: u64) -> bool {
        match self.busy_until.iter_mut().find(|b| now >= **b) {
            Some(slot) => {
                *slot = until;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self, size: usize) {
        self.busy_until.clear();
        self.busy_until.resize(size, 0);
    }
}
