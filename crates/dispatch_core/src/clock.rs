use std::cmp::Ordering;
use std::collections::BinaryHeap;

use bevy_ecs::prelude::Resource;

use crate::entities::EmergencyId;

/// Simulated seconds in one hour.
pub const SECS_PER_HOUR: u64 = 60 * 60;

/// Trial generation counter. Every scheduled event is tagged with the trial
/// it was scheduled under so firings from a superseded trial can be discarded
/// instead of mutating freshly reset state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrialId(pub u64);

/// Event kinds, in tie-break order: at equal timestamps a GenerationTick is
/// processed before a ProcessingTick, so an emergency minted this second is
/// dispatchable this second. Completions come last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventKind {
    GenerationTick,
    ProcessingTick,
    CompleteCall,
    CompleteReport,
}

/// What an event is about, for kinds that target a specific record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSubject {
    Emergency(EmergencyId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: u64,
    pub kind: EventKind,
    pub subject: Option<EventSubject>,
    pub trial: TrialId,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, kind).
        other
            .timestamp
            .cmp(&self.timestamp)
            .then_with(|| other.kind.cmp(&self.kind))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Discrete-event clock. Time is an integer second counter that only moves
/// when an event of the current trial is popped.
#[derive(Debug, Default, Resource)]
pub struct SimulationClock {
    now: u64,
    trial: TrialId,
    events: BinaryHeap<Event>,
    stale_discarded: u64,
}

impl SimulationClock {
    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn trial(&self) -> TrialId {
        self.trial
    }

    /// Events discarded because their trial tag was superseded.
    pub fn stale_discarded(&self) -> u64 {
        self.stale_discarded
    }

    /// Resets time to 0 under a new trial generation. Events already queued
    /// keep their old tag and are dropped when they surface.
    pub fn begin_trial(&mut self, trial: TrialId) {
        self.now = 0;
        self.trial = trial;
    }

    pub fn schedule_at(&mut self, timestamp: u64, kind: EventKind, subject: Option<EventSubject>) {
        debug_assert!(
            timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        self.events.push(Event {
            timestamp,
            kind,
            subject,
            trial: self.trial,
        });
    }

    pub fn schedule_in(&mut self, delay_secs: u64, kind: EventKind, subject: Option<EventSubject>) {
        self.schedule_at(self.now.saturating_add(delay_secs), kind, subject);
    }

    /// Pops the next event of the current trial and advances `now` to its
    /// timestamp. Stale-tagged events are dropped without advancing time.
    pub fn pop_next(&mut self) -> Option<Event> {
        while let Some(event) = self.events.pop() {
            if event.trial != self.trial {
                self.stale_discarded += 1;
                continue;
            }
            self.now = event.timestamp;
            return Some(event);
        }
        None
    }

    /// Timestamp of the next current-trial event, draining stale ones off the
    /// top of the heap.
    pub fn next_event_time(&mut self) -> Option<u64> {
        loop {
            match self.events.peek() {
                Some(event) if event.trial != self.trial => {
                    self.events.pop();
                    self.stale_discarded += 1;
                }
                Some(event) => return Some(event.timestamp),
                None => return None,
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// The event currently being routed through the schedule. Inserted by the
/// runner before each schedule run.
#[derive(Debug, Clone, Copy, Resource)]
pub struct CurrentEvent(pub Event);
