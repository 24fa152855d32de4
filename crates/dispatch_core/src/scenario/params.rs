use std::time::Duration;

use bevy_ecs::prelude::Resource;
use rand::Rng;

use crate::entities::Coordinates;
use crate::trial::CommandError;

/// Default bounding box: Sofia, Bulgaria (approx).
const DEFAULT_LAT_MIN: f64 = 42.62;
const DEFAULT_LAT_MAX: f64 = 42.75;
const DEFAULT_LNG_MIN: f64 = 23.24;
const DEFAULT_LNG_MAX: f64 = 23.42;

/// Default grid cell size in degrees (~1.1 km).
const DEFAULT_CELL_SIZE_DEG: f64 = 0.01;

/// Geographic region emergencies and responders are drawn from.
#[derive(Debug, Clone, Copy)]
pub struct RegionBounds {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lng_min: f64,
    pub lng_max: f64,
}

impl RegionBounds {
    pub fn contains(&self, coords: Coordinates) -> bool {
        (self.lat_min..=self.lat_max).contains(&coords.lat)
            && (self.lng_min..=self.lng_max).contains(&coords.lng)
    }

    fn is_well_formed(&self) -> bool {
        self.lat_min < self.lat_max
            && self.lng_min < self.lng_max
            && self.lat_min >= -90.0
            && self.lat_max <= 90.0
            && self.lng_min >= -180.0
            && self.lng_max <= 180.0
    }
}

impl Default for RegionBounds {
    fn default() -> Self {
        Self {
            lat_min: DEFAULT_LAT_MIN,
            lat_max: DEFAULT_LAT_MAX,
            lng_min: DEFAULT_LNG_MIN,
            lng_max: DEFAULT_LNG_MAX,
        }
    }
}

/// Wall-clock pacing multiplier for the host driver loop; 1 = real time.
/// Accepted range is 1..=1000. Pacing only: simulated durations already
/// scheduled on the event clock are unaffected by later changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Resource)]
pub struct SpeedMultiplier(pub u32);

impl SpeedMultiplier {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 1000;

    /// Wall-clock interval between driver ticks at this speed.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.0.max(1)))
    }
}

impl Default for SpeedMultiplier {
    fn default() -> Self {
        Self(1)
    }
}

/// Inclusive range of drawn service durations, simulated seconds.
#[derive(Debug, Clone, Copy)]
pub struct ProcessingRange {
    pub min_secs: u64,
    pub max_secs: u64,
}

impl ProcessingRange {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> u64 {
        rng.gen_range(self.min_secs..=self.max_secs)
    }
}

/// Queue abandonment model for the call pipeline.
#[derive(Debug, Clone, Copy)]
pub struct HangupConfig {
    /// Queue age beyond which an unanswered call may be abandoned.
    pub threshold_secs: u64,
    /// Per-simulated-second abandonment probability once past the threshold.
    pub prob_per_sec: f64,
}

/// Opportunistic on-scene resolution for the call pipeline.
#[derive(Debug, Clone, Copy)]
pub struct SelfCompletionConfig {
    /// Simulated seconds between sweeps.
    pub check_interval_secs: u64,
    /// Search radius for a coincidental responder, kilometers.
    pub radius_km: f64,
    /// Per-responder success probability each sweep.
    pub prob_per_responder: f64,
}

/// Parameters for one simulation world. Fixed while a trial runs; each trial
/// draws its own incident volume and populations from these.
#[derive(Debug, Clone, Resource)]
pub struct SimulationParams {
    pub bounds: RegionBounds,
    /// Responders per pipeline population.
    pub responder_count: usize,
    /// Call-taking operator pool size.
    pub operator_count: usize,
    pub horizon_hours: u64,
    /// Baseline incidents per trial before the randomized extra draw.
    pub base_incidents: u64,
    /// Inclusive range of extra incidents added per trial.
    pub min_extra_incidents: u64,
    pub max_extra_incidents: u64,
    pub call_processing: ProcessingRange,
    pub report_processing: ProcessingRange,
    /// Maximum range a responder will self-dispatch over, kilometers.
    pub report_max_range_km: f64,
    pub hangup: HangupConfig,
    pub self_completion: SelfCompletionConfig,
    pub cell_size_deg: f64,
    /// Master seed; trial and pipeline seeds are derived from it. If `None`,
    /// defaults to 0.
    pub seed: Option<u64>,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            bounds: RegionBounds::default(),
            responder_count: 80,
            operator_count: 4,
            horizon_hours: 6,
            base_incidents: 150,
            min_extra_incidents: 0,
            max_extra_incidents: 50,
            call_processing: ProcessingRange {
                min_secs: 120,
                max_secs: 600,
            },
            report_processing: ProcessingRange {
                min_secs: 120,
                max_secs: 600,
            },
            report_max_range_km: 4.0,
            hangup: HangupConfig {
                threshold_secs: 300,
                prob_per_sec: 0.02,
            },
            self_completion: SelfCompletionConfig {
                check_interval_secs: 60,
                radius_km: 0.8,
                prob_per_responder: 0.01,
            },
            cell_size_deg: DEFAULT_CELL_SIZE_DEG,
            seed: None,
        }
    }
}

impl SimulationParams {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_horizon_hours(mut self, hours: u64) -> Self {
        self.horizon_hours = hours;
        self
    }

    /// Set both population sizes at once.
    pub fn with_staffing(mut self, responders: usize, operators: usize) -> Self {
        self.responder_count = responders;
        self.operator_count = operators;
        self
    }

    /// Incident volume per trial: `base` plus a uniform draw in
    /// `min_extra..=max_extra`.
    pub fn with_incident_volume(mut self, base: u64, min_extra: u64, max_extra: u64) -> Self {
        self.base_incidents = base;
        self.min_extra_incidents = min_extra;
        self.max_extra_incidents = max_extra;
        self
    }

    pub fn with_call_processing(mut self, min_secs: u64, max_secs: u64) -> Self {
        self.call_processing = ProcessingRange { min_secs, max_secs };
        self
    }

    pub fn with_report_processing(mut self, min_secs: u64, max_secs: u64) -> Self {
        self.report_processing = ProcessingRange { min_secs, max_secs };
        self
    }

    pub fn with_report_max_range_km(mut self, km: f64) -> Self {
        self.report_max_range_km = km;
        self
    }

    pub fn with_hangup(mut self, threshold_secs: u64, prob_per_sec: f64) -> Self {
        self.hangup = HangupConfig {
            threshold_secs,
            prob_per_sec,
        };
        self
    }

    pub fn with_self_completion(
        mut self,
        check_interval_secs: u64,
        radius_km: f64,
        prob_per_responder: f64,
    ) -> Self {
        self.self_completion = SelfCompletionConfig {
            check_interval_secs,
            radius_km,
            prob_per_responder,
        };
        self
    }

    pub fn with_bounds(mut self, bounds: RegionBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Trial horizon in simulated seconds.
    pub fn horizon_secs(&self) -> u64 {
        self.horizon_hours * crate::clock::SECS_PER_HOUR
    }

    /// Checks the configuration; called at world build and again on every
    /// trial start.
    pub fn validate(&self) -> Result<(), CommandError> {
        if !self.bounds.is_well_formed() {
            return Err(CommandError::InvalidBounds {
                lat_min: self.bounds.lat_min,
                lat_max: self.bounds.lat_max,
                lng_min: self.bounds.lng_min,
                lng_max: self.bounds.lng_max,
            });
        }
        if self.horizon_hours == 0 {
            return Err(CommandError::InvalidHorizon(self.horizon_hours));
        }
        if self.cell_size_deg <= 0.0 {
            return Err(CommandError::InvalidCellSize(self.cell_size_deg));
        }
        if self.call_processing.min_secs > self.call_processing.max_secs {
            return Err(CommandError::InvalidProcessingRange {
                min_secs: self.call_processing.min_secs,
                max_secs: self.call_processing.max_secs,
            });
        }
        if self.report_processing.min_secs > self.report_processing.max_secs {
            return Err(CommandError::InvalidProcessingRange {
                min_secs: self.report_processing.min_secs,
                max_secs: self.report_processing.max_secs,
            });
        }
        if self.min_extra_incidents > self.max_extra_incidents {
            return Err(CommandError::InvalidIncidentRange {
                min_extra: self.min_extra_incidents,
                max_extra: self.max_extra_incidents,
            });
        }
        for prob in [self.hangup.prob_per_sec, self.self_completion.prob_per_responder] {
            if !(0.0..=1.0).contains(&prob) {
                return Err(CommandError::InvalidProbability(prob));
            }
        }
        for radius in [self.report_max_range_km, self.self_completion.radius_km] {
            if !radius.is_finite() || radius < 0.0 {
                return Err(CommandError::InvalidRadius(radius));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        assert!(SimulationParams::default().validate().is_ok());
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let params = SimulationParams::default().with_bounds(RegionBounds {
            lat_min: 43.0,
            lat_max: 42.0,
            lng_min: 23.0,
            lng_max: 24.0,
        });
        assert!(matches!(
            params.validate(),
            Err(CommandError::InvalidBounds { .. })
        ));
    }

    #[test]
    fn zero_horizon_is_rejected() {
        let params = SimulationParams::default().with_horizon_hours(0);
        assert!(matches!(
            params.validate(),
            Err(CommandError::InvalidHorizon(0))
        ));
    }

    #[test]
    fn inverted_processing_range_is_rejected() {
        let params = SimulationParams::default().with_call_processing(600, 120);
        assert!(matches!(
            params.validate(),
            Err(CommandError::InvalidProcessingRange { .. })
        ));
    }

    #[test]
    fn out_of_unit_probability_is_rejected() {
        let params = SimulationParams::default().with_hangup(300, 1.5);
        assert!(matches!(
            params.validate(),
            Err(CommandError::InvalidProbability(_))
        ));
    }

    #[test]
    fn tick_interval_scales_with_multiplier() {
        assert_eq!(SpeedMultiplier(1).tick_interval(), Duration::from_millis(1000));
        assert_eq!(SpeedMultiplier(4).tick_interval(), Duration::from_millis(250));
        assert_eq!(SpeedMultiplier(1000).tick_interval(), Duration::from_millis(1));
    }
}
