//! Parameter variation framework for exploring the dispatch parameter space.
//!
//! This module provides tools for defining parameter spaces and generating
//! parameter sets for parallel experimentation. Supports grid search and
//! random sampling strategies.

use std::collections::HashSet;

use dispatch_core::scenario::SimulationParams;

/// A single parameter configuration for an experiment run.
///
/// Wraps `SimulationParams` with experiment metadata for tracking and
/// reproducibility.
#[derive(Debug, Clone)]
pub struct ParameterSet {
    /// Engine parameters for this run.
    pub params: SimulationParams,
    /// Unique experiment ID for this parameter combination.
    pub experiment_id: String,
    /// Run ID within the experiment (one per seed).
    pub run_id: usize,
    /// Master seed used for this run.
    pub seed: u64,
    /// Consecutive trials to run under this configuration.
    pub trials: u64,
}

impl ParameterSet {
    pub fn new(
        params: SimulationParams,
        experiment_id: String,
        run_id: usize,
        seed: u64,
        trials: u64,
    ) -> Self {
        Self {
            params,
            experiment_id,
            run_id,
            seed,
            trials,
        }
    }

    /// Engine parameters with this run's seed applied.
    pub fn simulation_params(&self) -> SimulationParams {
        self.params.clone().with_seed(self.seed)
    }
}

/// Defines a parameter space for exploration.
///
/// Axes left empty fall back to the base configuration's value, so a space
/// only enumerates the dimensions it actually varies.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    /// Base parameters, used as defaults for unspecified axes.
    base: SimulationParams,
    /// Trials per generated parameter set.
    trials: u64,
    /// Responder population sizes to explore.
    responder_counts: Vec<usize>,
    /// Operator pool sizes to explore.
    operator_counts: Vec<usize>,
    /// Baseline incident volumes to explore.
    base_incident_volumes: Vec<u64>,
    /// Hangup thresholds to explore, seconds.
    hangup_thresholds_secs: Vec<u64>,
    /// Report self-dispatch ranges to explore, kilometers.
    report_ranges_km: Vec<f64>,
    /// Master seeds; each becomes a separate run of every combination.
    seeds: Vec<u64>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self {
            base: SimulationParams::default(),
            trials: 3,
            responder_counts: vec![],
            operator_counts: vec![],
            base_incident_volumes: vec![],
            hangup_thresholds_secs: vec![],
            report_ranges_km: vec![],
            seeds: vec![],
        }
    }

    /// Create a new parameter space for grid search.
    pub fn grid() -> Self {
        Self::new()
    }

    /// Set responder population sizes to explore.
    pub fn responder_counts(mut self, counts: Vec<usize>) -> Self {
        self.responder_counts = counts;
        self
    }

    /// Set operator pool sizes to explore.
    pub fn operator_counts(mut self, counts: Vec<usize>) -> Self {
        self.operator_counts = counts;
        self
    }

    /// Set baseline incident volumes to explore.
    pub fn base_incident_volumes(mut self, volumes: Vec<u64>) -> Self {
        self.base_incident_volumes = volumes;
        self
    }

    /// Set hangup thresholds to explore (seconds).
    pub fn hangup_thresholds_secs(mut self, thresholds: Vec<u64>) -> Self {
        self.hangup_thresholds_secs = thresholds;
        self
    }

    /// Set report self-dispatch ranges to explore (kilometers).
    pub fn report_ranges_km(mut self, ranges: Vec<f64>) -> Self {
        self.report_ranges_km = ranges;
        self
    }

    /// Set master seeds; every combination runs once per seed.
    pub fn seeds(mut self, seeds: Vec<u64>) -> Self {
        self.seeds = seeds;
        self
    }

    /// Set base parameters (used as defaults).
    pub fn with_base(mut self, base: SimulationParams) -> Self {
        self.base = base;
        self
    }

    /// Set the trial count per generated parameter set.
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    fn combination(
        &self,
        responder_count: usize,
        operator_count: usize,
        base_incidents: u64,
        threshold_secs: u64,
        report_range_km: f64,
    ) -> SimulationParams {
        self.base
            .clone()
            .with_staffing(responder_count, operator_count)
            .with_incident_volume(
                base_incidents,
                self.base.min_extra_incidents,
                self.base.max_extra_incidents,
            )
            .with_hangup(threshold_secs, self.base.hangup.prob_per_sec)
            .with_report_max_range_km(report_range_km)
    }

    /// Generate all parameter sets using grid search (cartesian product).
    ///
    /// Each combination of specified axes is generated once per seed; axes
    /// without values use the base configuration.
    pub fn generate(&self) -> Vec<ParameterSet> {
        let responders = axis_or(&self.responder_counts, self.base.responder_count);
        let operators = axis_or(&self.operator_counts, self.base.operator_count);
        let volumes = axis_or(&self.base_incident_volumes, self.base.base_incidents);
        let thresholds = axis_or(&self.hangup_thresholds_secs, self.base.hangup.threshold_secs);
        let ranges = axis_or(&self.report_ranges_km, self.base.report_max_range_km);
        let seeds = axis_or(&self.seeds, self.base.seed.unwrap_or(0));

        let mut sets = Vec::new();
        let mut experiment = 0usize;
        for &responder_count in &responders {
            for &operator_count in &operators {
                for &base_incidents in &volumes {
                    for &threshold_secs in &thresholds {
                        for &report_range_km in &ranges {
                            let params = self.combination(
                                responder_count,
                                operator_count,
                                base_incidents,
                                threshold_secs,
                                report_range_km,
                            );
                            for (run_id, &seed) in seeds.iter().enumerate() {
                                sets.push(ParameterSet::new(
                                    params.clone(),
                                    format!("exp_{experiment}"),
                                    run_id,
                                    seed,
                                    self.trials,
                                ));
                            }
                            experiment += 1;
                        }
                    }
                }
            }
        }
        sets
    }

    /// Generate random parameter sets (Monte Carlo sampling).
    ///
    /// Samples `count` distinct combinations uniformly from the defined axes.
    /// Stops early if the space cannot supply `count` distinct combinations.
    pub fn sample_random(&self, count: usize, seed: u64) -> Vec<ParameterSet> {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        fn pick<T: Copy>(rng: &mut StdRng, axis: &[T], default: T) -> T {
            if axis.is_empty() {
                default
            } else {
                axis[rng.gen_range(0..axis.len())]
            }
        }

        let mut rng = StdRng::seed_from_u64(seed);
        let mut sets: Vec<ParameterSet> = Vec::new();
        let mut seen = HashSet::new();
        let mut attempts = 0;
        const MAX_ATTEMPTS: usize = 10_000;

        while sets.len() < count && attempts < MAX_ATTEMPTS {
            attempts += 1;
            let params = self.combination(
                pick(&mut rng, &self.responder_counts, self.base.responder_count),
                pick(&mut rng, &self.operator_counts, self.base.operator_count),
                pick(&mut rng, &self.base_incident_volumes, self.base.base_incidents),
                pick(
                    &mut rng,
                    &self.hangup_thresholds_secs,
                    self.base.hangup.threshold_secs,
                ),
                pick(&mut rng, &self.report_ranges_km, self.base.report_max_range_km),
            );

            // Combinations are deduplicated on their full debug rendering.
            if !seen.insert(format!("{params:?}")) {
                continue;
            }

            let run_seed = if self.seeds.is_empty() {
                seed.wrapping_add(sets.len() as u64).wrapping_mul(0x9e37_79b9)
            } else {
                self.seeds[rng.gen_range(0..self.seeds.len())]
            };

            sets.push(ParameterSet::new(
                params,
                format!("random_{}", sets.len()),
                0,
                run_seed,
                self.trials,
            ));
        }

        sets
    }
}

impl Default for ParameterSpace {
    fn default() -> Self {
        Self::new()
    }
}

fn axis_or<T: Copy>(axis: &[T], default: T) -> Vec<T> {
    if axis.is_empty() {
        vec![default]
    } else {
        axis.to_vec()
    }
}
