//! Pre-defined parameter space configurations for experimentation.
//!
//! Ready-to-use spaces for the sweeps we run most often. Each returns a
//! `ParameterSpace` that callers can generate or sample from directly.

use dispatch_core::scenario::SimulationParams;

use crate::ParameterSpace;

/// Smallest useful space, for smoke-testing the sweep machinery.
pub fn minimal_space() -> ParameterSpace {
    ParameterSpace::grid()
        .with_base(SimulationParams::default().with_horizon_hours(1))
        .with_trials(1)
        .responder_counts(vec![40, 80])
        .operator_counts(vec![2])
        .seeds(vec![42])
}

/// Staffing sweep: how responder and operator headcount shift the balance
/// between the two intake pipelines.
pub fn staffing_space() -> ParameterSpace {
    ParameterSpace::grid()
        .responder_counts(vec![40, 80, 160, 320])
        .operator_counts(vec![2, 4, 8])
        .seeds(vec![7, 11, 13])
}

/// Demand sweep: incident volume against caller patience and report range.
pub fn demand_space() -> ParameterSpace {
    ParameterSpace::grid()
        .base_incident_volumes(vec![75, 150, 300, 600])
        .hangup_thresholds_secs(vec![120, 300, 600])
        .report_ranges_km(vec![2.0, 4.0, 8.0])
        .seeds(vec![7, 11])
}
