//! Scenario setup: simulation parameters and world construction.

mod build;
mod params;

pub use build::build_simulation;
pub use params::{
    HangupConfig, ProcessingRange, RegionBounds, SelfCompletionConfig, SimulationParams,
    SpeedMultiplier,
};
