pub mod clock;
pub mod entities;
pub mod pipeline;
pub mod runner;
pub mod scenario;
pub mod spatial;
pub mod spawner;
pub mod systems;
pub mod telemetry;
pub mod trial;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
