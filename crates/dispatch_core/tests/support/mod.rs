pub mod schedule;
pub mod world;

pub use schedule::ScheduleRunner;
pub use world::{inject, place_call_responders, place_report_responders, TestWorldBuilder};
