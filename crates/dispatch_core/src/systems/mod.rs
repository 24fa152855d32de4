pub mod call_dispatch;
pub mod completion;
pub mod generation;
pub mod hangup;
pub mod report_dispatch;
pub mod self_completion;
pub mod snapshot;

pub use call_dispatch::call_dispatch_system;
pub use completion::{complete_call_system, complete_report_system};
pub use generation::emergency_generation_system;
pub use hangup::hangup_system;
pub use report_dispatch::report_dispatch_system;
pub use self_completion::self_completion_system;
pub use snapshot::capture_snapshot_system;

#[cfg(test)]
mod end_to_end_tests {
    use bevy_ecs::prelude::World;

    use crate::entities::{Coordinates, EmergencyStatus};
    use crate::pipeline::{CallPipeline, PipelineKind, ReportPipeline};
    use crate::runner::{run_trial, simulation_schedule};
    use crate::scenario::{build_simulation, SimulationParams};
    use crate::telemetry::TrialResults;
    use crate::trial::{self, TrialPhase, TrialState};

    #[test]
    fn resolves_one_injected_incident_through_both_pipelines() {
        // No stochastic generation; one incident injected by hand. The wide
        // report range guarantees some responder can claim it, and the zeroed
        // self-completion probability keeps the call on the operator path.
        let params = SimulationParams::default()
            .with_seed(7)
            .with_horizon_hours(1)
            .with_incident_volume(0, 0, 0)
            .with_staffing(60, 2)
            .with_report_max_range_km(100.0)
            .with_self_completion(60, 0.8, 0.0);
        let mut world = World::new();
        build_simulation(&mut world, params).expect("valid params");
        let mut schedule = simulation_schedule();

        trial::start_trial(&mut world).expect("start");
        let (call_id, report_id) =
            trial::report_incident(&mut world, Coordinates::new(42.68, 23.32)).expect("inject");

        run_trial(&mut world, &mut schedule);
        assert_eq!(world.resource::<TrialState>().phase(), TrialPhase::Finished);

        let call = world.resource::<CallPipeline>();
        let emergency = call.emergency(call_id).expect("call record");
        assert_eq!(emergency.status, EmergencyStatus::Completed);
        assert_eq!(call.stats.completed, 1);
        assert_eq!(call.stats.canceled, 0);
        assert_eq!(call.stats.self_completed, 0);

        let report = world.resource::<ReportPipeline>();
        let emergency = report.emergency(report_id).expect("report record");
        assert_eq!(emergency.status, EmergencyStatus::Completed);
        assert!(emergency.assigned_responder.is_some());
        assert_eq!(report.stats.completed, 1);
        assert_eq!(report.stats.self_completed, 1);

        let results = world.resource::<TrialResults>();
        assert_eq!(results.rows.len(), 2);
        let call_row = results
            .rows
            .iter()
            .find(|r| r.pipeline == PipelineKind::Call)
            .expect("call row");
        // Resolution includes the drawn service duration, at least 120s.
        assert!(call_row.avg_resolution_secs >= 120.0);
    }

    #[test]
    fn unserved_call_hangs_up_while_unreachable_report_stays_pending() {
        // Zero operators starve the call queue; a certain hangup roll cancels
        // the call once it ages past the threshold. Zero report range leaves
        // the report unclaimed for the whole trial.
        let params = SimulationParams::default()
            .with_seed(11)
            .with_horizon_hours(1)
            .with_incident_volume(0, 0, 0)
            .with_staffing(40, 0)
            .with_report_max_range_km(0.0)
            .with_hangup(10, 1.0)
            .with_self_completion(60, 0.8, 0.0);
        let mut world = World::new();
        build_simulation(&mut world, params).expect("valid params");
        let mut schedule = simulation_schedule();

        trial::start_trial(&mut world).expect("start");
        let (call_id, report_id) =
            trial::report_incident(&mut world, Coordinates::new(42.70, 23.30)).expect("inject");

        run_trial(&mut world, &mut schedule);

        let call = world.resource::<CallPipeline>();
        assert_eq!(
            call.emergency(call_id).map(|e| e.status),
            Some(EmergencyStatus::Canceled)
        );
        assert_eq!(call.stats.canceled, 1);
        assert_eq!(call.stats.completed, 0);
        assert!(call.queue.is_empty());

        let report = world.resource::<ReportPipeline>();
        assert_eq!(
            report.emergency(report_id).map(|e| e.status),
            Some(EmergencyStatus::Pending)
        );
        assert_eq!(report.stats.completed, 0);
        assert_eq!(report.stats.canceled, 0);
    }
}
