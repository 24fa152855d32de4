use crate::export::FlatRow;

pub(crate) fn export_to_csv_impl(
    rows: &[FlatRow<'_>],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut wtr = csv::Writer::from_writer(file);

    wtr.write_record([
        "experiment_id",
        "run_id",
        "seed",
        "trials",
        "responders",
        "operators",
        "base_incidents",
        "hangup_threshold_secs",
        "report_range_km",
        "trial",
        "pipeline",
        "completed",
        "canceled",
        "self_completed",
        "avg_resolution_secs",
        "avg_processing_secs",
        "total_resolution_secs",
    ])?;

    for row in rows {
        wtr.write_record([
            row.experiment_id,
            &row.run_id.to_string(),
            &row.seed.to_string(),
            &row.trials.to_string(),
            &row.responders.to_string(),
            &row.operators.to_string(),
            &row.base_incidents.to_string(),
            &row.hangup_threshold_secs.to_string(),
            &row.report_range_km.to_string(),
            &row.trial.to_string(),
            row.pipeline,
            &row.completed.to_string(),
            &row.canceled.to_string(),
            &row.self_completed.to_string(),
            &row.avg_resolution_secs.to_string(),
            &row.avg_processing_secs.to_string(),
            &row.total_resolution_secs.to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
