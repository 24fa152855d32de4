use crate::metrics::ExperimentOutcome;

pub(crate) fn export_to_json_impl(
    outcomes: &[ExperimentOutcome],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(file, outcomes)?;
    Ok(())
}
