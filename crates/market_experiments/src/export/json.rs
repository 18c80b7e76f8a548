use crate::runner::RunSummary;

pub(crate) fn export_to_json_impl(
    summaries: &[RunSummary],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    serde_json::to_writer_pretty(file, summaries)?;
    Ok(())
}
