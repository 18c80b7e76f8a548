//! Result export utilities.
//!
//! Runs are persisted as flat tables: CSV with one row per run (parameters
//! plus the metric vocabulary) or pretty-printed JSON.

use std::fs::File;
use std::path::Path;

use crate::parameters::ParameterSet;
use crate::runner::RunSummary;

mod csv;
mod json;

/// Export run summaries with their parameters to CSV.
///
/// Summaries and parameter sets are paired by index; mismatched lengths are
/// an error.
pub fn export_to_csv(
    summaries: &[RunSummary],
    parameter_sets: &[ParameterSet],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_not_empty(summaries)?;
    let file = create_output_file(path)?;
    csv::export_to_csv_impl(summaries, parameter_sets, file)
}

/// Export run summaries to pretty-printed JSON.
pub fn export_to_json(
    summaries: &[RunSummary],
    path: impl AsRef<Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    ensure_not_empty(summaries)?;
    let file = create_output_file(path)?;
    json::export_to_json_impl(summaries, file)
}

fn create_output_file(path: impl AsRef<Path>) -> Result<File, Box<dyn std::error::Error>> {
    Ok(File::create(path)?)
}

fn ensure_not_empty(summaries: &[RunSummary]) -> Result<(), Box<dyn std::error::Error>> {
    if summaries.is_empty() {
        return Err("no results to export".into());
    }
    Ok(())
}
