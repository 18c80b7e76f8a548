use crate::parameters::ParameterSet;
use crate::runner::RunSummary;

/// Fixed metric columns so every exported file has a stable header; runs
/// missing a key (e.g. no bids anywhere) export 0.0.
const METRIC_COLUMNS: &[&str] = &[
    "connection_rate",
    "avg_bids_per_search",
    "med_bids_per_search",
    "pct_searches_with_bids",
    "avg_offer_distance",
    "med_offer_distance",
    "p90_offer_distance",
    "avg_bid_distance",
    "med_bid_distance",
    "p90_bid_distance",
    "avg_connection_distance",
    "med_connection_distance",
    "p90_connection_distance",
    "avg_offer_score",
    "med_offer_score",
    "avg_bid_score",
    "med_bid_score",
    "avg_connection_score",
    "med_connection_score",
    "search_density",
    "connection_density",
    "coverage_ratio",
    "active_coverage_ratio",
];

pub(crate) fn export_to_csv_impl(
    summaries: &[RunSummary],
    parameter_sets: &[ParameterSet],
    file: std::fs::File,
) -> Result<(), Box<dyn std::error::Error>> {
    if summaries.len() != parameter_sets.len() {
        return Err(format!(
            "Summaries length ({}) doesn't match parameter_sets length ({})",
            summaries.len(),
            parameter_sets.len()
        )
        .into());
    }

    let mut wtr = csv::Writer::from_writer(file);

    let mut header = vec![
        "experiment_id".to_string(),
        "run_id".to_string(),
        "seed".to_string(),
        "search_iterations".to_string(),
        "search_radius_km".to_string(),
        "cleaner_base_bid_probability".to_string(),
        "connection_base_probability".to_string(),
        "distance_decay_factor".to_string(),
        "min_capacity_factor".to_string(),
        "search_count".to_string(),
        "connection_count".to_string(),
    ];
    header.extend(METRIC_COLUMNS.iter().map(|column| column.to_string()));
    wtr.write_record(&header)?;

    for (summary, param_set) in summaries.iter().zip(parameter_sets.iter()) {
        let config = &param_set.config;
        let mut record = vec![
            param_set.experiment_id.clone(),
            param_set.run_id.to_string(),
            param_set.seed.to_string(),
            config.search_iterations.to_string(),
            config.search_radius_km.to_string(),
            config.cleaner_base_bid_probability.to_string(),
            config.connection_base_probability.to_string(),
            config.distance_decay_factor.to_string(),
            config.min_capacity_factor.to_string(),
            summary.search_count.to_string(),
            summary.connection_count.to_string(),
        ];
        record.extend(METRIC_COLUMNS.iter().map(|column| {
            summary
                .metrics
                .get(*column)
                .copied()
                .unwrap_or(0.0)
                .to_string()
        }));
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
