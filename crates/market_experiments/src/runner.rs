//! Simulation execution: single runs, supply sweeps, and rayon-parallel
//! experiments.
//!
//! The core simulator is single-threaded over one owned random stream;
//! parallelism lives here, where every run gets its own seed (base seed plus
//! run index) and therefore its own independent sub-stream.

use std::collections::BTreeMap;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use market_core::config::SimulationConfig;
use market_core::market::Market;
use market_core::metrics::MarketMetrics;
use market_core::simulator::Simulator;

use crate::parameters::ParameterSet;

/// Aggregated outcome of one simulation run.
#[derive(Debug, Clone, serde::Serialize)]
pub struct RunSummary {
    pub experiment_id: String,
    pub run_id: usize,
    pub seed: u64,
    pub search_count: usize,
    pub connection_count: usize,
    /// The flat metric vocabulary from `MarketMetrics::calculate_metrics`.
    pub metrics: BTreeMap<String, f64>,
}

/// Run one parameter set against a market and fold the results into a
/// summary.
pub fn run_single_simulation(
    market: &Market,
    param_set: &ParameterSet,
) -> Result<RunSummary, String> {
    let config = param_set.config.clone().with_seed(param_set.seed);
    let mut simulator = Simulator::new(market, config)
        .map_err(|error| format!("run {}: {error}", param_set.run_id))?;
    let results = simulator
        .run(None)
        .map_err(|error| format!("run {}: {error}", param_set.run_id))?;

    let mut metrics = MarketMetrics::new();
    metrics.add_results(&results);
    Ok(RunSummary {
        experiment_id: param_set.experiment_id.clone(),
        run_id: param_set.run_id,
        seed: param_set.seed,
        search_count: metrics.search_count(),
        connection_count: metrics.connection_count(),
        metrics: metrics.calculate_metrics(market),
    })
}

/// Run the configured number of supply-configuration iterations
/// sequentially, deriving an independent seed for each run from the base
/// seed and the run index.
pub fn run_supply_sweep(
    market: &Market,
    config: &SimulationConfig,
) -> Result<Vec<RunSummary>, String> {
    config.validate().map_err(|error| error.to_string())?;
    let base_seed = config.random_seed.unwrap_or(0);
    (0..config.supply_configuration_iterations)
        .map(|run_id| {
            let param_set = ParameterSet {
                experiment_id: "supply-sweep".to_string(),
                run_id,
                seed: base_seed.wrapping_add(run_id as u64),
                config: config.clone(),
            };
            run_single_simulation(market, &param_set)
        })
        .collect()
}

/// Run parameter sets in parallel across available CPU cores.
///
/// Summaries come back in the same order as the input sets.
pub fn run_parallel_experiments(
    market: &Market,
    parameter_sets: &[ParameterSet],
    num_threads: Option<usize>,
) -> Result<Vec<RunSummary>, String> {
    run_parallel_experiments_with_progress(market, parameter_sets, num_threads, true)
}

/// Same as [`run_parallel_experiments`], with an optional progress bar.
pub fn run_parallel_experiments_with_progress(
    market: &Market,
    parameter_sets: &[ParameterSet],
    num_threads: Option<usize>,
    show_progress: bool,
) -> Result<Vec<RunSummary>, String> {
    let total = parameter_sets.len();
    let progress = if show_progress && total > 0 {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .map_err(|error| format!("progress template: {error}"))?
                .progress_chars("#>-"),
        );
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|error| format!("thread pool: {error}"))?;

    let progress_ref = progress.as_ref();
    let summaries = pool.install(|| {
        parameter_sets
            .par_iter()
            .map(|param_set| {
                let summary = run_single_simulation(market, param_set);
                if let Some(bar) = progress_ref {
                    bar.inc(1);
                }
                summary
            })
            .collect::<Result<Vec<_>, _>>()
    })?;

    if let Some(bar) = progress {
        bar.finish_with_message("Completed");
    }

    Ok(summaries)
}
