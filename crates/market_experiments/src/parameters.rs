//! Parameter variation framework for simulation sweeps.
//!
//! A [`ParameterSpace`] holds the values to explore per dimension; empty
//! dimensions fall back to the base config's value. `generate()` expands the
//! grid into one [`ParameterSet`] per combination, each carrying its own
//! seed so runs stay independently reproducible; `sample()` draws a random
//! subset of the grid for spaces too large to sweep exhaustively.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use market_core::config::SimulationConfig;

/// One runnable parameter combination.
#[derive(Debug, Clone, Serialize)]
pub struct ParameterSet {
    pub experiment_id: String,
    pub run_id: usize,
    pub seed: u64,
    pub config: SimulationConfig,
}

/// Grid of parameter variations to explore.
#[derive(Debug, Clone)]
pub struct ParameterSpace {
    experiment_id: String,
    base: SimulationConfig,
    bid_probabilities: Vec<f64>,
    connection_probabilities: Vec<f64>,
    decay_factors: Vec<f64>,
    search_radii_km: Vec<f64>,
    search_iterations: Vec<usize>,
    seeds: Vec<u64>,
}

impl ParameterSpace {
    pub fn grid() -> Self {
        Self {
            experiment_id: "experiment".to_string(),
            base: SimulationConfig::default(),
            bid_probabilities: Vec::new(),
            connection_probabilities: Vec::new(),
            decay_factors: Vec::new(),
            search_radii_km: Vec::new(),
            search_iterations: Vec::new(),
            seeds: Vec::new(),
        }
    }

    pub fn with_experiment_id(mut self, experiment_id: impl Into<String>) -> Self {
        self.experiment_id = experiment_id.into();
        self
    }

    pub fn with_base(mut self, base: SimulationConfig) -> Self {
        self.base = base;
        self
    }

    pub fn bid_probabilities(mut self, values: Vec<f64>) -> Self {
        self.bid_probabilities = values;
        self
    }

    pub fn connection_probabilities(mut self, values: Vec<f64>) -> Self {
        self.connection_probabilities = values;
        self
    }

    pub fn decay_factors(mut self, values: Vec<f64>) -> Self {
        self.decay_factors = values;
        self
    }

    pub fn search_radii_km(mut self, values: Vec<f64>) -> Self {
        self.search_radii_km = values;
        self
    }

    pub fn search_iterations(mut self, values: Vec<usize>) -> Self {
        self.search_iterations = values;
        self
    }

    pub fn seeds(mut self, values: Vec<u64>) -> Self {
        self.seeds = values;
        self
    }

    /// Expand the grid into all combinations (Cartesian product).
    pub fn generate(&self) -> Vec<ParameterSet> {
        let bids = non_empty_or(&self.bid_probabilities, self.base.cleaner_base_bid_probability);
        let connections = non_empty_or(
            &self.connection_probabilities,
            self.base.connection_base_probability,
        );
        let decays = non_empty_or(&self.decay_factors, self.base.distance_decay_factor);
        let radii = non_empty_or(&self.search_radii_km, self.base.search_radius_km);
        let iterations = non_empty_or(&self.search_iterations, self.base.search_iterations);
        let seeds = non_empty_or(&self.seeds, self.base.random_seed.unwrap_or(0));

        let mut sets = Vec::new();
        let mut run_id = 0;
        for &seed in &seeds {
            for &bid in &bids {
                for &connection in &connections {
                    for &decay in &decays {
                        for &radius in &radii {
                            for &iters in &iterations {
                                let config = self
                                    .base
                                    .clone()
                                    .with_base_probabilities(bid, connection)
                                    .with_distance_decay_factor(decay)
                                    .with_search_radius_km(radius)
                                    .with_search_iterations(iters)
                                    .with_seed(seed);
                                sets.push(ParameterSet {
                                    experiment_id: self.experiment_id.clone(),
                                    run_id,
                                    seed,
                                    config,
                                });
                                run_id += 1;
                            }
                        }
                    }
                }
            }
        }
        sets
    }

    /// Draw `count` random combinations from the grid instead of expanding
    /// it fully. Run ids are renumbered 0..count; the draw itself is seeded
    /// so a sampled sweep is as reproducible as a full one.
    pub fn sample(&self, count: usize, sampling_seed: u64) -> Vec<ParameterSet> {
        let full_grid = self.generate();
        if full_grid.len() <= count {
            return full_grid;
        }
        let mut rng = StdRng::seed_from_u64(sampling_seed);
        let mut sets = Vec::with_capacity(count);
        for run_id in 0..count {
            let picked = &full_grid[rng.gen_range(0..full_grid.len())];
            sets.push(ParameterSet {
                run_id,
                ..picked.clone()
            });
        }
        sets
    }
}

fn non_empty_or<T: Copy>(values: &[T], default: T) -> Vec<T> {
    if values.is_empty() {
        vec![default]
    } else {
        values.to_vec()
    }
}
