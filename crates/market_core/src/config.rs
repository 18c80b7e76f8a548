//! Simulation run parameters.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Immutable parameter bundle for a simulation run.
///
/// All ranges are checked by [`SimulationConfig::validate`], which the
/// simulator calls before any search executes, so a bad value fails fast
/// instead of surfacing mid-run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of searches per run.
    pub search_iterations: usize,
    /// Number of independent supply-configuration runs in a sweep.
    pub supply_configuration_iterations: usize,
    /// Seed for the run's random stream. When set, identically-configured
    /// runs over the same market reproduce field-by-field.
    pub random_seed: Option<u64>,
    /// Radius around the sampled search point within which cleaners receive
    /// offers.
    pub search_radius_km: f64,
    /// Base probability that a cleaner bids, before quality, capacity, and
    /// distance adjustments.
    pub cleaner_base_bid_probability: f64,
    /// Base probability that a bid converts to a connection.
    pub connection_base_probability: f64,
    /// Exponential decay applied per kilometer of distance.
    pub distance_decay_factor: f64,
    /// Floor for the capacity factor of a nearly saturated cleaner.
    pub min_capacity_factor: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            search_iterations: 10,
            supply_configuration_iterations: 10,
            random_seed: None,
            search_radius_km: 10.0,
            cleaner_base_bid_probability: 0.14,
            connection_base_probability: 0.4,
            distance_decay_factor: 0.2,
            min_capacity_factor: 0.1,
        }
    }
}

impl SimulationConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_search_iterations(mut self, iterations: usize) -> Self {
        self.search_iterations = iterations;
        self
    }

    pub fn with_supply_configuration_iterations(mut self, iterations: usize) -> Self {
        self.supply_configuration_iterations = iterations;
        self
    }

    pub fn with_search_radius_km(mut self, radius_km: f64) -> Self {
        self.search_radius_km = radius_km;
        self
    }

    pub fn with_base_probabilities(mut self, bid: f64, connection: f64) -> Self {
        self.cleaner_base_bid_probability = bid;
        self.connection_base_probability = connection;
        self
    }

    pub fn with_distance_decay_factor(mut self, factor: f64) -> Self {
        self.distance_decay_factor = factor;
        self
    }

    pub fn with_min_capacity_factor(mut self, floor: f64) -> Self {
        self.min_capacity_factor = floor;
        self
    }

    /// Check all numeric ranges.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if self.search_iterations == 0 {
            return Err(SimulationError::InvalidConfig(
                "search_iterations must be positive".to_string(),
            ));
        }
        if self.supply_configuration_iterations == 0 {
            return Err(SimulationError::InvalidConfig(
                "supply_configuration_iterations must be positive".to_string(),
            ));
        }
        if self.search_radius_km <= 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "search_radius_km {} must be positive",
                self.search_radius_km
            )));
        }
        if !(0.0..=1.0).contains(&self.cleaner_base_bid_probability) {
            return Err(SimulationError::InvalidConfig(format!(
                "cleaner_base_bid_probability {} outside [0, 1]",
                self.cleaner_base_bid_probability
            )));
        }
        if !(0.0..=1.0).contains(&self.connection_base_probability) {
            return Err(SimulationError::InvalidConfig(format!(
                "connection_base_probability {} outside [0, 1]",
                self.connection_base_probability
            )));
        }
        if self.distance_decay_factor < 0.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "distance_decay_factor {} must be non-negative",
                self.distance_decay_factor
            )));
        }
        if self.min_capacity_factor <= 0.0 || self.min_capacity_factor > 1.0 {
            return Err(SimulationError::InvalidConfig(format!(
                "min_capacity_factor {} outside (0, 1]",
                self.min_capacity_factor
            )));
        }
        Ok(())
    }

    /// Total trials across a full supply sweep.
    pub fn total_iterations(&self) -> usize {
        self.search_iterations * self.supply_configuration_iterations
    }
}
