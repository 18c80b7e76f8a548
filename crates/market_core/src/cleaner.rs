//! Supplier entities and their bid-probability model.

use serde::Serialize;

use crate::error::SimulationError;
use crate::geo::GeoPoint;

/// Connections one team member can sustain at a time.
pub const CONNECTIONS_PER_TEAM_MEMBER: u32 = 10;

/// A cleaner registered in a market.
///
/// `bidding_active` gates participation in new searches; `assignment_active`
/// is informational for this engine. Fields are fixed for the duration of a
/// simulation run; `active_connections` and the flags are updated externally
/// between runs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cleaner {
    pub contractor_id: String,
    pub location: GeoPoint,
    pub postal_code: Option<String>,
    pub bidding_active: bool,
    pub assignment_active: bool,
    pub cleaner_score: f64,
    pub service_radius_km: f64,
    pub team_size: u32,
    pub active_connections: u32,
}

impl Cleaner {
    pub fn new(contractor_id: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            contractor_id: contractor_id.into(),
            location,
            postal_code: None,
            bidding_active: true,
            assignment_active: true,
            cleaner_score: 0.5,
            service_radius_km: 10.0,
            team_size: 1,
            active_connections: 0,
        }
    }

    pub fn with_postal_code(mut self, code: impl Into<String>) -> Self {
        self.postal_code = Some(code.into());
        self
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.cleaner_score = score;
        self
    }

    pub fn with_service_radius_km(mut self, radius_km: f64) -> Self {
        self.service_radius_km = radius_km;
        self
    }

    pub fn with_team_size(mut self, team_size: u32) -> Self {
        self.team_size = team_size;
        self
    }

    pub fn with_active_connections(mut self, active_connections: u32) -> Self {
        self.active_connections = active_connections;
        self
    }

    pub fn with_bidding_active(mut self, active: bool) -> Self {
        self.bidding_active = active;
        self
    }

    pub fn with_assignment_active(mut self, active: bool) -> Self {
        self.assignment_active = active;
        self
    }

    /// Check field invariants. `Market::add_cleaner` calls this before
    /// registering, so invalid cleaners never enter a simulation.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(0.0..=1.0).contains(&self.cleaner_score) {
            return Err(SimulationError::InvalidScore(self.cleaner_score));
        }
        if self.service_radius_km <= 0.0 {
            return Err(SimulationError::NonPositiveRadius(self.service_radius_km));
        }
        if self.team_size == 0 {
            return Err(SimulationError::ZeroTeamSize);
        }
        Ok(())
    }

    pub fn distance_km_to(&self, point: &GeoPoint) -> f64 {
        self.location.distance_km(point)
    }

    pub fn is_in_range(&self, point: &GeoPoint) -> bool {
        self.distance_km_to(point) <= self.service_radius_km
    }

    pub fn max_connections(&self) -> u32 {
        self.team_size * CONNECTIONS_PER_TEAM_MEMBER
    }

    /// Remaining-capacity multiplier in `[min_capacity_factor, 1]`.
    pub fn capacity_factor(&self, min_capacity_factor: f64) -> f64 {
        let load = f64::from(self.active_connections) / f64::from(self.max_connections());
        (1.0 - load).max(min_capacity_factor)
    }

    /// Probability that this cleaner bids on an offer at `distance_km`.
    ///
    /// Base probability, quality, capacity, and exponential distance decay
    /// combine multiplicatively, clamped to [0, 1]. Returns exactly 0 when
    /// `bidding_active` is false.
    pub fn bid_probability(
        &self,
        distance_km: f64,
        distance_decay_factor: f64,
        base_probability: f64,
        min_capacity_factor: f64,
    ) -> f64 {
        if !self.bidding_active {
            return 0.0;
        }
        let quality_factor = self.cleaner_score;
        let capacity_factor = self.capacity_factor(min_capacity_factor);
        let distance_factor = (-distance_decay_factor * distance_km).exp();
        (base_probability * quality_factor * capacity_factor * distance_factor).clamp(0.0, 1.0)
    }
}
