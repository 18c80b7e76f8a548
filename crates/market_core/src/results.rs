//! Per-search outcome records.
//!
//! An `Offer` is the base fact about one cleaner seen by one search; a `Bid`
//! widens it with an optional amount and time; a `Connection` widens a bid
//! with an optional connection time. The stages compose by value: each
//! record owns the previous stage.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::SimulationError;
use crate::geo::GeoPoint;

/// A candidate cleaner found within search radius of a sampled location.
///
/// Offers are recorded for inactive cleaners too, so downstream metrics can
/// distinguish "no cleaner nearby" from "cleaner nearby but inactive".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Offer {
    pub contractor_id: String,
    pub distance_km: f64,
    pub cleaner_score: f64,
    pub active: bool,
    pub team_size: u32,
    pub active_connections: u32,
}

impl Offer {
    pub fn new(
        contractor_id: impl Into<String>,
        distance_km: f64,
        cleaner_score: f64,
        active: bool,
        team_size: u32,
        active_connections: u32,
    ) -> Result<Self, SimulationError> {
        if distance_km < 0.0 {
            return Err(SimulationError::NegativeDistance(distance_km));
        }
        if !(0.0..=1.0).contains(&cleaner_score) {
            return Err(SimulationError::InvalidScore(cleaner_score));
        }
        if team_size == 0 {
            return Err(SimulationError::ZeroTeamSize);
        }
        Ok(Self {
            contractor_id: contractor_id.into(),
            distance_km,
            cleaner_score,
            active,
            team_size,
            active_connections,
        })
    }
}

/// An offer the cleaner decided to respond to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bid {
    pub offer: Offer,
    pub bid_amount: Option<f64>,
    pub bid_time: Option<f64>,
}

impl Bid {
    pub fn from_offer(offer: Offer) -> Self {
        Self {
            offer,
            bid_amount: None,
            bid_time: None,
        }
    }

    pub fn new(
        offer: Offer,
        bid_amount: Option<f64>,
        bid_time: Option<f64>,
    ) -> Result<Self, SimulationError> {
        if let Some(amount) = bid_amount {
            if amount <= 0.0 {
                return Err(SimulationError::NonPositiveBidAmount(amount));
            }
        }
        if let Some(time) = bid_time {
            if time < 0.0 {
                return Err(SimulationError::NegativeBidTime(time));
            }
        }
        Ok(Self {
            offer,
            bid_amount,
            bid_time,
        })
    }

    pub fn contractor_id(&self) -> &str {
        &self.offer.contractor_id
    }

    pub fn distance_km(&self) -> f64 {
        self.offer.distance_km
    }

    pub fn cleaner_score(&self) -> f64 {
        self.offer.cleaner_score
    }
}

/// The single bid (if any) that converted to a hire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Connection {
    pub bid: Bid,
    pub connection_time: Option<f64>,
}

impl Connection {
    pub fn from_bid(bid: Bid) -> Self {
        Self {
            bid,
            connection_time: None,
        }
    }

    /// A connection time requires a bid time and may not precede it.
    pub fn new(bid: Bid, connection_time: Option<f64>) -> Result<Self, SimulationError> {
        if let Some(connection_time) = connection_time {
            let bid_time = bid
                .bid_time
                .ok_or(SimulationError::ConnectionWithoutBidTime)?;
            if connection_time < bid_time {
                return Err(SimulationError::ConnectionBeforeBid {
                    bid_time,
                    connection_time,
                });
            }
        }
        Ok(Self {
            bid,
            connection_time,
        })
    }

    pub fn contractor_id(&self) -> &str {
        self.bid.contractor_id()
    }

    pub fn distance_km(&self) -> f64 {
        self.bid.distance_km()
    }

    pub fn cleaner_score(&self) -> f64 {
        self.bid.cleaner_score()
    }
}

/// Everything one simulated search produced, consumed read-only by metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub search_id: String,
    pub location: GeoPoint,
    pub postal_code: Option<String>,
    pub offers: Vec<Offer>,
    pub bids: Vec<Bid>,
    /// At most one connection per search.
    pub connections: Vec<Connection>,
}

impl SearchResult {
    pub fn new(
        search_id: impl Into<String>,
        location: GeoPoint,
        postal_code: Option<String>,
    ) -> Self {
        Self {
            search_id: search_id.into(),
            location,
            postal_code,
            offers: Vec::new(),
            bids: Vec::new(),
            connections: Vec::new(),
        }
    }

    pub fn num_offers(&self) -> usize {
        self.offers.len()
    }

    pub fn num_bids(&self) -> usize {
        self.bids.len()
    }

    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }

    pub fn unique_cleaners(&self) -> BTreeSet<&str> {
        self.offers
            .iter()
            .map(|offer| offer.contractor_id.as_str())
            .collect()
    }

    pub fn unique_active_cleaners(&self) -> BTreeSet<&str> {
        self.offers
            .iter()
            .filter(|offer| offer.active)
            .map(|offer| offer.contractor_id.as_str())
            .collect()
    }

    /// Bids per offer, when any offers exist.
    pub fn bid_rate(&self) -> Option<f64> {
        if self.offers.is_empty() {
            return None;
        }
        Some(self.bids.len() as f64 / self.offers.len() as f64)
    }

    /// Connections per bid, when any bids exist.
    pub fn acceptance_rate(&self) -> Option<f64> {
        if self.bids.is_empty() {
            return None;
        }
        Some(self.connections.len() as f64 / self.bids.len() as f64)
    }
}
