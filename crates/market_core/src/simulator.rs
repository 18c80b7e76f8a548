//! The per-search simulation pipeline.
//!
//! Each search runs sample → offer → bid → connect against a read-only
//! market. The simulator owns its random stream; when a seed is configured
//! the stream is reseeded once at the start of every run, so consecutive
//! identically-configured runs over the same market reproduce field by
//! field.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cleaner::Cleaner;
use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::geo::GeoPoint;
use crate::market::Market;
use crate::results::{Bid, Connection, Offer, SearchResult};

pub struct Simulator<'a> {
    market: &'a Market,
    config: SimulationConfig,
    rng: StdRng,
    search_sequence: u64,
}

impl<'a> Simulator<'a> {
    /// Validates the config before anything runs.
    pub fn new(market: &'a Market, config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        let rng = match config.random_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            market,
            config,
            rng,
            search_sequence: 0,
        })
    }

    pub fn market(&self) -> &Market {
        self.market
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Execute `iterations` independent searches (default: the configured
    /// count) and return the ordered results.
    pub fn run(&mut self, iterations: Option<usize>) -> Result<Vec<SearchResult>, SimulationError> {
        let count = iterations.unwrap_or(self.config.search_iterations);
        if let Some(seed) = self.config.random_seed {
            self.rng = StdRng::seed_from_u64(seed);
            self.search_sequence = 0;
        }
        let mut results = Vec::with_capacity(count);
        for _ in 0..count {
            results.push(self.simulate_search()?);
        }
        Ok(results)
    }

    /// Simulate one search interaction in the market.
    pub fn simulate_search(&mut self) -> Result<SearchResult, SimulationError> {
        let (location, postal_code) = self.market.sample_search_location(&mut self.rng)?;
        self.search_sequence += 1;
        let search_id = format!("search-{:06}", self.search_sequence);
        let mut result = SearchResult::new(search_id, location, postal_code);

        let candidates = self
            .market
            .cleaners_in_range(&location, self.config.search_radius_km)?;
        result.offers = generate_offers(&candidates, &location)?;
        result.bids = self.simulate_bids(&candidates, &result.offers);
        if !result.bids.is_empty() {
            result.connections = self.simulate_connection(&result.bids);
        }
        Ok(result)
    }

    /// One uniform draw per bid-active offer, promoted when the draw falls
    /// below the cleaner's bid probability. Inactive cleaners never bid and
    /// consume no draws.
    fn simulate_bids(&mut self, cleaners: &[&Cleaner], offers: &[Offer]) -> Vec<Bid> {
        let mut bids = Vec::new();
        for (cleaner, offer) in cleaners.iter().zip(offers) {
            if !offer.active {
                continue;
            }
            let probability = cleaner.bid_probability(
                offer.distance_km,
                self.config.distance_decay_factor,
                self.config.cleaner_base_bid_probability,
                self.config.min_capacity_factor,
            );
            if self.rng.gen::<f64>() < probability {
                bids.push(Bid::from_offer(offer.clone()));
            }
        }
        bids
    }

    /// Walk the bids best-score-first (stable sort, so equal scores keep
    /// insertion order); the first successful draw becomes the sole
    /// connection.
    fn simulate_connection(&mut self, bids: &[Bid]) -> Vec<Connection> {
        let mut sorted: Vec<&Bid> = bids.iter().collect();
        sorted.sort_by(|a, b| {
            b.offer
                .cleaner_score
                .partial_cmp(&a.offer.cleaner_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        for bid in sorted {
            let probability = (self.config.connection_base_probability
                * bid.offer.cleaner_score
                * (-self.config.distance_decay_factor * bid.offer.distance_km).exp())
            .clamp(0.0, 1.0);
            if self.rng.gen::<f64>() < probability {
                return vec![Connection::from_bid(bid.clone())];
            }
        }
        Vec::new()
    }
}

/// One offer per candidate, inactive cleaners included so metrics can see
/// "nearby but inactive" supply.
fn generate_offers(
    cleaners: &[&Cleaner],
    location: &GeoPoint,
) -> Result<Vec<Offer>, SimulationError> {
    cleaners
        .iter()
        .map(|cleaner| {
            Offer::new(
                cleaner.contractor_id.clone(),
                cleaner.distance_km_to(location),
                cleaner.cleaner_score,
                cleaner.bidding_active,
                cleaner.team_size,
                cleaner.active_connections,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{single_code_market, test_point};

    fn seeded_config() -> SimulationConfig {
        SimulationConfig::default()
            .with_seed(42)
            .with_search_iterations(20)
    }

    #[test]
    fn run_produces_requested_number_of_results() {
        let market = single_code_market();
        let mut simulator = Simulator::new(&market, seeded_config()).expect("simulator");
        assert_eq!(simulator.run(None).expect("run").len(), 20);
        assert_eq!(simulator.run(Some(7)).expect("run").len(), 7);
    }

    #[test]
    fn search_ids_are_sequential_per_run() {
        let market = single_code_market();
        let mut simulator = Simulator::new(&market, seeded_config()).expect("simulator");
        let results = simulator.run(Some(3)).expect("run");
        let ids: Vec<&str> = results.iter().map(|r| r.search_id.as_str()).collect();
        assert_eq!(ids, ["search-000001", "search-000002", "search-000003"]);
    }

    #[test]
    fn inactive_cleaners_receive_offers_but_never_bid() {
        let mut market = single_code_market();
        let idle = Cleaner::new("c-idle", test_point())
            .with_postal_code("10001")
            .with_bidding_active(false);
        market.add_cleaner(idle).expect("add cleaner");

        let mut simulator = Simulator::new(&market, seeded_config()).expect("simulator");
        let results = simulator.run(Some(50)).expect("run");
        let mut saw_idle_offer = false;
        for result in &results {
            for offer in &result.offers {
                if offer.contractor_id == "c-idle" {
                    assert!(!offer.active);
                    saw_idle_offer = true;
                }
            }
            assert!(result.bids.iter().all(|b| b.contractor_id() != "c-idle"));
        }
        assert!(saw_idle_offer);
    }

    #[test]
    fn invalid_config_fails_before_running() {
        let market = single_code_market();
        let config = SimulationConfig::default().with_search_radius_km(-1.0);
        assert!(Simulator::new(&market, config).is_err());
    }

    #[test]
    fn at_most_one_connection_and_it_comes_from_the_bids() {
        let market = single_code_market();
        let config = seeded_config().with_base_probabilities(0.9, 0.9);
        let mut simulator = Simulator::new(&market, config).expect("simulator");
        let results = simulator.run(Some(100)).expect("run");
        for result in &results {
            assert!(result.num_connections() <= 1);
            if let Some(connection) = result.connections.first() {
                assert!(result
                    .bids
                    .iter()
                    .any(|bid| bid.contractor_id() == connection.contractor_id()));
            }
        }
    }
}
