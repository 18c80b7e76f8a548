//! Aggregation of search results into market-level summary statistics.
//!
//! Results are folded in one at a time; `calculate_metrics` then derives the
//! flat name → value vocabulary downstream consumers key off of literally:
//! `connection_rate`, `avg_bids_per_search`, `coverage_ratio`,
//! `search_density`, and the per-stage distance/score summaries.

use std::collections::BTreeMap;
use std::f64::consts::PI;

use serde::Serialize;

use crate::geo::GeoPoint;
use crate::market::{Market, MarketGeometry};
use crate::results::SearchResult;

/// Raw per-stage samples, exposed so the presentation layer can draw
/// distributions without recomputing them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StageSamples {
    pub offer: Vec<f64>,
    pub bid: Vec<f64>,
    pub connection: Vec<f64>,
}

impl StageSamples {
    fn stages(&self) -> [(&'static str, &[f64]); 3] {
        [
            ("offer", self.offer.as_slice()),
            ("bid", self.bid.as_slice()),
            ("connection", self.connection.as_slice()),
        ]
    }
}

/// Geospatial collections for map rendering by the (external) presentation
/// layer.
#[derive(Debug, Clone, Serialize)]
pub struct GeospatialData {
    pub searches: Vec<GeoPoint>,
    pub connections: Vec<GeoPoint>,
    pub cleaners: Vec<GeoPoint>,
    /// Cleaner location plus service radius in kilometers.
    pub service_areas: Vec<(GeoPoint, f64)>,
}

/// Spatial distribution of searches and the coverage/density math.
#[derive(Debug, Clone, Default)]
pub struct GeographicMetrics {
    search_points: Vec<GeoPoint>,
    connection_points: Vec<GeoPoint>,
}

impl GeographicMetrics {
    pub fn add_search(&mut self, result: &SearchResult) {
        self.search_points.push(result.location);
        if !result.connections.is_empty() {
            self.connection_points.push(result.location);
        }
    }

    pub fn search_points(&self) -> &[GeoPoint] {
        &self.search_points
    }

    pub fn connection_points(&self) -> &[GeoPoint] {
        &self.connection_points
    }

    /// Density and coverage keys. A market with zero total area yields the
    /// same keys, all zero, rather than dividing by zero.
    pub fn coverage_metrics(&self, market: &Market) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();
        let total_area = market.total_area_km2();
        if total_area <= 0.0 {
            for key in [
                "search_density",
                "connection_density",
                "coverage_ratio",
                "active_coverage_ratio",
            ] {
                metrics.insert(key.to_string(), 0.0);
            }
            return metrics;
        }

        metrics.insert(
            "search_density".to_string(),
            self.search_points.len() as f64 / total_area,
        );
        metrics.insert(
            "connection_density".to_string(),
            self.connection_points.len() as f64 / total_area,
        );
        metrics.insert("coverage_ratio".to_string(), covered_ratio(market, false));
        metrics.insert(
            "active_coverage_ratio".to_string(),
            covered_ratio(market, true),
        );

        if let MarketGeometry::Area { .. } = market.geometry() {
            let radii: Vec<f64> = market
                .cleaners()
                .filter(|c| c.bidding_active)
                .map(|c| c.service_radius_km)
                .collect();
            if !radii.is_empty() {
                metrics.insert(
                    "avg_service_radius".to_string(),
                    radii.iter().sum::<f64>() / radii.len() as f64,
                );
            }
        }
        metrics
    }
}

/// Fraction of the market area reachable by at least one service radius.
///
/// Postal-code markets take the largest service radius present in each code
/// as a stand-in for the union of that code's circles, saturating at the
/// code's own area. Location markets sum one circle per cleaner, capped at
/// the market area. Both understate true union coverage when many small
/// radii jointly cover what no single one does; downstream consumers expect
/// exactly this formula.
fn covered_ratio(market: &Market, active_only: bool) -> f64 {
    let total_area = market.total_area_km2();
    if total_area <= 0.0 {
        return 0.0;
    }
    let covered = match market.geometry() {
        MarketGeometry::PostalCodes(codes) => {
            let mut max_radius: BTreeMap<&str, f64> = BTreeMap::new();
            for cleaner in market.cleaners() {
                if active_only && !cleaner.bidding_active {
                    continue;
                }
                if let Some(code) = cleaner.postal_code.as_deref() {
                    let entry = max_radius.entry(code).or_insert(0.0);
                    if cleaner.service_radius_km > *entry {
                        *entry = cleaner.service_radius_km;
                    }
                }
            }
            codes
                .values()
                .map(|pc| {
                    let area = pc.area_km2.unwrap_or(0.0);
                    match max_radius.get(pc.postal_code.as_str()) {
                        Some(radius) => (PI * radius * radius).min(area),
                        None => 0.0,
                    }
                })
                .sum::<f64>()
        }
        MarketGeometry::Area { .. } => {
            let circles: f64 = market
                .cleaners()
                .filter(|c| !active_only || c.bidding_active)
                .map(|c| PI * c.service_radius_km * c.service_radius_km)
                .sum();
            circles.min(total_area)
        }
    };
    (covered / total_area).clamp(0.0, 1.0)
}

/// Running aggregates over a stream of search results.
#[derive(Debug, Clone, Default)]
pub struct MarketMetrics {
    geographic: GeographicMetrics,
    search_count: usize,
    connection_count: usize,
    bid_counts: Vec<usize>,
    distances: StageSamples,
    scores: StageSamples,
}

impl MarketMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one search result into the running aggregates.
    pub fn add_result(&mut self, result: &SearchResult) {
        self.search_count += 1;
        self.bid_counts.push(result.num_bids());
        self.connection_count += result.num_connections();
        self.geographic.add_search(result);

        for offer in &result.offers {
            self.distances.offer.push(offer.distance_km);
            self.scores.offer.push(offer.cleaner_score);
        }
        for bid in &result.bids {
            self.distances.bid.push(bid.distance_km());
            self.scores.bid.push(bid.cleaner_score());
        }
        for connection in &result.connections {
            self.distances.connection.push(connection.distance_km());
            self.scores.connection.push(connection.cleaner_score());
        }
    }

    pub fn add_results(&mut self, results: &[SearchResult]) {
        for result in results {
            self.add_result(result);
        }
    }

    pub fn search_count(&self) -> usize {
        self.search_count
    }

    pub fn connection_count(&self) -> usize {
        self.connection_count
    }

    pub fn geographic(&self) -> &GeographicMetrics {
        &self.geographic
    }

    /// Derive the summary vocabulary. Zero searches produce the degenerate
    /// (but well-defined) zero rates, not an error.
    pub fn calculate_metrics(&self, market: &Market) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        let connection_rate = if self.search_count > 0 {
            self.connection_count as f64 / self.search_count as f64
        } else {
            0.0
        };
        metrics.insert("connection_rate".to_string(), connection_rate);

        if !self.bid_counts.is_empty() {
            let counts: Vec<f64> = self.bid_counts.iter().map(|&n| n as f64).collect();
            let (avg, median, _) = calculate_stats(&counts);
            metrics.insert("avg_bids_per_search".to_string(), avg);
            metrics.insert("med_bids_per_search".to_string(), median);
            let with_bids = self.bid_counts.iter().filter(|&&n| n > 0).count();
            metrics.insert(
                "pct_searches_with_bids".to_string(),
                with_bids as f64 / self.bid_counts.len() as f64,
            );
        }

        for (stage, values) in self.distances.stages() {
            if values.is_empty() {
                continue;
            }
            let (avg, median, p90) = calculate_stats(values);
            metrics.insert(format!("avg_{stage}_distance"), avg);
            metrics.insert(format!("med_{stage}_distance"), median);
            metrics.insert(format!("p90_{stage}_distance"), p90);
        }
        for (stage, values) in self.scores.stages() {
            if values.is_empty() {
                continue;
            }
            let (avg, median, _) = calculate_stats(values);
            metrics.insert(format!("avg_{stage}_score"), avg);
            metrics.insert(format!("med_{stage}_score"), median);
        }

        metrics.extend(self.geographic.coverage_metrics(market));
        metrics
    }

    pub fn distance_distributions(&self) -> &StageSamples {
        &self.distances
    }

    pub fn score_distributions(&self) -> &StageSamples {
        &self.scores
    }

    pub fn geospatial_data(&self, market: &Market) -> GeospatialData {
        GeospatialData {
            searches: self.geographic.search_points.clone(),
            connections: self.geographic.connection_points.clone(),
            cleaners: market.cleaners().map(|c| c.location).collect(),
            service_areas: market
                .cleaners()
                .map(|c| (c.location, c.service_radius_km))
                .collect(),
        }
    }
}

/// Mean, median, and p90 over a sorted copy of the sample.
pub fn calculate_stats(values: &[f64]) -> (f64, f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0, 0.0);
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let avg = sorted.iter().sum::<f64>() / sorted.len() as f64;
    let median = if sorted.len() % 2 == 0 {
        (sorted[sorted.len() / 2 - 1] + sorted[sorted.len() / 2]) / 2.0
    } else {
        sorted[sorted.len() / 2]
    };
    let p90_idx = ((sorted.len() - 1) as f64 * 0.9) as usize;
    let p90 = sorted[p90_idx.min(sorted.len() - 1)];

    (avg, median, p90)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::{Bid, Connection, Offer};

    fn offer(id: &str, distance_km: f64, score: f64) -> Offer {
        Offer::new(id, distance_km, score, true, 1, 0).expect("offer")
    }

    fn result_with(offers: Vec<Offer>, bids: usize, connected: bool) -> SearchResult {
        let location = GeoPoint::new(40.75, -73.99).expect("valid coordinates");
        let mut result = SearchResult::new("search-000001", location, Some("10001".to_string()));
        result.bids = offers
            .iter()
            .take(bids)
            .cloned()
            .map(Bid::from_offer)
            .collect();
        if connected {
            result.connections = result
                .bids
                .first()
                .cloned()
                .map(Connection::from_bid)
                .into_iter()
                .collect();
        }
        result.offers = offers;
        result
    }

    #[test]
    fn calculate_stats_matches_hand_computed_values() {
        let values = vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let (avg, median, p90) = calculate_stats(&values);
        assert_eq!(avg, 55.0);
        assert_eq!(median, 55.0);
        assert_eq!(p90, 90.0);
    }

    #[test]
    fn calculate_stats_empty_is_zero() {
        assert_eq!(calculate_stats(&[]), (0.0, 0.0, 0.0));
    }

    #[test]
    fn fold_accumulates_counts_and_samples() {
        let mut metrics = MarketMetrics::new();
        metrics.add_result(&result_with(
            vec![offer("c-1", 1.0, 0.8), offer("c-2", 3.0, 0.6)],
            1,
            true,
        ));
        metrics.add_result(&result_with(vec![offer("c-1", 2.0, 0.8)], 0, false));

        assert_eq!(metrics.search_count(), 2);
        assert_eq!(metrics.connection_count(), 1);
        assert_eq!(metrics.distance_distributions().offer.len(), 3);
        assert_eq!(metrics.distance_distributions().bid.len(), 1);
        assert_eq!(metrics.distance_distributions().connection.len(), 1);
        assert_eq!(metrics.geographic().search_points().len(), 2);
        assert_eq!(metrics.geographic().connection_points().len(), 1);
    }

    #[test]
    fn zero_searches_yield_zero_rate() {
        let market = crate::test_helpers::single_code_market();
        let metrics = MarketMetrics::new();
        let summary = metrics.calculate_metrics(&market);
        assert_eq!(summary["connection_rate"], 0.0);
        assert!(!summary.contains_key("avg_bids_per_search"));
    }
}
