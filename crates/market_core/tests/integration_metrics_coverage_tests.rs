mod support;

use market_core::cleaner::Cleaner;
use market_core::config::SimulationConfig;
use market_core::market::Market;
use market_core::metrics::MarketMetrics;
use market_core::simulator::Simulator;
use support::market::{point, scenario_market, PostalMarketBuilder};

#[test]
fn zero_cleaners_means_zero_coverage() {
    let market = PostalMarketBuilder::new("nyc")
        .code("10001", 40.7505, -73.9965, 100, Some(4.0))
        .build();
    let metrics = MarketMetrics::new();
    let summary = metrics.calculate_metrics(&market);

    assert_eq!(summary["coverage_ratio"], 0.0);
    assert_eq!(summary["active_coverage_ratio"], 0.0);
}

#[test]
fn overlapping_cleaners_cannot_push_coverage_above_one() {
    let mut builder = PostalMarketBuilder::new("nyc")
        .code("10001", 40.7505, -73.9965, 100, Some(4.0));
    // Many identically-located cleaners with radii far larger than the code
    for i in 0..10 {
        builder = builder.cleaner(
            Cleaner::new(format!("c-{i}"), point(40.7505, -73.9965))
                .with_postal_code("10001")
                .with_service_radius_km(25.0),
        );
    }
    let market = builder.build();
    let summary = MarketMetrics::new().calculate_metrics(&market);

    assert_eq!(summary["coverage_ratio"], 1.0);
    assert_eq!(summary["active_coverage_ratio"], 1.0);
}

#[test]
fn active_coverage_never_exceeds_total_coverage() {
    // The largest radius in the code belongs to an inactive cleaner
    let market = PostalMarketBuilder::new("nyc")
        .code("10001", 40.7505, -73.9965, 100, Some(1000.0))
        .cleaner(
            Cleaner::new("c-active", point(40.7505, -73.9965))
                .with_postal_code("10001")
                .with_service_radius_km(5.0),
        )
        .cleaner(
            Cleaner::new("c-idle", point(40.7505, -73.9965))
                .with_postal_code("10001")
                .with_service_radius_km(10.0)
                .with_bidding_active(false),
        )
        .build();
    let summary = MarketMetrics::new().calculate_metrics(&market);

    let coverage = summary["coverage_ratio"];
    let active = summary["active_coverage_ratio"];
    assert!(active <= coverage, "active {active} > coverage {coverage}");
    assert!((0.0..=1.0).contains(&coverage));
    assert!((0.0..=1.0).contains(&active));
    assert!(active < coverage, "inactive max radius should widen the gap");
}

#[test]
fn location_market_coverage_saturates_at_market_area() {
    let center = point(37.7749, -122.4194);
    let mut market = Market::with_center("sf", center, 10.0).expect("market");
    for i in 0..5 {
        market
            .add_cleaner(
                Cleaner::new(format!("c-{i}"), center).with_service_radius_km(10.0),
            )
            .expect("add");
    }
    let summary = MarketMetrics::new().calculate_metrics(&market);

    assert_eq!(summary["coverage_ratio"], 1.0);
    assert!(summary.contains_key("avg_service_radius"));
    assert_eq!(summary["avg_service_radius"], 10.0);
}

#[test]
fn zero_area_market_fails_soft_with_zeroed_ratios() {
    let market = PostalMarketBuilder::new("nyc")
        .code("10001", 40.7505, -73.9965, 100, None)
        .cleaner(
            Cleaner::new("c-1", point(40.7505, -73.9965)).with_postal_code("10001"),
        )
        .build();

    let config = SimulationConfig::default()
        .with_seed(42)
        .with_search_iterations(20);
    let mut simulator = Simulator::new(&market, config).expect("simulator");
    let results = simulator.run(None).expect("run");

    let mut metrics = MarketMetrics::new();
    metrics.add_results(&results);
    let summary = metrics.calculate_metrics(&market);

    assert_eq!(summary["search_density"], 0.0);
    assert_eq!(summary["connection_density"], 0.0);
    assert_eq!(summary["coverage_ratio"], 0.0);
    assert_eq!(summary["active_coverage_ratio"], 0.0);
    // Count-based rates stay well-defined
    assert!(summary.contains_key("connection_rate"));
    assert!(summary.contains_key("avg_bids_per_search"));
}

#[test]
fn summary_vocabulary_covers_all_stages_after_a_busy_run() {
    let market = scenario_market();
    let config = SimulationConfig::default()
        .with_seed(42)
        .with_search_iterations(400)
        .with_base_probabilities(0.9, 0.9);
    let mut simulator = Simulator::new(&market, config).expect("simulator");
    let results = simulator.run(None).expect("run");

    let mut metrics = MarketMetrics::new();
    metrics.add_results(&results);
    let summary = metrics.calculate_metrics(&market);

    for key in [
        "connection_rate",
        "avg_bids_per_search",
        "med_bids_per_search",
        "pct_searches_with_bids",
        "avg_offer_distance",
        "med_offer_distance",
        "p90_offer_distance",
        "avg_bid_distance",
        "avg_connection_distance",
        "avg_offer_score",
        "avg_bid_score",
        "avg_connection_score",
        "search_density",
        "connection_density",
        "coverage_ratio",
        "active_coverage_ratio",
    ] {
        assert!(summary.contains_key(key), "missing {key}");
    }

    assert!(summary["connection_rate"] > 0.0);
    assert!(summary["pct_searches_with_bids"] > 0.0);
}

#[test]
fn distribution_accessors_expose_raw_samples() {
    let market = scenario_market();
    let config = SimulationConfig::default()
        .with_seed(42)
        .with_search_iterations(100)
        .with_base_probabilities(0.9, 0.9);
    let mut simulator = Simulator::new(&market, config).expect("simulator");
    let results = simulator.run(None).expect("run");

    let mut metrics = MarketMetrics::new();
    metrics.add_results(&results);

    let offers: usize = results.iter().map(|r| r.num_offers()).sum();
    assert_eq!(metrics.distance_distributions().offer.len(), offers);
    assert_eq!(metrics.score_distributions().offer.len(), offers);

    let geospatial = metrics.geospatial_data(&market);
    assert_eq!(geospatial.searches.len(), 100);
    assert_eq!(geospatial.cleaners.len(), 1);
    assert_eq!(geospatial.service_areas.len(), 1);
    assert_eq!(geospatial.connections.len(), metrics.connection_count());
}
