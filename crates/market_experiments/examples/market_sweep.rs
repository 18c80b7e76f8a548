//! Run a small parameter sweep over a demo postal-code market and export
//! the results.
//!
//! Run with: cargo run -p market_experiments --example market_sweep

use market_core::cleaner::Cleaner;
use market_core::geo::{GeoPoint, PostalCode};
use market_core::market::Market;
use market_experiments::{export_to_csv, export_to_json, run_parallel_experiments, ParameterSpace};
use std::collections::BTreeMap;

fn demo_market() -> Market {
    let codes: BTreeMap<String, PostalCode> = [
        ("10001", 40.7505, -73.9965, 250u32, 1.6),
        ("10002", 40.7170, -73.9870, 700u32, 2.3),
        ("10003", 40.7320, -73.9890, 420u32, 1.5),
    ]
    .into_iter()
    .map(|(code, lat, lon, tam, area)| {
        let centroid = GeoPoint::new(lat, lon).expect("demo coordinates");
        let pc = PostalCode::new(code, "manhattan", centroid, tam, Some(area))
            .expect("demo postal code");
        (code.to_string(), pc)
    })
    .collect();

    let mut market = Market::with_postal_codes("manhattan", codes).expect("demo market");
    let roster = [
        ("c-001", 40.7502, -73.9950, "10001", 0.85, 2, 4),
        ("c-002", 40.7515, -74.0001, "10001", 0.60, 1, 9),
        ("c-003", 40.7168, -73.9860, "10002", 0.75, 3, 12),
        ("c-004", 40.7190, -73.9905, "10002", 0.45, 1, 2),
        ("c-005", 40.7330, -73.9880, "10003", 0.92, 2, 0),
    ];
    for (id, lat, lon, code, score, team, connections) in roster {
        let location = GeoPoint::new(lat, lon).expect("demo coordinates");
        let cleaner = Cleaner::new(id, location)
            .with_postal_code(code)
            .with_score(score)
            .with_team_size(team)
            .with_active_connections(connections);
        market.add_cleaner(cleaner).expect("demo cleaner fits");
    }
    market
}

fn main() {
    let market = demo_market();

    let space = ParameterSpace::grid()
        .with_experiment_id("manhattan-demo")
        .bid_probabilities(vec![0.10, 0.14, 0.20])
        .decay_factors(vec![0.1, 0.2])
        .search_iterations(vec![500])
        .seeds(vec![42]);
    let parameter_sets = space.generate();

    println!(
        "--- Market sweep ({} cleaners, {} parameter sets, 500 searches each) ---",
        market.cleaner_count(),
        parameter_sets.len()
    );

    let summaries = match run_parallel_experiments(&market, &parameter_sets, None) {
        Ok(summaries) => summaries,
        Err(error) => {
            eprintln!("sweep failed: {error}");
            std::process::exit(1);
        }
    };

    println!("\n  run  bid_p  decay  connection_rate  avg_bids  coverage");
    for (summary, set) in summaries.iter().zip(&parameter_sets) {
        println!(
            "  {:>3}  {:>5.2}  {:>5.2}  {:>15.4}  {:>8.3}  {:>8.3}",
            summary.run_id,
            set.config.cleaner_base_bid_probability,
            set.config.distance_decay_factor,
            summary.metrics.get("connection_rate").copied().unwrap_or(0.0),
            summary
                .metrics
                .get("avg_bids_per_search")
                .copied()
                .unwrap_or(0.0),
            summary.metrics.get("coverage_ratio").copied().unwrap_or(0.0),
        );
    }

    if let Err(error) = export_to_csv(&summaries, &parameter_sets, "market_sweep_results.csv") {
        eprintln!("csv export failed: {error}");
    }
    if let Err(error) = export_to_json(&summaries, "market_sweep_results.json") {
        eprintln!("json export failed: {error}");
    }
    println!("\nExported market_sweep_results.csv and market_sweep_results.json");
}
