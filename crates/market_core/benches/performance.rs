//! Performance benchmarks for market_core using Criterion.rs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use market_core::config::SimulationConfig;
use market_core::metrics::MarketMetrics;
use market_core::simulator::Simulator;
use market_core::test_helpers::grid_postal_market;

fn bench_simulation_run(c: &mut Criterion) {
    let scenarios = vec![
        ("small", 10, 2),
        ("medium", 50, 4),
        ("large", 100, 10),
    ];

    let mut group = c.benchmark_group("simulation_run");
    for (name, codes, cleaners_per_code) in scenarios {
        let market = grid_postal_market(codes, cleaners_per_code);
        group.bench_with_input(
            BenchmarkId::from_parameter(name),
            &market,
            |b, market| {
                b.iter(|| {
                    let config = SimulationConfig::default()
                        .with_seed(42)
                        .with_search_iterations(100);
                    let mut simulator =
                        Simulator::new(market, config).expect("simulator");
                    black_box(simulator.run(None).expect("run"));
                });
            },
        );
    }
    group.finish();
}

fn bench_metrics_fold(c: &mut Criterion) {
    let market = grid_postal_market(50, 4);
    let config = SimulationConfig::default()
        .with_seed(42)
        .with_search_iterations(1000);
    let mut simulator = Simulator::new(&market, config).expect("simulator");
    let results = simulator.run(None).expect("run");

    c.bench_function("metrics_fold_1000_searches", |b| {
        b.iter(|| {
            let mut metrics = MarketMetrics::new();
            metrics.add_results(&results);
            black_box(metrics.calculate_metrics(&market));
        });
    });
}

criterion_group!(benches, bench_simulation_run, bench_metrics_fold);
criterion_main!(benches);
