//! Shared fixtures for tests, benches, and examples.

use std::collections::BTreeMap;

use crate::cleaner::Cleaner;
use crate::geo::{GeoPoint, PostalCode};
use crate::market::Market;

/// Centroid of the standard test postal code ("10001", midtown Manhattan).
pub fn test_point() -> GeoPoint {
    GeoPoint::new(40.7505, -73.9965).expect("test coordinates are valid")
}

pub fn test_postal_code(code: &str, lat: f64, lon: f64, str_tam: u32) -> PostalCode {
    let centroid = GeoPoint::new(lat, lon).expect("test coordinates are valid");
    PostalCode::new(code, "test-market", centroid, str_tam, Some(4.0))
        .expect("test postal code is valid")
}

/// A market with the single postal code "10001" and one active cleaner "C1"
/// at its centroid (score 0.8, radius 10 km, team of 2, 5 active
/// connections).
pub fn single_code_market() -> Market {
    let mut codes = BTreeMap::new();
    codes.insert(
        "10001".to_string(),
        test_postal_code("10001", 40.7505, -73.9965, 100),
    );
    let mut market = Market::with_postal_codes("test-market", codes).expect("market");
    let cleaner = Cleaner::new("C1", test_point())
        .with_postal_code("10001")
        .with_score(0.8)
        .with_service_radius_km(10.0)
        .with_team_size(2)
        .with_active_connections(5);
    market.add_cleaner(cleaner).expect("cleaner fits market");
    market
}

/// A synthetic postal-code market laid out on a small grid around midtown,
/// with `cleaners_per_code` cleaners spread across the codes. Deterministic,
/// sized for benches.
pub fn grid_postal_market(code_count: usize, cleaners_per_code: usize) -> Market {
    let mut codes = BTreeMap::new();
    for i in 0..code_count {
        let code = format!("1{:04}", i);
        let lat = 40.70 + (i / 10) as f64 * 0.02;
        let lon = -74.00 + (i % 10) as f64 * 0.02;
        codes.insert(code.clone(), test_postal_code(&code, lat, lon, 100));
    }
    let mut market = Market::with_postal_codes("grid-market", codes).expect("market");
    for i in 0..code_count {
        let code = format!("1{:04}", i);
        let lat = 40.70 + (i / 10) as f64 * 0.02;
        let lon = -74.00 + (i % 10) as f64 * 0.02;
        for j in 0..cleaners_per_code {
            let location =
                GeoPoint::new(lat + 0.001 * j as f64, lon).expect("test coordinates are valid");
            let cleaner = Cleaner::new(format!("c-{i}-{j}"), location)
                .with_postal_code(&code)
                .with_score(0.5 + 0.4 * (j % 2) as f64)
                .with_team_size(1 + (j % 3) as u32);
            market.add_cleaner(cleaner).expect("cleaner fits market");
        }
    }
    market
}
