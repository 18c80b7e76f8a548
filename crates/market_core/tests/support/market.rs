#![allow(dead_code)]

use std::collections::BTreeMap;

use market_core::cleaner::Cleaner;
use market_core::geo::{GeoPoint, PostalCode};
use market_core::market::Market;

pub fn point(lat: f64, lon: f64) -> GeoPoint {
    GeoPoint::new(lat, lon).expect("valid test coordinates")
}

pub fn postal_code(code: &str, lat: f64, lon: f64, str_tam: u32, area: Option<f64>) -> PostalCode {
    PostalCode::new(code, "test-market", point(lat, lon), str_tam, area)
        .expect("valid test postal code")
}

/// Builder for postal-code test markets.
pub struct PostalMarketBuilder {
    market_id: String,
    codes: BTreeMap<String, PostalCode>,
    cleaners: Vec<Cleaner>,
}

impl PostalMarketBuilder {
    pub fn new(market_id: &str) -> Self {
        Self {
            market_id: market_id.to_string(),
            codes: BTreeMap::new(),
            cleaners: Vec::new(),
        }
    }

    pub fn code(mut self, code: &str, lat: f64, lon: f64, str_tam: u32, area: Option<f64>) -> Self {
        self.codes
            .insert(code.to_string(), postal_code(code, lat, lon, str_tam, area));
        self
    }

    pub fn cleaner(mut self, cleaner: Cleaner) -> Self {
        self.cleaners.push(cleaner);
        self
    }

    pub fn build(self) -> Market {
        let mut market =
            Market::with_postal_codes(self.market_id, self.codes).expect("test market geometry");
        for cleaner in self.cleaners {
            market.add_cleaner(cleaner).expect("test cleaner fits");
        }
        market
    }
}

/// One postal code "10001" (TAM 100) with one active cleaner "C1" at the
/// centroid.
pub fn scenario_market() -> Market {
    PostalMarketBuilder::new("M")
        .code("10001", 40.7505, -73.9965, 100, Some(4.0))
        .cleaner(
            Cleaner::new("C1", point(40.7505, -73.9965))
                .with_postal_code("10001")
                .with_score(0.8)
                .with_service_radius_km(10.0)
                .with_team_size(2)
                .with_active_connections(5),
        )
        .build()
}
