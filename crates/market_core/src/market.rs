//! Market geography and the cleaner registry.
//!
//! A market is either postal-code-based (a set of weighted postal codes) or
//! location-based (a center and radius). The variants sample search
//! locations differently: postal-code markets draw a code TAM-weighted and
//! jitter around its centroid, which concentrates demand where the TAM is;
//! location markets draw uniformly within the radius.

use std::collections::BTreeMap;

use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::cleaner::Cleaner;
use crate::error::SimulationError;
use crate::geo::{GeoPoint, PostalCode, KM_PER_DEGREE};

/// Standard deviation, in kilometers, of the Gaussian jitter applied around a
/// sampled postal-code centroid so search points do not cluster exactly on
/// centroids.
const SEARCH_JITTER_STD_KM: f64 = 1.0;

/// The two mutually exclusive market definitions, fixed at construction.
#[derive(Debug, Clone)]
pub enum MarketGeometry {
    /// Defined by a non-empty set of postal codes keyed by code.
    PostalCodes(BTreeMap<String, PostalCode>),
    /// Defined by a center point and a positive radius in kilometers.
    Area { center: GeoPoint, radius_km: f64 },
}

#[derive(Debug, Clone)]
pub struct Market {
    market_id: String,
    geometry: MarketGeometry,
    cleaners: BTreeMap<String, Cleaner>,
}

impl Market {
    /// Build a postal-code-based market.
    pub fn with_postal_codes(
        market_id: impl Into<String>,
        postal_codes: BTreeMap<String, PostalCode>,
    ) -> Result<Self, SimulationError> {
        if postal_codes.is_empty() {
            return Err(SimulationError::EmptyPostalCodes);
        }
        Ok(Self {
            market_id: market_id.into(),
            geometry: MarketGeometry::PostalCodes(postal_codes),
            cleaners: BTreeMap::new(),
        })
    }

    /// Build a location-based market around `center`.
    pub fn with_center(
        market_id: impl Into<String>,
        center: GeoPoint,
        radius_km: f64,
    ) -> Result<Self, SimulationError> {
        if radius_km <= 0.0 {
            return Err(SimulationError::NonPositiveRadius(radius_km));
        }
        Ok(Self {
            market_id: market_id.into(),
            geometry: MarketGeometry::Area { center, radius_km },
            cleaners: BTreeMap::new(),
        })
    }

    pub fn market_id(&self) -> &str {
        &self.market_id
    }

    pub fn geometry(&self) -> &MarketGeometry {
        &self.geometry
    }

    /// Registered cleaners in contractor-id order.
    pub fn cleaners(&self) -> impl Iterator<Item = &Cleaner> {
        self.cleaners.values()
    }

    pub fn cleaner_count(&self) -> usize {
        self.cleaners.len()
    }

    pub fn get_cleaner(&self, contractor_id: &str) -> Option<&Cleaner> {
        self.cleaners.get(contractor_id)
    }

    /// Postal codes of this market, or `None` for location-based markets.
    pub fn postal_codes(&self) -> Option<&BTreeMap<String, PostalCode>> {
        match &self.geometry {
            MarketGeometry::PostalCodes(codes) => Some(codes),
            MarketGeometry::Area { .. } => None,
        }
    }

    /// Total demand weight; defined only for postal-code markets.
    pub fn total_str_tam(&self) -> Option<u64> {
        self.postal_codes()
            .map(|codes| codes.values().map(|pc| u64::from(pc.str_tam)).sum())
    }

    /// Sum of postal-code areas, or the area of the market circle. Postal
    /// codes with no area data contribute zero.
    pub fn total_area_km2(&self) -> f64 {
        match &self.geometry {
            MarketGeometry::PostalCodes(codes) => codes
                .values()
                .filter_map(|pc| pc.area_km2)
                .sum(),
            MarketGeometry::Area { radius_km, .. } => {
                std::f64::consts::PI * radius_km * radius_km
            }
        }
    }

    /// Register a cleaner, replacing any existing entry with the same
    /// contractor id.
    ///
    /// Postal-code markets require the cleaner's postal code to be one of the
    /// market's codes; location markets require the cleaner to lie within the
    /// market radius.
    pub fn add_cleaner(&mut self, cleaner: Cleaner) -> Result<(), SimulationError> {
        cleaner.validate()?;
        match &self.geometry {
            MarketGeometry::PostalCodes(codes) => {
                let code = cleaner.postal_code.as_deref().ok_or_else(|| {
                    SimulationError::MissingPostalCode(cleaner.contractor_id.clone())
                })?;
                if !codes.contains_key(code) {
                    return Err(SimulationError::UnknownPostalCode(code.to_string()));
                }
            }
            MarketGeometry::Area { center, radius_km } => {
                let distance_km = center.distance_km(&cleaner.location);
                if distance_km > *radius_km {
                    return Err(SimulationError::CleanerOutsideMarket {
                        contractor_id: cleaner.contractor_id.clone(),
                        distance_km,
                        radius_km: *radius_km,
                    });
                }
            }
        }
        self.cleaners.insert(cleaner.contractor_id.clone(), cleaner);
        Ok(())
    }

    /// All cleaners within `radius_km` of `point`, boundary inclusive.
    pub fn cleaners_in_range(
        &self,
        point: &GeoPoint,
        radius_km: f64,
    ) -> Result<Vec<&Cleaner>, SimulationError> {
        if radius_km <= 0.0 {
            return Err(SimulationError::NonPositiveRadius(radius_km));
        }
        Ok(self
            .cleaners
            .values()
            .filter(|cleaner| cleaner.distance_km_to(point) <= radius_km)
            .collect())
    }

    /// Sample a search location.
    ///
    /// Postal-code markets pick a code with probability proportional to its
    /// TAM, then perturb the centroid with an independent 2-D Gaussian
    /// (sigma about 1 km per axis). Location markets sample radius-uniform
    /// within the market circle and return no postal code.
    pub fn sample_search_location<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Result<(GeoPoint, Option<String>), SimulationError> {
        match &self.geometry {
            MarketGeometry::PostalCodes(codes) => {
                let selected = sample_postal_code_by_tam(&self.market_id, codes, rng)?;
                let centroid = selected.centroid;
                let lat_std = SEARCH_JITTER_STD_KM / KM_PER_DEGREE;
                let lon_std = SEARCH_JITTER_STD_KM
                    / (KM_PER_DEGREE * centroid.latitude().to_radians().cos());
                let lat = Normal::new(centroid.latitude(), lat_std)
                    .expect("std dev is positive")
                    .sample(rng);
                let lon = Normal::new(centroid.longitude(), lon_std)
                    .expect("std dev is positive")
                    .sample(rng);
                let point = GeoPoint::new(lat, lon)?;
                Ok((point, Some(selected.postal_code.clone())))
            }
            MarketGeometry::Area { center, radius_km } => {
                let point = center.sample_point_in_radius(*radius_km, rng)?;
                Ok((point, None))
            }
        }
    }

    /// All other postal codes within `threshold_km` of `code`'s centroid.
    pub fn postal_neighbors(
        &self,
        code: &str,
        threshold_km: f64,
    ) -> Result<Vec<&PostalCode>, SimulationError> {
        if threshold_km <= 0.0 {
            return Err(SimulationError::NonPositiveThreshold(threshold_km));
        }
        let codes = self
            .postal_codes()
            .ok_or_else(|| SimulationError::UnknownPostalCode(code.to_string()))?;
        let origin = codes
            .get(code)
            .ok_or_else(|| SimulationError::UnknownPostalCode(code.to_string()))?;
        Ok(codes
            .values()
            .filter(|pc| {
                pc.postal_code != origin.postal_code
                    && origin.distance_km_to(pc) <= threshold_km
            })
            .collect())
    }
}

/// Categorical draw over the TAM weight vector: cumulative weights plus a
/// uniform draw, resolved with `partition_point`.
fn sample_postal_code_by_tam<'a, R: Rng>(
    market_id: &str,
    codes: &'a BTreeMap<String, PostalCode>,
    rng: &mut R,
) -> Result<&'a PostalCode, SimulationError> {
    let entries: Vec<&PostalCode> = codes.values().collect();
    let mut cumulative = Vec::with_capacity(entries.len());
    let mut total = 0.0;
    for pc in &entries {
        total += f64::from(pc.str_tam);
        cumulative.push(total);
    }
    if total <= 0.0 {
        return Err(SimulationError::ZeroMarketTam(market_id.to_string()));
    }
    let r: f64 = rng.gen_range(0.0..total);
    let idx = cumulative.partition_point(|&w| w <= r).min(entries.len() - 1);
    Ok(entries[idx])
}
