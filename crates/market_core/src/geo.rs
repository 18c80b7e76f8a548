//! Geographic primitives: validated coordinates, great-circle distance, and
//! random point sampling.
//!
//! Distances use the haversine formula on a spherical Earth; point sampling
//! uses a local flat-Earth approximation (1 degree of latitude is about
//! 111 km, longitude scaled by cos(latitude)), which is accurate at the
//! city scales this simulation targets.

use rand::Rng;
use serde::Serialize;

use crate::error::SimulationError;

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Approximate length of one degree of latitude in kilometers.
pub(crate) const KM_PER_DEGREE: f64 = 111.0;

/// A validated geographic coordinate.
///
/// Latitude must lie in [-90, 90] and longitude in [-180, 180]; construction
/// fails rather than clamping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, SimulationError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(SimulationError::InvalidLatitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(SimulationError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in kilometers (haversine).
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        let (lat1, lon1) = (self.latitude.to_radians(), self.longitude.to_radians());
        let (lat2, lon2) = (other.latitude.to_radians(), other.longitude.to_radians());
        let dlat = lat2 - lat1;
        let dlon = lon2 - lon1;
        let sin_dlat = (dlat * 0.5).sin();
        let sin_dlon = (dlon * 0.5).sin();
        let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
        let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Sample a random point within `radius_km` of this point.
    ///
    /// Bearing is uniform; distance is radius-uniform rather than
    /// area-uniform, which concentrates samples toward the center.
    pub fn sample_point_in_radius<R: Rng>(
        &self,
        radius_km: f64,
        rng: &mut R,
    ) -> Result<GeoPoint, SimulationError> {
        if radius_km <= 0.0 {
            return Err(SimulationError::NonPositiveRadius(radius_km));
        }
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let r = rng.gen_range(0.0..radius_km);
        let lat_offset = r * angle.cos() / KM_PER_DEGREE;
        let lon_offset = r * angle.sin() / (KM_PER_DEGREE * self.latitude.to_radians().cos());
        GeoPoint::new(self.latitude + lat_offset, self.longitude + lon_offset)
    }
}

/// A postal-code area with its centroid and market attributes.
///
/// `str_tam` is the demand weight used for search-location sampling; `area_km2`
/// feeds density and coverage math and may be absent for markets loaded
/// without area data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostalCode {
    pub postal_code: String,
    pub market: String,
    pub centroid: GeoPoint,
    pub str_tam: u32,
    pub area_km2: Option<f64>,
}

impl PostalCode {
    pub fn new(
        postal_code: impl Into<String>,
        market: impl Into<String>,
        centroid: GeoPoint,
        str_tam: u32,
        area_km2: Option<f64>,
    ) -> Result<Self, SimulationError> {
        if let Some(area) = area_km2 {
            if area < 0.0 {
                return Err(SimulationError::NegativeArea(area));
            }
        }
        Ok(Self {
            postal_code: postal_code.into(),
            market: market.into(),
            centroid,
            str_tam,
            area_km2,
        })
    }

    /// Centroid-to-centroid distance in kilometers.
    pub fn distance_km_to(&self, other: &PostalCode) -> f64 {
        self.centroid.distance_km(&other.centroid)
    }

    /// This code's share of the market's total TAM.
    pub fn tam_weight(&self, total_market_tam: u32) -> Result<f64, SimulationError> {
        if total_market_tam == 0 {
            return Err(SimulationError::ZeroMarketTam(self.market.clone()));
        }
        Ok(f64::from(self.str_tam) / f64::from(total_market_tam))
    }
}
