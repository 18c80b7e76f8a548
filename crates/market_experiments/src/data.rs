//! CSV loading of postal-code and cleaner rosters.
//!
//! Row-level validation happens here, so the simulation core only ever sees
//! entities whose invariants already hold. Errors carry the offending row
//! number.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use market_core::cleaner::Cleaner;
use market_core::geo::{GeoPoint, PostalCode};

#[derive(Debug, Deserialize)]
pub struct PostalCodeRecord {
    pub postal_code: String,
    pub market: String,
    pub latitude: f64,
    pub longitude: f64,
    pub str_tam: u32,
    #[serde(default)]
    pub area: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CleanerRecord {
    pub contractor_id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub postal_code: Option<String>,
    pub bidding_active: bool,
    pub assignment_active: bool,
    pub cleaner_score: f64,
    pub service_radius: f64,
    pub team_size: u32,
    pub active_connections: u32,
}

/// Load a postal-code roster keyed by code. Later rows replace earlier rows
/// with the same code.
pub fn load_postal_codes(
    path: impl AsRef<Path>,
) -> Result<BTreeMap<String, PostalCode>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut codes = BTreeMap::new();
    for (row, record) in reader.deserialize::<PostalCodeRecord>().enumerate() {
        let record = record?;
        let centroid = GeoPoint::new(record.latitude, record.longitude)
            .map_err(|error| format!("postal code row {}: {error}", row + 1))?;
        let postal_code = PostalCode::new(
            record.postal_code,
            record.market,
            centroid,
            record.str_tam,
            record.area,
        )
        .map_err(|error| format!("postal code row {}: {error}", row + 1))?;
        codes.insert(postal_code.postal_code.clone(), postal_code);
    }
    Ok(codes)
}

/// Load a cleaner roster in file order.
pub fn load_cleaners(
    path: impl AsRef<Path>,
) -> Result<Vec<Cleaner>, Box<dyn std::error::Error>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut cleaners = Vec::new();
    for (row, record) in reader.deserialize::<CleanerRecord>().enumerate() {
        let record = record?;
        let location = GeoPoint::new(record.latitude, record.longitude)
            .map_err(|error| format!("cleaner row {}: {error}", row + 1))?;
        let cleaner = Cleaner {
            contractor_id: record.contractor_id,
            location,
            postal_code: record.postal_code,
            bidding_active: record.bidding_active,
            assignment_active: record.assignment_active,
            cleaner_score: record.cleaner_score,
            service_radius_km: record.service_radius,
            team_size: record.team_size,
            active_connections: record.active_connections,
        };
        cleaner
            .validate()
            .map_err(|error| format!("cleaner row {}: {error}", row + 1))?;
        cleaners.push(cleaner);
    }
    Ok(cleaners)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write");
        file
    }

    #[test]
    fn loads_postal_codes_with_optional_area() {
        let file = write_temp(
            "postal_code,market,latitude,longitude,str_tam,area\n\
             10001,nyc,40.7505,-73.9965,100,4.0\n\
             10002,nyc,40.7170,-73.9870,300,\n",
        );
        let codes = load_postal_codes(file.path()).expect("load");
        assert_eq!(codes.len(), 2);
        assert_eq!(codes["10001"].area_km2, Some(4.0));
        assert_eq!(codes["10002"].area_km2, None);
        assert_eq!(codes["10002"].str_tam, 300);
    }

    #[test]
    fn loads_cleaners_and_validates_rows() {
        let file = write_temp(
            "contractor_id,latitude,longitude,postal_code,bidding_active,assignment_active,\
             cleaner_score,service_radius,team_size,active_connections\n\
             c-1,40.7505,-73.9965,10001,true,true,0.8,10.0,2,5\n\
             c-2,40.7170,-73.9870,,false,true,0.5,5.0,1,0\n",
        );
        let cleaners = load_cleaners(file.path()).expect("load");
        assert_eq!(cleaners.len(), 2);
        assert_eq!(cleaners[0].postal_code.as_deref(), Some("10001"));
        assert_eq!(cleaners[1].postal_code, None);
        assert!(!cleaners[1].bidding_active);
    }

    #[test]
    fn rejects_out_of_range_rows_with_row_context() {
        let file = write_temp(
            "contractor_id,latitude,longitude,postal_code,bidding_active,assignment_active,\
             cleaner_score,service_radius,team_size,active_connections\n\
             c-1,40.7505,-73.9965,10001,true,true,1.8,10.0,2,5\n",
        );
        let error = load_cleaners(file.path()).expect_err("invalid score");
        assert!(error.to_string().contains("row 1"));
    }
}
