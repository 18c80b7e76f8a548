use std::fmt;

/// Errors raised when an entity is constructed with out-of-range fields or an
/// operation is called with an invalid argument. Degenerate-but-valid states
/// (zero searches, no bids, zero total area) are not errors and produce
/// well-defined outputs instead.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationError {
    InvalidLatitude(f64),
    InvalidLongitude(f64),
    NonPositiveRadius(f64),
    NonPositiveThreshold(f64),
    InvalidScore(f64),
    ZeroTeamSize,
    NegativeDistance(f64),
    NegativeArea(f64),
    NonPositiveBidAmount(f64),
    NegativeBidTime(f64),
    ConnectionWithoutBidTime,
    ConnectionBeforeBid {
        bid_time: f64,
        connection_time: f64,
    },
    EmptyPostalCodes,
    MissingPostalCode(String),
    UnknownPostalCode(String),
    CleanerOutsideMarket {
        contractor_id: String,
        distance_km: f64,
        radius_km: f64,
    },
    ZeroMarketTam(String),
    InvalidConfig(String),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimulationError::InvalidLatitude(lat) => {
                write!(f, "latitude {lat} outside [-90, 90]")
            }
            SimulationError::InvalidLongitude(lon) => {
                write!(f, "longitude {lon} outside [-180, 180]")
            }
            SimulationError::NonPositiveRadius(r) => {
                write!(f, "radius {r} km must be positive")
            }
            SimulationError::NonPositiveThreshold(t) => {
                write!(f, "threshold {t} km must be positive")
            }
            SimulationError::InvalidScore(s) => {
                write!(f, "cleaner score {s} outside [0, 1]")
            }
            SimulationError::ZeroTeamSize => write!(f, "team size must be at least 1"),
            SimulationError::NegativeDistance(d) => {
                write!(f, "distance {d} km must be non-negative")
            }
            SimulationError::NegativeArea(a) => {
                write!(f, "area {a} km^2 must be non-negative")
            }
            SimulationError::NonPositiveBidAmount(a) => {
                write!(f, "bid amount {a} must be positive")
            }
            SimulationError::NegativeBidTime(t) => {
                write!(f, "bid time {t} must be non-negative")
            }
            SimulationError::ConnectionWithoutBidTime => {
                write!(f, "connection time requires a bid time")
            }
            SimulationError::ConnectionBeforeBid {
                bid_time,
                connection_time,
            } => write!(
                f,
                "connection time {connection_time} precedes bid time {bid_time}"
            ),
            SimulationError::EmptyPostalCodes => {
                write!(f, "postal-code market requires at least one postal code")
            }
            SimulationError::MissingPostalCode(contractor_id) => write!(
                f,
                "cleaner {contractor_id} has no postal code for a postal-code market"
            ),
            SimulationError::UnknownPostalCode(code) => {
                write!(f, "postal code {code} not in market")
            }
            SimulationError::CleanerOutsideMarket {
                contractor_id,
                distance_km,
                radius_km,
            } => write!(
                f,
                "cleaner {contractor_id} is {distance_km:.1} km from market center, \
                 exceeds radius of {radius_km} km"
            ),
            SimulationError::ZeroMarketTam(market_id) => {
                write!(f, "market {market_id} has zero total TAM")
            }
            SimulationError::InvalidConfig(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl std::error::Error for SimulationError {}
