//! Core data types and enums for transit data.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::identifiers::*;

// ============================================================================
// Coordinates
// ============================================================================

/// A WGS84 coordinate in decimal degrees.
///
/// Stored on disk as a two-element `[lat, lng]` array.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Round both components to `decimals` places.
    pub fn rounded(&self, decimals: usize) -> Self {
        let scale = 10f64.powi(decimals as i32);
        Self {
            lat: (self.lat * scale).round() / scale,
            lng: (self.lng * scale).round() / scale,
        }
    }

    /// Fixed-point key for hashing, at `decimals` places.
    pub fn key(&self, decimals: usize) -> (i64, i64) {
        let scale = 10f64.powi(decimals as i32);
        (
            (self.lat * scale).round() as i64,
            (self.lng * scale).round() as i64,
        )
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self::new(lat, lng)
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(latlng: LatLng) -> Self {
        [latlng.lat, latlng.lng]
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

// geo uses (x, y) = (lng, lat)
impl From<LatLng> for geo::Point {
    fn from(latlng: LatLng) -> Self {
        geo::Point::new(latlng.lng, latlng.lat)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Direction of travel along a numbered route.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    Northbound,
    Southbound,
    Eastbound,
    Westbound,
    Inbound,
    Outbound,
}

// ============================================================================
// Keys
// ============================================================================

/// A route is built once per (route number, direction).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RouteKey {
    pub route_num: RouteNumber,
    pub direction: Direction,
}

impl RouteKey {
    pub fn new(route_num: impl Into<RouteNumber>, direction: Direction) -> Self {
        Self {
            route_num: route_num.into(),
            direction,
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.route_num, self.direction)
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum TransitError {
    #[error("Halt id mismatch: stored {stored}, derived {derived}")]
    IdMismatch {
        stored: HaltIdentifier,
        derived: HaltIdentifier,
    },

    #[error("Halt id collision: {id} is already used by {existing:?}, not {incoming:?}")]
    IdCollision {
        id: HaltIdentifier,
        existing: String,
        incoming: String,
    },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, TransitError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_latlng_serializes_as_pair() {
        let latlng = LatLng::new(6.9271, 79.8612);
        assert_eq!(serde_json::to_string(&latlng).unwrap(), "[6.9271,79.8612]");

        let back: LatLng = serde_json::from_str("[6.9271,79.8612]").unwrap();
        assert_eq!(back, latlng);
    }

    #[test]
    fn test_latlng_rounding() {
        let latlng = LatLng::new(6.934_449, 79.842_851).rounded(4);
        assert_eq!(latlng, LatLng::new(6.9344, 79.8429));
        assert_eq!(latlng.key(4), (69344, 798429));
    }

    #[test]
    fn test_latlng_geo_axis_order() {
        let point: geo::Point = LatLng::new(6.9, 79.8).into();
        assert_eq!(point.x(), 79.8);
        assert_eq!(point.y(), 6.9);
    }

    #[test]
    fn test_latlng_validity() {
        assert!(LatLng::new(6.9, 79.8).is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
        assert!(!LatLng::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn test_direction_parsing() {
        assert_eq!(Direction::from_str("northbound").unwrap(), Direction::Northbound);
        assert_eq!(Direction::from_str("Southbound").unwrap(), Direction::Southbound);
        assert!(Direction::from_str("sideways").is_err());
        assert_eq!(Direction::Inbound.to_string(), "inbound");
        assert_eq!(
            serde_json::to_string(&Direction::Eastbound).unwrap(),
            "\"eastbound\""
        );
    }

    #[test]
    fn test_route_key_display() {
        let key = RouteKey::new("138", Direction::Northbound);
        assert_eq!(key.to_string(), "138-northbound");
    }
}
