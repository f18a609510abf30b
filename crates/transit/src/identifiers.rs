//! Type-safe identifiers for transit entities.
//!
//! All identifiers use Arc<str> for cheap cloning and minimal memory overhead.
//! Halt identifiers are never chosen by hand: they are derived from the halt's
//! display name and rounded coordinates so independent builds agree on them.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::models::types::LatLng;

/// Decimal places kept for halt coordinates, both in identifiers and on disk.
pub const HALT_COORD_PRECISION: usize = 4;

macro_rules! impl_identifier {
    ($name:ident) => {
        #[derive(Clone, Debug)]
        pub struct $name(Arc<str>);

        impl $name {
            pub fn new(s: impl AsRef<str>) -> Self {
                Self(s.as_ref().into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                Arc::ptr_eq(&self.0, &other.0) || self.0 == other.0
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.0.hash(state);
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self::new(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                String::deserialize(deserializer).map(Self::from)
            }
        }
    };
}

impl_identifier!(HaltIdentifier);
impl_identifier!(RouteNumber);

impl HaltIdentifier {
    /// Derive the identifier for a halt, e.g.
    /// `("Pettah Bus Stop", (6.9344, 79.8428))` -> `pettah-bus-stop-6.9344N-79.8428E`.
    pub fn derive(name: &str, latlng: LatLng) -> Self {
        let latlng = latlng.rounded(HALT_COORD_PRECISION);
        let lat_suffix = if latlng.lat >= 0.0 { 'N' } else { 'S' };
        let lng_suffix = if latlng.lng >= 0.0 { 'E' } else { 'W' };
        Self::new(format!(
            "{}-{:.prec$}{}-{:.prec$}{}",
            slug(name),
            latlng.lat.abs(),
            lat_suffix,
            latlng.lng.abs(),
            lng_suffix,
            prec = HALT_COORD_PRECISION,
        ))
    }
}

/// Lower-case, spaces to hyphens, periods dropped.
pub fn slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "-").replace('.', "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_equality() {
        let id1 = HaltIdentifier::new("halt_123");
        let id2 = HaltIdentifier::new("halt_123");
        let id3 = id1.clone();

        assert_eq!(id1, id2);
        assert_eq!(id1, id3);
        assert!(Arc::ptr_eq(&id1.0, &id3.0)); // Clone shares Arc
    }

    #[test]
    fn test_identifier_hash() {
        use std::collections::HashMap;

        let mut map = HashMap::new();
        map.insert(HaltIdentifier::new("test"), 42);

        assert_eq!(map.get(&HaltIdentifier::new("test")), Some(&42));
    }

    #[test]
    fn test_identifier_serde() {
        let id = RouteNumber::new("138");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"138\"");
        let back: RouteNumber = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("Pettah Bus Stop"), "pettah-bus-stop");
        assert_eq!(slug("St. Anthony's Church"), "st-anthony's-church");
    }

    #[test]
    fn test_derive_is_deterministic() {
        let a = HaltIdentifier::derive("Pettah Bus Stop", LatLng::new(6.9344, 79.8428));
        let b = HaltIdentifier::derive("Pettah Bus Stop", LatLng::new(6.9344, 79.8428));
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "pettah-bus-stop-6.9344N-79.8428E");
    }

    #[test]
    fn test_derive_differs_on_any_input() {
        let base = HaltIdentifier::derive("Pettah Bus Stop", LatLng::new(6.9344, 79.8428));
        let other_name = HaltIdentifier::derive("Pettah Bus Stand", LatLng::new(6.9344, 79.8428));
        let other_lat = HaltIdentifier::derive("Pettah Bus Stop", LatLng::new(6.9345, 79.8428));
        let other_lng = HaltIdentifier::derive("Pettah Bus Stop", LatLng::new(6.9344, 79.8429));

        assert_ne!(base, other_name);
        assert_ne!(base, other_lat);
        assert_ne!(base, other_lng);
    }

    #[test]
    fn test_derive_directional_suffixes() {
        let id = HaltIdentifier::derive("Plaza", LatLng::new(-33.86881, -151.20929));
        assert_eq!(id.as_str(), "plaza-33.8688S-151.2093W");
    }
}
