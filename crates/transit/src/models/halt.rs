use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::identifiers::{HaltIdentifier, HALT_COORD_PRECISION};
use crate::models::types::*;

/// A bus stop or station.
///
/// The identifier is always derived from the name and the rounded
/// coordinates; there is no way to build a `Halt` whose id disagrees with
/// them.
#[derive(Clone, Debug, PartialEq)]
pub struct Halt {
    id: HaltIdentifier,
    name: Arc<str>,
    latlng: LatLng,
}

/// On-disk shape of a halt: `{id, name, latlng: [lat, lng]}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HaltRecord {
    pub id: HaltIdentifier,
    pub name: String,
    pub latlng: LatLng,
}

impl Halt {
    pub fn new(name: impl AsRef<str>, latlng: LatLng) -> Self {
        let name = name.as_ref();
        let latlng = latlng.rounded(HALT_COORD_PRECISION);
        Self {
            id: HaltIdentifier::derive(name, latlng),
            name: name.into(),
            latlng,
        }
    }

    pub fn id(&self) -> &HaltIdentifier {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn latlng(&self) -> LatLng {
        self.latlng
    }

    /// Google Maps link for eyeballing a halt.
    pub fn maps_url(&self) -> String {
        format!(
            "https://www.google.com/maps?q={},{}",
            self.latlng.lat, self.latlng.lng
        )
    }
}

impl TryFrom<HaltRecord> for Halt {
    type Error = TransitError;

    fn try_from(record: HaltRecord) -> Result<Self> {
        let halt = Halt::new(&record.name, record.latlng);
        if halt.id != record.id {
            return Err(TransitError::IdMismatch {
                stored: record.id,
                derived: halt.id,
            });
        }
        Ok(halt)
    }
}

impl From<&Halt> for HaltRecord {
    fn from(halt: &Halt) -> Self {
        Self {
            id: halt.id.clone(),
            name: halt.name.to_string(),
            latlng: halt.latlng,
        }
    }
}
