//! Order-preserving deduplication for halts gathered from overlapping
//! searches.

use std::collections::HashMap;
use std::hash::Hash;

use itertools::Itertools;
use tracing::warn;

use crate::identifiers::{HaltIdentifier, HALT_COORD_PRECISION};
use crate::models::{Halt, LatLng};

/// Keep the first item for every key.
pub fn dedupe_by_key<T, K, F>(items: impl IntoIterator<Item = T>, key: F) -> Vec<T>
where
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> K,
{
    items.into_iter().unique_by(key).collect()
}

/// Fallback key for sources without a stable identifier: the trimmed
/// display name and the rounded position.
pub fn name_latlng_key(name: &str, latlng: LatLng) -> (String, (i64, i64)) {
    (name.trim().to_string(), latlng.key(HALT_COORD_PRECISION))
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DedupReport {
    pub input: usize,
    pub kept: usize,
    /// Dropped records that matched the kept halt exactly
    pub duplicates: usize,
    /// Identifiers shared by halts with different display names
    pub collisions: Vec<HaltIdentifier>,
}

/// Dedupe halts by identifier, first seen wins.
///
/// A later halt with the same identifier but a different display name is a
/// collision: it is dropped, logged and reported.
pub fn dedupe_halts(halts: impl IntoIterator<Item = Halt>) -> (Vec<Halt>, DedupReport) {
    let mut report = DedupReport::default();
    let mut kept: Vec<Halt> = Vec::new();
    let mut by_id: HashMap<HaltIdentifier, usize> = HashMap::new();

    for halt in halts {
        report.input += 1;
        match by_id.get(halt.id()) {
            Some(&position) => {
                let existing = &kept[position];
                if existing.name() == halt.name() {
                    report.duplicates += 1;
                } else {
                    warn!(
                        "Halt id collision on {}: keeping {:?}, dropping {:?}",
                        halt.id(),
                        existing.name(),
                        halt.name()
                    );
                    report.collisions.push(halt.id().clone());
                }
            }
            None => {
                by_id.insert(halt.id().clone(), kept.len());
                kept.push(halt);
            }
        }
    }

    report.kept = kept.len();
    (kept, report)
}
