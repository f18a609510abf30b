//! R-tree index over halts.
//!
//! ## Two-Stage Filtering
//!
//! Queries use a two-stage filtering approach:
//! 1. **R-tree filter**: a degree-space bounding box around the query point
//!    that is guaranteed to contain every halt within the threshold
//! 2. **Haversine filter**: exact geodesic distance on the filtered halts
//!
//! Candidates are put back into collection order between the two stages, so
//! every answer is identical to a linear scan over the collection.

use std::collections::HashSet;

use rstar::{RTree, RTreeObject, AABB};

use crate::models::{Halt, LatLng};
use crate::spatial::queries::{bounding_half_widths, haversine_distance};

// ============================================================================
// Halt Spatial Node
// ============================================================================

#[derive(Clone, Debug)]
pub struct HaltNode {
    /// Position of the halt in the indexed collection
    pub position: usize,
    point: [f64; 2],
}

impl HaltNode {
    pub fn new(position: usize, latlng: LatLng) -> Self {
        Self {
            position,
            point: [latlng.lng, latlng.lat],
        }
    }
}

impl RTreeObject for HaltNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

// ============================================================================
// Halt Index
// ============================================================================

/// Immutable set of halts with proximity queries.
///
/// Halts keep the order they were given in; repeated identifiers keep their
/// first occurrence only.
#[derive(Clone, Debug)]
pub struct HaltIndex {
    halts: Vec<Halt>,
    tree: RTree<HaltNode>,
}

impl HaltIndex {
    pub fn new(halts: Vec<Halt>) -> Self {
        let mut seen = HashSet::new();
        let halts: Vec<Halt> = halts
            .into_iter()
            .filter(|halt| seen.insert(halt.id().clone()))
            .collect();

        let tree = RTree::bulk_load(
            halts
                .iter()
                .enumerate()
                .map(|(position, halt)| HaltNode::new(position, halt.latlng()))
                .collect(),
        );

        Self { halts, tree }
    }

    pub fn halts(&self) -> &[Halt] {
        &self.halts
    }

    pub fn len(&self) -> usize {
        self.halts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.halts.is_empty()
    }

    /// The halt nearest to `point`, if it lies within `max_distance_m`.
    ///
    /// On equal distances the halt earliest in the collection wins.
    pub fn closest_halt(&self, point: LatLng, max_distance_m: f64) -> Option<&Halt> {
        if !is_valid_threshold(max_distance_m) {
            return None;
        }

        let mut best: Option<(usize, f64)> = None;
        for position in self.candidates(point, max_distance_m) {
            let distance = haversine_distance(point, self.halts[position].latlng());
            if distance > max_distance_m {
                continue;
            }
            match best {
                Some((_, best_distance)) if best_distance <= distance => {}
                _ => best = Some((position, distance)),
            }
        }

        best.map(|(position, _)| &self.halts[position])
    }

    /// Halts lying within `threshold_m` of any point of `path`.
    ///
    /// Each halt appears at most once, ordered by the first path point it is
    /// near. Halts near the same path point keep collection order.
    pub fn nearby_halts(&self, path: &[LatLng], threshold_m: f64) -> Vec<&Halt> {
        if !is_valid_threshold(threshold_m) {
            return Vec::new();
        }

        let mut selected = vec![false; self.halts.len()];
        let mut result = Vec::new();
        for &point in path {
            for position in self.candidates(point, threshold_m) {
                if selected[position] {
                    continue;
                }
                if haversine_distance(point, self.halts[position].latlng()) <= threshold_m {
                    selected[position] = true;
                    result.push(&self.halts[position]);
                }
            }
        }
        result
    }

    /// Positions of every halt that may be within `radius_m`, ascending.
    fn candidates(&self, point: LatLng, radius_m: f64) -> Vec<usize> {
        let mut positions: Vec<usize> = match bounding_half_widths(point, radius_m) {
            Some((dlat, dlng)) => {
                let envelope = AABB::from_corners(
                    [point.lng - dlng, point.lat - dlat],
                    [point.lng + dlng, point.lat + dlat],
                );
                self.tree
                    .locate_in_envelope(&envelope)
                    .map(|node| node.position)
                    .collect()
            }
            None => (0..self.halts.len()).collect(),
        };
        positions.sort_unstable();
        positions
    }
}

fn is_valid_threshold(threshold_m: f64) -> bool {
    threshold_m >= 0.0 && threshold_m.is_finite()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halts() -> Vec<Halt> {
        vec![
            Halt::new("Kottawa", LatLng::new(6.8412, 79.9654)),
            Halt::new("Maharagama", LatLng::new(6.8480, 79.9265)),
            Halt::new("Nugegoda", LatLng::new(6.8649, 79.8997)),
            Halt::new("Borella", LatLng::new(6.9147, 79.8778)),
            Halt::new("Pettah", LatLng::new(6.9344, 79.8428)),
        ]
    }

    #[test]
    fn test_closest_halt_empty_index() {
        let index = HaltIndex::new(vec![]);
        assert!(index.is_empty());
        assert!(index.closest_halt(LatLng::new(6.9, 79.8), 10_000.0).is_none());
    }

    #[test]
    fn test_closest_halt_respects_threshold() {
        let index = HaltIndex::new(halts());
        // ~110 m north of Pettah
        let query = LatLng::new(6.9354, 79.8428);

        assert!(index.closest_halt(query, 50.0).is_none());
        let halt = index.closest_halt(query, 200.0).unwrap();
        assert_eq!(halt.name(), "Pettah");
    }

    #[test]
    fn test_closest_halt_picks_minimum() {
        let index = HaltIndex::new(halts());
        let query = LatLng::new(6.8470, 79.9280);
        let halt = index.closest_halt(query, 50_000.0).unwrap();
        assert_eq!(halt.name(), "Maharagama");
    }

    #[test]
    fn test_closest_halt_tie_goes_to_first() {
        let index = HaltIndex::new(vec![
            Halt::new("West", LatLng::new(0.0, -0.001)),
            Halt::new("East", LatLng::new(0.0, 0.001)),
        ]);
        let halt = index.closest_halt(LatLng::new(0.0, 0.0), 1_000.0).unwrap();
        assert_eq!(halt.name(), "West");
    }

    #[test]
    fn test_closest_halt_rejects_bad_threshold() {
        let index = HaltIndex::new(halts());
        let pettah = LatLng::new(6.9344, 79.8428);
        assert!(index.closest_halt(pettah, -1.0).is_none());
        assert!(index.closest_halt(pettah, f64::NAN).is_none());
        assert_eq!(index.closest_halt(pettah, 0.0).unwrap().name(), "Pettah");
    }

    #[test]
    fn test_nearby_halts_empty_inputs() {
        let index = HaltIndex::new(halts());
        assert!(index.nearby_halts(&[], 100.0).is_empty());

        let empty = HaltIndex::new(vec![]);
        assert!(empty
            .nearby_halts(&[LatLng::new(6.9344, 79.8428)], 100.0)
            .is_empty());
    }

    #[test]
    fn test_nearby_halts_follow_path_order() {
        let index = HaltIndex::new(halts());
        // Pettah towards Kottawa, passing by each halt, with repeats
        let path = vec![
            LatLng::new(6.9345, 79.8429),
            LatLng::new(6.9344, 79.8428),
            LatLng::new(6.9148, 79.8777),
            LatLng::new(6.8650, 79.8998),
            LatLng::new(6.9148, 79.8777),
            LatLng::new(6.8413, 79.9653),
        ];

        let names: Vec<&str> = index
            .nearby_halts(&path, 50.0)
            .into_iter()
            .map(Halt::name)
            .collect();
        assert_eq!(names, vec!["Pettah", "Borella", "Nugegoda", "Kottawa"]);
    }

    #[test]
    fn test_nearby_halts_never_repeat() {
        let mut input = halts();
        input.push(Halt::new("Pettah", LatLng::new(6.9344, 79.8428)));
        let index = HaltIndex::new(input);
        assert_eq!(index.len(), 5);

        let path: Vec<LatLng> = index.halts().iter().map(Halt::latlng).cycle().take(20).collect();
        let found = index.nearby_halts(&path, 5_000.0);

        let unique: HashSet<_> = found.iter().map(|h| h.id().clone()).collect();
        assert_eq!(unique.len(), found.len());
        assert_eq!(found.len(), 5);
    }

    #[test]
    fn test_matches_linear_scan() {
        let index = HaltIndex::new(halts());
        let queries = [
            LatLng::new(6.90, 79.88),
            LatLng::new(6.85, 79.95),
            LatLng::new(7.20, 80.10),
        ];
        for query in queries {
            for threshold in [100.0, 2_000.0, 8_000.0, 50_000.0] {
                let expected = index
                    .halts()
                    .iter()
                    .map(|h| (h, haversine_distance(query, h.latlng())))
                    .filter(|(_, d)| *d <= threshold)
                    .fold(None, |best: Option<(&Halt, f64)>, (h, d)| match best {
                        Some((_, bd)) if bd <= d => best,
                        _ => Some((h, d)),
                    })
                    .map(|(h, _)| h.id().clone());
                assert_eq!(
                    index.closest_halt(query, threshold).map(|h| h.id().clone()),
                    expected
                );
            }
        }
    }
}
