use serde::{Deserialize, Serialize};

use crate::models::route::path_length_m;
use crate::models::types::LatLng;

/// A named sub-path, usually a cached directions result between two places.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub name: String,
    pub latlng_list: Vec<LatLng>,
}

impl Segment {
    pub fn new(name: impl Into<String>, latlng_list: Vec<LatLng>) -> Self {
        Self {
            name: name.into(),
            latlng_list,
        }
    }

    pub fn length_m(&self) -> f64 {
        path_length_m(&self.latlng_list)
    }
}

/// Read-only view over a list of segments.
#[derive(Clone, Debug, Default)]
pub struct SegmentCollection {
    segments: Vec<Segment>,
}

impl SegmentCollection {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.name == name)
    }

    pub fn total_length_m(&self) -> f64 {
        self.segments.iter().map(Segment::length_m).sum()
    }

    /// All points of all segments, in order. Consecutive duplicates at segment
    /// joins are dropped.
    pub fn joined_latlng_list(&self) -> Vec<LatLng> {
        let mut points: Vec<LatLng> = Vec::new();
        for segment in &self.segments {
            for point in &segment.latlng_list {
                if points.last() != Some(point) {
                    points.push(*point);
                }
            }
        }
        points
    }
}
