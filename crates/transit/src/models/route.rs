use geo::LineString;
use serde::{Deserialize, Serialize};

use crate::identifiers::RouteNumber;
use crate::models::types::*;
use crate::spatial::queries::haversine_distance;

/// A numbered, directional bus route.
///
/// `halt_name_list` is only present once halts have been matched against the
/// path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub route_num: RouteNumber,
    pub direction: Direction,
    pub latlng_list: Vec<LatLng>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halt_name_list: Option<Vec<String>>,
}

impl Route {
    pub fn new(key: RouteKey, latlng_list: Vec<LatLng>) -> Self {
        Self {
            route_num: key.route_num,
            direction: key.direction,
            latlng_list,
            halt_name_list: None,
        }
    }

    pub fn key(&self) -> RouteKey {
        RouteKey::new(self.route_num.clone(), self.direction)
    }

    pub fn with_halt_names(mut self, names: Vec<String>) -> Self {
        self.halt_name_list = Some(names);
        self
    }

    /// Path as a geo LineString (x = lng, y = lat).
    pub fn geometry(&self) -> LineString {
        line_string(&self.latlng_list)
    }

    /// Length of the path in meters.
    pub fn length_m(&self) -> f64 {
        path_length_m(&self.latlng_list)
    }
}

pub fn line_string(points: &[LatLng]) -> LineString {
    points.iter().copied().map(geo::Point::from).collect()
}

pub fn path_length_m(points: &[LatLng]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_distance(pair[0], pair[1]))
        .sum()
}
