//! Fakes and scratch directories for tests.

use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};

use lanka_bus_transit::{LatLng, RouteNumber};

use crate::clients::{DirectionsService, NearbyQuery, Place, PlacesService, RelationService};
use crate::error::{Error, Result};

pub fn temp_dir(label: &str) -> PathBuf {
    static COUNTER: AtomicUsize = AtomicUsize::new(0);
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "lanka-bus-core-{}-{}-{}",
        label,
        std::process::id(),
        n
    ));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Returns a fixed path and records every call.
pub struct FakeDirections {
    pub path: Vec<LatLng>,
    pub calls: RefCell<Vec<(String, String, String)>>,
}

impl FakeDirections {
    pub fn new(path: Vec<LatLng>) -> Self {
        Self {
            path,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl DirectionsService for FakeDirections {
    fn route_latlng_list(
        &self,
        route_num: &RouteNumber,
        start_location: &str,
        end_location: &str,
    ) -> Result<Vec<LatLng>> {
        self.calls.borrow_mut().push((
            route_num.to_string(),
            start_location.to_string(),
            end_location.to_string(),
        ));
        if self.path.is_empty() {
            return Err(Error::NoRoute {
                start: start_location.into(),
                end: end_location.into(),
            });
        }
        Ok(self.path.clone())
    }
}

/// Returns a fixed relation path for every route number.
pub struct FakeRelations {
    pub path: Vec<LatLng>,
}

impl FakeRelations {
    pub fn new(path: Vec<LatLng>) -> Self {
        Self { path }
    }
}

impl RelationService for FakeRelations {
    fn route_relation_latlng_list(&self, _route_num: &RouteNumber) -> Result<Vec<LatLng>> {
        Ok(self.path.clone())
    }
}

/// Answers a nearby search with every known place inside the radius.
pub struct FakePlaces {
    pub places: Vec<Place>,
    pub queries: RefCell<Vec<LatLng>>,
}

impl FakePlaces {
    pub fn new(places: Vec<Place>) -> Self {
        Self {
            places,
            queries: RefCell::new(Vec::new()),
        }
    }
}

impl PlacesService for FakePlaces {
    fn nearby_places(&self, query: &NearbyQuery<'_>) -> Result<Vec<Place>> {
        self.queries.borrow_mut().push(query.center);
        Ok(self
            .places
            .iter()
            .filter(|p| {
                lanka_bus_transit::haversine_distance(query.center, p.latlng) <= query.radius_m
            })
            .cloned()
            .collect())
    }
}

pub fn place(place_id: Option<&str>, name: &str, lat: f64, lng: f64) -> Place {
    Place {
        place_id: place_id.map(String::from),
        name: name.to_string(),
        latlng: LatLng::new(lat, lng),
    }
}
