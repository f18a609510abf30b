//! Pluggable access to the external map services.
//!
//! Build steps only see these traits; the real clients talk HTTP and tests
//! substitute in-memory fakes.

pub mod google;
pub mod overpass;

use std::time::Duration;

use lanka_bus_transit::{LatLng, RouteNumber};

use crate::error::Result;

pub use google::GoogleMapsClient;
pub use overpass::OverpassClient;

/// Route geometry between two named places.
pub trait DirectionsService {
    /// Ordered path of the route numbered `route_num` from `start` to `end`.
    ///
    /// Fails with `Error::NoRoute` when the service has no route at all.
    fn route_latlng_list(
        &self,
        route_num: &RouteNumber,
        start_location: &str,
        end_location: &str,
    ) -> Result<Vec<LatLng>>;
}

/// A named place returned by a nearby search.
#[derive(Clone, Debug, PartialEq)]
pub struct Place {
    /// Stable service-side identifier, when the source has one
    pub place_id: Option<String>,
    pub name: String,
    pub latlng: LatLng,
}

#[derive(Clone, Debug)]
pub struct NearbyQuery<'a> {
    pub center: LatLng,
    pub radius_m: f64,
    pub place_type: &'a str,
    pub keyword: Option<&'a str>,
}

/// Places around a point.
pub trait PlacesService {
    /// All pages of results for `query`.
    fn nearby_places(&self, query: &NearbyQuery<'_>) -> Result<Vec<Place>>;
}

/// Transit relations from an open geographic database.
pub trait RelationService {
    /// Way geometry of the bus route relation tagged `ref=<route_num>`.
    fn route_relation_latlng_list(&self, route_num: &RouteNumber) -> Result<Vec<LatLng>>;
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::blocking::Client> {
    Ok(reqwest::blocking::Client::builder()
        .user_agent(concat!("lanka-bus/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()?)
}
