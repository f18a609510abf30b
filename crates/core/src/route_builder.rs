//! Builds route files, once per (route number, direction).

use std::sync::Arc;

use lanka_bus_transit::store::{read_route, write_route};
use lanka_bus_transit::{DataLayout, HaltIndex, LatLng, Route, RouteKey};
use tracing::{info, warn};

use crate::clients::{DirectionsService, RelationService};
use crate::error::{Error, Result};
use crate::segment_cache::SegmentCache;

pub struct RouteBuilder<'a> {
    layout: &'a DataLayout,
    halts: Arc<HaltIndex>,
    threshold_m: f64,
}

impl<'a> RouteBuilder<'a> {
    pub fn new(layout: &'a DataLayout, halts: Arc<HaltIndex>, threshold_m: f64) -> Self {
        Self {
            layout,
            halts,
            threshold_m,
        }
    }

    /// Build the route from a directions lookup between two named places.
    ///
    /// An existing route file is returned as is.
    pub fn build(
        &self,
        key: RouteKey,
        start_location: &str,
        end_location: &str,
        directions: &dyn DirectionsService,
    ) -> Result<Route> {
        self.build_with(key, |key| {
            SegmentCache::new(self.layout, directions).latlng_list(
                &key.route_num,
                start_location,
                end_location,
            )
        })
    }

    /// Build the route from the OpenStreetMap relation geometry.
    pub fn build_from_overpass(&self, key: RouteKey, relations: &dyn RelationService) -> Result<Route> {
        self.build_with(key, |key| {
            let latlng_list = relations.route_relation_latlng_list(&key.route_num)?;
            if latlng_list.is_empty() {
                return Err(Error::NoRelation {
                    route_num: key.route_num.to_string(),
                });
            }
            Ok(latlng_list)
        })
    }

    fn build_with<F>(&self, key: RouteKey, fetch_latlng_list: F) -> Result<Route>
    where
        F: FnOnce(&RouteKey) -> Result<Vec<LatLng>>,
    {
        let path = self.layout.route_path(&key);
        if path.exists() {
            warn!("Route {key} already exists at {}, not rebuilding", path.display());
            return Ok(read_route(&path)?);
        }

        let latlng_list = fetch_latlng_list(&key)?;
        let route = self.with_halt_names(Route::new(key, latlng_list));
        write_route(&path, &route)?;
        Ok(route)
    }

    /// Re-match halts against a stored route and save the result.
    pub fn attach_halt_names(&self, route: Route) -> Result<Route> {
        let route = self.with_halt_names(route);
        write_route(&self.layout.route_path(&route.key()), &route)?;
        Ok(route)
    }

    fn with_halt_names(&self, route: Route) -> Route {
        if self.halts.is_empty() {
            return route;
        }
        let names: Vec<String> = self
            .halts
            .nearby_halts(&route.latlng_list, self.threshold_m)
            .into_iter()
            .map(|halt| halt.name().to_string())
            .collect();
        info!("Route {} passes {} halts", route.key(), names.len());
        route.with_halt_names(names)
    }
}
