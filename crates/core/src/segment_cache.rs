//! File cache in front of the paid directions service.

use lanka_bus_transit::store::{read_segment_cache, write_segment_cache};
use lanka_bus_transit::{DataLayout, LatLng, RouteNumber};
use tracing::info;

use crate::clients::DirectionsService;
use crate::error::{Error, Result};

pub struct SegmentCache<'a> {
    layout: &'a DataLayout,
    directions: &'a dyn DirectionsService,
}

impl<'a> SegmentCache<'a> {
    pub fn new(layout: &'a DataLayout, directions: &'a dyn DirectionsService) -> Self {
        Self { layout, directions }
    }

    /// Path of `route_num` from `start_location` to `end_location`, from disk
    /// if it was fetched before.
    pub fn latlng_list(
        &self,
        route_num: &RouteNumber,
        start_location: &str,
        end_location: &str,
    ) -> Result<Vec<LatLng>> {
        let path = self
            .layout
            .segment_cache_path(route_num, start_location, end_location);
        if path.exists() {
            return Ok(read_segment_cache(&path)?);
        }

        info!("Fetching directions for {route_num}: {start_location} -> {end_location}");
        let latlng_list =
            self.directions
                .route_latlng_list(route_num, start_location, end_location)?;
        if latlng_list.is_empty() {
            return Err(Error::NoRoute {
                start: start_location.into(),
                end: end_location.into(),
            });
        }
        write_segment_cache(&path, &latlng_list)?;
        Ok(latlng_list)
    }
}
