//! Build steps for the bus data set: fetching route geometry, collecting
//! halts, manual halt entry and map rendering.

pub mod clients;
pub mod error;
pub mod halt_entry;
pub mod halt_harvester;
pub mod pipeline;
pub mod render;
pub mod route_builder;
pub mod segment_cache;
pub mod settings;

#[cfg(test)]
mod test_util;

pub use error::{Error, Result};
pub use halt_harvester::HaltHarvester;
pub use pipeline::{Pipeline, PlannedRoute, default_routes};
pub use render::{MapLayers, MapRenderer};
pub use route_builder::RouteBuilder;
pub use segment_cache::SegmentCache;
pub use settings::Settings;

pub use lanka_bus_transit as transit;
