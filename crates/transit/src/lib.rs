//! # lanka-bus-transit
//!
//! Bus halts, routes and segments stored as flat JSON files, plus the
//! proximity matching that ties halts to route paths.
//!
//! ## Features
//!
//! - **Derived identifiers**: a halt's id is a pure function of its name and
//!   rounded coordinates, so independent builds merge cleanly
//! - **Spatial queries**: R-tree prefilter with exact Haversine distances
//! - **File cache**: halt files stay in memory until they change on disk
//!
//! ## Example
//!
//! ```
//! use lanka_bus_transit::prelude::*;
//!
//! let index = HaltIndex::new(vec![
//!     Halt::new("Pettah Bus Stop", LatLng::new(6.9344, 79.8428)),
//!     Halt::new("Borella", LatLng::new(6.9147, 79.8778)),
//! ]);
//!
//! let path = [LatLng::new(6.9345, 79.8429), LatLng::new(6.9148, 79.8777)];
//! let nearby = index.nearby_halts(&path, 50.0);
//! assert_eq!(nearby.len(), 2);
//! assert_eq!(nearby[0].id().as_str(), "pettah-bus-stop-6.9344N-79.8428E");
//! ```

pub mod dedup;
pub mod identifiers;
pub mod models;
pub mod spatial;
pub mod store;

// Re-exports for convenience
pub mod prelude {
    pub use crate::dedup::{dedupe_by_key, dedupe_halts, name_latlng_key, DedupReport};
    pub use crate::identifiers::*;
    pub use crate::models::{
        line_string, Direction, Halt, HaltRecord, LatLng, Result, Route, RouteKey, Segment,
        SegmentCollection, TransitError,
    };
    pub use crate::spatial::{haversine_distance, HaltIndex};
    pub use crate::store::{DataLayout, HaltCache};
}

pub use prelude::*;
