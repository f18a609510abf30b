//! Spatial indexing and query utilities.

pub mod index;
pub mod queries;

pub use index::HaltIndex;
pub use queries::{haversine_distance, EARTH_RADIUS_M};
