//! Transit data models and types.

pub mod halt;
pub mod route;
pub mod segment;
pub mod types;

// Re-exports for convenience
pub use halt::{Halt, HaltRecord};
pub use route::{line_string, Route};
pub use segment::{Segment, SegmentCollection};
pub use types::{Direction, LatLng, Result, RouteKey, TransitError};
