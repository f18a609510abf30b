//! Spatial query utilities for distance calculations.
//!
//! Uses Haversine formula for accurate distances on Earth's surface.

use crate::models::types::LatLng;

/// Mean Earth radius used throughout, in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate Haversine distance between two points in meters
pub fn haversine_distance(a: LatLng, b: LatLng) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlng = (b.lng - a.lng).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS_M * c
}

/// Half-widths in degrees `(dlat, dlng)` of a box around `center` containing
/// every point within `radius_m`. `None` when the box would wrap a pole or
/// the antimeridian, in which case callers should scan everything.
pub fn bounding_half_widths(center: LatLng, radius_m: f64) -> Option<(f64, f64)> {
    let angular = radius_m / EARTH_RADIUS_M;
    let dlat = angular.to_degrees();
    if center.lat.abs() + dlat >= 90.0 {
        return None;
    }

    let ratio = angular.sin() / center.lat.to_radians().cos();
    if angular >= std::f64::consts::FRAC_PI_2 || ratio >= 1.0 {
        return None;
    }
    let dlng = ratio.asin().to_degrees();
    if center.lng.abs() + dlng >= 180.0 {
        return None;
    }

    // Pad for floating point error at the box edge
    const PAD: f64 = 1e-9;
    Some((dlat + PAD, dlng + PAD))
}
