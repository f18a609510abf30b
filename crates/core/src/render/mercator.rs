//! Web Mercator pixel math at 256 px tiles.

use std::f64::consts::PI;

use lanka_bus_transit::LatLng;

use crate::render::tiles::Tile;

pub const TILE_SIZE: f64 = 256.0;
pub const MAX_ZOOM: u8 = 17;

/// Beyond this the projection runs off to infinity.
const MAX_LATITUDE: f64 = 85.051_128_78;

fn world_size(zoom: u8) -> f64 {
    TILE_SIZE * f64::from(1u32 << zoom)
}

/// Global pixel position of `latlng` at `zoom`, origin at the north-west
/// corner of the world.
pub fn project(latlng: LatLng, zoom: u8) -> (f64, f64) {
    let size = world_size(zoom);
    let lat = latlng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (latlng.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    (x, y)
}

pub fn unproject(x: f64, y: f64, zoom: u8) -> LatLng {
    let size = world_size(zoom);
    let lng = x / size * 360.0 - 180.0;
    // y = 0 is the north edge, y = size the south edge
    let lat = (PI - 2.0 * PI * y / size).sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Largest zoom, up to `MAX_ZOOM`, at which every point fits inside a
/// `width` x `height` canvas with `padding` pixels left on each side.
pub fn fit_zoom(points: &[LatLng], width: u32, height: u32, padding: u32) -> u8 {
    let usable_w = f64::from(width.saturating_sub(2 * padding));
    let usable_h = f64::from(height.saturating_sub(2 * padding));
    (0..=MAX_ZOOM)
        .rev()
        .find(|&zoom| {
            let (min, max) = pixel_bounds(points, zoom);
            max.0 - min.0 <= usable_w && max.1 - min.1 <= usable_h
        })
        .unwrap_or(0)
}

fn pixel_bounds(points: &[LatLng], zoom: u8) -> ((f64, f64), (f64, f64)) {
    points.iter().map(|p| project(*p, zoom)).fold(
        ((f64::INFINITY, f64::INFINITY), (f64::NEG_INFINITY, f64::NEG_INFINITY)),
        |(min, max), (x, y)| ((min.0.min(x), min.1.min(y)), (max.0.max(x), max.1.max(y))),
    )
}

/// The part of the world a canvas shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub zoom: u8,
    /// Global pixel position of the canvas' top-left corner
    pub left: f64,
    pub top: f64,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// Centered on the points at the zoom `fit_zoom` picks. `None` for no
    /// points.
    pub fn fit(points: &[LatLng], width: u32, height: u32, padding: u32) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let zoom = fit_zoom(points, width, height, padding);
        let (min, max) = pixel_bounds(points, zoom);
        Some(Self {
            zoom,
            left: (min.0 + max.0 - f64::from(width)) / 2.0,
            top: (min.1 + max.1 - f64::from(height)) / 2.0,
            width,
            height,
        })
    }

    /// Canvas pixel position of `latlng`.
    pub fn to_pixel(&self, latlng: LatLng) -> (f64, f64) {
        let (x, y) = project(latlng, self.zoom);
        (x - self.left, y - self.top)
    }

    /// Tiles that cover the canvas, row by row.
    pub fn tiles(&self) -> Vec<Tile> {
        let last = (1u32 << self.zoom) - 1;
        let index = |pixel: f64| (pixel / TILE_SIZE).floor().clamp(0.0, f64::from(last)) as u32;

        let (x0, x1) = (index(self.left), index(self.left + f64::from(self.width) - 1.0));
        let (y0, y1) = (index(self.top), index(self.top + f64::from(self.height) - 1.0));
        (y0..=y1)
            .flat_map(|y| {
                (x0..=x1).map(move |x| Tile {
                    zoom: self.zoom,
                    x,
                    y,
                })
            })
            .collect()
    }
}
