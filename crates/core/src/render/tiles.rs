//! Raster basemap tiles from an OSM-style `{z}/{x}/{y}` server.

use std::time::Duration;

use image::RgbaImage;
use reqwest::blocking::Client;
use tracing::debug;

use crate::clients::http_client;
use crate::error::Result;
use crate::render::mercator::TILE_SIZE;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    pub zoom: u8,
    pub x: u32,
    pub y: u32,
}

impl Tile {
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{z}", &self.zoom.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
    }

    /// Global pixel position of the tile's top-left corner.
    pub fn origin(&self) -> (f64, f64) {
        (f64::from(self.x) * TILE_SIZE, f64::from(self.y) * TILE_SIZE)
    }
}

pub struct TileSource {
    http: Client,
    url_template: String,
}

impl TileSource {
    pub fn new(url_template: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: http_client(timeout)?,
            url_template: url_template.into(),
        })
    }

    pub fn fetch(&self, tile: Tile) -> Result<RgbaImage> {
        let url = tile.url(&self.url_template);
        debug!("Fetching tile {url}");
        let bytes = self.http.get(&url).send()?.error_for_status()?.bytes()?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}
