//! Knobs shared by the build steps.

use std::path::PathBuf;
use std::time::Duration;

use lanka_bus_transit::DataLayout;

/// Name of the environment variable holding the Google Maps key.
pub const GMAPS_API_KEY_VAR: &str = "GMAPS_API_KEY";

#[derive(Clone, Debug)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub image_dir: PathBuf,

    /// Max distance between a route point and a halt for the halt to count
    /// as served by the route
    pub threshold_m: f64,

    /// Distance between consecutive places searches along a route
    pub sample_spacing_m: f64,
    pub search_radius_m: f64,
    pub place_type: String,
    pub place_keyword: Option<String>,
    /// Fixed wait before asking for the next page of places results
    pub page_delay: Duration,

    /// Area the Overpass relation search is restricted to
    pub overpass_area: String,
    pub overpass_url: String,

    pub tile_url: String,
    pub image_width: u32,
    pub image_height: u32,

    pub http_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            image_dir: PathBuf::from("images"),
            threshold_m: 50.0,
            sample_spacing_m: 500.0,
            search_radius_m: 500.0,
            place_type: "bus_station".into(),
            place_keyword: None,
            page_delay: Duration::from_secs(2),
            overpass_area: "Colombo".into(),
            overpass_url: "https://overpass-api.de/api/interpreter".into(),
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            image_width: 1024,
            image_height: 1024,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl Settings {
    pub fn layout(&self) -> DataLayout {
        DataLayout::new(&self.data_dir)
    }

    pub fn route_image_path(&self, key: &lanka_bus_transit::RouteKey) -> PathBuf {
        self.image_dir.join("routes").join(format!("{key}.png"))
    }

    pub fn halts_image_path(&self) -> PathBuf {
        self.image_dir.join("halts.png")
    }
}
