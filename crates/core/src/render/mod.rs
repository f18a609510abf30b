//! Route and halt maps: a PNG over a tile basemap, plus a GeoJSON sidecar
//! carrying the labels the raster can't.

pub mod canvas;
pub mod mercator;
pub mod style;
pub mod tiles;

use std::path::{Path, PathBuf};

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use image::{ImageFormat, RgbaImage, imageops};
use lanka_bus_transit::{Halt, HaltIndex, LatLng, Route, TransitError, line_string};
use tracing::{info, warn};

use crate::error::Result;
use crate::settings::Settings;

pub use mercator::Viewport;
pub use style::MapStyle;
pub use tiles::{Tile, TileSource};

/// Pixels kept clear around the drawn features.
const PADDING_PX: u32 = 32;

#[derive(Clone, Debug, PartialEq)]
pub struct LabelledPoint {
    pub label: String,
    pub latlng: LatLng,
}

/// What goes on one map.
#[derive(Clone, Debug, Default)]
pub struct MapLayers {
    pub title: String,
    pub line: Vec<LatLng>,
    pub points: Vec<LabelledPoint>,
}

impl MapLayers {
    /// The route line with the halts it passes.
    pub fn route(route: &Route, halts: &HaltIndex, threshold_m: f64) -> Self {
        Self {
            title: route.key().to_string(),
            line: route.latlng_list.clone(),
            points: halts
                .nearby_halts(&route.latlng_list, threshold_m)
                .into_iter()
                .map(LabelledPoint::from)
                .collect(),
        }
    }

    pub fn halts(halts: &[Halt]) -> Self {
        Self {
            title: "halts".into(),
            line: Vec::new(),
            points: halts.iter().map(LabelledPoint::from).collect(),
        }
    }

    fn all_latlngs(&self) -> Vec<LatLng> {
        self.line
            .iter()
            .copied()
            .chain(self.points.iter().map(|p| p.latlng))
            .collect()
    }
}

impl From<&Halt> for LabelledPoint {
    fn from(halt: &Halt) -> Self {
        Self {
            label: halt.name().to_string(),
            latlng: halt.latlng(),
        }
    }
}

pub struct MapRenderer {
    tiles: Option<TileSource>,
    style: MapStyle,
    width: u32,
    height: u32,
}

impl MapRenderer {
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self {
            tiles: Some(TileSource::new(&settings.tile_url, settings.http_timeout)?),
            style: MapStyle::default(),
            width: settings.image_width,
            height: settings.image_height,
        })
    }

    /// Draw over the plain background only.
    pub fn without_basemap(width: u32, height: u32) -> Self {
        Self {
            tiles: None,
            style: MapStyle::default(),
            width,
            height,
        }
    }

    pub fn with_style(mut self, style: MapStyle) -> Self {
        self.style = style;
        self
    }

    /// Draw `layers` to a PNG at `output` and write the GeoJSON sidecar next
    /// to it. Returns the sidecar path.
    pub fn render(&self, layers: &MapLayers, output: &Path) -> Result<PathBuf> {
        let Some(viewport) = Viewport::fit(&layers.all_latlngs(), self.width, self.height, PADDING_PX)
        else {
            return Err(TransitError::InvalidData(format!("Nothing to draw for {}", layers.title)).into());
        };

        let mut canvas = self.basemap(&viewport);

        let line: Vec<(f64, f64)> = layers.line.iter().map(|p| viewport.to_pixel(*p)).collect();
        canvas::stroke_polyline(
            &mut canvas,
            &line,
            self.style.line_width,
            style::to_pixel(self.style.line_color),
        );
        for point in &layers.points {
            let center = viewport.to_pixel(point.latlng);
            canvas::fill_disc(
                &mut canvas,
                center,
                self.style.point_radius + 1.5,
                style::to_pixel(self.style.point_outline),
            );
            canvas::fill_disc(
                &mut canvas,
                center,
                self.style.point_radius,
                style::to_pixel(self.style.point_fill),
            );
        }

        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }
        canvas.save_with_format(output, ImageFormat::Png)?;
        info!(
            "Wrote {} (zoom {}, {} points)",
            output.display(),
            viewport.zoom,
            layers.points.len()
        );

        let sidecar = sidecar_path(output);
        std::fs::write(&sidecar, sidecar_geojson(layers).to_string())?;
        Ok(sidecar)
    }

    fn basemap(&self, viewport: &Viewport) -> RgbaImage {
        let background = style::to_pixel(self.style.background);
        let mut canvas = RgbaImage::from_pixel(viewport.width, viewport.height, background);
        let Some(source) = &self.tiles else {
            return canvas;
        };

        for tile in viewport.tiles() {
            match source.fetch(tile) {
                Ok(image) => {
                    let (x, y) = tile.origin();
                    imageops::overlay(
                        &mut canvas,
                        &image,
                        (x - viewport.left).round() as i64,
                        (y - viewport.top).round() as i64,
                    );
                }
                Err(e) => {
                    warn!("Basemap unavailable ({e}), drawing on a plain background");
                    return RgbaImage::from_pixel(viewport.width, viewport.height, background);
                }
            }
        }
        canvas
    }
}

/// `images/halts.png` -> `images/halts.geojson`
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    image_path.with_extension("geojson")
}

fn position(latlng: LatLng) -> Vec<f64> {
    vec![latlng.lng, latlng.lat]
}

/// Line and labelled points as features; the map title sits on the
/// collection itself.
fn sidecar_geojson(layers: &MapLayers) -> GeoJson {
    let mut features = Vec::new();

    if !layers.line.is_empty() {
        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::from(&line_string(&layers.line)))),
            id: None,
            properties: None,
            foreign_members: None,
        });
    }

    for (index, point) in layers.points.iter().enumerate() {
        let mut properties = serde_json::Map::new();
        properties.insert("label".to_string(), serde_json::json!(point.label));
        properties.insert("index".to_string(), serde_json::json!(index));
        features.push(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::Point(position(point.latlng)))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        });
    }

    let mut collection_members = serde_json::Map::new();
    collection_members.insert("title".to_string(), serde_json::json!(layers.title));

    GeoJson::from(FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(collection_members),
    })
}

pub fn draw_route(
    renderer: &MapRenderer,
    route: &Route,
    halts: &HaltIndex,
    threshold_m: f64,
    output: &Path,
) -> Result<PathBuf> {
    renderer.render(&MapLayers::route(route, halts, threshold_m), output)
}

pub fn draw_halts(renderer: &MapRenderer, halts: &[Halt], output: &Path) -> Result<PathBuf> {
    renderer.render(&MapLayers::halts(halts), output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::test_util::temp_dir;
    use lanka_bus_transit::{Direction, RouteKey};

    fn route() -> Route {
        Route::new(
            RouteKey::new("138", Direction::Northbound),
            vec![
                LatLng::new(6.8412, 80.0022),
                LatLng::new(6.8500, 79.9500),
                LatLng::new(6.9344, 79.8428),
            ],
        )
    }

    #[test]
    fn test_render_route_writes_png_and_sidecar() {
        let dir = temp_dir("render-route");
        let output = dir.join("routes").join("138-northbound.png");
        let halts = HaltIndex::new(vec![
            Halt::new("Homagama", LatLng::new(6.8412, 80.0022)),
            Halt::new("Kandy", LatLng::new(7.2906, 80.6337)),
        ]);
        let renderer = MapRenderer::without_basemap(256, 192);

        let sidecar = draw_route(&renderer, &route(), &halts, 50.0, &output).unwrap();
        assert_eq!(sidecar, dir.join("routes").join("138-northbound.geojson"));

        let image = image::open(&output).unwrap();
        assert_eq!((image.width(), image.height()), (256, 192));

        let geojson: GeoJson = std::fs::read_to_string(&sidecar).unwrap().parse().unwrap();
        let GeoJson::FeatureCollection(collection) = geojson else {
            panic!("expected a feature collection");
        };
        assert_eq!(collection.features.len(), 2);
        match collection.features[0].geometry.as_ref().map(|g| &g.value) {
            Some(Value::LineString(line)) => {
                assert_eq!(line.len(), 3);
                // GeoJSON positions are [lng, lat]
                assert_eq!(line[0], vec![80.0022, 6.8412]);
            }
            other => panic!("expected the route line, got {other:?}"),
        }
        assert!(collection.features[0].properties.is_none());
        let title = collection
            .foreign_members
            .as_ref()
            .and_then(|members| members.get("title"))
            .and_then(|v| v.as_str());
        assert_eq!(title, Some("138-northbound"));
        let label = collection.features[1]
            .properties
            .as_ref()
            .and_then(|p| p.get("label"))
            .and_then(|v| v.as_str());
        assert_eq!(label, Some("Homagama"));
    }

    #[test]
    fn test_render_draws_line_pixels() {
        let dir = temp_dir("render-pixels");
        let output = dir.join("line.png");
        let renderer = MapRenderer::without_basemap(100, 100);
        let layers = MapLayers {
            title: "line".into(),
            line: vec![LatLng::new(6.90, 79.80), LatLng::new(6.90, 79.90)],
            points: vec![],
        };
        renderer.render(&layers, &output).unwrap();

        let image = image::open(&output).unwrap().to_rgba8();
        let background = style::to_pixel(MapStyle::default().background);
        assert_ne!(*image.get_pixel(50, 50), background);
        assert_eq!(*image.get_pixel(50, 5), background);
    }

    #[test]
    fn test_render_nothing_is_an_error() {
        let dir = temp_dir("render-empty");
        let renderer = MapRenderer::without_basemap(100, 100);
        assert!(matches!(
            draw_halts(&renderer, &[], &dir.join("halts.png")),
            Err(Error::Transit(TransitError::InvalidData(_)))
        ));
        assert!(!dir.join("halts.png").exists());
    }
}
