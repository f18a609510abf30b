use image::Rgba;
use palette::Srgba;

pub struct MapStyle {
    pub background: Srgba<f32>,
    pub line_color: Srgba<f32>,
    pub line_width: f64,
    pub point_fill: Srgba<f32>,
    pub point_outline: Srgba<f32>,
    pub point_radius: f64,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            background: Srgba::new(0.93, 0.93, 0.90, 1.0),
            line_color: Srgba::new(0.80, 0.10, 0.12, 0.85),
            line_width: 4.0,
            point_fill: Srgba::new(0.10, 0.35, 0.80, 1.0),
            point_outline: Srgba::new(1.0, 1.0, 1.0, 1.0),
            point_radius: 5.0,
        }
    }
}

pub fn to_pixel(color: Srgba<f32>) -> Rgba<u8> {
    let color: Srgba<u8> = color.into_format();
    Rgba([color.red, color.green, color.blue, color.alpha])
}
