//! Minimal raster drawing on top of an `RgbaImage`.

use image::{Pixel, Rgba, RgbaImage};

/// Alpha-blend `color` over the pixel, ignoring positions off the canvas.
fn blend(canvas: &mut RgbaImage, x: i64, y: i64, color: Rgba<u8>) {
    let (Ok(x), Ok(y)) = (u32::try_from(x), u32::try_from(y)) else {
        return;
    };
    if x < canvas.width() && y < canvas.height() {
        canvas.get_pixel_mut(x, y).blend(&color);
    }
}

pub fn fill_disc(canvas: &mut RgbaImage, center: (f64, f64), radius: f64, color: Rgba<u8>) {
    let (cx, cy) = center;
    let r = radius.max(0.5);
    for y in (cy - r).floor() as i64..=(cy + r).ceil() as i64 {
        for x in (cx - r).floor() as i64..=(cx + r).ceil() as i64 {
            let (dx, dy) = (x as f64 + 0.5 - cx, y as f64 + 0.5 - cy);
            if dx * dx + dy * dy <= r * r {
                blend(canvas, x, y, color);
            }
        }
    }
}

/// Stroke a polyline `width` pixels wide. Pixels covered by more than one
/// stamp are blended once.
pub fn stroke_polyline(canvas: &mut RgbaImage, points: &[(f64, f64)], width: f64, color: Rgba<u8>) {
    let r = (width / 2.0).max(0.5);
    let mut covered = vec![false; canvas.width() as usize * canvas.height() as usize];
    let mut stamp = |canvas: &mut RgbaImage, (cx, cy): (f64, f64)| {
        for y in (cy - r).floor() as i64..=(cy + r).ceil() as i64 {
            for x in (cx - r).floor() as i64..=(cx + r).ceil() as i64 {
                if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
                    continue;
                }
                let (dx, dy) = (x as f64 + 0.5 - cx, y as f64 + 0.5 - cy);
                let i = y as usize * canvas.width() as usize + x as usize;
                if dx * dx + dy * dy <= r * r && !covered[i] {
                    covered[i] = true;
                    blend(canvas, x, y, color);
                }
            }
        }
    };

    if let [only] = points {
        stamp(canvas, *only);
    }
    for pair in points.windows(2) {
        let ((x0, y0), (x1, y1)) = (pair[0], pair[1]);
        let steps = ((x1 - x0).hypot(y1 - y0) * 2.0).ceil().max(1.0) as usize;
        for step in 0..=steps {
            let t = step as f64 / steps as f64;
            stamp(canvas, (x0 + (x1 - x0) * t, y0 + (y1 - y0) * t));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    #[test]
    fn test_fill_disc_clips_to_canvas() {
        let mut canvas = RgbaImage::from_pixel(10, 10, WHITE);
        fill_disc(&mut canvas, (0.0, 0.0), 3.0, RED);
        assert_eq!(*canvas.get_pixel(0, 0), RED);
        assert_eq!(*canvas.get_pixel(1, 1), RED);
        assert_eq!(*canvas.get_pixel(5, 5), WHITE);
    }

    #[test]
    fn test_stroke_polyline() {
        let mut canvas = RgbaImage::from_pixel(20, 20, WHITE);
        stroke_polyline(&mut canvas, &[(2.0, 10.0), (18.0, 10.0)], 2.0, RED);
        for x in 2..18 {
            assert_eq!(*canvas.get_pixel(x, 10), RED, "x = {x}");
        }
        assert_eq!(*canvas.get_pixel(10, 2), WHITE);
        assert_eq!(*canvas.get_pixel(10, 17), WHITE);
    }

    #[test]
    fn test_translucent_stroke_blends_once() {
        let mut canvas = RgbaImage::from_pixel(20, 20, WHITE);
        let half_red = Rgba([255, 0, 0, 128]);
        stroke_polyline(&mut canvas, &[(2.0, 10.0), (18.0, 10.0), (2.0, 10.0)], 4.0, half_red);
        let mut once = WHITE;
        once.blend(&half_red);
        assert_eq!(*canvas.get_pixel(10, 10), once);
    }
}
