//! CPU render surfaces.
//!
//! The renderer only needs four operations from the thing it draws on: its
//! size, a clear, and filled/stroked polygons in screen coordinates. Anything
//! implementing [`RenderSurface`] can be drawn on; [`Canvas`] is the shipped
//! RGBA image target used for headless runs and PNG capture.

use std::path::Path;

use cgmath::Point2;
use image::{Rgba, RgbaImage};

use crate::config::Rgb;
use crate::error::Result;

/// A 2D target the renderer draws polygons onto.
pub trait RenderSurface {
    /// Width and height in pixels.
    fn size(&self) -> (u32, u32);

    /// Fills the whole surface with one color.
    fn clear(&mut self, color: Rgb);

    /// Fills a simple polygon. Parts outside the surface are ignored.
    fn fill_polygon(&mut self, points: &[Point2<f32>], color: Rgb);

    /// Draws the closed outline of a polygon.
    fn stroke_polygon(&mut self, points: &[Point2<f32>], color: Rgb);
}

/// CPU-backed RGBA image surface.
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Color of one pixel; `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        self.image
            .get_pixel_checked(x, y)
            .map(|Rgba([r, g, b, _])| [*r, *g, *b])
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> &[[u8; 4]] {
        bytemuck::cast_slice(self.image.as_raw().as_slice())
    }

    /// Number of pixels in row `y` whose color is `color`.
    pub fn count_in_row(&self, y: u32, color: Rgb) -> usize {
        let width = self.image.width() as usize;
        let start = y as usize * width;
        self.pixels()
            .get(start..start + width)
            .map(|row| row.iter().filter(|p| p[..3] == color).count())
            .unwrap_or(0)
    }

    /// Writes the canvas as a PNG file.
    pub fn save_png(&self, path: &Path) -> Result<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }

    fn put(&mut self, x: i32, y: i32, color: Rgb) {
        if x >= 0 && y >= 0 && (x as u32) < self.image.width() && (y as u32) < self.image.height() {
            self.image
                .put_pixel(x as u32, y as u32, Rgba([color[0], color[1], color[2], 255]));
        }
    }

    /// Draw a line using Bresenham's algorithm
    fn draw_line(&mut self, from: Point2<f32>, to: Point2<f32>, color: Rgb) {
        let Some((from, to)) = clip_segment(from, to, self.image.width(), self.image.height())
        else {
            return;
        };
        let (x0, y0) = (from.x.round() as i32, from.y.round() as i32);
        let (x1, y1) = (to.x.round() as i32, to.y.round() as i32);

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let mut x = x0;
        let mut y = y0;

        loop {
            self.put(x, y, color);
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }
}

/// Clips a segment to the canvas rectangle (Liang-Barsky).
///
/// Projected points can lie far off-screen; clipping first keeps the line walk
/// proportional to the visible part.
fn clip_segment(
    from: Point2<f32>,
    to: Point2<f32>,
    width: u32,
    height: u32,
) -> Option<(Point2<f32>, Point2<f32>)> {
    let (dx, dy) = (to.x - from.x, to.y - from.y);
    let (max_x, max_y) = (width as f32 - 1.0, height as f32 - 1.0);
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;

    for (p, q) in [
        (-dx, from.x),
        (dx, max_x - from.x),
        (-dy, from.y),
        (dy, max_y - from.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let t = q / p;
        if p < 0.0 {
            t0 = t0.max(t);
        } else {
            t1 = t1.min(t);
        }
        if t0 > t1 {
            return None;
        }
    }

    Some((
        Point2::new(from.x + t0 * dx, from.y + t0 * dy),
        Point2::new(from.x + t1 * dx, from.y + t1 * dy),
    ))
}

impl RenderSurface for Canvas {
    fn size(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    fn clear(&mut self, color: Rgb) {
        let fill = Rgba([color[0], color[1], color[2], 255]);
        for pixel in self.image.pixels_mut() {
            *pixel = fill;
        }
    }

    /// Scanline fill with the even-odd rule, sampling at pixel centres.
    fn fill_polygon(&mut self, points: &[Point2<f32>], color: Rgb) {
        if points.len() < 3 {
            return;
        }
        let (width, height) = self.size();
        let min_y = points.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
        let max_y = points.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max);
        let first_row = (min_y - 0.5).ceil().max(0.0) as i32;
        let last_row = ((max_y - 0.5).floor()).min(height as f32 - 1.0) as i32;

        let mut crossings = Vec::with_capacity(points.len());
        for row in first_row..=last_row {
            let sample_y = row as f32 + 0.5;
            crossings.clear();
            for (i, a) in points.iter().enumerate() {
                let b = points[(i + 1) % points.len()];
                // Half-open in y so shared vertices are counted once.
                if (a.y <= sample_y) != (b.y <= sample_y) {
                    let t = (sample_y - a.y) / (b.y - a.y);
                    crossings.push(a.x + t * (b.x - a.x));
                }
            }
            crossings.sort_by(|a, b| a.total_cmp(b));

            for span in crossings.chunks_exact(2) {
                let start = (span[0] - 0.5).ceil().max(0.0) as i32;
                let end = (span[1] - 0.5).floor().min(width as f32 - 1.0) as i32;
                for x in start..=end {
                    self.put(x, row, color);
                }
            }
        }
    }

    fn stroke_polygon(&mut self, points: &[Point2<f32>], color: Rgb) {
        for (i, &from) in points.iter().enumerate() {
            let to = points[(i + 1) % points.len()];
            self.draw_line(from, to, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgb = [255, 0, 0];
    const BLUE: Rgb = [0, 0, 255];

    fn square(min: f32, max: f32) -> [Point2<f32>; 4] {
        [
            Point2::new(min, min),
            Point2::new(max, min),
            Point2::new(max, max),
            Point2::new(min, max),
        ]
    }

    #[test]
    fn clear_sets_every_pixel() {
        let mut canvas = Canvas::new(4, 3);
        canvas.clear(BLUE);
        assert!(canvas.pixels().iter().all(|p| *p == [0, 0, 255, 255]));
        assert_eq!(canvas.pixels().len(), 12);
    }

    #[test]
    fn fill_covers_pixel_centres_inside_the_polygon() {
        let mut canvas = Canvas::new(10, 10);
        canvas.clear(BLUE);
        canvas.fill_polygon(&square(2.0, 6.0), RED);

        assert_eq!(canvas.pixel(2, 2), Some(RED));
        assert_eq!(canvas.pixel(5, 5), Some(RED));
        assert_eq!(canvas.pixel(6, 6), Some(BLUE));
        assert_eq!(canvas.pixel(1, 3), Some(BLUE));
        let filled = canvas.pixels().iter().filter(|p| p[..3] == RED).count();
        assert_eq!(filled, 16);
    }

    #[test]
    fn fill_clips_huge_polygons() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill_polygon(&square(-1.0e6, 1.0e6), RED);
        assert!(canvas.pixels().iter().all(|p| p[..3] == RED));
    }

    #[test]
    fn stroke_draws_the_outline_only() {
        let mut canvas = Canvas::new(10, 10);
        canvas.clear(BLUE);
        canvas.stroke_polygon(&square(1.0, 8.0), RED);

        assert_eq!(canvas.pixel(1, 1), Some(RED));
        assert_eq!(canvas.pixel(8, 4), Some(RED));
        assert_eq!(canvas.pixel(4, 8), Some(RED));
        assert_eq!(canvas.pixel(4, 4), Some(BLUE));
    }

    #[test]
    fn stroke_off_screen_is_ignored() {
        let mut canvas = Canvas::new(10, 10);
        canvas.clear(BLUE);
        canvas.stroke_polygon(&square(20.0, 30.0), RED);
        assert!(canvas.pixels().iter().all(|p| p[..3] == BLUE));
    }

    #[test]
    fn counts_pixels_per_row() {
        let mut canvas = Canvas::new(6, 2);
        canvas.clear(BLUE);
        canvas.fill_polygon(&square(0.0, 1.0), RED);
        assert_eq!(canvas.count_in_row(0, RED), 1);
        assert_eq!(canvas.count_in_row(1, RED), 0);
        assert_eq!(canvas.count_in_row(5, RED), 0);
    }
}
