//! RGBA software canvas with the handful of 2D operations the compositor
//! needs: gradient fills, scaled image draws, polygon clips, circles.
//!
//! Shapes are rasterized into 8-bit masks with `imageproc` and blended onto
//! the surface with `image::imageops::overlay`.

use std::path::Path;

use boardcast_common::error::{BoardcastError, BoardcastResult};
use boardcast_layout::{Point, Rect, Rgba8, Size};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_polygon_mut};
use imageproc::point::Point as PixelPoint;

/// Scaled tiles larger than this multiple of the canvas area are skipped.
/// Only a tiny source stretched far past the canvas gets there.
const MAX_TILE_OVERDRAW: u64 = 4;

/// An off-screen compositing surface.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// A transparent canvas.
    pub fn new(size: Size) -> Self {
        Self {
            image: RgbaImage::new(size.width, size.height),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }

    /// Resize the surface, clearing it. No-op when the size already matches.
    pub fn resize(&mut self, size: Size) {
        if self.size() != size {
            tracing::debug!(%size, "Canvas resized");
            self.image = RgbaImage::new(size.width, size.height);
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8> {
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        let Rgba([r, g, b, a]) = *self.image.get_pixel(x, y);
        Some(Rgba8 { r, g, b, a })
    }

    /// Overwrite every pixel with `shade(x + 0.5, y + 0.5)`.
    pub fn fill_with(&mut self, mut shade: impl FnMut(f64, f64) -> Rgba8) {
        for (x, y, pixel) in self.image.enumerate_pixels_mut() {
            let c = shade(x as f64 + 0.5, y as f64 + 0.5);
            *pixel = Rgba([c.r, c.g, c.b, c.a]);
        }
    }

    /// Draw `source` stretched into `dest` (source-over).
    pub fn draw_image(&mut self, source: &RgbaImage, dest: Rect) {
        self.draw_image_masked(source, dest, None);
    }

    /// Draw `source` stretched into `dest`, keeping only pixels inside the
    /// closed `clip` polygon (canvas coordinates).
    pub fn draw_image_clipped(&mut self, source: &RgbaImage, dest: Rect, clip: &[Point]) {
        self.draw_image_masked(source, dest, Some(clip));
    }

    fn draw_image_masked(&mut self, source: &RgbaImage, dest: Rect, clip: Option<&[Point]>) {
        let (src_w, src_h) = source.dimensions();
        let (w, h) = (dest.w.round(), dest.h.round());
        if !(w >= 1.0 && h >= 1.0) || src_w == 0 || src_h == 0 {
            return;
        }
        let (origin_x, origin_y) = (dest.x.round(), dest.y.round());

        // Only the source pixels that land on the canvas are scaled.
        let (Some(cols), Some(rows)) = (
            visible_slice(origin_x, w, src_w, self.image.width()),
            visible_slice(origin_y, h, src_h, self.image.height()),
        ) else {
            tracing::trace!(?dest, "Image outside canvas, skipped");
            return;
        };

        let tile_area = cols.dest_len as u64 * rows.dest_len as u64;
        let canvas_area = self.image.width() as u64 * self.image.height() as u64;
        if tile_area > canvas_area.max(1) * MAX_TILE_OVERDRAW {
            tracing::debug!(
                ?dest,
                source_width = src_w,
                source_height = src_h,
                "Scaled image too large for the canvas, skipped"
            );
            return;
        }

        let crop = imageops::crop_imm(source, cols.src_start, rows.src_start, cols.src_len, rows.src_len)
            .to_image();
        let mut tile = if crop.dimensions() == (cols.dest_len, rows.dest_len) {
            crop
        } else {
            imageops::resize(&crop, cols.dest_len, rows.dest_len, FilterType::Triangle)
        };

        if let Some(polygon) = clip {
            let mut mask = GrayImage::new(tile.width(), tile.height());
            let points = pixel_polygon(polygon, cols.dest_start as f64, rows.dest_start as f64);
            if points.len() >= 3 {
                draw_polygon_mut(&mut mask, &points, Luma([255u8]));
            }
            for (pixel, coverage) in tile.pixels_mut().zip(mask.pixels()) {
                pixel[3] = scale_alpha(pixel[3], coverage[0]);
            }
        }

        imageops::overlay(&mut self.image, &tile, cols.dest_start, rows.dest_start);
    }

    /// Fill a disc.
    pub fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        let radius = radius.round().max(0.0) as i32;
        self.paint_ring(center, radius, None, color);
    }

    /// Stroke a circle outline of `line_width`, centred on the radius.
    pub fn stroke_circle(&mut self, center: Point, radius: f64, line_width: f64, color: Rgba8) {
        let half = line_width.max(0.0) / 2.0;
        let outer = (radius + half).round().max(0.0) as i32;
        let inner = (radius - half).round() as i32;
        self.paint_ring(center, outer, Some(inner), color);
    }

    /// Paint the pixels within `outer` of `center` and, when given, beyond
    /// `inner`. Each pixel is blended once.
    fn paint_ring(&mut self, center: Point, outer: i32, inner: Option<i32>, color: Rgba8) {
        let side = 2 * outer as u32 + 1;
        let local = (outer, outer);
        let mut mask = GrayImage::new(side, side);
        draw_filled_circle_mut(&mut mask, local, outer, Luma([255u8]));
        if let Some(inner) = inner.filter(|r| *r >= 0) {
            draw_filled_circle_mut(&mut mask, local, inner, Luma([0u8]));
        }

        let tile = RgbaImage::from_fn(side, side, |x, y| {
            Rgba([color.r, color.g, color.b, scale_alpha(color.a, mask.get_pixel(x, y)[0])])
        });
        let x = center.x.round() as i64 - outer as i64;
        let y = center.y.round() as i64 - outer as i64;
        imageops::overlay(&mut self.image, &tile, x, y);
    }

    /// Write the canvas as an image file (format from the extension).
    pub fn save(&self, path: impl AsRef<Path>) -> BoardcastResult<()> {
        let path = path.as_ref();
        self.image
            .save(path)
            .map_err(|e| BoardcastError::render(format!("Failed to save {}: {e}", path.display())))
    }
}

/// Source pixels along one axis whose scaled image overlaps the canvas,
/// and where they land.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slice {
    src_start: u32,
    src_len: u32,
    dest_start: i64,
    dest_len: u32,
}

/// `origin` and `len` are the whole-pixel destination span of a source
/// `src_len` pixels long.
fn visible_slice(origin: f64, len: f64, src_len: u32, canvas_len: u32) -> Option<Slice> {
    let start = origin.max(0.0);
    let end = (origin + len).min(canvas_len as f64);
    if end <= start {
        return None;
    }

    let per_pixel = len / src_len as f64;
    let first = ((start - origin) / per_pixel).floor().max(0.0) as u32;
    let last = (((end - origin) / per_pixel).ceil() as u32).clamp(first + 1, src_len);

    let dest_start = (origin + first as f64 * per_pixel).round();
    let dest_end = (origin + last as f64 * per_pixel).round();
    Some(Slice {
        src_start: first,
        src_len: last - first,
        dest_start: dest_start as i64,
        dest_len: (dest_end - dest_start).max(1.0) as u32,
    })
}

/// Polygon vertices in whole pixels relative to `(dx, dy)`, with repeated
/// vertices and a closing duplicate dropped.
fn pixel_polygon(polygon: &[Point], dx: f64, dy: f64) -> Vec<PixelPoint<i32>> {
    let mut points: Vec<PixelPoint<i32>> = Vec::with_capacity(polygon.len());
    for p in polygon {
        let q = PixelPoint::new((p.x - dx).round() as i32, (p.y - dy).round() as i32);
        if points.last() != Some(&q) {
            points.push(q);
        }
    }
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    points
}

fn scale_alpha(alpha: u8, coverage: u8) -> u8 {
    (alpha as u16 * coverage as u16 / 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardcast_layout::rounded_rect_path;

    fn solid(size: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba(color))
    }

    #[test]
    fn resize_is_noop_for_same_size() {
        let mut canvas = Canvas::new(Size::new(4, 4));
        canvas.fill_with(|_, _| Rgba8::rgb(1, 2, 3));
        canvas.resize(Size::new(4, 4));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba8::rgb(1, 2, 3)));
        canvas.resize(Size::new(8, 2));
        assert_eq!(canvas.size(), Size::new(8, 2));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba8::rgb(0, 0, 0).with_alpha(0)));
    }

    #[test]
    fn draw_image_scales_into_destination() {
        let mut canvas = Canvas::new(Size::new(20, 20));
        canvas.fill_with(|_, _| Rgba8::rgb(255, 255, 255));
        canvas.draw_image(&solid(2, [255, 0, 0, 255]), Rect::new(5.0, 5.0, 10.0, 10.0));

        assert_eq!(canvas.pixel(10, 10), Some(Rgba8::rgb(255, 0, 0)));
        assert_eq!(canvas.pixel(4, 10), Some(Rgba8::rgb(255, 255, 255)));
        assert_eq!(canvas.pixel(15, 10), Some(Rgba8::rgb(255, 255, 255)));
    }

    #[test]
    fn transparent_source_leaves_background() {
        let mut canvas = Canvas::new(Size::new(10, 10));
        canvas.fill_with(|_, _| Rgba8::rgb(0, 0, 255));
        canvas.draw_image(&solid(10, [255, 0, 0, 0]), Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(canvas.pixel(5, 5), Some(Rgba8::rgb(0, 0, 255)));
    }

    #[test]
    fn draw_outside_bounds_is_ignored() {
        let mut canvas = Canvas::new(Size::new(10, 10));
        canvas.draw_image(&solid(4, [255, 0, 0, 255]), Rect::new(-20.0, 30.0, 4.0, 4.0));
        assert!(canvas.image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn partially_visible_image_keeps_its_placement() {
        let mut source = RgbaImage::from_pixel(4, 1, Rgba([255, 0, 0, 255]));
        source.put_pixel(2, 0, Rgba([0, 0, 255, 255]));
        source.put_pixel(3, 0, Rgba([0, 0, 255, 255]));

        let mut canvas = Canvas::new(Size::new(40, 10));
        canvas.draw_image(&source, Rect::new(-40.0, 0.0, 80.0, 10.0));

        // Source columns 2..4 cover canvas columns 0..40.
        assert_eq!(canvas.pixel(5, 5), Some(Rgba8::rgb(0, 0, 255)));
        assert_eq!(canvas.pixel(35, 5), Some(Rgba8::rgb(0, 0, 255)));
    }

    #[test]
    fn oversized_destination_only_scales_the_visible_part() {
        // A camera-sized frame stretched tens of thousands of pixels wide.
        let source = RgbaImage::from_pixel(640, 480, Rgba([0, 200, 0, 255]));
        let mut canvas = Canvas::new(Size::new(256, 256));
        canvas.draw_image(&source, Rect::new(-5000.0, -5000.0, 34560.0, 34560.0));
        assert!(canvas.image().pixels().all(|p| p.0 == [0, 200, 0, 255]));

        let cols = visible_slice(-5000.0, 34560.0, 640, 256).unwrap();
        assert!(cols.dest_len <= 256 + 2 * 54, "{cols:?}");
        assert!(cols.dest_start <= 0 && cols.dest_start + cols.dest_len as i64 >= 256);
    }

    #[test]
    fn tiny_source_blown_up_past_the_canvas_is_skipped() {
        let mut canvas = Canvas::new(Size::new(32, 32));
        canvas.draw_image(&solid(1, [255, 0, 0, 255]), Rect::new(-9000.0, -9000.0, 20000.0, 20000.0));
        assert!(canvas.image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn visible_slice_is_whole_source_when_fully_inside() {
        let slice = visible_slice(5.0, 10.0, 2, 20).unwrap();
        assert_eq!(
            slice,
            Slice {
                src_start: 0,
                src_len: 2,
                dest_start: 5,
                dest_len: 10,
            }
        );
        assert_eq!(visible_slice(-20.0, 4.0, 4, 10), None);
        assert_eq!(visible_slice(10.0, 4.0, 4, 10), None);
    }

    #[test]
    fn circular_clip_hides_corners() {
        let mut canvas = Canvas::new(Size::new(40, 40));
        canvas.fill_with(|_, _| Rgba8::rgb(255, 255, 255));
        let path = rounded_rect_path(0.0, 0.0, 40.0, 40.0, 999.0);
        canvas.draw_image_clipped(
            &solid(40, [0, 0, 0, 255]),
            Rect::new(0.0, 0.0, 40.0, 40.0),
            &path.flatten(16),
        );

        assert_eq!(canvas.pixel(20, 20), Some(Rgba8::rgb(0, 0, 0)));
        assert_eq!(canvas.pixel(0, 0), Some(Rgba8::rgb(255, 255, 255)));
        assert_eq!(canvas.pixel(39, 39), Some(Rgba8::rgb(255, 255, 255)));
    }

    #[test]
    fn degenerate_clip_draws_nothing() {
        let mut canvas = Canvas::new(Size::new(10, 10));
        let line = [Point::new(0.0, 0.0), Point::new(9.0, 9.0)];
        canvas.draw_image_clipped(&solid(10, [255, 0, 0, 255]), Rect::new(0.0, 0.0, 10.0, 10.0), &line);
        assert!(canvas.image().pixels().all(|p| p.0[3] == 0));
    }

    #[test]
    fn pixel_polygon_drops_duplicates_and_closing_vertex() {
        let polygon = [
            Point::new(0.0, 0.0),
            Point::new(0.2, 0.1),
            Point::new(8.0, 0.0),
            Point::new(8.0, 6.0),
            Point::new(0.0, 0.4),
        ];
        let points = pixel_polygon(&polygon, 0.0, 0.0);
        assert_eq!(
            points,
            vec![PixelPoint::new(0, 0), PixelPoint::new(8, 0), PixelPoint::new(8, 6)]
        );
    }

    #[test]
    fn circle_fill_and_stroke() {
        let mut canvas = Canvas::new(Size::new(60, 60));
        canvas.fill_with(|_, _| Rgba8::rgb(255, 255, 255));
        let center = Point::new(30.0, 30.0);
        canvas.fill_circle(center, 18.0, Rgba8::rgb(0, 0, 255).with_alpha(0x40));
        canvas.stroke_circle(center, 18.0, 4.0, Rgba8::rgb(0, 0, 255));

        // On the ring the stroke is opaque.
        assert_eq!(canvas.pixel(30, 11), Some(Rgba8::rgb(0, 0, 255)));
        // Inside, a translucent tint over white.
        let inner = canvas.pixel(30, 30).unwrap();
        assert!(inner.r < 255 && inner.r > 150, "{inner:?}");
        assert!(inner.b >= 254, "{inner:?}");
        // The fill is blended once, so the whole interior shares one tint.
        assert_eq!(canvas.pixel(25, 33), Some(inner));
        // Outside, untouched.
        assert_eq!(canvas.pixel(2, 2), Some(Rgba8::rgb(255, 255, 255)));
    }
}
