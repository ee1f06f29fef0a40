//! Output-size resolution and 2D geometry for frame composition.

use serde::{Deserialize, Serialize};

use crate::presets::AspectPreset;

/// Long edge of every ratio-based output size.
pub const BASE_LONG_EDGE: u32 = 1280;

/// Allowed width range for the custom preset.
pub const CUSTOM_WIDTH_RANGE: (u32, u32) = (480, 1920);

/// Allowed height range for the custom preset.
pub const CUSTOM_HEIGHT_RANGE: (u32, u32) = (360, 1920);

/// Integer pixel dimensions of an output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl std::fmt::Display for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fractional width/height, used for on-screen containers and source images.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    pub width: f64,
    pub height: f64,
}

impl Extent {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Whether both sides are finite and strictly positive.
    pub fn is_drawable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// A 2D point in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }
}

/// Resolve the recorded frame size for an aspect preset.
///
/// The custom preset clamps each dimension independently; non-numeric
/// input (NaN) counts as zero and therefore lands on the minimum. Ratio
/// presets keep the long edge at [`BASE_LONG_EDGE`].
pub fn compute_output_size(preset: &AspectPreset, custom_width: f64, custom_height: f64) -> Size {
    if preset.is_custom() {
        return Size::new(
            clamp_dimension(custom_width, CUSTOM_WIDTH_RANGE),
            clamp_dimension(custom_height, CUSTOM_HEIGHT_RANGE),
        );
    }

    let base = BASE_LONG_EDGE as f64;
    if preset.ratio >= 1.0 {
        Size::new(BASE_LONG_EDGE, (base / preset.ratio).round() as u32)
    } else {
        Size::new((base * preset.ratio).round() as u32, BASE_LONG_EDGE)
    }
}

fn clamp_dimension(value: f64, (min, max): (u32, u32)) -> u32 {
    let value = if value.is_nan() { 0.0 } else { value.round() };
    value.clamp(min as f64, max as f64) as u32
}

/// Centre `source` inside `output` shrunk by `padding` on every side,
/// preserving the source aspect ratio.
///
/// Negative padding counts as zero. Returns `None` when nothing would be
/// visible (empty source or padding that swallows the whole output).
pub fn fit_centered(source: Extent, output: Size, padding: f64) -> Option<Rect> {
    if !source.is_drawable() {
        return None;
    }

    let padding = if padding.is_finite() { padding.max(0.0) } else { 0.0 };
    let target_w = output.width as f64 - padding * 2.0;
    let target_h = output.height as f64 - padding * 2.0;
    if target_w <= 0.0 || target_h <= 0.0 {
        return None;
    }

    let scale = (target_w / source.width).min(target_h / source.height);
    let w = source.width * scale;
    let h = source.height * scale;
    Some(Rect::new(
        (output.width as f64 - w) / 2.0,
        (output.height as f64 - h) / 2.0,
        w,
        h,
    ))
}

/// Independent horizontal/vertical factors mapping container pixels to
/// output pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContainerScale {
    pub x: f64,
    pub y: f64,
}

impl ContainerScale {
    /// `None` when the container has no area (nothing can be mapped).
    pub fn between(container: Extent, output: Size) -> Option<Self> {
        if !container.is_drawable() {
            return None;
        }
        Some(Self {
            x: output.width as f64 / container.width,
            y: output.height as f64 / container.height,
        })
    }

    /// Factor applied to lengths that must stay square (bubble side).
    pub fn uniform(&self) -> f64 {
        self.x.min(self.y)
    }

    pub fn map_point(&self, p: Point) -> Point {
        Point::new(p.x * self.x, p.y * self.y)
    }
}

/// One drawing command of a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathSegment {
    MoveTo(Point),
    LineTo(Point),
    QuadTo { ctrl: Point, to: Point },
    Close,
}

/// A single closed contour built from lines and quadratic curves.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub segments: Vec<PathSegment>,
}

impl Path {
    /// Flatten into a polygon, subdividing each quadratic curve into
    /// `curve_steps` lines. The closing edge is implicit.
    pub fn flatten(&self, curve_steps: usize) -> Vec<Point> {
        let steps = curve_steps.max(1);
        let mut points: Vec<Point> = Vec::new();
        let mut current = Point::default();

        for segment in &self.segments {
            match *segment {
                PathSegment::MoveTo(p) | PathSegment::LineTo(p) => {
                    points.push(p);
                    current = p;
                }
                PathSegment::QuadTo { ctrl, to } => {
                    for i in 1..=steps {
                        let t = i as f64 / steps as f64;
                        let mt = 1.0 - t;
                        points.push(Point::new(
                            mt * mt * current.x + 2.0 * mt * t * ctrl.x + t * t * to.x,
                            mt * mt * current.y + 2.0 * mt * t * ctrl.y + t * t * to.y,
                        ));
                    }
                    current = to;
                }
                PathSegment::Close => {}
            }
        }

        // Drop consecutive duplicates (zero-radius corners emit them).
        let same = |a: &Point, b: &Point| (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9;
        points.dedup_by(|a, b| same(a, b));
        if points.len() > 1 && same(&points[0], &points[points.len() - 1]) {
            points.pop();
        }
        points
    }
}

/// Effective corner radius: never negative, never more than half the
/// shorter side.
pub fn effective_corner_radius(w: f64, h: f64, r: f64) -> f64 {
    r.min(w / 2.0).min(h / 2.0).max(0.0)
}

/// Closed rounded-rectangle contour used to clip the camera bubble.
pub fn rounded_rect_path(x: f64, y: f64, w: f64, h: f64, r: f64) -> Path {
    let radius = effective_corner_radius(w, h, r);
    let p = Point::new;
    Path {
        segments: vec![
            PathSegment::MoveTo(p(x + radius, y)),
            PathSegment::LineTo(p(x + w - radius, y)),
            PathSegment::QuadTo {
                ctrl: p(x + w, y),
                to: p(x + w, y + radius),
            },
            PathSegment::LineTo(p(x + w, y + h - radius)),
            PathSegment::QuadTo {
                ctrl: p(x + w, y + h),
                to: p(x + w - radius, y + h),
            },
            PathSegment::LineTo(p(x + radius, y + h)),
            PathSegment::QuadTo {
                ctrl: p(x, y + h),
                to: p(x, y + h - radius),
            },
            PathSegment::LineTo(p(x, y + radius)),
            PathSegment::QuadTo {
                ctrl: p(x, y),
                to: p(x + radius, y),
            },
            PathSegment::Close,
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets::{aspect_preset, ASPECT_PRESETS};
    use proptest::prelude::*;

    #[test]
    fn square_preset_is_1280_square() {
        assert_eq!(
            compute_output_size(aspect_preset("1:1"), 0.0, 0.0),
            Size::new(1280, 1280)
        );
    }

    #[test]
    fn portrait_preset_fixes_height() {
        assert_eq!(
            compute_output_size(aspect_preset("9:16"), 0.0, 0.0),
            Size::new(720, 1280)
        );
        assert_eq!(
            compute_output_size(aspect_preset("3:4"), 0.0, 0.0),
            Size::new(960, 1280)
        );
    }

    #[test]
    fn landscape_presets_fix_width() {
        assert_eq!(
            compute_output_size(aspect_preset("16:9"), 0.0, 0.0),
            Size::new(1280, 720)
        );
        assert_eq!(
            compute_output_size(aspect_preset("4:3"), 0.0, 0.0),
            Size::new(1280, 960)
        );
    }

    #[test]
    fn custom_width_below_minimum_clamps() {
        let size = compute_output_size(aspect_preset("custom"), 100.0, 720.0);
        assert_eq!(size, Size::new(480, 720));
    }

    #[test]
    fn custom_non_numeric_input_lands_on_minimum() {
        let size = compute_output_size(aspect_preset("custom"), f64::NAN, f64::NAN);
        assert_eq!(size, Size::new(480, 360));
    }

    #[test]
    fn custom_rounds_fractional_input() {
        let size = compute_output_size(aspect_preset("custom"), 1000.4, 800.6);
        assert_eq!(size, Size::new(1000, 801));
    }

    #[test]
    fn fit_centered_letterboxes_wide_source() {
        let rect = fit_centered(Extent::new(1600.0, 900.0), Size::new(1280, 1280), 80.0).unwrap();
        assert!((rect.w - 1120.0).abs() < 1e-9);
        assert!((rect.h - 630.0).abs() < 1e-9);
        assert!((rect.x - 80.0).abs() < 1e-9);
        assert!((rect.y - 325.0).abs() < 1e-9);
    }

    #[test]
    fn fit_centered_treats_negative_padding_as_zero() {
        let rect = fit_centered(Extent::new(640.0, 360.0), Size::new(1280, 720), -50.0).unwrap();
        assert_eq!(rect, Rect::new(0.0, 0.0, 1280.0, 720.0));
    }

    #[test]
    fn fit_centered_rejects_swallowing_padding_and_empty_source() {
        assert!(fit_centered(Extent::new(640.0, 360.0), Size::new(480, 360), 200.0).is_none());
        assert!(fit_centered(Extent::new(0.0, 360.0), Size::new(1280, 720), 0.0).is_none());
    }

    #[test]
    fn container_scale_is_independent_per_axis() {
        let scale = ContainerScale::between(Extent::new(1440.0, 900.0), Size::new(1280, 720)).unwrap();
        assert!((scale.x - 1280.0 / 1440.0).abs() < 1e-12);
        assert!((scale.y - 0.8).abs() < 1e-12);
        assert!((scale.uniform() - 0.8).abs() < 1e-12);
        assert!(ContainerScale::between(Extent::new(0.0, 900.0), Size::new(1280, 720)).is_none());
    }

    #[test]
    fn rounded_rect_path_is_closed_and_starts_after_corner() {
        let path = rounded_rect_path(10.0, 20.0, 100.0, 50.0, 8.0);
        assert_eq!(
            path.segments.first(),
            Some(&PathSegment::MoveTo(Point::new(18.0, 20.0)))
        );
        assert_eq!(path.segments.last(), Some(&PathSegment::Close));
    }

    #[test]
    fn zero_radius_flattens_to_rectangle_corners() {
        let polygon = rounded_rect_path(0.0, 0.0, 10.0, 20.0, 0.0).flatten(4);
        assert_eq!(polygon.len(), 4);
        assert!(polygon.contains(&Point::new(10.0, 20.0)));
    }

    proptest! {
        #[test]
        fn ratio_presets_stay_within_one_pixel(index in 0usize..ASPECT_PRESETS.len()) {
            let preset = &ASPECT_PRESETS[index];
            prop_assume!(!preset.is_custom());
            let size = compute_output_size(preset, 0.0, 0.0);
            // Rounding the short edge moves the ratio by at most half a pixel.
            if preset.ratio >= 1.0 {
                let ideal_h = size.width as f64 / preset.ratio;
                prop_assert!((size.height as f64 - ideal_h).abs() <= 1.0);
            } else {
                let ideal_w = size.height as f64 * preset.ratio;
                prop_assert!((size.width as f64 - ideal_w).abs() <= 1.0);
            }
            prop_assert_eq!(size.width.max(size.height), BASE_LONG_EDGE);
        }

        #[test]
        fn custom_output_is_always_in_bounds(w in proptest::num::f64::ANY, h in proptest::num::f64::ANY) {
            let size = compute_output_size(aspect_preset("custom"), w, h);
            prop_assert!((480..=1920).contains(&size.width));
            prop_assert!((360..=1920).contains(&size.height));
        }

        #[test]
        fn corner_radius_never_exceeds_half_short_side(
            w in 0.0f64..2000.0,
            h in 0.0f64..2000.0,
            r in -100.0f64..5000.0,
        ) {
            let radius = effective_corner_radius(w, h, r);
            prop_assert!(radius <= w.min(h) / 2.0 + 1e-12);
            prop_assert!(radius >= 0.0);

            // The path's first point sits exactly one radius past the corner.
            let path = rounded_rect_path(0.0, 0.0, w, h, r);
            match path.segments[0] {
                PathSegment::MoveTo(p) => prop_assert!((p.x - radius).abs() < 1e-9),
                _ => prop_assert!(false, "path must start with MoveTo"),
            }
        }
    }
}
