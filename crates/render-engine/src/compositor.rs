//! Frame compositor: combines background, drawing, camera bubble, and
//! cursor highlight.
//!
//! [`plan_frame`] turns settings and overlay state into output-space
//! geometry; [`render_frame`] paints a plan onto a [`Canvas`].

use boardcast_layout::{
    fit_centered, rounded_rect_path, BackgroundPreset, ContainerScale, Extent, OverlaySnapshot,
    Point, Rect, RecordingSettings, Rgba8, Size,
};
use image::RgbaImage;

use crate::background::paint_background;
use crate::canvas::Canvas;

/// Cursor highlight radius in output pixels. Not scaled with the container.
pub const CURSOR_HIGHLIGHT_RADIUS: f64 = 18.0;

/// Width of the highlight outline in output pixels.
pub const CURSOR_STROKE_WIDTH: f64 = 4.0;

/// Alpha of the highlight fill (the outline is opaque).
pub const CURSOR_FILL_ALPHA: u8 = 0x40;

/// Line segments per bubble corner when flattening the clip path.
const CORNER_STEPS: usize = 12;

/// One frame's composition instructions, in output pixels.
#[derive(Debug, Clone)]
pub struct FrameComposition {
    /// Size of the output surface.
    pub output: Size,

    /// Gradient painted first, over the whole surface.
    pub background: &'static BackgroundPreset,

    /// Where the drawing surface lands, if it is visible at all.
    pub drawing: Option<Rect>,

    /// Camera bubble placement, if enabled and the camera has a frame.
    pub camera: Option<CameraBubble>,

    /// Cursor highlight, if enabled and a pointer position is known.
    pub cursor: Option<CursorHighlight>,
}

/// Camera bubble instruction for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraBubble {
    /// Square bubble bounds.
    pub rect: Rect,
    /// Requested corner radius; the clip path caps it at half the side.
    pub corner_radius: f64,
}

/// Cursor highlight instruction for a single frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorHighlight {
    pub center: Point,
    pub radius: f64,
    pub fill: Rgba8,
    pub stroke: Rgba8,
    pub line_width: f64,
}

/// Compute the composition for one frame.
///
/// `drawing` is the pixel size of the current drawing-surface snapshot;
/// `camera_ready` says whether the camera has a frame to show.
pub fn plan_frame(
    settings: &RecordingSettings,
    output: Size,
    overlay: &OverlaySnapshot,
    drawing: Option<Extent>,
    camera_ready: bool,
) -> FrameComposition {
    let drawing = drawing.and_then(|extent| fit_centered(extent, output, settings.canvas_padding));
    let scale = ContainerScale::between(overlay.container, output);

    let camera = match scale {
        Some(scale) if settings.camera_enabled && camera_ready => {
            let side = settings.camera_size * scale.uniform();
            let origin = scale.map_point(overlay.camera);
            Some(CameraBubble {
                rect: Rect::new(origin.x, origin.y, side, side),
                corner_radius: settings.camera_radius,
            })
        }
        _ => None,
    };

    let cursor = match (scale, overlay.cursor) {
        (Some(scale), Some(pointer)) if settings.cursor_enabled => {
            let color = settings.cursor_rgba();
            Some(CursorHighlight {
                center: scale.map_point(pointer),
                radius: CURSOR_HIGHLIGHT_RADIUS,
                fill: color.with_alpha(CURSOR_FILL_ALPHA),
                stroke: color,
                line_width: CURSOR_STROKE_WIDTH,
            })
        }
        _ => None,
    };

    FrameComposition {
        output,
        background: settings.background(),
        drawing,
        camera,
        cursor,
    }
}

/// Pixel sources for one frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameSources<'a> {
    /// Snapshot of the whiteboard drawing surface.
    pub drawing: Option<&'a RgbaImage>,
    /// Latest camera frame.
    pub camera: Option<&'a RgbaImage>,
}

/// Paint a planned frame. The canvas is resized to the plan's output size
/// if it differs.
pub fn render_frame(canvas: &mut Canvas, plan: &FrameComposition, sources: FrameSources<'_>) {
    canvas.resize(plan.output);
    paint_background(canvas, plan.background);

    if let (Some(dest), Some(drawing)) = (plan.drawing, sources.drawing) {
        canvas.draw_image(drawing, dest);
    }

    if let (Some(bubble), Some(frame)) = (plan.camera, sources.camera) {
        let r = bubble.rect;
        let clip = rounded_rect_path(r.x, r.y, r.w, r.h, bubble.corner_radius);
        canvas.draw_image_clipped(frame, r, &clip.flatten(CORNER_STEPS));
    }

    if let Some(cursor) = plan.cursor {
        canvas.fill_circle(cursor.center, cursor.radius, cursor.fill);
        canvas.stroke_circle(cursor.center, cursor.radius, cursor.line_width, cursor.stroke);
    }
}

/// Plan and paint one frame from live inputs.
pub fn compose_frame(
    canvas: &mut Canvas,
    settings: &RecordingSettings,
    output: Size,
    overlay: &OverlaySnapshot,
    sources: FrameSources<'_>,
) -> FrameComposition {
    let drawing = sources
        .drawing
        .map(|image| Extent::new(image.width() as f64, image.height() as f64));
    let plan = plan_frame(settings, output, overlay, drawing, sources.camera.is_some());
    render_frame(canvas, &plan, sources);
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use proptest::prelude::*;

    fn overlay() -> OverlaySnapshot {
        let mut snapshot = OverlaySnapshot::new(Extent::new(1440.0, 900.0), 180.0);
        snapshot.cursor = Some(Point::new(720.0, 450.0));
        snapshot
    }

    #[test]
    fn camera_bubble_scales_position_per_axis_and_size_uniformly() {
        let plan = plan_frame(
            &RecordingSettings::default(),
            Size::new(1280, 720),
            &overlay(),
            None,
            true,
        );
        let bubble = plan.camera.unwrap();
        let sx = 1280.0 / 1440.0;
        let sy = 720.0 / 900.0;
        assert!((bubble.rect.x - 120.0 * sx).abs() < 1e-9);
        assert!((bubble.rect.y - 220.0 * sy).abs() < 1e-9);
        assert!((bubble.rect.w - 180.0 * sx.min(sy)).abs() < 1e-9);
        assert_eq!(bubble.rect.w, bubble.rect.h);
    }

    #[test]
    fn camera_skipped_when_disabled_or_not_ready() {
        let disabled = RecordingSettings {
            camera_enabled: false,
            ..Default::default()
        };
        let plan = plan_frame(&disabled, Size::new(1280, 720), &overlay(), None, true);
        assert!(plan.camera.is_none());

        let plan = plan_frame(
            &RecordingSettings::default(),
            Size::new(1280, 720),
            &overlay(),
            None,
            false,
        );
        assert!(plan.camera.is_none());
    }

    #[test]
    fn cursor_radius_is_fixed_in_output_space() {
        for output in [Size::new(1280, 720), Size::new(480, 360), Size::new(1920, 1920)] {
            let plan = plan_frame(&RecordingSettings::default(), output, &overlay(), None, false);
            let cursor = plan.cursor.unwrap();
            assert_eq!(cursor.radius, 18.0);
            assert_eq!(cursor.line_width, 4.0);
            assert_eq!(cursor.fill.a, 0x40);
            assert_eq!(cursor.stroke.a, 0xff);
        }
    }

    #[test]
    fn cursor_skipped_without_position() {
        let snapshot = OverlaySnapshot::new(Extent::new(1440.0, 900.0), 180.0);
        let plan = plan_frame(
            &RecordingSettings::default(),
            Size::new(1280, 720),
            &snapshot,
            None,
            false,
        );
        assert!(plan.cursor.is_none());
    }

    #[test]
    fn zero_area_container_drops_overlays_but_keeps_drawing() {
        let snapshot = OverlaySnapshot {
            container: Extent::new(0.0, 0.0),
            ..overlay()
        };
        let plan = plan_frame(
            &RecordingSettings::default(),
            Size::new(1280, 720),
            &snapshot,
            Some(Extent::new(1440.0, 900.0)),
            true,
        );
        assert!(plan.camera.is_none());
        assert!(plan.cursor.is_none());
        assert!(plan.drawing.is_some());
    }

    #[test]
    fn drawing_fits_inside_padding() {
        let plan = plan_frame(
            &RecordingSettings::default(),
            Size::new(1280, 720),
            &overlay(),
            Some(Extent::new(1440.0, 900.0)),
            false,
        );
        let rect = plan.drawing.unwrap();
        assert!(rect.x >= 80.0 - 1e-9 && rect.y >= 80.0 - 1e-9);
        assert!(rect.right() <= 1200.0 + 1e-9 && rect.bottom() <= 640.0 + 1e-9);
        assert!((rect.w / rect.h - 1.6).abs() < 1e-9);
    }

    #[test]
    fn compose_frame_layers_in_order() {
        let settings = RecordingSettings {
            canvas_padding: 0.0,
            cursor_enabled: false,
            camera_size: 20.0,
            camera_radius: 0.0,
            ..Default::default()
        };
        let output = Size::new(160, 90);
        let mut snapshot = OverlaySnapshot::new(Extent::new(160.0, 90.0), 20.0);
        snapshot.camera = Point::new(10.0, 10.0);

        let drawing = RgbaImage::from_pixel(16, 9, Rgba([0, 255, 0, 255]));
        let camera = RgbaImage::from_pixel(8, 8, Rgba([255, 0, 0, 255]));
        let mut canvas = Canvas::new(Size::new(1, 1));

        compose_frame(
            &mut canvas,
            &settings,
            output,
            &snapshot,
            FrameSources {
                drawing: Some(&drawing),
                camera: Some(&camera),
            },
        );

        assert_eq!(canvas.size(), output);
        // Drawing fills the frame, the bubble sits on top of it.
        assert_eq!(canvas.pixel(100, 60), Some(Rgba8::rgb(0, 255, 0)));
        assert_eq!(canvas.pixel(20, 20), Some(Rgba8::rgb(255, 0, 0)));
    }

    #[test]
    fn transparent_drawing_shows_background() {
        let settings = RecordingSettings {
            background_id: "paper".to_string(),
            cursor_enabled: false,
            camera_enabled: false,
            ..Default::default()
        };
        let drawing = RgbaImage::new(100, 100);
        let mut canvas = Canvas::new(Size::new(1, 1));
        compose_frame(
            &mut canvas,
            &settings,
            Size::new(480, 360),
            &overlay(),
            FrameSources {
                drawing: Some(&drawing),
                camera: None,
            },
        );
        let center = canvas.pixel(240, 180).unwrap();
        assert!(center.r > 0xf0 && center.a == 255, "{center:?}");
    }

    #[test]
    fn huge_bubble_from_tiny_container_fills_the_frame() {
        let settings = RecordingSettings {
            aspect_id: "1:1".to_string(),
            cursor_enabled: false,
            camera_radius: 0.0,
            ..Default::default()
        };
        let output = settings.output_size();
        let snapshot = OverlaySnapshot {
            container: Extent::new(10.0, 10.0),
            camera: Point::new(0.0, 0.0),
            ..overlay()
        };
        let camera = RgbaImage::from_pixel(640, 480, Rgba([200, 0, 0, 255]));
        let mut canvas = Canvas::new(Size::new(1, 1));

        let plan = compose_frame(
            &mut canvas,
            &settings,
            output,
            &snapshot,
            FrameSources {
                drawing: None,
                camera: Some(&camera),
            },
        );

        let bubble = plan.camera.unwrap();
        assert!(bubble.rect.w > 20_000.0, "{bubble:?}");
        assert_eq!(canvas.pixel(output.width / 2, output.height / 2), Some(Rgba8::rgb(200, 0, 0)));
    }

    proptest! {
        #[test]
        fn overlays_stay_proportional_for_any_container(
            w in 1.0f64..4000.0,
            h in 1.0f64..4000.0,
            cx in 0.0f64..1.0,
            cy in 0.0f64..1.0,
        ) {
            let snapshot = OverlaySnapshot {
                container: Extent::new(w, h),
                cursor: Some(Point::new(cx * w, cy * h)),
                ..overlay()
            };
            let output = Size::new(1280, 720);
            let plan = plan_frame(&RecordingSettings::default(), output, &snapshot, None, true);

            let bubble = plan.camera.unwrap();
            prop_assert!((bubble.rect.w - bubble.rect.h).abs() < 1e-9);
            prop_assert!(bubble.rect.w <= 180.0 * (1280.0 / w).max(720.0 / h) + 1e-9);

            let cursor = plan.cursor.unwrap();
            prop_assert_eq!(cursor.radius, CURSOR_HIGHLIGHT_RADIUS);
            prop_assert!(cursor.center.x >= -1e-9 && cursor.center.x <= 1280.0 + 1e-9);
            prop_assert!(cursor.center.y >= -1e-9 && cursor.center.y <= 720.0 + 1e-9);
        }
    }
}
