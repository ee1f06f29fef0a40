//! Compose a single frame to PNG.

use std::path::PathBuf;

use anyhow::Context;
use boardcast_layout::{Extent, OverlaySnapshot, Point};
use boardcast_render_engine::{compose_frame, Canvas, FrameSources};

use super::load_settings;

pub struct PreviewArgs {
    pub drawing: PathBuf,
    pub out: PathBuf,
    pub settings: Option<PathBuf>,
    pub aspect: Option<String>,
    pub background: Option<String>,
    pub container: Extent,
    pub camera: Option<PathBuf>,
    pub camera_at: Option<Point>,
    pub cursor: Option<Point>,
}

pub fn run(args: PreviewArgs) -> anyhow::Result<()> {
    let mut settings = load_settings(args.settings.as_deref())?;
    if let Some(aspect) = args.aspect {
        settings.aspect_id = aspect;
    }
    if let Some(background) = args.background {
        settings.background_id = background;
    }

    let drawing = image::open(&args.drawing)
        .with_context(|| format!("Failed to open drawing {}", args.drawing.display()))?
        .to_rgba8();
    let camera = match &args.camera {
        Some(path) => Some(
            image::open(path)
                .with_context(|| format!("Failed to open camera frame {}", path.display()))?
                .to_rgba8(),
        ),
        None => None,
    };

    let mut overlay = OverlaySnapshot::new(args.container, settings.camera_size);
    if let Some(at) = args.camera_at {
        overlay.camera = at;
    }
    overlay.cursor = args.cursor;

    let output = settings.output_size();
    let mut canvas = Canvas::new(output);
    let plan = compose_frame(
        &mut canvas,
        &settings,
        output,
        &overlay,
        FrameSources {
            drawing: Some(&drawing),
            camera: camera.as_ref(),
        },
    );
    canvas.save(&args.out)?;

    println!("Wrote {} ({output})", args.out.display());
    if let Some(rect) = plan.drawing {
        println!(
            "  Drawing: {:.0}x{:.0} at ({:.0}, {:.0})",
            rect.w, rect.h, rect.x, rect.y
        );
    }
    if let Some(bubble) = plan.camera {
        println!(
            "  Camera:  {:.0}px at ({:.0}, {:.0})",
            bubble.rect.w, bubble.rect.x, bubble.rect.y
        );
    }
    if let Some(cursor) = plan.cursor {
        println!("  Cursor:  ({:.0}, {:.0})", cursor.center.x, cursor.center.y);
    }
    Ok(())
}
