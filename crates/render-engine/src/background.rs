//! Gradient background painter.

use boardcast_layout::BackgroundPreset;

use crate::canvas::Canvas;

/// Fill the whole canvas with the preset's linear gradient.
///
/// Each pixel centre is projected onto the gradient axis; positions before
/// the start or past the end take the first or last stop colour.
pub fn paint_background(canvas: &mut Canvas, preset: &BackgroundPreset) {
    let size = canvas.size();
    let (start, end) = preset
        .axis
        .endpoints(size.width as f64, size.height as f64);
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let len_sq = dx * dx + dy * dy;

    if len_sq <= f64::EPSILON {
        let color = preset.color_at(0.0);
        canvas.fill_with(|_, _| color);
        return;
    }

    canvas.fill_with(|x, y| {
        let t = ((x - start.x) * dx + (y - start.y) * dy) / len_sq;
        preset.color_at(t)
    });
}
