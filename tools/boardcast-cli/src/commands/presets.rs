//! List the built-in presets.

use boardcast_layout::{
    compute_output_size, ASPECT_PRESETS, BACKGROUND_PRESETS, CAMERA_RADIUS_RANGE,
    CAMERA_SIZE_RANGE, CANVAS_PADDING_RANGE, CURSOR_COLORS,
};

pub fn run() -> anyhow::Result<()> {
    println!("Aspect presets:");
    for preset in &ASPECT_PRESETS {
        let size = compute_output_size(preset, 1280.0, 720.0);
        let note = if preset.is_custom() {
            " (default custom size)"
        } else {
            ""
        };
        println!(
            "  {:<7} {:<10} {:<14} {size}{note}",
            preset.id, preset.label, preset.subtitle
        );
    }

    println!();
    println!("Backgrounds:");
    for preset in &BACKGROUND_PRESETS {
        println!("  {:<7} {:<8} {}", preset.id, preset.label, preset.css());
    }

    println!();
    println!("Cursor colors: {}", CURSOR_COLORS.join(" "));

    println!();
    println!("Slider ranges:");
    println!(
        "  camera size {}..={}, camera radius {}..={}, padding {}..={}",
        CAMERA_SIZE_RANGE.start(),
        CAMERA_SIZE_RANGE.end(),
        CAMERA_RADIUS_RANGE.start(),
        CAMERA_RADIUS_RANGE.end(),
        CANVAS_PADDING_RANGE.start(),
        CANVAS_PADDING_RANGE.end()
    );
    Ok(())
}
