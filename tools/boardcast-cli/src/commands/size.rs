//! Print the output size for an aspect preset.

use boardcast_layout::{aspect_preset, compute_output_size};

pub fn run(aspect: &str, width: f64, height: f64) -> anyhow::Result<()> {
    let preset = aspect_preset(aspect);
    if preset.id != aspect {
        tracing::warn!(requested = aspect, using = preset.id, "Unknown aspect preset");
    }
    let size = compute_output_size(preset, width, height);
    println!("{} ({}): {size}", preset.id, preset.label);
    Ok(())
}
