//! Recording settings read by the compositor every frame.
//!
//! These are plain values edited by the settings panel. Apart from the
//! custom output-size clamps applied in [`compute_output_size`], nothing here
//! is validated; the slider ranges below are UI bounds only.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::color::Rgba8;
use crate::geometry::{compute_output_size, Size};
use crate::presets::{
    aspect_preset, background_preset, AspectPreset, BackgroundPreset, CURSOR_COLORS,
};

/// Slider range for the camera bubble side, in container pixels.
pub const CAMERA_SIZE_RANGE: RangeInclusive<u32> = 120..=280;

/// Slider range for the bubble corner radius.
pub const CAMERA_RADIUS_RANGE: RangeInclusive<u32> = 0..=64;

/// Slider range for the padding around the drawing, in output pixels.
pub const CANVAS_PADDING_RANGE: RangeInclusive<u32> = 0..=160;

/// Everything the settings panel exposes to the compositor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecordingSettings {
    /// Selected [`AspectPreset`] identifier.
    pub aspect_id: String,

    /// Width used when the custom aspect is selected.
    pub custom_width: f64,

    /// Height used when the custom aspect is selected.
    pub custom_height: f64,

    /// Selected [`BackgroundPreset`] identifier.
    pub background_id: String,

    /// Draw the camera bubble into the recording.
    pub camera_enabled: bool,

    /// Bubble side length in container pixels.
    pub camera_size: f64,

    /// Bubble corner radius in output pixels (capped at half the side).
    pub camera_radius: f64,

    /// Space kept free around the drawing on every side, in output pixels.
    pub canvas_padding: f64,

    /// Draw the cursor highlight into the recording.
    pub cursor_enabled: bool,

    /// Highlight colour as `#rrggbb`.
    pub cursor_color: String,

    /// Presenter notes. Never composited into the recording.
    pub teleprompter: Teleprompter,
}

/// Script panel shown to the presenter while recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Teleprompter {
    /// Whether the panel is open.
    pub visible: bool,
    pub text: String,
}

impl Default for Teleprompter {
    fn default() -> Self {
        Self {
            visible: true,
            text: String::new(),
        }
    }
}

impl Teleprompter {
    pub fn toggle(&mut self) {
        self.visible = !self.visible;
    }

    /// The script to show, if the panel is open and holds any text.
    pub fn script(&self) -> Option<&str> {
        let text = self.text.trim();
        (self.visible && !text.is_empty()).then_some(text)
    }
}

impl Default for RecordingSettings {
    fn default() -> Self {
        Self {
            aspect_id: "16:9".to_string(),
            custom_width: 1280.0,
            custom_height: 720.0,
            background_id: "mint".to_string(),
            camera_enabled: true,
            camera_size: 180.0,
            camera_radius: 999.0,
            canvas_padding: 80.0,
            cursor_enabled: true,
            cursor_color: CURSOR_COLORS[0].to_string(),
            teleprompter: Teleprompter::default(),
        }
    }
}

impl RecordingSettings {
    pub fn aspect(&self) -> &'static AspectPreset {
        aspect_preset(&self.aspect_id)
    }

    pub fn background(&self) -> &'static BackgroundPreset {
        background_preset(&self.background_id)
    }

    /// Output frame size for the current aspect selection.
    pub fn output_size(&self) -> Size {
        compute_output_size(self.aspect(), self.custom_width, self.custom_height)
    }

    /// Parsed cursor colour, falling back to the first palette entry.
    pub fn cursor_rgba(&self) -> Rgba8 {
        Rgba8::parse_hex(&self.cursor_color).unwrap_or(Rgba8::rgb(0xff, 0x4d, 0x4f))
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SettingsError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Save settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::IoError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| SettingsError::ParseError {
            path: path.to_path_buf(),
            source: e,
        })?;
        std::fs::write(path, json).map_err(|e| SettingsError::IoError {
            path: path.to_path_buf(),
            source: e,
        })
    }
}

/// Errors that can occur when loading or saving settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("I/O error at {path}: {source}")]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
}
