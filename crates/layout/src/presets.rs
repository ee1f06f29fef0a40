//! Fixed preset tables: aspect ratios, gradient backgrounds, cursor colours.
//!
//! Presets are closed sets looked up by identifier. Unknown identifiers fall
//! back to the first entry of the table.

use crate::color::Rgba8;
use crate::geometry::Point;

/// A named output aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AspectPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub subtitle: &'static str,
    /// Width divided by height.
    pub ratio: f64,
}

/// Identifier of the free-form size preset.
pub const CUSTOM_ASPECT_ID: &str = "custom";

impl AspectPreset {
    /// Whether the output size comes from explicit width/height.
    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_ASPECT_ID
    }
}

pub static ASPECT_PRESETS: [AspectPreset; 6] = [
    AspectPreset {
        id: "16:9",
        label: "16:9",
        subtitle: "YouTube",
        ratio: 16.0 / 9.0,
    },
    AspectPreset {
        id: "4:3",
        label: "4:3",
        subtitle: "Classic",
        ratio: 4.0 / 3.0,
    },
    AspectPreset {
        id: "3:4",
        label: "3:4",
        subtitle: "RedNote",
        ratio: 3.0 / 4.0,
    },
    AspectPreset {
        id: "9:16",
        label: "9:16",
        subtitle: "TikTok",
        ratio: 9.0 / 16.0,
    },
    AspectPreset {
        id: "1:1",
        label: "1:1",
        subtitle: "Square",
        ratio: 1.0,
    },
    AspectPreset {
        id: CUSTOM_ASPECT_ID,
        label: "Custom",
        subtitle: "Your size",
        ratio: 16.0 / 9.0,
    },
];

/// Look up an aspect preset, falling back to `16:9`.
pub fn aspect_preset(id: &str) -> &'static AspectPreset {
    ASPECT_PRESETS
        .iter()
        .find(|preset| preset.id == id)
        .unwrap_or(&ASPECT_PRESETS[0])
}

/// Where a linear gradient starts and ends on the painted surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientAxis {
    /// (0, 0) to (w, h).
    TopLeftToBottomRight,
    /// (w, 0) to (0, h).
    TopRightToBottomLeft,
    /// (0, h) to (w, 0).
    BottomLeftToTopRight,
}

impl GradientAxis {
    /// Start and end points for a surface of `width` x `height`.
    pub fn endpoints(self, width: f64, height: f64) -> (Point, Point) {
        match self {
            Self::TopLeftToBottomRight => (Point::new(0.0, 0.0), Point::new(width, height)),
            Self::TopRightToBottomLeft => (Point::new(width, 0.0), Point::new(0.0, height)),
            Self::BottomLeftToTopRight => (Point::new(0.0, height), Point::new(width, 0.0)),
        }
    }
}

/// A colour at an offset in [0, 1] along a gradient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub offset: f64,
    pub color: Rgba8,
}

const fn stop(offset: f64, r: u8, g: u8, b: u8) -> ColorStop {
    ColorStop {
        offset,
        color: Rgba8::rgb(r, g, b),
    }
}

/// A named gradient wallpaper painted behind the drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundPreset {
    pub id: &'static str,
    pub label: &'static str,
    pub axis: GradientAxis,
    /// Stops sorted by offset.
    pub stops: &'static [ColorStop],
}

impl BackgroundPreset {
    /// CSS rendition of the gradient for UI swatches.
    pub fn css(&self) -> String {
        let stops = self
            .stops
            .iter()
            .map(|s| format!("{} {}%", s.color.to_hex(), (s.offset * 100.0).round()))
            .collect::<Vec<_>>()
            .join(", ");
        format!("linear-gradient(135deg, {stops})")
    }

    /// Colour at position `t` along the gradient axis (clamped).
    pub fn color_at(&self, t: f64) -> Rgba8 {
        let Some(first) = self.stops.first() else {
            return Rgba8::rgb(255, 255, 255);
        };
        if t <= first.offset {
            return first.color;
        }
        for pair in self.stops.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if t <= b.offset {
                let span = b.offset - a.offset;
                if span <= f64::EPSILON {
                    return b.color;
                }
                return Rgba8::lerp(a.color, b.color, (t - a.offset) / span);
            }
        }
        self.stops[self.stops.len() - 1].color
    }
}

pub static BACKGROUND_PRESETS: [BackgroundPreset; 5] = [
    BackgroundPreset {
        id: "mint",
        label: "Mint",
        axis: GradientAxis::TopLeftToBottomRight,
        stops: &[
            stop(0.0, 0xf6, 0xf8, 0xff),
            stop(0.48, 0xc7, 0xf9, 0xe9),
            stop(1.0, 0xf8, 0xd9, 0xff),
        ],
    },
    BackgroundPreset {
        id: "sunset",
        label: "Sunset",
        axis: GradientAxis::TopRightToBottomLeft,
        stops: &[
            stop(0.0, 0xff, 0xf2, 0xe6),
            stop(0.5, 0xff, 0x99, 0xbb),
            stop(1.0, 0x6b, 0x8c, 0xff),
        ],
    },
    BackgroundPreset {
        id: "aurora",
        label: "Aurora",
        axis: GradientAxis::BottomLeftToTopRight,
        stops: &[
            stop(0.0, 0x06, 0x29, 0x4c),
            stop(0.45, 0x00, 0xb3, 0xb8),
            stop(1.0, 0xc2, 0xf9, 0x70),
        ],
    },
    BackgroundPreset {
        id: "blush",
        label: "Blush",
        axis: GradientAxis::TopLeftToBottomRight,
        stops: &[
            stop(0.0, 0xfd, 0xe2, 0xe4),
            stop(0.5, 0xe2, 0xf0, 0xff),
            stop(1.0, 0xd0, 0xf4, 0xde),
        ],
    },
    BackgroundPreset {
        id: "paper",
        label: "Paper",
        axis: GradientAxis::TopLeftToBottomRight,
        stops: &[stop(0.0, 0xff, 0xff, 0xff), stop(1.0, 0xf4, 0xf1, 0xec)],
    },
];

/// Look up a background preset, falling back to `mint`.
pub fn background_preset(id: &str) -> &'static BackgroundPreset {
    BACKGROUND_PRESETS
        .iter()
        .find(|preset| preset.id == id)
        .unwrap_or(&BACKGROUND_PRESETS[0])
}

/// Palette offered for the cursor highlight.
pub const CURSOR_COLORS: [&str; 7] = [
    "#ff4d4f", "#ff8f1f", "#ffcc00", "#2cc56f", "#2f7cff", "#8b5cf6", "#f43f5e",
];
