//! 8-bit RGBA colours and `#rrggbb` parsing.

use serde::{Deserialize, Serialize};

/// A straight-alpha RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    /// Opaque colour from RGB components.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same colour with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Parse `#rrggbb` or `#rrggbbaa` (the leading `#` is optional).
    pub fn parse_hex(input: &str) -> Result<Self, ColorParseError> {
        let hex = input.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(ColorParseError {
                input: input.to_string(),
            });
        }

        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorParseError {
                input: input.to_string(),
            })
        };

        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }

    /// Lowercase `#rrggbb` form (alpha omitted).
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Linear interpolation between two colours, `t` clamped to [0, 1].
    pub fn lerp(a: Rgba8, b: Rgba8, t: f64) -> Rgba8 {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
        Rgba8 {
            r: mix(a.r, b.r),
            g: mix(a.g, b.g),
            b: mix(a.b, b.b),
            a: mix(a.a, b.a),
        }
    }
}

/// A string that is not a `#rrggbb[aa]` colour.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid colour {input:?}: expected #rrggbb or #rrggbbaa")]
pub struct ColorParseError {
    pub input: String,
}
