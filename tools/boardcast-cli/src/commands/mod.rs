pub mod check;
pub mod config;
pub mod presets;
pub mod preview;
pub mod record;
pub mod size;

use std::path::Path;

use boardcast_layout::{Extent, Point, RecordingSettings};

/// Parse `WxH` (e.g. `1280x720`).
pub fn parse_extent(s: &str) -> Result<Extent, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got {s:?}"))?;
    let width: f64 = w.trim().parse().map_err(|e| format!("bad width {w:?}: {e}"))?;
    let height: f64 = h.trim().parse().map_err(|e| format!("bad height {h:?}: {e}"))?;
    Ok(Extent::new(width, height))
}

/// Parse `X,Y` (e.g. `120,220`).
pub fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got {s:?}"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x {x:?}: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y {y:?}: {e}"))?;
    Ok(Point::new(x, y))
}

/// Settings from a JSON file, or defaults.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<RecordingSettings> {
    match path {
        Some(path) => RecordingSettings::load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load settings: {e}")),
        None => Ok(RecordingSettings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_accepts_either_x() {
        assert_eq!(parse_extent("1280x720").unwrap(), Extent::new(1280.0, 720.0));
        assert_eq!(parse_extent("640X480").unwrap(), Extent::new(640.0, 480.0));
        assert!(parse_extent("1280").is_err());
    }

    #[test]
    fn point_parses_decimals() {
        assert_eq!(parse_point("12.5, 40").unwrap(), Point::new(12.5, 40.0));
        assert!(parse_point("12;40").is_err());
    }
}
