//! Overlay positions in on-screen container space.

use serde::{Deserialize, Serialize};

use crate::geometry::{Extent, Point, Rect};

/// Initial top-left corner of the camera bubble.
pub const DEFAULT_CAMERA_POSITION: Point = Point::new(120.0, 220.0);

/// The latest overlay state, as read once per composited frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlaySnapshot {
    /// Size of the on-screen container the overlays live in.
    pub container: Extent,

    /// Top-left corner of the camera bubble.
    pub camera: Point,

    /// Bubble side length in container pixels.
    pub camera_size: f64,

    /// Last pointer position over the container, if any was seen.
    pub cursor: Option<Point>,
}

impl OverlaySnapshot {
    pub fn new(container: Extent, camera_size: f64) -> Self {
        Self {
            container,
            camera: DEFAULT_CAMERA_POSITION,
            camera_size,
            cursor: None,
        }
    }

    /// The bubble as a rectangle in container space.
    pub fn camera_rect(&self) -> Rect {
        Rect::new(
            self.camera.x,
            self.camera.y,
            self.camera_size,
            self.camera_size,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_snapshot_has_default_bubble_and_no_cursor() {
        let snapshot = OverlaySnapshot::new(Extent::new(1440.0, 900.0), 180.0);
        assert_eq!(snapshot.camera_rect(), Rect::new(120.0, 220.0, 180.0, 180.0));
        assert!(snapshot.cursor.is_none());
    }
}
