//! Passive cursor-highlight follower.

use boardcast_layout::{Extent, Point};

/// Mirrors the live pointer position while it is over the container.
///
/// There is no gesture and no clamping. Once a position has been seen it
/// is kept after the pointer leaves, so the highlight stays where the
/// pointer exited.
#[derive(Debug, Clone, Default)]
pub struct CursorFollower {
    last: Option<Point>,
}

impl CursorFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known pointer position over the container.
    pub fn position(&self) -> Option<Point> {
        self.last
    }

    /// Record a pointer move. Returns whether the position changed.
    pub fn pointer_moved(&mut self, pointer: Point, container: Extent) -> bool {
        let over = pointer.x >= 0.0
            && pointer.y >= 0.0
            && pointer.x <= container.width
            && pointer.y <= container.height;
        if !over {
            return false;
        }
        self.last = Some(pointer);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn follows_pointer_inside_container() {
        let mut cursor = CursorFollower::new();
        assert!(cursor.position().is_none());
        assert!(cursor.pointer_moved(Point::new(10.0, 20.0), Extent::new(100.0, 100.0)));
        assert_eq!(cursor.position(), Some(Point::new(10.0, 20.0)));
    }

    #[test]
    fn keeps_last_position_after_leaving() {
        let mut cursor = CursorFollower::new();
        cursor.pointer_moved(Point::new(99.0, 50.0), Extent::new(100.0, 100.0));
        assert!(!cursor.pointer_moved(Point::new(140.0, 50.0), Extent::new(100.0, 100.0)));
        assert_eq!(cursor.position(), Some(Point::new(99.0, 50.0)));
    }
}
