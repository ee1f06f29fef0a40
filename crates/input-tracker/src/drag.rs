//! Drag state machine for a square overlay region.

use boardcast_layout::{Extent, Point, Rect};

/// Whether a drag gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    /// Dragging, with the pointer's offset from the region's top-left corner.
    Dragging { offset: Point },
}

/// Tracks pointer-driven repositioning of one draggable region.
///
/// The region stays fully inside its container while dragged:
/// `0 <= x <= container.width - size` (and likewise for y).
#[derive(Debug, Clone)]
pub struct DragTracker {
    position: Point,
    size: f64,
    state: DragState,
}

impl DragTracker {
    pub fn new(position: Point, size: f64) -> Self {
        Self {
            position,
            size,
            state: DragState::Idle,
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn region(&self) -> Rect {
        Rect::new(self.position.x, self.position.y, self.size, self.size)
    }

    /// Change the region's side length. The position is left untouched;
    /// the next drag move re-clamps it.
    pub fn set_size(&mut self, size: f64) {
        self.size = size;
    }

    /// Start dragging if `pointer` falls inside the region.
    /// Returns whether a drag started.
    pub fn pointer_down(&mut self, pointer: Point) -> bool {
        if !self.region().contains(pointer) {
            return false;
        }
        self.state = DragState::Dragging {
            offset: Point::new(pointer.x - self.position.x, pointer.y - self.position.y),
        };
        true
    }

    /// Follow the pointer while dragging. Returns the new position, or
    /// `None` when no drag is in progress.
    pub fn pointer_move(&mut self, pointer: Point, container: Extent) -> Option<Point> {
        let DragState::Dragging { offset } = self.state else {
            return None;
        };

        let max_x = container.width - self.size;
        let max_y = container.height - self.size;
        // min first, then max: a container smaller than the region pins it at 0.
        self.position = Point::new(
            (pointer.x - offset.x).min(max_x).max(0.0),
            (pointer.y - offset.y).min(max_y).max(0.0),
        );
        Some(self.position)
    }

    /// End any drag, wherever the pointer is.
    pub fn pointer_up(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const CONTAINER: Extent = Extent::new(1000.0, 600.0);

    #[test]
    fn pointer_down_outside_region_does_not_drag() {
        let mut drag = DragTracker::new(Point::new(120.0, 220.0), 180.0);
        assert!(!drag.pointer_down(Point::new(10.0, 10.0)));
        assert_eq!(drag.state(), DragState::Idle);
        assert_eq!(drag.pointer_move(Point::new(500.0, 300.0), CONTAINER), None);
        assert_eq!(drag.position(), Point::new(120.0, 220.0));
    }

    #[test]
    fn drag_preserves_grab_offset() {
        let mut drag = DragTracker::new(Point::new(120.0, 220.0), 180.0);
        assert!(drag.pointer_down(Point::new(150.0, 250.0)));
        assert_eq!(
            drag.pointer_move(Point::new(430.0, 330.0), CONTAINER),
            Some(Point::new(400.0, 300.0))
        );
    }

    #[test]
    fn drag_past_edges_stops_exactly_at_edges() {
        let mut drag = DragTracker::new(Point::new(120.0, 220.0), 180.0);
        drag.pointer_down(Point::new(130.0, 230.0));

        let pos = drag.pointer_move(Point::new(5000.0, 5000.0), CONTAINER).unwrap();
        assert_eq!(pos, Point::new(820.0, 420.0));

        let pos = drag.pointer_move(Point::new(-5000.0, -5000.0), CONTAINER).unwrap();
        assert_eq!(pos, Point::new(0.0, 0.0));
    }

    #[test]
    fn pointer_up_anywhere_ends_drag() {
        let mut drag = DragTracker::new(Point::new(0.0, 0.0), 100.0);
        drag.pointer_down(Point::new(50.0, 50.0));
        drag.pointer_up();
        assert!(!drag.is_dragging());
        assert_eq!(drag.pointer_move(Point::new(300.0, 300.0), CONTAINER), None);
    }

    #[test]
    fn container_smaller_than_region_pins_to_origin() {
        let mut drag = DragTracker::new(Point::new(0.0, 0.0), 280.0);
        drag.pointer_down(Point::new(10.0, 10.0));
        let pos = drag
            .pointer_move(Point::new(100.0, 100.0), Extent::new(200.0, 200.0))
            .unwrap();
        assert_eq!(pos, Point::new(0.0, 0.0));
    }

    proptest! {
        #[test]
        fn dragged_region_never_leaves_container(
            grab_x in 0.0f64..180.0,
            grab_y in 0.0f64..180.0,
            moves in proptest::collection::vec((-3000.0f64..3000.0, -3000.0f64..3000.0), 1..20),
        ) {
            let mut drag = DragTracker::new(Point::new(120.0, 220.0), 180.0);
            prop_assert!(drag.pointer_down(Point::new(120.0 + grab_x, 220.0 + grab_y)));
            for (x, y) in moves {
                let pos = drag.pointer_move(Point::new(x, y), CONTAINER).unwrap();
                prop_assert!(pos.x >= 0.0 && pos.x <= CONTAINER.width - 180.0);
                prop_assert!(pos.y >= 0.0 && pos.y <= CONTAINER.height - 180.0);
            }
        }
    }
}
