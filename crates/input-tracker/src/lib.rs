//! Boardcast Input Tracker
//!
//! Turns pointer events over the whiteboard container into overlay
//! positions for the compositor:
//!
//! - **Drag:** The camera bubble follows a pointer-down/move/up gesture,
//!   clamped to the container
//! - **Cursor:** The highlight mirrors the live pointer, no gesture needed
//!
//! Positions are published through a single-writer latest-value cell. The
//! compositor reads the newest [`OverlaySnapshot`] once per frame; stale
//! intermediate values are never queued.

pub mod cursor;
pub mod drag;
pub mod script;

use std::time::Duration;

use boardcast_layout::{Extent, OverlaySnapshot, Point, DEFAULT_CAMERA_POSITION};
use tokio::sync::watch;

pub use cursor::CursorFollower;
pub use drag::{DragState, DragTracker};
pub use script::{PointerEvent, PointerKind, PointerScript, TimedPointerEvent};

/// Owns the overlay gesture state and publishes snapshots.
pub struct OverlayTracker {
    container: Extent,
    drag: DragTracker,
    cursor: CursorFollower,
    tx: watch::Sender<OverlaySnapshot>,
}

impl OverlayTracker {
    /// Create a tracker for a container of the given size with the bubble
    /// at its default position.
    pub fn new(container: Extent, camera_size: f64) -> Self {
        let snapshot = OverlaySnapshot::new(container, camera_size);
        let (tx, _rx) = watch::channel(snapshot);
        Self {
            container,
            drag: DragTracker::new(DEFAULT_CAMERA_POSITION, camera_size),
            cursor: CursorFollower::new(),
            tx,
        }
    }

    /// A read handle for the compositor.
    pub fn reader(&self) -> OverlayReader {
        OverlayReader {
            rx: self.tx.subscribe(),
        }
    }

    /// The current state.
    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            container: self.container,
            camera: self.drag.position(),
            camera_size: self.drag.size(),
            cursor: self.cursor.position(),
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Apply one pointer event and publish the result.
    pub fn handle(&mut self, event: PointerEvent) {
        let pointer = event.position();
        match event.kind {
            PointerKind::Down => {
                if self.drag.pointer_down(pointer) {
                    tracing::debug!(x = pointer.x, y = pointer.y, "Camera drag started");
                }
            }
            PointerKind::Move => {
                self.drag.pointer_move(pointer, self.container);
                self.cursor.pointer_moved(pointer, self.container);
            }
            PointerKind::Up => {
                if self.drag.is_dragging() {
                    let Point { x, y } = self.drag.position();
                    tracing::debug!(x, y, "Camera drag ended");
                }
                self.drag.pointer_up();
            }
        }
        self.publish();
    }

    /// The container was resized (window resize, layout change).
    pub fn resize_container(&mut self, container: Extent) {
        self.container = container;
        self.publish();
    }

    /// The bubble size setting changed.
    pub fn set_camera_size(&mut self, size: f64) {
        self.drag.set_size(size);
        self.publish();
    }

    /// Replay a pointer script in real time until it ends or `true` is
    /// sent on `stop`. A pending wait for the next event is cut short by
    /// the stop. Returns the number of events applied.
    pub async fn replay(&mut self, script: &PointerScript, mut stop: watch::Receiver<bool>) -> u64 {
        let start = tokio::time::Instant::now();
        let mut applied = 0u64;

        for timed in script.events() {
            if *stop.borrow() {
                break;
            }
            tokio::select! {
                _ = tokio::time::sleep_until(start + Duration::from_millis(timed.t_ms)) => {}
                _ = stop_requested(&mut stop) => break,
            }
            self.handle(timed.event);
            applied += 1;
        }

        tracing::debug!(applied, "Pointer script replay finished");
        applied
    }

    fn publish(&self) {
        self.tx.send_replace(self.snapshot());
    }
}

/// Resolves once `true` is sent. A dropped sender never stops the replay.
async fn stop_requested(stop: &mut watch::Receiver<bool>) {
    let stopped = stop.wait_for(|stop| *stop).await.is_ok();
    if !stopped {
        std::future::pending::<()>().await;
    }
}

/// Read side of the overlay cell. Cheap to clone.
#[derive(Debug, Clone)]
pub struct OverlayReader {
    rx: watch::Receiver<OverlaySnapshot>,
}

impl OverlayReader {
    /// The most recently published snapshot.
    pub fn latest(&self) -> OverlaySnapshot {
        *self.rx.borrow()
    }
}
