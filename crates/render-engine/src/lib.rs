//! Boardcast Render Engine
//!
//! Real-time compositor that paints one output frame from the whiteboard
//! drawing, the camera feed, and the overlay state.
//!
//! # Frame Layers
//!
//! ```text
//! background preset ──┐
//!                     ├── Gradient fill (full surface)
//! drawing surface ────┘         │
//!                               ├── Scaled drawing (fit inside padding)
//! camera frame ─────────────────┘         │
//!                                         ├── Bubble (rounded-rect clip)
//! cursor position ────────────────────────┘         │
//!                                                   ├── Highlight circle
//!                                                   ▼
//!                                             output canvas
//! ```
//!
//! Planning ([`compositor::plan_frame`]) is pure geometry; painting
//! ([`compositor::render_frame`]) touches pixels.

pub mod background;
pub mod canvas;
pub mod compositor;

pub use canvas::Canvas;
pub use compositor::*;
