//! Boardcast Layout Model
//!
//! Defines the data contracts shared by the tracker, renderer, and capture
//! engine:
//! - **Geometry:** Output-size resolution, aspect-preserving fits, rounded
//!   rectangle clip paths
//! - **Presets:** Fixed aspect, background, and cursor-colour tables
//! - **Settings:** The plain configuration values read by the compositor
//! - **Overlay:** Camera bubble and cursor positions in container space
//!
//! Container coordinates are on-screen pixels; output coordinates are pixels
//! of the recorded frame. [`geometry::ContainerScale`] maps between them.

pub mod color;
pub mod geometry;
pub mod overlay;
pub mod presets;
pub mod settings;

pub use color::*;
pub use geometry::*;
pub use overlay::*;
pub use presets::*;
pub use settings::*;
