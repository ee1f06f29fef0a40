//! Boardcast Capture Engine
//!
//! Runs real-time recording sessions: every display refresh the compositor
//! paints background, drawing, camera bubble, and cursor highlight into an
//! off-screen canvas; the canvas is sampled at the capture frame rate and
//! fed, together with microphone audio, to a media recorder whose encoded
//! chunks become one downloadable artifact.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │                      Studio                       │
//! │  ┌───────────┐  ┌─────────────┐  ┌─────────────┐  │
//! │  │ Drawing   │  │ Overlay     │  │ Camera/Mic  │  │
//! │  │ Surface   │  │ Reader      │  │ MediaStream │  │
//! │  └─────┬─────┘  └──────┬──────┘  └──────┬──────┘  │
//! │        ▼               ▼                ▼         │
//! │  ┌─────────────────────────────────────────────┐  │
//! │  │     FrameLoop (compositing, per refresh)    │  │
//! │  └──────────────────────┬──────────────────────┘  │
//! │                         ▼ 30 fps                  │
//! │  ┌─────────────────────────────────────────────┐  │
//! │  │ MediaRecorder ──events──▶ chunk pump        │  │
//! │  └──────────────────────┬──────────────────────┘  │
//! │                         ▼                         │
//! │                 RecordingArtifact                 │
//! └───────────────────────────────────────────────────┘
//! ```

pub mod artifact;
pub mod frame_loop;
pub mod media;
pub mod recorder;
pub mod session;

#[cfg(feature = "gstreamer")]
pub mod gst;

pub use artifact::*;
pub use media::*;
pub use recorder::*;
pub use session::*;
