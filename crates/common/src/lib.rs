//! Boardcast Common Utilities
//!
//! Shared infrastructure for all Boardcast crates:
//! - Error types and result aliases
//! - Recording clock and capture-rate control
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
