//! Error types shared across Boardcast crates.

use std::path::PathBuf;

/// Top-level error type for Boardcast operations.
#[derive(Debug, thiserror::Error)]
pub enum BoardcastError {
    #[error("Capture error: {message}")]
    Capture { message: String },

    #[error("Recorder error: {message}")]
    Recorder { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Device error: {message}")]
    Device { message: String },

    #[error("Not ready: {message}")]
    NotReady { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Permission denied: {message}")]
    PermissionDenied { message: String },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using BoardcastError.
pub type BoardcastResult<T> = Result<T, BoardcastError>;

impl BoardcastError {
    pub fn capture(msg: impl Into<String>) -> Self {
        Self::Capture {
            message: msg.into(),
        }
    }

    pub fn recorder(msg: impl Into<String>) -> Self {
        Self::Recorder {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn device(msg: impl Into<String>) -> Self {
        Self::Device {
            message: msg.into(),
        }
    }

    pub fn not_ready(msg: impl Into<String>) -> Self {
        Self::NotReady {
            message: msg.into(),
        }
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::PermissionDenied {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }

    /// Whether this error came from a camera/microphone permission prompt.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_category() {
        let err = BoardcastError::not_ready("drawing surface missing");
        assert_eq!(err.to_string(), "Not ready: drawing surface missing");
    }

    #[test]
    fn permission_denied_is_detectable() {
        assert!(BoardcastError::permission_denied("camera").is_permission_denied());
        assert!(!BoardcastError::device("camera").is_permission_denied());
    }
}
