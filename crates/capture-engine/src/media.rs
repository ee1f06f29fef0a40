//! Media collaborators: the drawing surface, camera/microphone tracks, and
//! the device layer that opens them.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use boardcast_common::error::{BoardcastError, BoardcastResult};
use image::RgbaImage;

/// The whiteboard's rendered canvas. Read only: the compositor takes a
/// snapshot every frame and never writes back.
pub trait DrawingSurface: Send + Sync {
    /// Current pixels, or `None` if the surface has nothing to show yet.
    fn snapshot(&self) -> Option<RgbaImage>;
}

/// A drawing surface backed by a fixed image.
#[derive(Debug, Clone)]
pub struct StaticImageSurface {
    image: RgbaImage,
}

impl StaticImageSurface {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Load any image format the `image` crate can decode.
    pub fn open(path: impl AsRef<Path>) -> BoardcastResult<Self> {
        Ok(Self::new(load_rgba(path.as_ref())?))
    }
}

impl DrawingSurface for StaticImageSurface {
    fn snapshot(&self) -> Option<RgbaImage> {
        Some(self.image.clone())
    }
}

/// A live video track (the camera).
pub trait VideoTrack: Send + Sync {
    fn label(&self) -> &str;

    /// Latest decoded frame, or `None` until the first frame is available
    /// (and after the track is stopped).
    fn latest_frame(&self) -> Option<RgbaImage>;

    /// Release the device.
    fn stop(&self);
}

/// A video track that always shows the same picture.
#[derive(Debug)]
pub struct StillCamera {
    label: String,
    frame: RgbaImage,
    stopped: AtomicBool,
}

impl StillCamera {
    pub fn new(label: impl Into<String>, frame: RgbaImage) -> Self {
        Self {
            label: label.into(),
            frame,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn open(path: impl AsRef<Path>) -> BoardcastResult<Self> {
        let path = path.as_ref();
        Ok(Self::new(path.display().to_string(), load_rgba(path)?))
    }
}

impl VideoTrack for StillCamera {
    fn label(&self) -> &str {
        &self.label
    }

    fn latest_frame(&self) -> Option<RgbaImage> {
        if self.stopped.load(Ordering::Relaxed) {
            return None;
        }
        Some(self.frame.clone())
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Relaxed);
    }
}

/// A microphone track. The recorder backend opens `source` itself when it
/// merges audio into the capture stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioTrack {
    pub id: String,
    pub label: String,
    /// Backend-specific source description.
    pub source: String,
}

/// Combined camera + microphone media.
#[derive(Clone, Default)]
pub struct MediaStream {
    pub video: Option<Arc<dyn VideoTrack>>,
    pub audio: Vec<AudioTrack>,
}

impl MediaStream {
    /// Stop every track in the stream.
    pub fn stop_all(&self) {
        if let Some(video) = &self.video {
            video.stop();
        }
    }
}

impl std::fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaStream")
            .field("video", &self.video.as_ref().map(|v| v.label().to_string()))
            .field("audio", &self.audio)
            .finish()
    }
}

/// Permission-gated access to the camera and microphone.
#[async_trait::async_trait]
pub trait MediaDevices: Send + Sync {
    /// Open combined video + audio media.
    async fn open_camera_and_microphone(&self) -> BoardcastResult<MediaStream>;
}

fn load_rgba(path: &Path) -> BoardcastResult<RgbaImage> {
    if !path.exists() {
        return Err(BoardcastError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let image = image::open(path)
        .map_err(|e| BoardcastError::device(format!("Failed to decode {}: {e}", path.display())))?;
    Ok(image.to_rgba8())
}
