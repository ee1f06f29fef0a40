//! Media recorder interface.
//!
//! A recorder consumes composited frames (plus any audio tracks it was
//! configured with) and emits encoded chunks as [`RecorderEvent`]s. The
//! session owns exactly one recorder per recording.

use boardcast_common::config::RecordingDefaults;
use boardcast_common::error::BoardcastResult;
use boardcast_layout::Size;
use image::RgbaImage;
use tokio::sync::mpsc;

use crate::media::AudioTrack;

/// Events emitted by a running recorder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    /// An encoded chunk. Chunks may be empty; consumers drop those.
    DataAvailable(Vec<u8>),

    /// The recorder finished flushing. No further events follow.
    Stopped,

    /// A non-fatal encoder problem.
    Error(String),
}

/// Channel the recorder delivers its events on.
pub type RecorderEventSender = mpsc::UnboundedSender<RecorderEvent>;

/// Parameters for a new recorder.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Container/codec, e.g. `video/webm;codecs=vp9`.
    pub mime_type: String,

    /// Frame dimensions. Fixed for the whole recording.
    pub size: Size,

    /// Capture frame rate.
    pub fps: u32,

    /// Microphone tracks to merge into the stream.
    pub audio_tracks: Vec<AudioTrack>,
}

/// A running encoder.
pub trait MediaRecorder: Send {
    /// Begin encoding. Events are delivered on `events` until
    /// [`RecorderEvent::Stopped`].
    fn start(&mut self, events: RecorderEventSender) -> BoardcastResult<()>;

    /// Submit one captured frame, stamped in nanoseconds since start.
    fn push_frame(&mut self, frame: &RgbaImage, timestamp_ns: u64) -> BoardcastResult<()>;

    /// Request finalization. Completion is signalled asynchronously by
    /// [`RecorderEvent::Stopped`].
    fn stop(&mut self) -> BoardcastResult<()>;
}

/// Creates recorders and answers format queries.
pub trait RecorderFactory: Send + Sync {
    /// Whether recorders for `mime_type` can be created.
    fn is_type_supported(&self, mime_type: &str) -> bool;

    fn create(&self, config: RecorderConfig) -> BoardcastResult<Box<dyn MediaRecorder>>;
}

/// Pick the preferred format if the factory supports it, the fallback
/// otherwise.
pub fn select_mime_type(factory: &dyn RecorderFactory, defaults: &RecordingDefaults) -> String {
    if factory.is_type_supported(&defaults.preferred_mime_type) {
        defaults.preferred_mime_type.clone()
    } else {
        tracing::debug!(
            preferred = %defaults.preferred_mime_type,
            fallback = %defaults.fallback_mime_type,
            "Preferred format unsupported, using fallback"
        );
        defaults.fallback_mime_type.clone()
    }
}

/// Base container type of a MIME string (`video/webm;codecs=vp9` ->
/// `video/webm`).
pub fn container_type(mime_type: &str) -> &str {
    mime_type.split(';').next().unwrap_or(mime_type).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Formats(&'static [&'static str]);

    impl RecorderFactory for Formats {
        fn is_type_supported(&self, mime_type: &str) -> bool {
            self.0.contains(&mime_type)
        }

        fn create(&self, _config: RecorderConfig) -> BoardcastResult<Box<dyn MediaRecorder>> {
            Err(boardcast_common::BoardcastError::unsupported("test factory"))
        }
    }

    #[test]
    fn prefers_vp9_when_supported() {
        let defaults = RecordingDefaults::default();
        let factory = Formats(&["video/webm;codecs=vp9", "video/webm"]);
        assert_eq!(select_mime_type(&factory, &defaults), "video/webm;codecs=vp9");
    }

    #[test]
    fn falls_back_to_generic_webm() {
        let defaults = RecordingDefaults::default();
        let factory = Formats(&["video/webm"]);
        assert_eq!(select_mime_type(&factory, &defaults), "video/webm");
        // The fallback is used even if nothing is reported as supported.
        assert_eq!(select_mime_type(&Formats(&[]), &defaults), "video/webm");
    }

    #[test]
    fn container_type_strips_codec_parameters() {
        assert_eq!(container_type("video/webm;codecs=vp9"), "video/webm");
        assert_eq!(container_type("video/webm"), "video/webm");
    }
}
