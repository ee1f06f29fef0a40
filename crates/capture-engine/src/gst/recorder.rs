use std::time::Duration;

use boardcast_common::error::{BoardcastError, BoardcastResult};
use gst::prelude::*;
use gstreamer as gst;
use image::RgbaImage;

use super::{child, drain, element_available, launch, play, shut_down};
use crate::media::AudioTrack;
use crate::recorder::{
    container_type, MediaRecorder, RecorderConfig, RecorderEvent, RecorderEventSender,
    RecorderFactory,
};

const EOS_DEADLINE: Duration = Duration::from_secs(10);

/// Creates WebM recorders (VP9 or VP8 video, Opus audio).
#[derive(Debug, Default, Clone, Copy)]
pub struct GstRecorderFactory;

impl GstRecorderFactory {
    pub fn new() -> Self {
        Self
    }
}

impl RecorderFactory for GstRecorderFactory {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        if container_type(mime_type) != "video/webm" || !element_available("webmmux") {
            return false;
        }
        video_encoder(mime_type).is_some_and(element_available)
    }

    fn create(&self, config: RecorderConfig) -> BoardcastResult<Box<dyn MediaRecorder>> {
        Ok(Box::new(GstMediaRecorder::new(config)?))
    }
}

/// Encoder element for a WebM MIME string.
fn video_encoder(mime_type: &str) -> Option<&'static str> {
    let codecs = mime_type
        .split(';')
        .skip(1)
        .find_map(|param| param.trim().strip_prefix("codecs="))
        .map(|c| c.trim_matches('"').to_ascii_lowercase());

    match codecs.as_deref() {
        Some(c) if c.starts_with("vp9") => Some("vp9enc"),
        Some(c) if c.starts_with("vp8") => Some("vp8enc"),
        None => Some("vp8enc"),
        Some(_) => None,
    }
}

fn pipeline_description(config: &RecorderConfig, encoder: &str) -> String {
    let (w, h) = (config.size.width, config.size.height);
    let fps = config.fps.max(1);
    let keyint = fps.saturating_mul(2);

    let mut description = format!(
        "webmmux name=mux streamable=true ! appsink name=sink emit-signals=true sync=false \
         appsrc name=src is-live=true format=time \
         caps=video/x-raw,format=RGBA,width={w},height={h},framerate={fps}/1 \
         ! queue max-size-buffers=8 ! videoconvert ! {encoder} deadline=1 keyframe-max-dist={keyint} \
         ! queue ! mux."
    );
    for track in &config.audio_tracks {
        description.push_str(&audio_branch(track));
    }
    description
}

fn audio_branch(track: &AudioTrack) -> String {
    format!(
        " {} ! queue ! audioconvert ! audioresample ! opusenc ! queue ! mux.",
        track.source
    )
}

/// A live WebM encoder fed with RGBA frames.
pub struct GstMediaRecorder {
    config: RecorderConfig,
    pipeline: gst::Pipeline,
    appsrc: gst::Element,
    sink: gst::Element,
    events: Option<RecorderEventSender>,
}

impl GstMediaRecorder {
    pub fn new(config: RecorderConfig) -> BoardcastResult<Self> {
        let encoder = video_encoder(&config.mime_type).ok_or_else(|| {
            BoardcastError::unsupported(format!("No encoder for {}", config.mime_type))
        })?;
        let pipeline = launch("recorder", &pipeline_description(&config, encoder))?;
        let appsrc = child(&pipeline, "src")?;
        let sink = child(&pipeline, "sink")?;
        tracing::debug!(mime = %config.mime_type, size = %config.size, "Recorder pipeline built");
        Ok(Self {
            config,
            pipeline,
            appsrc,
            sink,
            events: None,
        })
    }
}

impl MediaRecorder for GstMediaRecorder {
    fn start(&mut self, events: RecorderEventSender) -> BoardcastResult<()> {
        let tx = events.clone();
        self.sink.connect("new-sample", false, move |values| {
            Some(forward_sample(values, &tx).to_value())
        });
        play(&self.pipeline, "recorder")?;
        self.events = Some(events);
        Ok(())
    }

    fn push_frame(&mut self, frame: &RgbaImage, timestamp_ns: u64) -> BoardcastResult<()> {
        let (w, h) = frame.dimensions();
        if (w, h) != (self.config.size.width, self.config.size.height) {
            return Err(BoardcastError::recorder(format!(
                "Frame is {w}x{h}, recorder expects {}",
                self.config.size
            )));
        }

        let mut buffer = gst::Buffer::from_slice(frame.as_raw().clone());
        if let Some(buf) = buffer.get_mut() {
            buf.set_pts(gst::ClockTime::from_nseconds(timestamp_ns));
        }
        match self
            .appsrc
            .emit_by_name::<gst::FlowReturn>("push-buffer", &[&buffer])
        {
            gst::FlowReturn::Ok => Ok(()),
            flow => Err(BoardcastError::recorder(format!("push-buffer returned {flow:?}"))),
        }
    }

    fn stop(&mut self) -> BoardcastResult<()> {
        let Some(events) = self.events.take() else {
            return Err(BoardcastError::recorder("Recorder was never started"));
        };

        let pipeline = self.pipeline.clone();
        std::thread::Builder::new()
            .name("boardcast-recorder-drain".to_string())
            .spawn(move || {
                drain(&pipeline, "recorder", EOS_DEADLINE);
                shut_down(&pipeline, "recorder");
                let _ = events.send(RecorderEvent::Stopped);
            })
            .map_err(|e| BoardcastError::recorder(format!("Failed to spawn drain thread: {e}")))?;
        Ok(())
    }
}

impl Drop for GstMediaRecorder {
    fn drop(&mut self) {
        if self.events.is_some() {
            shut_down(&self.pipeline, "recorder");
        }
    }
}

fn forward_sample(values: &[gst::glib::Value], tx: &RecorderEventSender) -> gst::FlowReturn {
    let Some(sink) = values.first().and_then(|v| v.get::<gst::Element>().ok()) else {
        return gst::FlowReturn::Error;
    };
    let Some(sample) = sink.emit_by_name::<Option<gst::Sample>>("pull-sample", &[]) else {
        return gst::FlowReturn::Eos;
    };
    if let Some(buffer) = sample.buffer() {
        match buffer.map_readable() {
            Ok(map) => {
                let _ = tx.send(RecorderEvent::DataAvailable(map.as_slice().to_vec()));
            }
            Err(e) => {
                let _ = tx.send(RecorderEvent::Error(format!("Unreadable buffer: {e}")));
            }
        }
    }
    gst::FlowReturn::Ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use boardcast_layout::Size;

    fn config(mime: &str, audio: Vec<AudioTrack>) -> RecorderConfig {
        RecorderConfig {
            mime_type: mime.to_string(),
            size: Size::new(1280, 720),
            fps: 30,
            audio_tracks: audio,
        }
    }

    #[test]
    fn encoder_follows_codec_parameter() {
        assert_eq!(video_encoder("video/webm;codecs=vp9"), Some("vp9enc"));
        assert_eq!(video_encoder("video/webm; codecs=\"vp8,opus\""), Some("vp8enc"));
        assert_eq!(video_encoder("video/webm"), Some("vp8enc"));
        assert_eq!(video_encoder("video/webm;codecs=av1"), None);
    }

    #[test]
    fn description_has_one_branch_per_audio_track() {
        let mic = AudioTrack {
            id: "mic-0".to_string(),
            label: "Mic".to_string(),
            source: "pulsesrc".to_string(),
        };
        let description = pipeline_description(&config("video/webm", vec![mic]), "vp8enc");
        assert!(description.contains("width=1280,height=720,framerate=30/1"));
        assert!(description.contains("vp8enc"));
        assert_eq!(description.matches("opusenc").count(), 1);
        assert!(description.contains("pulsesrc ! queue"));
    }
}
