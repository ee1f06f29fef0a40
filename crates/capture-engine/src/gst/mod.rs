//! GStreamer backend.
//!
//! ```text
//! recorder:  appsrc (RGBA) ─▶ videoconvert ─▶ vp9enc/vp8enc ─┐
//!            mic source ─▶ audioconvert ─▶ opusenc ──────────┴▶ webmmux ─▶ appsink ─▶ chunks
//! camera:    v4l2src ─▶ videoconvert ─▶ RGBA appsink ─▶ latest frame
//! ```

mod devices;
mod recorder;

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use boardcast_common::error::{BoardcastError, BoardcastResult};
use gst::prelude::*;
use gstreamer as gst;

pub use devices::{detect_default_webcam_device, GstCamera, GstMediaDevices};
pub use recorder::{GstMediaRecorder, GstRecorderFactory};

/// Initialize GStreamer once per process.
pub fn init_gstreamer() -> BoardcastResult<()> {
    static GST_INIT: OnceLock<Result<(), String>> = OnceLock::new();
    match GST_INIT.get_or_init(|| gst::init().map_err(|e| e.to_string())) {
        Ok(()) => Ok(()),
        Err(e) => Err(BoardcastError::capture(format!(
            "Failed to initialize GStreamer: {e}"
        ))),
    }
}

/// Whether an element factory is installed.
pub fn element_available(name: &str) -> bool {
    init_gstreamer().is_ok() && gst::ElementFactory::find(name).is_some()
}

fn launch(name: &str, description: &str) -> BoardcastResult<gst::Pipeline> {
    init_gstreamer()?;
    tracing::debug!(pipeline = name, %description, "Building pipeline");
    let element = gst::parse::launch(description)
        .map_err(|e| BoardcastError::capture(format!("Failed to build {name} pipeline: {e}")))?;
    element
        .dynamic_cast::<gst::Pipeline>()
        .map_err(|_| BoardcastError::capture("Launch string did not produce a pipeline"))
}

fn child(pipeline: &gst::Pipeline, name: &str) -> BoardcastResult<gst::Element> {
    pipeline
        .by_name(name)
        .ok_or_else(|| BoardcastError::capture(format!("Pipeline has no element named {name}")))
}

/// Set Playing and wait for the state change to settle.
fn play(pipeline: &gst::Pipeline, name: &str) -> BoardcastResult<()> {
    pipeline.set_state(gst::State::Playing).map_err(|e| {
        BoardcastError::capture(format!("Failed to start {name} pipeline: {e:?}"))
    })?;

    match pipeline.state(gst::ClockTime::from_seconds(10)) {
        (Ok(_), gst::State::Playing, _) => Ok(()),
        (Ok(_), state, _) => {
            tracing::warn!(pipeline = name, ?state, "Pipeline did not reach Playing within timeout");
            Ok(())
        }
        (Err(e), _, _) => Err(BoardcastError::capture(format!(
            "{name} pipeline failed to reach Playing state: {e:?}"
        ))),
    }
}

/// Send EOS and wait (bounded) for it to reach the sink so encoders and
/// the muxer flush their tails.
fn drain(pipeline: &gst::Pipeline, name: &str, deadline: Duration) {
    if !pipeline.send_event(gst::event::Eos::new()) {
        tracing::warn!(pipeline = name, "Failed to send EOS; output may be truncated");
        return;
    }
    let Some(bus) = pipeline.bus() else {
        return;
    };

    let start = Instant::now();
    loop {
        let elapsed = start.elapsed();
        if elapsed >= deadline {
            tracing::warn!(pipeline = name, "EOS drain timed out");
            return;
        }
        let remaining = gst::ClockTime::from_nseconds((deadline - elapsed).as_nanos() as u64);
        match bus.timed_pop(remaining) {
            Some(msg) => match msg.view() {
                gst::MessageView::Eos(_) => {
                    tracing::debug!(pipeline = name, "EOS received; pipeline drained");
                    return;
                }
                gst::MessageView::Error(e) => {
                    tracing::warn!(pipeline = name, error = %e.error(), "Pipeline error during EOS drain");
                    return;
                }
                _ => {}
            },
            None => {
                tracing::warn!(pipeline = name, "EOS drain timed out");
                return;
            }
        }
    }
}

fn shut_down(pipeline: &gst::Pipeline, name: &str) {
    if let Err(e) = pipeline.set_state(gst::State::Null) {
        tracing::warn!(pipeline = name, error = ?e, "Failed to stop pipeline");
    }
}

fn quote(value: &str) -> String {
    value.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_escapes_double_quotes() {
        assert_eq!(quote(r#"/dev/vid"eo0"#), r#"/dev/vid\"eo0"#);
    }
}
