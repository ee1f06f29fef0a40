use std::path::Path;
use std::sync::{Arc, Mutex};

use boardcast_common::error::{BoardcastError, BoardcastResult};
use gst::prelude::*;
use gstreamer as gst;
use image::RgbaImage;

use super::{child, element_available, launch, play, quote, shut_down};
use crate::media::{AudioTrack, MediaDevices, MediaStream, VideoTrack};

/// Camera via V4L2 and microphone via an audio source element.
#[derive(Debug, Clone)]
pub struct GstMediaDevices {
    /// `/dev/videoN`; detected when `None`.
    pub camera_device: Option<String>,

    /// Audio source element, e.g. `autoaudiosrc` or `pulsesrc device=...`.
    pub audio_source: String,
}

impl Default for GstMediaDevices {
    fn default() -> Self {
        Self {
            camera_device: None,
            audio_source: "autoaudiosrc".to_string(),
        }
    }
}

#[async_trait::async_trait]
impl MediaDevices for GstMediaDevices {
    async fn open_camera_and_microphone(&self) -> BoardcastResult<MediaStream> {
        let device = self
            .camera_device
            .clone()
            .or_else(detect_default_webcam_device)
            .ok_or_else(|| BoardcastError::device("No camera found"))?;

        if !Path::new(&device).exists() {
            return Err(BoardcastError::FileNotFound {
                path: device.into(),
            });
        }

        let camera = tokio::task::spawn_blocking(move || GstCamera::open(&device))
            .await
            .map_err(|e| BoardcastError::device(format!("Camera task failed: {e}")))??;

        let source_element = self.audio_source.split_whitespace().next().unwrap_or_default();
        if !element_available(source_element) {
            camera.stop();
            return Err(BoardcastError::device(format!(
                "Audio source element {source_element} is not installed"
            )));
        }

        Ok(MediaStream {
            video: Some(Arc::new(camera)),
            audio: vec![AudioTrack {
                id: "mic-0".to_string(),
                label: "Default microphone".to_string(),
                source: self.audio_source.clone(),
            }],
        })
    }
}

/// A V4L2 camera delivering RGBA frames.
pub struct GstCamera {
    label: String,
    pipeline: gst::Pipeline,
    latest: Arc<Mutex<Option<RgbaImage>>>,
}

impl GstCamera {
    pub fn open(device: &str) -> BoardcastResult<Self> {
        if !element_available("v4l2src") {
            return Err(BoardcastError::unsupported("v4l2src is not installed"));
        }

        let description = format!(
            "v4l2src device=\"{}\" ! queue max-size-buffers=2 leaky=downstream ! videoconvert \
             ! video/x-raw,format=RGBA ! appsink name=sink emit-signals=true drop=true max-buffers=1 sync=false",
            quote(device)
        );
        let pipeline = launch("camera", &description)?;
        let sink = child(&pipeline, "sink")?;

        let latest = Arc::new(Mutex::new(None));
        let slot = latest.clone();
        sink.connect("new-sample", false, move |values| {
            Some(store_frame(values, &slot).to_value())
        });

        if let Err(e) = play(&pipeline, "camera") {
            shut_down(&pipeline, "camera");
            return Err(BoardcastError::permission_denied(format!(
                "Cannot open camera {device}: {e}"
            )));
        }

        tracing::info!(%device, "Camera opened");
        Ok(Self {
            label: device.to_string(),
            pipeline,
            latest,
        })
    }
}

impl VideoTrack for GstCamera {
    fn label(&self) -> &str {
        &self.label
    }

    fn latest_frame(&self) -> Option<RgbaImage> {
        self.latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn stop(&self) {
        shut_down(&self.pipeline, "camera");
        *self
            .latest
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}

impl Drop for GstCamera {
    fn drop(&mut self) {
        shut_down(&self.pipeline, "camera");
    }
}

fn store_frame(values: &[gst::glib::Value], slot: &Mutex<Option<RgbaImage>>) -> gst::FlowReturn {
    let Some(sink) = values.first().and_then(|v| v.get::<gst::Element>().ok()) else {
        return gst::FlowReturn::Error;
    };
    let Some(sample) = sink.emit_by_name::<Option<gst::Sample>>("pull-sample", &[]) else {
        return gst::FlowReturn::Eos;
    };

    let dims = sample.caps().and_then(|caps| {
        let s = caps.structure(0)?;
        Some((s.get::<i32>("width").ok()?, s.get::<i32>("height").ok()?))
    });
    let (Some((w, h)), Some(buffer)) = (dims, sample.buffer()) else {
        return gst::FlowReturn::Ok;
    };
    let Ok(map) = buffer.map_readable() else {
        return gst::FlowReturn::Ok;
    };

    if let Some(frame) = RgbaImage::from_raw(w as u32, h as u32, map.as_slice().to_vec()) {
        *slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(frame);
    }
    gst::FlowReturn::Ok
}

/// Pick the most webcam-like `/dev/videoN` node.
///
/// Devices whose sysfs name looks like a capture card or tuner are skipped;
/// names mentioning a camera rank first.
pub fn detect_default_webcam_device() -> Option<String> {
    let mut candidates: Vec<(String, u32)> = (0..16u32)
        .filter_map(|idx| {
            let path = format!("/dev/video{idx}");
            if !Path::new(&path).exists() {
                return None;
            }
            let name = std::fs::read_to_string(format!("/sys/class/video4linux/video{idx}/name"))
                .unwrap_or_default();
            Some((path, webcam_priority(&name)))
        })
        .filter(|(_, priority)| *priority > 0)
        .collect();

    candidates.sort_by(|a, b| b.1.cmp(&a.1));
    let (device, priority) = candidates.into_iter().next()?;
    tracing::info!(%device, priority, "Selected webcam device");
    Some(device)
}

fn webcam_priority(name: &str) -> u32 {
    const WEBCAM: [&str; 6] = ["webcam", "camera", "cam", "facetime", "logitech", "v4l2loopback"];
    const NOT_WEBCAM: [&str; 6] = ["tuner", "dvb", "hdmi", "capture", "encoder", "decoder"];

    let name = name.to_lowercase();
    if NOT_WEBCAM.iter().any(|kw| name.contains(kw)) {
        0
    } else if WEBCAM.iter().any(|kw| name.contains(kw)) {
        80
    } else {
        10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webcam_names_rank_above_generic_devices() {
        assert_eq!(webcam_priority("Integrated Camera: Integrated C"), 80);
        assert_eq!(webcam_priority("uvcvideo"), 10);
        assert_eq!(webcam_priority("HDMI Capture"), 0);
    }
}
