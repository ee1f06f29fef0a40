//! Recording session state machine.
//!
//! ```text
//!          start()               stop()             Stopped event
//!   Idle ──────────▶ Recording ──────────▶ Stopping ──────────────▶ Idle
//!    ▲                                                     (artifact ready)
//!    └── start() refused: status "Canvas is not ready."
//! ```
//!
//! While recording, a [`FrameLoop`] composites one frame per display
//! refresh into the output canvas and captures every frame that falls on
//! the capture-rate grid. Encoded chunks are collected by a pump task that
//! owns the chunk buffer and publishes the artifact when the recorder
//! reports it has stopped.

use std::sync::{Arc, Mutex};
use std::time::Instant;

use boardcast_common::clock::{RateController, RecordingClock};
use boardcast_common::config::RecordingDefaults;
use boardcast_common::error::BoardcastError;
use boardcast_input_tracker::OverlayReader;
use boardcast_layout::{RecordingSettings, Size};
use boardcast_render_engine::{compose_frame, Canvas, FrameSources};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::artifact::RecordingArtifact;
use crate::frame_loop::{FrameHandler, FrameLoop, FrameScheduler, RefreshScheduler};
use crate::media::{DrawingSurface, MediaDevices, MediaStream, VideoTrack};
use crate::recorder::{
    select_mime_type, MediaRecorder, RecorderConfig, RecorderEvent, RecorderFactory,
};

pub const STATUS_NOT_READY: &str = "Canvas is not ready.";
pub const STATUS_RECORDING: &str = "Recording...";
pub const STATUS_PROCESSING: &str = "Processing...";
pub const STATUS_READY: &str = "Recording ready.";
pub const STATUS_PERMISSION_DENIED: &str = "Camera permission denied.";

/// Recording lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Idle,
    Recording,
    /// Stop requested; waiting for the recorder to flush.
    Stopping,
}

/// Observable studio state.
#[derive(Debug, Clone)]
pub struct StudioStatus {
    pub state: CaptureState,

    /// Human-readable status line. Empty until something happens.
    pub message: String,

    /// Output size of the current or most recent recording.
    pub output_size: Option<Size>,

    /// The most recent finished recording.
    pub artifact: Option<Arc<RecordingArtifact>>,

    /// Recordings started so far.
    pub sessions_started: u64,

    /// Recordings finalized so far.
    pub sessions_finalized: u64,
}

impl Default for StudioStatus {
    fn default() -> Self {
        Self {
            state: CaptureState::Idle,
            message: String::new(),
            output_size: None,
            artifact: None,
            sessions_started: 0,
            sessions_finalized: 0,
        }
    }
}

impl StudioStatus {
    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    /// Status line for display, `"Ready"` when nothing has happened yet.
    pub fn display_message(&self) -> &str {
        if self.message.is_empty() {
            "Ready"
        } else {
            &self.message
        }
    }
}

type SchedulerFactory = Box<dyn Fn() -> Box<dyn FrameScheduler> + Send + Sync>;
type SharedRecorder = Arc<Mutex<Box<dyn MediaRecorder>>>;

/// Coordinates the compositor, the recorder, and the media devices.
pub struct Studio {
    defaults: RecordingDefaults,
    settings: watch::Receiver<RecordingSettings>,
    recorders: Arc<dyn RecorderFactory>,
    schedulers: SchedulerFactory,

    drawing: Option<Arc<dyn DrawingSurface>>,
    output: Option<Canvas>,
    overlay: Option<OverlayReader>,
    media: Option<MediaStream>,

    status: Arc<watch::Sender<StudioStatus>>,
    active: Option<ActiveRecording>,
}

struct ActiveRecording {
    frame_loop: FrameLoop<CompositeFrames>,
    recorder: SharedRecorder,
    pump: JoinHandle<()>,
    clock: RecordingClock,
}

impl Studio {
    /// Create a studio. `settings` is read live by the compositor.
    pub fn new(
        defaults: RecordingDefaults,
        settings: watch::Receiver<RecordingSettings>,
        recorders: Arc<dyn RecorderFactory>,
    ) -> Self {
        let refresh_hz = defaults.display_refresh_hz;
        let (status, _rx) = watch::channel(StudioStatus::default());
        Self {
            defaults,
            settings,
            recorders,
            schedulers: Box::new(move || Box::new(RefreshScheduler::new(refresh_hz))),
            drawing: None,
            output: None,
            overlay: None,
            media: None,
            status: Arc::new(status),
            active: None,
        }
    }

    /// Replace the frame scheduler used for new recordings.
    pub fn with_scheduler<F>(mut self, make: F) -> Self
    where
        F: Fn() -> Box<dyn FrameScheduler> + Send + Sync + 'static,
    {
        self.schedulers = Box::new(make);
        self
    }

    pub fn attach_drawing_surface(&mut self, surface: Arc<dyn DrawingSurface>) {
        self.drawing = Some(surface);
    }

    /// Provide the off-screen output canvas. It is resized at record start.
    pub fn attach_output_canvas(&mut self, canvas: Canvas) {
        self.output = Some(canvas);
    }

    /// Provide the overlay container's latest-value reader.
    pub fn attach_container(&mut self, overlay: OverlayReader) {
        self.overlay = Some(overlay);
    }

    /// Open camera and microphone. On failure the studio keeps working
    /// without them and reports the denial in its status line.
    pub async fn acquire_media(&mut self, devices: &dyn MediaDevices) -> bool {
        match devices.open_camera_and_microphone().await {
            Ok(stream) => {
                tracing::info!(
                    camera = stream.video.as_ref().map(|v| v.label().to_string()),
                    audio_tracks = stream.audio.len(),
                    "Media acquired"
                );
                if let Some(previous) = self.media.replace(stream) {
                    previous.stop_all();
                }
                true
            }
            Err(e) => {
                if e.is_permission_denied() {
                    tracing::warn!(error = %e, "Camera/microphone access denied");
                } else {
                    tracing::warn!(error = %e, "Camera/microphone unavailable");
                }
                self.set_message(STATUS_PERMISSION_DENIED);
                false
            }
        }
    }

    pub fn media(&self) -> Option<&MediaStream> {
        self.media.as_ref()
    }

    /// The output canvas, while no recording holds it.
    pub fn output_canvas(&self) -> Option<&Canvas> {
        self.output.as_ref()
    }

    pub fn status(&self) -> StudioStatus {
        self.status.borrow().clone()
    }

    pub fn state(&self) -> CaptureState {
        self.status.borrow().state
    }

    /// Watch status changes.
    pub fn subscribe(&self) -> watch::Receiver<StudioStatus> {
        self.status.subscribe()
    }

    /// Start recording.
    ///
    /// Ignored unless idle. Returns whether a recording was started; a
    /// refusal is reported through the status line.
    pub async fn start(&mut self) -> bool {
        let state = self.state();
        if state != CaptureState::Idle {
            tracing::debug!(?state, "Start ignored, studio is busy");
            return false;
        }
        self.reap_stale_recording().await;

        let (Some(drawing), Some(overlay)) = (self.drawing.clone(), self.overlay.clone()) else {
            let missing = if self.drawing.is_none() {
                "drawing surface"
            } else {
                "overlay container"
            };
            self.refuse_start(BoardcastError::not_ready(format!("{missing} not attached")));
            return false;
        };
        let Some(mut canvas) = self.output.take() else {
            self.refuse_start(BoardcastError::not_ready("output canvas not attached"));
            return false;
        };

        let settings = self.settings.borrow().clone();
        let output_size = settings.output_size();
        canvas.resize(output_size);

        let mime_type = select_mime_type(self.recorders.as_ref(), &self.defaults);
        let config = RecorderConfig {
            mime_type: mime_type.clone(),
            size: output_size,
            fps: self.defaults.capture_fps,
            audio_tracks: self
                .media
                .as_ref()
                .map(|m| m.audio.clone())
                .unwrap_or_default(),
        };
        let audio_tracks = config.audio_tracks.len();

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let recorder = match self.recorders.create(config).and_then(|mut recorder| {
            recorder.start(events_tx)?;
            Ok(recorder)
        }) {
            Ok(recorder) => Arc::new(Mutex::new(recorder)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to start recorder");
                self.output = Some(canvas);
                self.set_message(format!("Recording failed: {e}"));
                return false;
            }
        };

        let clock = RecordingClock::start();
        tracing::info!(
            size = %output_size,
            mime = %mime_type,
            fps = self.defaults.capture_fps,
            audio_tracks,
            epoch_wall = %clock.epoch_wall(),
            "Recording started"
        );

        self.status.send_modify(|s| {
            s.state = CaptureState::Recording;
            s.message = STATUS_RECORDING.to_string();
            s.output_size = Some(output_size);
            s.artifact = None;
            s.sessions_started += 1;
        });

        let pump = tokio::spawn(collect_chunks(
            events_rx,
            self.status.clone(),
            mime_type,
            self.defaults.download_name.clone(),
        ));

        let handler = CompositeFrames {
            canvas,
            output_size,
            drawing,
            overlay,
            settings: self.settings.clone(),
            camera: self.media.as_ref().and_then(|m| m.video.clone()),
            recorder: recorder.clone(),
            rate: RateController::new(self.defaults.capture_fps),
            clock: clock.clone(),
            frames_captured: 0,
        };
        let frame_loop = FrameLoop::spawn(handler, (self.schedulers)());

        self.active = Some(ActiveRecording {
            frame_loop,
            recorder,
            pump,
            clock,
        });
        true
    }

    /// Stop recording. Ignored unless recording.
    ///
    /// Compositing stops first; then the recorder is asked to finalize.
    /// The studio returns to idle when the recorder reports completion.
    pub async fn stop(&mut self) {
        let state = self.state();
        if state != CaptureState::Recording {
            tracing::debug!(?state, "Stop ignored, not recording");
            return;
        }
        let Some(active) = self.active.take() else {
            return;
        };

        match active.frame_loop.finish().await {
            Ok((outcome, frames_drawn)) => {
                tracing::info!(
                    frames_drawn,
                    frames_captured = outcome.frames_captured,
                    duration_secs = active.clock.elapsed_secs(),
                    "Compositing stopped"
                );
                self.output = Some(outcome.canvas);
            }
            Err(e) => tracing::error!(error = %e, "Frame loop did not shut down cleanly"),
        }

        self.status.send_modify(|s| {
            s.state = CaptureState::Stopping;
            s.message = STATUS_PROCESSING.to_string();
        });

        let result = lock_recorder(&active.recorder).stop();
        if let Err(e) = result {
            tracing::error!(error = %e, "Recorder failed to stop");
            self.set_message(format!("Recording failed: {e}"));
        }

        // The pump finishes on its own once the recorder reports Stopped.
        drop(active.pump);
    }

    /// Wait until the current recording (if any) is finalized and return
    /// the latest artifact.
    pub async fn wait_for_artifact(&self) -> Option<Arc<RecordingArtifact>> {
        let mut rx = self.status.subscribe();
        // Bound to a local so the borrow guard drops before `rx`.
        let artifact = match rx.wait_for(|s| s.state == CaptureState::Idle).await {
            Ok(status) => status.artifact.clone(),
            Err(_) => None,
        };
        artifact
    }

    /// Stop any recording and release the camera and microphone.
    pub async fn shutdown(&mut self) {
        self.stop().await;
        self.reap_stale_recording().await;
        if let Some(media) = self.media.take() {
            media.stop_all();
            tracing::info!("Media tracks released");
        }
    }

    /// A recorder that stopped on its own leaves its compositing loop
    /// behind; cancel it and reclaim the canvas.
    async fn reap_stale_recording(&mut self) {
        let Some(stale) = self.active.take() else {
            return;
        };
        tracing::warn!("Recorder stopped without a stop request, cleaning up");
        if let Ok((outcome, _)) = stale.frame_loop.finish().await {
            self.output = Some(outcome.canvas);
        }
        stale.pump.abort();
    }

    fn refuse_start(&self, reason: BoardcastError) {
        tracing::warn!(error = %reason, "Start refused");
        self.set_message(STATUS_NOT_READY);
    }

    fn set_message(&self, message: impl Into<String>) {
        let message = message.into();
        self.status.send_modify(|s| s.message = message);
    }
}

impl Drop for Studio {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.frame_loop.cancel();
        }
    }
}

fn lock_recorder(recorder: &SharedRecorder) -> std::sync::MutexGuard<'_, Box<dyn MediaRecorder>> {
    recorder.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Owns the chunk buffer for one recording.
async fn collect_chunks(
    mut events: mpsc::UnboundedReceiver<RecorderEvent>,
    status: Arc<watch::Sender<StudioStatus>>,
    mime_type: String,
    download_name: String,
) {
    let mut chunks: Vec<Vec<u8>> = Vec::new();

    while let Some(event) = events.recv().await {
        match event {
            RecorderEvent::DataAvailable(chunk) => {
                if !chunk.is_empty() {
                    chunks.push(chunk);
                }
            }
            RecorderEvent::Error(message) => {
                tracing::warn!(%message, "Recorder reported an error");
            }
            RecorderEvent::Stopped => {
                let artifact = RecordingArtifact::from_chunks(chunks, &mime_type, download_name);
                tracing::info!(
                    bytes = artifact.len(),
                    chunks = artifact.chunk_count,
                    "Recording finalized"
                );
                let artifact = Arc::new(artifact);
                status.send_modify(|s| {
                    s.state = CaptureState::Idle;
                    s.message = STATUS_READY.to_string();
                    s.artifact = Some(artifact);
                    s.sessions_finalized += 1;
                });
                return;
            }
        }
    }

    tracing::warn!("Recorder closed its event channel without stopping");
    status.send_modify(|s| {
        if s.state == CaptureState::Stopping {
            s.state = CaptureState::Idle;
            s.message = "Recording failed: recorder closed unexpectedly".to_string();
        }
    });
}

/// Per-frame compositing and capture.
struct CompositeFrames {
    canvas: Canvas,
    output_size: Size,
    drawing: Arc<dyn DrawingSurface>,
    overlay: OverlayReader,
    settings: watch::Receiver<RecordingSettings>,
    camera: Option<Arc<dyn VideoTrack>>,
    recorder: SharedRecorder,
    rate: RateController,
    clock: RecordingClock,
    frames_captured: u64,
}

struct CompositeOutcome {
    canvas: Canvas,
    frames_captured: u64,
}

impl FrameHandler for CompositeFrames {
    type Output = CompositeOutcome;

    fn on_frame(&mut self, at: Instant) {
        let settings = self.settings.borrow().clone();
        let overlay = self.overlay.latest();
        let drawing = self.drawing.snapshot();
        let camera = self.camera.as_ref().and_then(|track| track.latest_frame());

        compose_frame(
            &mut self.canvas,
            &settings,
            self.output_size,
            &overlay,
            FrameSources {
                drawing: drawing.as_ref(),
                camera: camera.as_ref(),
            },
        );

        let timestamp_ns = self.clock.ns_since_epoch(at);
        if !self.rate.should_tick(timestamp_ns) {
            return;
        }
        if let Err(e) = lock_recorder(&self.recorder).push_frame(self.canvas.image(), timestamp_ns)
        {
            tracing::warn!(error = %e, "Dropped captured frame");
            return;
        }
        self.frames_captured += 1;
    }

    fn finish(self) -> CompositeOutcome {
        CompositeOutcome {
            canvas: self.canvas,
            frames_captured: self.frames_captured,
        }
    }
}
