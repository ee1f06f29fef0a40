//! Record the whiteboard to WebM.

use std::path::PathBuf;
#[cfg(feature = "gstreamer")]
use std::sync::Arc;
#[cfg(feature = "gstreamer")]
use std::time::Duration;

use boardcast_common::config::AppConfig;
use boardcast_layout::Extent;

pub struct RecordArgs {
    pub drawing: PathBuf,
    pub settings: Option<PathBuf>,
    pub seconds: Option<f64>,
    pub output: Option<PathBuf>,
    pub container: Extent,
    pub pointer_script: Option<PathBuf>,
    pub camera_image: Option<PathBuf>,
    pub no_camera: bool,
    pub notes: Option<PathBuf>,
}

#[cfg(not(feature = "gstreamer"))]
pub async fn run(_config: &AppConfig, _args: RecordArgs) -> anyhow::Result<()> {
    anyhow::bail!(
        "{}",
        boardcast_common::BoardcastError::unsupported(
            "recording needs a build with the `gstreamer` feature"
        )
    )
}

#[cfg(feature = "gstreamer")]
pub async fn run(config: &AppConfig, args: RecordArgs) -> anyhow::Result<()> {
    use boardcast_capture_engine::gst::{GstMediaDevices, GstRecorderFactory};
    use boardcast_capture_engine::{
        AudioTrack, MediaStream, StaticImageSurface, StillCamera, Studio,
    };
    use boardcast_input_tracker::{OverlayTracker, PointerScript};
    use boardcast_render_engine::Canvas;
    use tokio::sync::watch;

    let mut settings = super::load_settings(args.settings.as_deref())?;
    if let Some(path) = &args.notes {
        settings.teleprompter.text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read notes {}: {e}", path.display()))?;
        settings.teleprompter.visible = true;
    }
    let output_dir = args.output.unwrap_or_else(|| config.output_dir.clone());

    println!("Recording {}", args.drawing.display());
    println!("  Output size: {}", settings.output_size());
    println!("  Background:  {}", settings.background().label);
    println!("  Output dir:  {}", output_dir.display());
    println!();
    if let Some(script) = settings.teleprompter.script() {
        println!("Teleprompter (not recorded):");
        for line in script.lines() {
            println!("  | {line}");
        }
        println!();
    }

    let camera_size = settings.camera_size;
    let (_settings_tx, settings_rx) = watch::channel(settings);
    let mut studio = Studio::new(
        config.recording.clone(),
        settings_rx,
        Arc::new(GstRecorderFactory::new()),
    );

    studio.attach_drawing_surface(Arc::new(StaticImageSurface::open(&args.drawing)?));
    studio.attach_output_canvas(Canvas::new(boardcast_layout::Size::new(1, 1)));

    let mut tracker = OverlayTracker::new(args.container, camera_size);
    studio.attach_container(tracker.reader());

    if !args.no_camera {
        match &args.camera_image {
            Some(path) => {
                let devices = StillImageDevices {
                    stream: MediaStream {
                        video: Some(Arc::new(StillCamera::open(path)?)),
                        audio: vec![AudioTrack {
                            id: "mic-0".to_string(),
                            label: "Default microphone".to_string(),
                            source: GstMediaDevices::default().audio_source,
                        }],
                    },
                };
                studio.acquire_media(&devices).await;
            }
            None => {
                studio.acquire_media(&GstMediaDevices::default()).await;
            }
        }
    }

    let (replay_stop, replay_stop_rx) = watch::channel(false);
    let replay = match &args.pointer_script {
        Some(path) => {
            let script = PointerScript::load(path)?;
            println!(
                "Replaying {} pointer events over {:.1}s",
                script.events().len(),
                script.duration_ms() as f64 / 1000.0
            );
            Some(tokio::spawn(async move {
                tracker.replay(&script, replay_stop_rx).await
            }))
        }
        None => None,
    };

    if !studio.start().await {
        anyhow::bail!("{}", studio.status().display_message());
    }
    println!("{}", studio.status().display_message());

    match args.seconds {
        Some(secs) => {
            println!("Recording for {secs:.1}s (Ctrl+C to stop early)...");
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs_f64(secs.max(0.0))) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
        None => {
            println!("Press Ctrl+C to stop recording...");
            tokio::signal::ctrl_c().await?;
        }
    }

    replay_stop.send_replace(true);
    studio.stop().await;
    println!("{}", studio.status().display_message());

    let artifact = tokio::time::timeout(Duration::from_secs(15), studio.wait_for_artifact())
        .await
        .map_err(|_| anyhow::anyhow!("Timed out waiting for the recorder to finish"))?
        .ok_or_else(|| anyhow::anyhow!("{}", studio.status().display_message()))?;

    if let Some(task) = replay {
        match task.await {
            Ok(applied) => tracing::debug!(applied, "Pointer replay joined"),
            Err(e) => tracing::warn!(error = %e, "Pointer replay task failed"),
        }
    }
    studio.shutdown().await;

    let link = artifact.save_in(&output_dir)?;
    println!("{}", studio.status().display_message());
    println!("  {} ({} bytes, {})", link.url(), artifact.len(), artifact.mime_type);
    Ok(())
}

/// Hands out a prepared stream.
#[cfg(feature = "gstreamer")]
struct StillImageDevices {
    stream: boardcast_capture_engine::MediaStream,
}

#[cfg(feature = "gstreamer")]
#[async_trait::async_trait]
impl boardcast_capture_engine::MediaDevices for StillImageDevices {
    async fn open_camera_and_microphone(
        &self,
    ) -> boardcast_common::BoardcastResult<boardcast_capture_engine::MediaStream> {
        Ok(self.stream.clone())
    }
}
