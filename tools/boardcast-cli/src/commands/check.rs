//! Check recorder and device support.

use boardcast_common::config::AppConfig;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Boardcast System Check");
    println!("{}", "=".repeat(50));
    println!(
        "Capture: {} fps sampled from a {} Hz compositor",
        config.recording.capture_fps, config.recording.display_refresh_hz
    );
    println!();
    backend_report(config)
}

#[cfg(feature = "gstreamer")]
fn backend_report(config: &AppConfig) -> anyhow::Result<()> {
    use boardcast_capture_engine::gst::{
        detect_default_webcam_device, element_available, init_gstreamer, GstRecorderFactory,
    };
    use boardcast_capture_engine::{select_mime_type, RecorderFactory};

    init_gstreamer()?;
    println!("[OK] GStreamer initialized");

    let factory = GstRecorderFactory::new();
    for mime in [
        &config.recording.preferred_mime_type,
        &config.recording.fallback_mime_type,
    ] {
        let mark = if factory.is_type_supported(mime) { "OK" } else { "--" };
        println!("[{mark}] {mime}");
    }
    println!(
        "     Recordings will use {}",
        select_mime_type(&factory, &config.recording)
    );

    for element in ["videoconvert", "opusenc", "autoaudiosrc", "v4l2src"] {
        let mark = if element_available(element) { "OK" } else { "--" };
        println!("[{mark}] element {element}");
    }

    match detect_default_webcam_device() {
        Some(device) => println!("[OK] Camera: {device}"),
        None => println!("[WARN] No camera found; recordings will omit the bubble"),
    }
    Ok(())
}

#[cfg(not(feature = "gstreamer"))]
fn backend_report(_config: &AppConfig) -> anyhow::Result<()> {
    println!("[WARN] Built without the `gstreamer` feature; `record` is unavailable.");
    println!("       `preview`, `size`, and `presets` work without it.");
    Ok(())
}
