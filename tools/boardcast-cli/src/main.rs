//! Boardcast CLI — compose, inspect, and record whiteboard videos.
//!
//! Usage:
//!   boardcast presets              List aspect, background, and cursor presets
//!   boardcast size [OPTIONS]       Print the output size for an aspect
//!   boardcast preview [OPTIONS]    Compose a single frame to PNG
//!   boardcast record [OPTIONS]     Record the whiteboard to WebM
//!   boardcast check                Check recorder and device support
//!   boardcast config [--save]      Show or persist the configuration

use std::path::PathBuf;

use boardcast_layout::{Extent, Point};
use clap::{Parser, Subcommand};

mod commands;

use commands::{parse_extent, parse_point};

#[derive(Parser)]
#[command(
    name = "boardcast",
    about = "Whiteboard recorder with a camera bubble and cursor highlight",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List aspect, background, and cursor presets
    Presets,

    /// Print the output size for an aspect preset
    Size {
        /// Aspect preset id (16:9, 4:3, 3:4, 9:16, 1:1, custom)
        #[arg(short, long, default_value = "16:9")]
        aspect: String,

        /// Custom width (only used with --aspect custom)
        #[arg(long, default_value = "1280")]
        width: f64,

        /// Custom height (only used with --aspect custom)
        #[arg(long, default_value = "720")]
        height: f64,
    },

    /// Compose one frame and write it as PNG
    Preview {
        /// Drawing surface image
        #[arg(short, long)]
        drawing: PathBuf,

        /// Output PNG path
        #[arg(short, long, default_value = "boardcast-preview.png")]
        out: PathBuf,

        /// Recording settings JSON
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Override the aspect preset
        #[arg(long)]
        aspect: Option<String>,

        /// Override the background preset
        #[arg(long)]
        background: Option<String>,

        /// On-screen container size, WxH
        #[arg(long, default_value = "1280x720", value_parser = parse_extent)]
        container: Extent,

        /// Camera frame image; omit to leave the bubble out
        #[arg(long)]
        camera: Option<PathBuf>,

        /// Camera bubble position in container pixels, X,Y
        #[arg(long, value_parser = parse_point)]
        camera_at: Option<Point>,

        /// Pointer position in container pixels, X,Y
        #[arg(long, value_parser = parse_point)]
        cursor: Option<Point>,
    },

    /// Record the whiteboard to WebM
    Record {
        /// Drawing surface image
        #[arg(short, long)]
        drawing: PathBuf,

        /// Recording settings JSON
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Stop after this many seconds (default: wait for Ctrl+C)
        #[arg(long)]
        seconds: Option<f64>,

        /// Output directory (default: configured output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// On-screen container size, WxH
        #[arg(long, default_value = "1280x720", value_parser = parse_extent)]
        container: Extent,

        /// Replay pointer events from a JSONL script
        #[arg(long)]
        pointer_script: Option<PathBuf>,

        /// Use a still image instead of the webcam
        #[arg(long)]
        camera_image: Option<PathBuf>,

        /// Record without camera and microphone
        #[arg(long)]
        no_camera: bool,

        /// Teleprompter notes to show while recording (not recorded)
        #[arg(long)]
        notes: Option<PathBuf>,
    },

    /// Check recorder and device support
    Check,

    /// Show the effective configuration
    Config {
        /// Write it to the config file
        #[arg(long)]
        save: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = boardcast_common::config::AppConfig::load();
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    boardcast_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Presets => commands::presets::run(),
        Commands::Size {
            aspect,
            width,
            height,
        } => commands::size::run(&aspect, width, height),
        Commands::Preview {
            drawing,
            out,
            settings,
            aspect,
            background,
            container,
            camera,
            camera_at,
            cursor,
        } => commands::preview::run(commands::preview::PreviewArgs {
            drawing,
            out,
            settings,
            aspect,
            background,
            container,
            camera,
            camera_at,
            cursor,
        }),
        Commands::Record {
            drawing,
            settings,
            seconds,
            output,
            container,
            pointer_script,
            camera_image,
            no_camera,
            notes,
        } => {
            commands::record::run(
                &config,
                commands::record::RecordArgs {
                    drawing,
                    settings,
                    seconds,
                    output,
                    container,
                    pointer_script,
                    camera_image,
                    no_camera,
                    notes,
                },
            )
            .await
        }
        Commands::Check => commands::check::run(&config),
        Commands::Config { save } => commands::config::run(&config, save),
    }
}
