//! slidecap - streaming slide extraction for lecture/screen-recording videos.
//!
//! Thin command-line front end over the `D -> Q -> X -> W` pipeline: parses
//! flags, merges them over an optional on-disk config file, wires up a
//! `tracing` subscriber, and dispatches to the coordinator (§10.5).

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod config;
mod coordinator;
mod error;

use commands::batch::BatchArgs;
use commands::extract::ExtractArgs;
use commands::info::InfoArgs;

/// Extract distinct slide images from lecture/screen-recording videos.
#[derive(Parser, Debug)]
#[command(name = "slidecap")]
#[command(about = "Extract slide images from lecture and screen-recording videos", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the full slide-extraction pipeline against a single video
    Extract {
        /// Video file path
        video: PathBuf,

        /// Directory slides are written under (one `slides_{name}/` folder per video)
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Frames per chunk handed from the decoder to the detector
        #[arg(long, default_value_t = 500)]
        chunk_size: usize,

        /// SSIM stability threshold in [0.9, 0.9999]; defaults to the Normal preset (0.9985)
        #[arg(long)]
        threshold: Option<f64>,

        /// Disable the area-average downsample before SSIM (on by default)
        #[arg(long)]
        no_downsample: bool,

        /// JPEG quality in [1, 100]
        #[arg(long, default_value_t = 95)]
        jpeg_quality: u8,

        /// Optional TOML file of parameter overrides (flags still win)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Run `extract` sequentially over a list of videos
    Batch {
        /// Video file paths, processed one at a time
        videos: Vec<PathBuf>,

        /// Directory slides are written under
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        #[arg(long, default_value_t = 500)]
        chunk_size: usize,

        #[arg(long)]
        threshold: Option<f64>,

        #[arg(long)]
        no_downsample: bool,

        #[arg(long, default_value_t = 95)]
        jpeg_quality: u8,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Classify a video's keyframe cadence and sampling strategy without extracting slides
    Info {
        /// Video file path
        video: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level.parse().unwrap_or(tracing::Level::WARN))
        .init();

    match cli.command {
        Commands::Extract {
            video,
            out_dir,
            chunk_size,
            threshold,
            no_downsample,
            jpeg_quality,
            config,
        } => {
            commands::extract::run(ExtractArgs {
                video,
                out_dir,
                chunk_size,
                threshold,
                downsample: !no_downsample,
                jpeg_quality,
                config,
            })?;
        }
        Commands::Batch {
            videos,
            out_dir,
            chunk_size,
            threshold,
            no_downsample,
            jpeg_quality,
            config,
        } => {
            commands::batch::run(BatchArgs {
                videos,
                out_dir,
                chunk_size,
                threshold,
                downsample: !no_downsample,
                jpeg_quality,
                config,
            })?;
        }
        Commands::Info { video } => {
            commands::info::run(InfoArgs { video })?;
        }
    }

    Ok(())
}
