//! `slidecap extract`: run the full pipeline against a single video (§10.5).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use slidecap_core::{CancellationToken, PipelineConfig, ProgressEvent, ProgressSink, SsimPreset};
use slidecap_decode::DecoderConfig;

use crate::config::FileConfig;
use crate::coordinator;

pub struct ExtractArgs {
    pub video: PathBuf,
    pub out_dir: PathBuf,
    pub chunk_size: usize,
    pub threshold: Option<f64>,
    pub downsample: bool,
    pub jpeg_quality: u8,
    pub config: Option<PathBuf>,
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let video_name = video_base_name(&args.video)?;
    let pipeline_config = build_pipeline_config(&args)?;
    let decoder_config = DecoderConfig {
        chunk_size: pipeline_config.chunk_size,
        ..DecoderConfig::default()
    };

    let cancel = CancellationToken::new();
    let progress: Arc<dyn ProgressSink> = Arc::new(logging_progress_sink());

    let outcome = coordinator::run(
        &args.video,
        &args.out_dir,
        &video_name,
        pipeline_config,
        decoder_config,
        cancel,
        progress,
    )
    .with_context(|| format!("extracting slides from {}", args.video.display()))?;

    println!(
        "{}: {} slide(s) saved to {} in {:.1}s ({}x{} @ {:.2}fps via {})",
        video_name,
        outcome.slides_saved,
        args.out_dir.join(format!("slides_{video_name}")).display(),
        outcome.elapsed.as_secs_f64(),
        outcome.video_info.width,
        outcome.video_info.height,
        outcome.video_info.frame_rate,
        outcome.video_info.backend_name,
    );
    if outcome.video_info.sparse_keyframes {
        eprintln!("warning: {} has sparse keyframes (avg interval {:.1}s); slide boundaries may be coarse", video_name, outcome.video_info.avg_keyframe_interval_s);
    }
    Ok(())
}

/// Merge CLI flags over an optional on-disk config file (§10.3): flags win.
fn build_pipeline_config(args: &ExtractArgs) -> Result<PipelineConfig> {
    let mut config = PipelineConfig::default();
    if let Some(path) = &args.config {
        config = FileConfig::load(path)?.apply(config);
    }
    config.chunk_size = args.chunk_size;
    config.downsample_enabled = args.downsample;
    config.jpeg_quality = args.jpeg_quality;
    if let Some(t) = args.threshold {
        config.ssim_preset = SsimPreset::Custom(t);
    }
    config.validate().context("invalid pipeline configuration")?;
    Ok(config)
}

pub(crate) fn video_base_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("could not derive a video name from {}", path.display()))
}

/// Route every progress event through `tracing` (§10.1) rather than
/// `println!`, leaving the CLI's own stdout for the final summary line.
pub(crate) fn logging_progress_sink() -> impl ProgressSink {
    move |event: ProgressEvent| match event {
        ProgressEvent::SlideSaved {
            sequence_number,
            file_path,
            ..
        } => {
            tracing::info!(sequence_number, path = %file_path.display(), "slide saved");
        }
        ProgressEvent::VideoInfo {
            width,
            height,
            duration_s,
            backend_name,
            screen_recording,
            ..
        } => {
            tracing::info!(width, height, duration_s, backend = %backend_name, screen_recording, "video opened");
        }
        ProgressEvent::DecoderProgress { percent, .. } => {
            tracing::debug!(percent, "decoding");
        }
        ProgressEvent::SsimProgress {
            scores_completed,
            scores_total_in_chunk,
        } => {
            tracing::debug!(scores_completed, scores_total_in_chunk, "ssim progress");
        }
        ProgressEvent::DetectorProgress {
            local_index,
            scores_total_in_chunk,
        } => {
            tracing::debug!(local_index, scores_total_in_chunk, "detector progress");
        }
    }
}
