//! The decoder component (§4.D): opens a video, estimates its keyframe
//! cadence, picks a sampling strategy, and emits chunks of BGR 8-bit
//! [`FrameBuffer`]s into a [`ChunkQueue`] in presentation order.

use std::path::Path;

use ffmpeg_next::format::{input, Pixel};
use ffmpeg_next::media::Type as MediaType;
use ffmpeg_next::software::scaling::{context::Context as SwsContext, flag::Flags};
use ffmpeg_next::util::frame::video::Video as AvFrame;
use once_cell::sync::OnceCell;

use slidecap_core::{CancellationToken, Chunk, ChunkQueue, FrameBuffer, ProgressEvent, ProgressSink};

use crate::backend::{open_video_decoder, BackendKind};
use crate::error::{DecodeError, Result};
use crate::sampling::{
    classify_interval, estimate_avg_keyframe_interval, is_screen_recording, keep_keyframe,
    SamplingStrategy,
};

static FFMPEG_INIT: OnceCell<()> = OnceCell::new();

/// Initialise the underlying media library exactly once per process.
fn ensure_ffmpeg_initialized() -> Result<()> {
    FFMPEG_INIT
        .get_or_try_init(|| {
            ffmpeg_next::init().map_err(|e| DecodeError::OpenFailed(e.to_string()))
        })
        .map(|_| ())
}

/// Parameters governing one decode run, distinct from the pipeline-wide
/// [`slidecap_core::PipelineConfig`] since they are decoder-only (§6: "file
/// path... chunk size N... target interval").
#[derive(Debug, Clone)]
pub struct DecoderConfig {
    pub chunk_size: usize,
    pub target_interval_s: f64,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            target_interval_s: 2.0,
        }
    }
}

/// What the `video_info` progress event reports, and what the CLI's `info`
/// subcommand prints without running the full pipeline (§4.D steps 1-4).
#[derive(Debug, Clone)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub duration_s: f64,
    pub frame_rate: f64,
    pub avg_keyframe_interval_s: f64,
    pub sparse_keyframes: bool,
    pub screen_recording: bool,
    pub sampling_strategy: SamplingStrategy,
    pub backend_name: String,
}

/// Decodes `path` according to `config`, feeding chunks into `queue` until
/// end-of-stream or `cancel` is observed. Runs on the producer thread; the
/// caller is expected to call [`ChunkQueue::finish`]-equivalent cleanup via
/// this function's own return (it always calls `queue.finish()` before
/// returning, success or failure).
pub fn run_decode(
    path: &Path,
    config: &DecoderConfig,
    queue: &ChunkQueue,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<VideoInfo> {
    let result = decode_inner(path, config, queue, cancel, progress);
    queue.finish();
    result
}

fn decode_inner(
    path: &Path,
    config: &DecoderConfig,
    queue: &ChunkQueue,
    cancel: &CancellationToken,
    progress: &dyn ProgressSink,
) -> Result<VideoInfo> {
    ensure_ffmpeg_initialized()?;

    let mut ictx = input(path).map_err(|e| DecodeError::OpenFailed(e.to_string()))?;
    let stream = ictx
        .streams()
        .best(MediaType::Video)
        .ok_or(DecodeError::NoVideoStream)?;
    let stream_index = stream.index();
    let time_base = stream.time_base();
    let duration_s = if stream.duration() > 0 {
        stream.duration() as f64 * f64::from(time_base)
    } else {
        ictx.duration() as f64 / f64::from(ffmpeg_next::ffi::AV_TIME_BASE)
    };
    let frame_rate: f64 = stream.rate().into();
    let parameters = stream.parameters();
    let codec_id = parameters.id();

    let opened = open_video_decoder(codec_id, &parameters)?;
    let mut decoder = opened.decoder;
    let width = decoder.width();
    let height = decoder.height();

    // Step 2: scan up to 100 packets on the video stream to estimate the
    // average keyframe interval, then rewind.
    let mut keyframe_pts = Vec::new();
    let mut scanned = 0usize;
    for (stream, packet) in ictx.packets() {
        if stream.index() != stream_index {
            continue;
        }
        scanned += 1;
        if packet.is_key() {
            if let Some(pts) = packet.pts() {
                keyframe_pts.push(pts as f64 * f64::from(time_base));
            }
        }
        if scanned >= 100 {
            break;
        }
    }
    let avg_interval = estimate_avg_keyframe_interval(&keyframe_pts);
    let (strategy, sparse_keyframes) = classify_interval(avg_interval);
    let codec_name = codec_id.name();
    let screen_recording = is_screen_recording(width, height, codec_name, frame_rate, avg_interval);

    ictx.seek(0, ..0)
        .map_err(|e| DecodeError::OpenFailed(format!("seek to start failed: {e}")))?;

    let info = VideoInfo {
        width,
        height,
        duration_s,
        frame_rate,
        avg_keyframe_interval_s: avg_interval,
        sparse_keyframes,
        screen_recording,
        sampling_strategy: strategy,
        backend_name: opened.backend.name().to_string(),
    };
    progress.emit(ProgressEvent::VideoInfo {
        width,
        height,
        duration_s,
        frame_rate,
        avg_keyframe_interval_s: avg_interval,
        screen_recording,
        backend_name: info.backend_name.clone(),
    });

    let mut scaler: Option<SwsContext> = None;
    let mut pending: Vec<FrameBuffer> = Vec::with_capacity(config.chunk_size);
    let mut global_index = 0usize;
    let mut chunk_start = 0usize;
    let mut keyframe_ordinal = 0u64;

    macro_rules! flush_chunk {
        ($is_last:expr) => {{
            let frames = std::mem::replace(&mut pending, Vec::with_capacity(config.chunk_size));
            let chunk = Chunk::new(chunk_start, $is_last, frames);
            chunk_start = chunk.end_offset();
            if !queue.put(chunk) {
                return Err(DecodeError::Cancelled);
            }
        }};
    }

    'packets: for (stream, packet) in ictx.packets() {
        if cancel.is_cancelled() {
            return Err(DecodeError::Cancelled);
        }
        if stream.index() != stream_index {
            continue;
        }
        if !packet.is_key() {
            continue;
        }
        keyframe_ordinal += 1;
        if !keep_keyframe(strategy, keyframe_ordinal) {
            continue;
        }

        if let Err(e) = decoder.send_packet(&packet) {
            tracing::warn!(error = %e, "failed to send packet, skipping");
            continue;
        }

        let mut raw = AvFrame::empty();
        while decoder.receive_frame(&mut raw).is_ok() {
            if cancel.is_cancelled() {
                return Err(DecodeError::Cancelled);
            }
            let buffer = convert_to_bgr(&raw, &mut scaler, width, height)?;
            pending.push(buffer);
            global_index += 1;

            progress.emit(ProgressEvent::DecoderProgress {
                current_pts_s: raw.pts().unwrap_or(0) as f64 * f64::from(time_base),
                total_duration_s: duration_s,
                percent: if duration_s > 0.0 {
                    (raw.pts().unwrap_or(0) as f64 * f64::from(time_base) / duration_s * 100.0)
                        .clamp(0.0, 100.0)
                } else {
                    0.0
                },
            });

            if pending.len() >= config.chunk_size {
                flush_chunk!(false);
            }
            if global_index >= slidecap_core::limits::MAX_FRAMES_PER_VIDEO {
                break 'packets;
            }
        }
    }

    // Drain the decoder.
    let _ = decoder.send_eof();
    let mut raw = AvFrame::empty();
    while decoder.receive_frame(&mut raw).is_ok() {
        let buffer = convert_to_bgr(&raw, &mut scaler, width, height)?;
        pending.push(buffer);
        if pending.len() >= config.chunk_size {
            flush_chunk!(false);
        }
    }

    flush_chunk!(true);

    Ok(info)
}

fn convert_to_bgr(
    raw: &AvFrame,
    scaler: &mut Option<SwsContext>,
    width: u32,
    height: u32,
) -> Result<FrameBuffer> {
    if scaler.is_none() {
        *scaler = Some(
            SwsContext::get(raw.format(), width, height, Pixel::BGR24, width, height, Flags::BILINEAR)
                .map_err(|e| DecodeError::Packet(format!("failed to build scaler: {e}")))?,
        );
    }
    let mut bgr = AvFrame::empty();
    scaler
        .as_mut()
        .unwrap()
        .run(raw, &mut bgr)
        .map_err(|e| DecodeError::Packet(format!("scaling failed: {e}")))?;

    let src_stride = bgr.stride(0);
    let row_bytes = width as usize * slidecap_core::CHANNELS;
    let dst_stride = slidecap_core::framebuffer::align_up(row_bytes);
    let mut bytes = vec![0u8; dst_stride * height as usize];
    let src = bgr.data(0);
    for row in 0..height as usize {
        let src_row = &src[row * src_stride..row * src_stride + row_bytes];
        let dst_row = &mut bytes[row * dst_stride..row * dst_stride + row_bytes];
        dst_row.copy_from_slice(src_row);
    }
    FrameBuffer::from_bytes(width, height, dst_stride, bytes)
        .map_err(|e| DecodeError::Packet(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_documented_defaults() {
        let cfg = DecoderConfig::default();
        assert_eq!(cfg.chunk_size, 500);
        assert!((cfg.target_interval_s - 2.0).abs() < 1e-9);
    }

    #[test]
    fn backend_kind_survives_into_video_info() {
        let info = VideoInfo {
            width: 1920,
            height: 1080,
            duration_s: 120.0,
            frame_rate: 30.0,
            avg_keyframe_interval_s: 2.0,
            sparse_keyframes: false,
            screen_recording: true,
            sampling_strategy: SamplingStrategy::UseAllKeyframes,
            backend_name: BackendKind::Software.name().to_string(),
        };
        assert_eq!(info.backend_name, "software");
    }
}
