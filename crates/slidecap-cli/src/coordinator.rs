//! The coordinator (§2, §5): owns the decoder and the detector, starts one
//! producer thread running D and drives the consumer (X -> W) on the
//! calling thread, bridged by a capacity-1 [`ChunkQueue`]. Joins the
//! producer before reporting — the same producer/consumer thread pairing
//! [`slidecap_core::queue`]'s own tests already exercise, with the sink
//! wired onto the consumer side here.

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use slidecap_core::{CancellationToken, ChunkQueue, PipelineConfig, ProgressSink, Taken};
use slidecap_decode::{run_decode, DecodeError, DecoderConfig, VideoInfo};
use slidecap_detect::{DetectError, Detector};
use slidecap_sink::{Sink, SinkError};

use crate::error::{PipelineError, Result};

/// What one [`run`] call reports back to the command layer.
pub struct PipelineOutcome {
    pub video_info: VideoInfo,
    pub slides_saved: u32,
    pub elapsed: Duration,
}

/// Run the full `D -> Q -> X -> W` pipeline against one video.
///
/// `cancel` is observed at every suspension point in both the producer and
/// the consumer (§5); cancelling mid-run ends the pipeline in
/// [`PipelineError::Cancelled`] rather than a surfaced failure, with
/// whatever slides were already written left on disk (§7).
pub fn run(
    video_path: &Path,
    out_dir: &Path,
    video_name: &str,
    pipeline_config: PipelineConfig,
    decoder_config: DecoderConfig,
    cancel: CancellationToken,
    progress: Arc<dyn ProgressSink>,
) -> Result<PipelineOutcome> {
    pipeline_config.validate()?;

    let started = Instant::now();
    let queue = ChunkQueue::new(cancel.clone());

    let mut detector = Detector::new(pipeline_config);
    let mut sink = Sink::new(out_dir, video_name, pipeline_config.jpeg_quality)?;

    let (video_info_result, consumer_outcome) = thread::scope(|scope| {
        let queue_ref = &queue;
        let progress_ref = progress.as_ref();
        let producer_cancel = cancel.clone();
        let producer_path = video_path.to_path_buf();
        let producer_config = decoder_config.clone();
        let producer = scope.spawn(move || {
            run_decode(
                &producer_path,
                &producer_config,
                queue_ref,
                &producer_cancel,
                progress_ref,
            )
        });

        let consumer_outcome = drain(&queue, &mut detector, &mut sink, progress.as_ref(), &cancel);
        let video_info_result = producer.join().expect("producer thread panicked");
        (video_info_result, consumer_outcome)
    });

    let slides_saved = consumer_outcome?;

    let video_info = match video_info_result {
        Ok(info) => info,
        Err(DecodeError::Cancelled) => return Err(PipelineError::Cancelled),
        Err(e) => return Err(PipelineError::Decode(e)),
    };

    Ok(PipelineOutcome {
        video_info,
        slides_saved,
        elapsed: started.elapsed(),
    })
}

/// The consumer side: repeatedly take a chunk, run it through the detector,
/// and write every newly confirmed slide through the sink. Per-slide write
/// failures are logged and skipped (`SinkError::is_recoverable`, §7);
/// everything else is fatal for the video.
fn drain(
    queue: &ChunkQueue,
    detector: &mut Detector,
    sink: &mut Sink,
    progress: &dyn ProgressSink,
    cancel: &CancellationToken,
) -> Result<u32> {
    loop {
        if cancel.is_cancelled() {
            return Ok(sink.saved_count());
        }
        match queue.take() {
            Taken::Chunk(chunk) => {
                let result = match detector.process_chunk(chunk, progress, cancel) {
                    Ok(result) => result,
                    Err(DetectError::Cancelled) => return Ok(sink.saved_count()),
                    Err(err) => return Err(err.into()),
                };
                for slide in result.saved {
                    match sink.save(slide.frame.view(), progress) {
                        Ok(_) => {}
                        Err(err) if err.is_recoverable() => {
                            tracing::warn!(error = %err, global_index = slide.global_index, "slide write failed, continuing");
                        }
                        Err(err) => return Err(err.into()),
                    }
                }
                if result.video_finished {
                    return Ok(sink.saved_count());
                }
            }
            Taken::EndOfStream | Taken::Cancelled => return Ok(sink.saved_count()),
        }
    }
}
