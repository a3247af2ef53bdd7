//! Progress events emitted by the pipeline (§6).
//!
//! Plain data plus a sink trait rather than the source's synchronous
//! callbacks (Design Notes: "prefer a channel/iterator abstraction"); any
//! `Fn(ProgressEvent) + Send + Sync` closure is a valid sink, so callers can
//! wire this to a channel, a logger, or a GUI event bus as they see fit.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    DecoderProgress {
        current_pts_s: f64,
        total_duration_s: f64,
        percent: f64,
    },
    SsimProgress {
        scores_completed: usize,
        scores_total_in_chunk: usize,
    },
    DetectorProgress {
        local_index: usize,
        scores_total_in_chunk: usize,
    },
    VideoInfo {
        width: u32,
        height: u32,
        duration_s: f64,
        frame_rate: f64,
        avg_keyframe_interval_s: f64,
        screen_recording: bool,
        backend_name: String,
    },
    SlideSaved {
        video_name: String,
        sequence_number: u32,
        file_path: PathBuf,
    },
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

impl<F> ProgressSink for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn emit(&self, event: ProgressEvent) {
        self(event)
    }
}

/// A sink that discards every event; the default when the caller doesn't
/// care about progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProgressSink;

impl ProgressSink for NullProgressSink {
    fn emit(&self, _event: ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn closures_implement_progress_sink() {
        let count = Arc::new(AtomicUsize::new(0));
        let count2 = Arc::clone(&count);
        let sink = move |_event: ProgressEvent| {
            count2.fetch_add(1, Ordering::SeqCst);
        };
        sink.emit(ProgressEvent::SlideSaved {
            video_name: "lecture".into(),
            sequence_number: 1,
            file_path: "lecture/slides_lecture/slide_lecture_001.jpg".into(),
        });
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn null_sink_accepts_anything() {
        NullProgressSink.emit(ProgressEvent::DecoderProgress {
            current_pts_s: 1.0,
            total_duration_s: 10.0,
            percent: 10.0,
        });
    }
}
