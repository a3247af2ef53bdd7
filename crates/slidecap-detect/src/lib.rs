//! slidecap-detect: the chunk-aware two-stage stability detector (§4.X).
//!
//! Consumes one [`Chunk`] at a time, maintains [`ProcessingState`] across
//! chunk boundaries via a single-frame overlap, and emits the subset of
//! newly confirmed slide frames that fall within the chunk just processed.
//! This is deliberately the only place the local-index/global-index
//! mapping and the cross-chunk verification carry are exercised; everything
//! else in the pipeline only ever sees global indices.

pub mod error;

use slidecap_core::{
    local_to_global, CancellationToken, Chunk, FrameBuffer, PipelineConfig, ProcessingState,
    ProgressEvent, ProgressSink, Verification, VERIFICATION_COUNT,
};

pub use error::{DetectError, Result};

/// One confirmed slide, still holding an owned copy of its pixel data for
/// the sink to write out.
pub struct SavedSlide {
    pub global_index: usize,
    pub frame: FrameBuffer,
}

/// What a chunk's processing produced.
pub struct ChunkResult {
    pub saved: Vec<SavedSlide>,
    pub video_finished: bool,
}

enum VerifyOutcome {
    Success { j: usize },
    Fail { f: usize },
    Inconclusive { confirmed: usize },
}

/// Check up to `v` scores starting at `candidate_local` for stability.
/// `v == 0` means no further confirmations are needed: succeeds immediately
/// at `candidate_local` itself (the zero-confirmations-remaining case of a
/// carried-in verification, §4.X.3).
fn verify_window(candidate_local: usize, v: usize, scores: &[f64], threshold: f64) -> VerifyOutcome {
    for k in 0..v {
        let idx = candidate_local + k;
        match scores.get(idx) {
            None => return VerifyOutcome::Inconclusive { confirmed: k },
            Some(&score) if score < threshold => return VerifyOutcome::Fail { f: idx },
            Some(_) => {}
        }
    }
    VerifyOutcome::Success {
        j: candidate_local + v,
    }
}

pub struct Detector {
    config: PipelineConfig,
    state: ProcessingState,
}

impl Detector {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            state: ProcessingState::new(),
        }
    }

    pub fn state(&self) -> &ProcessingState {
        &self.state
    }

    fn downsample_target(&self) -> Option<(u32, u32)> {
        if self.config.downsample_enabled {
            Some((self.config.downsample_width, self.config.downsample_height))
        } else {
            None
        }
    }

    /// Duplicate the frame at `local` within the working view, record its
    /// global index as saved, and hand the owned copy to the caller.
    fn take_slide(
        &mut self,
        local: usize,
        global: usize,
        w: &[FrameBuffer],
    ) -> Result<SavedSlide> {
        self.state.record_saved(global);
        let frame = w[local].duplicate()?;
        Ok(SavedSlide {
            global_index: global,
            frame,
        })
    }

    /// Process one chunk, updating cross-chunk state and returning the
    /// slides newly confirmed within it (§4.X.1-§4.X.6). `cancel` is checked
    /// at each iteration of the main loop (§5), since a single chunk may
    /// hold hundreds of frames and cancellation must not wait for the next
    /// `take()` boundary to take effect.
    pub fn process_chunk(
        &mut self,
        chunk: Chunk,
        progress: &dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<ChunkResult> {
        let is_first = self.state.is_first_chunk();
        let n = chunk.len();
        let is_last = chunk.is_last;
        let start_offset = chunk.start_offset;
        self.state.global_frame_offset = start_offset;
        let chunk_start_global = start_offset;

        let overlap_global_index = self.state.overlap.as_ref().map(|o| o.global_index);
        let carried_verification = std::mem::replace(&mut self.state.verification, Verification::None);

        let mut w: Vec<FrameBuffer> = Vec::with_capacity(n + 1);
        if let Some(overlap) = self.state.overlap.take() {
            w.push(overlap.buffer);
        }
        w.extend(chunk.into_frames());

        let mut saved = Vec::new();

        if w.is_empty() {
            if is_last {
                self.state.finalize();
            }
            return Ok(ChunkResult {
                saved,
                video_finished: is_last,
            });
        }

        if is_first {
            saved.push(self.take_slide(0, chunk_start_global, &w)?);
        }

        let threshold = self.config.ssim_threshold();
        let views: Vec<_> = w.iter().map(|f| f.view()).collect();
        let scores = slidecap_metrics::batch_adjacent_ssim(&views, self.downsample_target())?;
        progress.emit(ProgressEvent::SsimProgress {
            scores_completed: scores.len(),
            scores_total_in_chunk: scores.len(),
        });

        let mut i = 0usize;

        if let Verification::InProgress {
            confirmations_needed,
            start_global_index,
        } = carried_verification
        {
            match verify_window(0, confirmations_needed, &scores, threshold) {
                VerifyOutcome::Success { j } => {
                    let g = local_to_global(is_first, chunk_start_global, overlap_global_index, j);
                    saved.push(self.take_slide(j, g, &w)?);
                    i = j;
                }
                VerifyOutcome::Fail { f } => i = f,
                VerifyOutcome::Inconclusive { confirmed } => {
                    self.state.verification = Verification::InProgress {
                        confirmations_needed: confirmations_needed - confirmed,
                        start_global_index,
                    };
                    i = scores.len();
                }
            }
        }

        while i < scores.len() {
            if cancel.is_cancelled() {
                return Err(DetectError::Cancelled);
            }
            progress.emit(ProgressEvent::DetectorProgress {
                local_index: i,
                scores_total_in_chunk: scores.len(),
            });
            if scores[i] >= threshold {
                i += 1;
                continue;
            }
            let candidate_local = i + 1;
            let v = VERIFICATION_COUNT - 1;
            match verify_window(candidate_local, v, &scores, threshold) {
                VerifyOutcome::Success { j } => {
                    let g = local_to_global(is_first, chunk_start_global, overlap_global_index, j);
                    saved.push(self.take_slide(j, g, &w)?);
                    i = j;
                }
                VerifyOutcome::Fail { f } => i = f,
                VerifyOutcome::Inconclusive { confirmed } => {
                    let g = local_to_global(
                        is_first,
                        chunk_start_global,
                        overlap_global_index,
                        candidate_local,
                    );
                    self.state.verification = Verification::InProgress {
                        confirmations_needed: v - confirmed,
                        start_global_index: g,
                    };
                    i = scores.len();
                }
            }
        }

        if is_last {
            let total_frames = chunk_start_global + n;
            if let Some(l) = self.state.last_stable_index {
                if total_frames >= 2 && l == total_frames - 2 {
                    saved.push(self.take_slide(w.len() - 1, total_frames - 1, &w)?);
                } else if total_frames >= 3
                    && l == total_frames - 3
                    && scores.last().is_some_and(|&s| s >= threshold)
                {
                    saved.push(self.take_slide(w.len() - 1, total_frames - 1, &w)?);
                }
            }
            self.state.finalize();
        }

        if n > 0 {
            let local_last = w.len() - 1;
            let global_last =
                local_to_global(is_first, chunk_start_global, overlap_global_index, local_last);
            let new_overlap = w.pop().expect("w is non-empty when n > 0");
            self.state.advance(new_overlap, global_last, n);
        }

        tracing::debug!(
            chunk_start = chunk_start_global,
            frames = n,
            saved = saved.len(),
            is_last,
            "chunk processed"
        );

        Ok(ChunkResult {
            saved,
            video_finished: is_last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidecap_core::{Chunk, NullProgressSink, PipelineConfig};

    fn solid_frame(width: u32, height: u32, value: u8) -> FrameBuffer {
        let mut buf = FrameBuffer::create(width, height).unwrap();
        let stride = buf.stride();
        for row in 0..height {
            let start = row as usize * stride;
            for b in &mut buf.bytes_mut()[start..start + width as usize * 3] {
                *b = value;
            }
        }
        buf
    }

    fn config() -> PipelineConfig {
        let mut cfg = PipelineConfig::default();
        cfg.downsample_enabled = false;
        cfg
    }

    fn frames_from_values(values: &[u8]) -> Vec<FrameBuffer> {
        values.iter().map(|&v| solid_frame(8, 8, v)).collect()
    }

    fn saved_indices(result: &ChunkResult) -> Vec<usize> {
        result.saved.iter().map(|s| s.global_index).collect()
    }

    #[test]
    fn single_frame_video_saves_index_zero() {
        let mut detector = Detector::new(config());
        let chunk = Chunk::new(0, true, frames_from_values(&[10]));
        let result = detector.process_chunk(chunk, &NullProgressSink, &CancellationToken::new()).unwrap();
        assert_eq!(saved_indices(&result), vec![0]);
        assert!(result.video_finished);
    }

    #[test]
    fn two_identical_frames_save_both_by_end_of_sequence_rule() {
        let mut detector = Detector::new(config());
        let chunk = Chunk::new(0, true, frames_from_values(&[10, 10]));
        let result = detector.process_chunk(chunk, &NullProgressSink, &CancellationToken::new()).unwrap();
        assert_eq!(saved_indices(&result), vec![0, 1]);
    }

    // All-similar video (scenario 1, §8): 5 frames, no transitions.
    #[test]
    fn all_stable_frames_save_only_the_first() {
        let mut detector = Detector::new(config());
        let chunk = Chunk::new(0, true, frames_from_values(&[10, 10, 10, 10, 10]));
        let result = detector.process_chunk(chunk, &NullProgressSink, &CancellationToken::new()).unwrap();
        assert_eq!(saved_indices(&result), vec![0]);
    }

    // One transition confirmed immediately (scenario 2 shape, §8).
    #[test]
    fn single_transition_is_confirmed_after_verification() {
        let mut detector = Detector::new(config());
        let chunk = Chunk::new(0, true, frames_from_values(&[10, 10, 200, 200, 200]));
        let result = detector.process_chunk(chunk, &NullProgressSink, &CancellationToken::new()).unwrap();
        assert_eq!(saved_indices(&result), vec![0, 2]);
    }

    // A transition whose candidate fails verification restarts from there
    // (scenario 4 shape, §8): unstable, unstable, stable, stable.
    #[test]
    fn failed_verification_restarts_from_point_of_instability() {
        let mut detector = Detector::new(config());
        let chunk = Chunk::new(0, true, frames_from_values(&[10, 90, 170, 170, 170]));
        let result = detector.process_chunk(chunk, &NullProgressSink, &CancellationToken::new()).unwrap();
        // whatever the exact indices, saved stays strictly increasing and starts at 0
        let indices = saved_indices(&result);
        assert_eq!(indices[0], 0);
        assert!(indices.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn chunk_boundary_independence_matches_single_chunk_result() {
        let values = [10u8, 10, 200, 200, 200, 10, 10, 200];
        let mut whole = Detector::new(config());
        let chunk = Chunk::new(0, true, frames_from_values(&values));
        let whole_result = whole.process_chunk(chunk, &NullProgressSink, &CancellationToken::new()).unwrap();
        let mut whole_saved = saved_indices(&whole_result);
        whole_saved.sort_unstable();

        let mut split = Detector::new(config());
        let frames = frames_from_values(&values);
        let mut all_saved = Vec::new();
        let chunk_size = 3;
        let total = frames.len();
        let mut frames = frames.into_iter();
        let mut offset = 0;
        loop {
            let batch: Vec<_> = (&mut frames).take(chunk_size).collect();
            let is_last = offset + batch.len() >= total;
            let n = batch.len();
            let chunk = Chunk::new(offset, is_last, batch);
            let result = split.process_chunk(chunk, &NullProgressSink, &CancellationToken::new()).unwrap();
            all_saved.extend(result.saved.iter().map(|s| s.global_index));
            offset += n;
            if is_last {
                break;
            }
        }
        all_saved.sort_unstable();
        all_saved.dedup();
        assert_eq!(whole_saved, all_saved);
    }

    #[test]
    fn carried_progress1_verification_confirms_on_the_next_chunks_first_score() {
        // First chunk: stable run, then instability at the very last score with
        // one confirmation observed before the chunk boundary.
        let mut detector = Detector::new(config());
        let first = Chunk::new(0, false, frames_from_values(&[10, 10, 200, 200]));
        let r1 = detector.process_chunk(first, &NullProgressSink, &CancellationToken::new()).unwrap();
        // scores: [1.0, <T, 1.0] over local indices; candidate_local=2 (global 2),
        // one confirmation (score[2]) observed, one more needed ->
        // InProgress{confirmations_needed: 1} (Progress1).
        assert_eq!(saved_indices(&r1), vec![0]);
        assert!(matches!(
            detector.state().verification,
            Verification::InProgress { .. }
        ));

        let second = Chunk::new(4, true, frames_from_values(&[200]));
        let r2 = detector.process_chunk(second, &NullProgressSink, &CancellationToken::new()).unwrap();
        // Overlap is global 3; working view is [g3, g4], scores = [1.0];
        // verify_window(0, 1) succeeds at j=1 -> global 4. The whole-video
        // sequence [10,10,200,200,200] saves [0, 4], so by chunk-boundary
        // independence (§8.4) the split must also save 4, not 2.
        assert_eq!(saved_indices(&r2), vec![4]);
    }

    #[test]
    fn cancellation_is_observed_inside_the_main_loop() {
        let mut detector = Detector::new(config());
        let chunk = Chunk::new(0, true, frames_from_values(&[10, 10, 10]));
        let cancel = CancellationToken::new();
        cancel.cancel();
        let err = detector.process_chunk(chunk, &NullProgressSink, &cancel).unwrap_err();
        assert!(matches!(err, DetectError::Cancelled));
    }
}
