//! Cross-chunk detector state (§3 `ProcessingState`, `VerificationState`).
//!
//! Owned exclusively by the consumer thread; the producer never touches it.
//! Modelled as a tagged [`Verification`] variant carrying the exact number
//! of confirmations still needed, rather than the source's loose
//! `(VerificationState, Option<usize>)` pair or a fixed three-way
//! `None`/`Progress1`/`Progress2` split — a closed enum over "confirmations
//! observed" cannot represent a candidate detected on a chunk's very last
//! score, which still needs the full `V - 1` confirmations and would
//! otherwise have nowhere to live (see Design Notes).

use crate::framebuffer::FrameBuffer;

/// Cross-chunk verification carry: either nothing is pending, or a
/// candidate frame at `start_global_index` still needs `confirmations_needed`
/// more consecutive stable scores before it is accepted as a slide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    None,
    InProgress {
        confirmations_needed: usize,
        start_global_index: usize,
    },
}

impl Default for Verification {
    fn default() -> Self {
        Verification::None
    }
}

/// The last frame of the most recently processed chunk, retained to bridge
/// the next chunk's working view (§4.X.1).
pub struct OverlapFrame {
    pub buffer: FrameBuffer,
    pub global_index: usize,
}

/// Persistent, per-video state threaded through successive chunks.
#[derive(Default)]
pub struct ProcessingState {
    pub saved_global_indices: Vec<usize>,
    pub last_stable_index: Option<usize>,
    pub overlap: Option<OverlapFrame>,
    pub verification: Verification,
    pub global_frame_offset: usize,
}

impl ProcessingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff no chunk has been processed yet.
    pub fn is_first_chunk(&self) -> bool {
        self.overlap.is_none()
    }

    /// Record a newly confirmed slide. Callers are expected to push in
    /// increasing order; §4.X.4 runs a defensive dedup/sort pass at the end
    /// of the video regardless.
    pub fn record_saved(&mut self, global_index: usize) {
        self.saved_global_indices.push(global_index);
        self.last_stable_index = Some(global_index);
    }

    /// Replace the overlap frame with the final buffer of the chunk just
    /// processed, and advance the global frame offset by that chunk's
    /// length (§4.X.5).
    pub fn advance(&mut self, new_overlap: FrameBuffer, new_overlap_global_index: usize, chunk_len: usize) {
        self.overlap = Some(OverlapFrame {
            buffer: new_overlap,
            global_index: new_overlap_global_index,
        });
        self.global_frame_offset += chunk_len;
    }

    /// Defensive invariant pass run once at end-of-video (§4.X.4): dedup and
    /// sort. The algorithm is designed to keep this a no-op in practice.
    pub fn finalize(&mut self) {
        self.saved_global_indices.sort_unstable();
        self.saved_global_indices.dedup();
    }
}

/// The single local-index -> global-index mapping used throughout the
/// detector (§4.X.1), centralised so no call site has to re-derive the
/// "is this the first chunk, and is this local index the overlap frame"
/// branching by hand.
pub fn local_to_global(
    is_first_chunk: bool,
    global_frame_offset: usize,
    overlap_global_index: Option<usize>,
    local_index: usize,
) -> usize {
    if is_first_chunk {
        global_frame_offset + local_index
    } else if local_index == 0 {
        overlap_global_index.expect("overlap frame must be set past the first chunk")
    } else {
        global_frame_offset + (local_index - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_chunk_maps_local_to_offset_plus_local() {
        assert_eq!(local_to_global(true, 0, None, 3), 3);
        assert_eq!(local_to_global(true, 100, None, 3), 103);
    }

    #[test]
    fn later_chunk_local_zero_is_the_overlap_frame() {
        assert_eq!(local_to_global(false, 500, Some(499), 0), 499);
        assert_eq!(local_to_global(false, 500, Some(499), 1), 500);
        assert_eq!(local_to_global(false, 500, Some(499), 2), 501);
    }

    #[test]
    fn record_saved_tracks_last_stable_index() {
        let mut state = ProcessingState::new();
        state.record_saved(0);
        state.record_saved(4);
        assert_eq!(state.saved_global_indices, vec![0, 4]);
        assert_eq!(state.last_stable_index, Some(4));
    }

    #[test]
    fn finalize_dedups_and_sorts() {
        let mut state = ProcessingState::new();
        state.saved_global_indices = vec![4, 0, 4, 2];
        state.finalize();
        assert_eq!(state.saved_global_indices, vec![0, 2, 4]);
    }
}
