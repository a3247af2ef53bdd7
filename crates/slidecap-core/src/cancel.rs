//! The single cancellation primitive shared by the producer, the consumer,
//! and the queue between them (§5).
//!
//! A [`CancellationToken`] is the only atomically shared mutable state in
//! the pipeline; everything else crosses threads by move.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Thread-safe, lock-free query — cheap enough to call at every
    /// decoder packet-read boundary and every detector main-loop iteration.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }
}
