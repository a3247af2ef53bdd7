//! Single-slot, single-producer single-consumer rendezvous between the
//! decoder and the detector (§4.Q).
//!
//! Capacity is exactly one chunk: the producer blocks in [`ChunkQueue::put`]
//! until the consumer has drained the slot, and the consumer blocks in
//! [`ChunkQueue::take`] until a chunk arrives or the producer signals
//! [`ChunkQueue::finish`]. Peak memory in flight is therefore bounded to the
//! producer's working chunk, the slot, and the consumer's working chunk.

use std::sync::{Condvar, Mutex};
use std::time::Duration;

use crate::cancel::CancellationToken;
use crate::chunk::Chunk;

/// How often `put`/`take` wake up to re-check the cancellation token while
/// otherwise blocked on the condition variable.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(25);

struct Slot {
    chunk: Option<Chunk>,
    finished: bool,
}

pub struct ChunkQueue {
    slot: Mutex<Slot>,
    not_full: Condvar,
    not_empty: Condvar,
    cancel: CancellationToken,
}

/// Outcome of a [`ChunkQueue::take`] call.
pub enum Taken {
    Chunk(Chunk),
    /// The producer called `finish()` and the slot is empty: orderly
    /// end-of-stream, not an error (`QueueClosed` in the error taxonomy).
    EndOfStream,
    /// The cancellation token was observed before a chunk arrived.
    Cancelled,
}

impl ChunkQueue {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            slot: Mutex::new(Slot {
                chunk: None,
                finished: false,
            }),
            not_full: Condvar::new(),
            not_empty: Condvar::new(),
            cancel,
        }
    }

    /// Blocks until the slot is empty or cancellation is requested. On
    /// cancellation, returns `false` without storing the chunk (the caller
    /// should drop it).
    pub fn put(&self, chunk: Chunk) -> bool {
        let mut slot = self.slot.lock().unwrap();
        loop {
            if self.cancel.is_cancelled() {
                return false;
            }
            if slot.chunk.is_none() {
                break;
            }
            let (guard, _timeout) = self
                .not_full
                .wait_timeout(slot, CANCEL_POLL_INTERVAL)
                .unwrap();
            slot = guard;
        }
        slot.chunk = Some(chunk);
        self.not_empty.notify_one();
        true
    }

    /// Blocks until the slot is full, the producer has finished, or
    /// cancellation is requested.
    pub fn take(&self) -> Taken {
        let mut slot = self.slot.lock().unwrap();
        loop {
            if let Some(chunk) = slot.chunk.take() {
                self.not_full.notify_one();
                return Taken::Chunk(chunk);
            }
            if slot.finished {
                return Taken::EndOfStream;
            }
            if self.cancel.is_cancelled() {
                return Taken::Cancelled;
            }
            let (guard, _timeout) = self
                .not_empty
                .wait_timeout(slot, CANCEL_POLL_INTERVAL)
                .unwrap();
            slot = guard;
        }
    }

    /// Producer-only: atomically marks end-of-stream and wakes any waiter.
    pub fn finish(&self) {
        let mut slot = self.slot.lock().unwrap();
        slot.finished = true;
        self.not_empty.notify_all();
    }
}
