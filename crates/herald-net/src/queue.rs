//! Outbound frame queue shared between report producers and the session.
//!
//! Producers run on whatever thread the host calls them from and only ever
//! enqueue. The session task is the single consumer: it waits on the wake
//! signal (bounded by a poll timeout), drains everything that is queued and
//! writes it out in insertion order.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// Unbounded FIFO of already-framed byte buffers with a wake signal.
#[derive(Debug, Default)]
pub struct OutboundQueue {
    frames: Mutex<VecDeque<Vec<u8>>>,
    wake: Notify,
}

impl OutboundQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame and fire the wake signal once.
    ///
    /// If the consumer is not currently waiting the signal is kept as a single
    /// permit, so the next [`wait`](Self::wait) returns immediately.
    pub fn enqueue(&self, frame: Vec<u8>) {
        self.frames.lock().push_back(frame);
        self.wake.notify_one();
    }

    /// Remove and return every queued frame, oldest first.
    pub fn drain_all(&self) -> Vec<Vec<u8>> {
        self.frames.lock().drain(..).collect()
    }

    /// Discard everything queued. Returns how many frames were dropped.
    pub fn clear(&self) -> usize {
        let mut frames = self.frames.lock();
        let dropped = frames.len();
        frames.clear();
        dropped
    }

    /// Number of frames waiting to be sent.
    pub fn len(&self) -> usize {
        self.frames.lock().len()
    }

    /// Whether nothing is waiting to be sent.
    pub fn is_empty(&self) -> bool {
        self.frames.lock().is_empty()
    }

    /// Wait for the wake signal for at most `timeout`.
    ///
    /// Returns `true` when woken by an enqueue and `false` when the poll
    /// timeout elapsed. Either way the caller should drain.
    pub async fn wait(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.wake.notified())
            .await
            .is_ok()
    }
}
