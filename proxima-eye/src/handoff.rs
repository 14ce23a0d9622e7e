//! Latest-wins single-slot frame exchange

use crate::frame::Frame;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Single-slot buffer between the camera producer and the inference loop.
///
/// `put` never blocks on the consumer and never queues: a pending frame that
/// has not been taken yet is replaced and dropped. `take` empties the slot,
/// so every frame is returned at most once.
#[derive(Debug, Default)]
pub struct FrameHandoff {
    slot: Mutex<Option<Frame>>,
    delivered: AtomicU64,
    overwritten: AtomicU64,
}

impl FrameHandoff {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `frame`, replacing any pending one. Returns true if a pending
    /// frame was discarded.
    pub fn put(&self, frame: Frame) -> bool {
        let previous = self.slot.lock().replace(frame);
        self.delivered.fetch_add(1, Ordering::Relaxed);

        // Dropped after the guard is released.
        match previous {
            Some(stale) => {
                self.overwritten.fetch_add(1, Ordering::Relaxed);
                trace!("Frame {} superseded before inference", stale.sequence());
                true
            }
            None => false,
        }
    }

    /// Remove and return the pending frame, if any
    pub fn take(&self) -> Option<Frame> {
        self.slot.lock().take()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.lock().is_none()
    }

    /// Drop any pending frame
    pub fn clear(&self) {
        self.slot.lock().take();
    }

    /// Total frames ever put
    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    /// Frames replaced before anyone took them
    pub fn overwritten(&self) -> u64 {
        self.overwritten.load(Ordering::Relaxed)
    }
}
