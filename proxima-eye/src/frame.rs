//! Captured camera frames

use bytes::Bytes;
use std::time::Instant;

/// One captured image. The pipeline never looks inside the pixel data; it
/// only hands the frame to the depth model.
///
/// Frames are deliberately not `Clone`: each one is owned by exactly one
/// stage at a time and dropped once consumed or superseded.
#[derive(Debug)]
pub struct Frame {
    sequence: u64,
    width: u32,
    height: u32,
    data: Bytes,
    captured_at: Instant,
}

impl Frame {
    pub fn new(sequence: u64, width: u32, height: u32, data: Bytes) -> Self {
        Self {
            sequence,
            width,
            height,
            data,
            captured_at: Instant::now(),
        }
    }

    /// Producer-assigned sequence number, increasing in delivery order
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn captured_at(&self) -> Instant {
        self.captured_at
    }
}
