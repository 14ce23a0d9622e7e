//! Throttle and device, serialized

use crate::device::HapticDevice;
use crate::throttle::{FeedbackState, FeedbackThrottle, HapticPulse};
use parking_lot::Mutex;
use proxima_core::{DangerLevel, HapticsConfig};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Owns the single long-lived [`FeedbackThrottle`].
///
/// The read-modify-write of the last-pulse time happens under one lock, so
/// concurrent level updates cannot both fire for the same interval.
pub struct HapticDriver {
    throttle: Mutex<FeedbackThrottle>,
    device: Arc<dyn HapticDevice>,
}

impl HapticDriver {
    pub fn new(config: &HapticsConfig, device: Arc<dyn HapticDevice>) -> Self {
        if !device.is_available() {
            info!("Haptic device '{}' unavailable, feedback disabled", device.name());
        }
        Self {
            throttle: Mutex::new(FeedbackThrottle::new(config)),
            device,
        }
    }

    pub fn update(&self, level: DangerLevel) -> Option<HapticPulse> {
        self.update_at(level, Instant::now())
    }

    /// Feed a new danger level observed at `now`; fires the device when the
    /// throttle allows. Returns the pulse that was sent.
    pub fn update_at(&self, level: DangerLevel, now: Instant) -> Option<HapticPulse> {
        if !self.device.is_available() {
            return None;
        }

        let pulse = self.throttle.lock().evaluate(level, now)?;
        if let Err(e) = self.device.fire(&pulse) {
            debug!("Haptic pulse dropped by '{}': {}", self.device.name(), e);
        }
        Some(pulse)
    }

    pub fn state(&self) -> FeedbackState {
        self.throttle.lock().state()
    }

    /// Reset the cadence and stop the device
    pub fn stop(&self) {
        self.throttle.lock().reset();
        self.device.stop();
    }
}
