//! Haptic hardware boundary

use crate::error::HapticError;
use crate::throttle::HapticPulse;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Vibration hardware. `fire` is fire-and-forget: callers log failures and
/// move on.
pub trait HapticDevice: Send + Sync {
    fn fire(&self, pulse: &HapticPulse) -> Result<(), HapticError>;

    /// False when the platform has no haptic hardware
    fn is_available(&self) -> bool;

    fn stop(&self);

    fn name(&self) -> &str;
}

/// Stand-in for devices without haptics. Feedback is silently absent.
#[derive(Debug, Default)]
pub struct NullHaptics;

impl HapticDevice for NullHaptics {
    fn fire(&self, _pulse: &HapticPulse) -> Result<(), HapticError> {
        Err(HapticError::Unavailable)
    }

    fn is_available(&self) -> bool {
        false
    }

    fn stop(&self) {}

    fn name(&self) -> &str {
        "none"
    }
}

/// Writes every pulse to the log. Used by the command line runner.
#[derive(Debug, Default)]
pub struct LogHaptics {
    fired: AtomicU64,
}

impl LogHaptics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fired(&self) -> u64 {
        self.fired.load(Ordering::Relaxed)
    }
}

impl HapticDevice for LogHaptics {
    fn fire(&self, pulse: &HapticPulse) -> Result<(), HapticError> {
        let count = self.fired.fetch_add(1, Ordering::Relaxed) + 1;
        info!(
            "Haptic pulse #{} intensity={:.2} sharpness={:.2}",
            count, pulse.intensity, pulse.sharpness
        );
        Ok(())
    }

    fn is_available(&self) -> bool {
        true
    }

    fn stop(&self) {
        info!("Haptics stopped after {} pulses", self.fired());
    }

    fn name(&self) -> &str {
        "log"
    }
}
