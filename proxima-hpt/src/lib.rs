//! proxima-hpt: haptic feedback for the proxima loop
//!
//! Provides:
//! - [`FeedbackThrottle`]: danger level to rate-limited pulse decisions
//! - [`HapticDevice`]: the boundary to vibration hardware
//! - [`HapticDriver`]: serialized throttle plus device, safe to share

pub mod device;
pub mod driver;
pub mod error;
pub mod throttle;

pub use device::{HapticDevice, LogHaptics, NullHaptics};
pub use driver::HapticDriver;
pub use error::HapticError;
pub use throttle::{FeedbackState, FeedbackThrottle, HapticPulse};
