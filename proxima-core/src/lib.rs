//! proxima-core: shared vocabulary for the proxima feedback loop
//!
//! Provides:
//! - Calibration thresholds and the pipeline configuration
//! - Depth reading to danger level classification
//! - Feedback categories and their user-facing text
//! - The error type shared by the other proxima crates

pub mod config;
pub mod error;
pub mod proximity;

pub use config::{Calibration, HapticsConfig, ProximityConfig, SchedulerConfig};
pub use error::{ProximaError, Result};
pub use proximity::{DangerLevel, FeedbackCategory, ProximityClassifier};
