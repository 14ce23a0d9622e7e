//! Configuration for the proxima pipeline

use crate::error::{ProximaError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Raw-reading thresholds used to normalise a central depth reading.
///
/// The depth model emits relative inverse depth, so a larger reading means a
/// closer surface. A reading at or below `far` maps to level 0, a reading at
/// or above `near` maps to level 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub near: f32,
    pub far: f32,
}

impl Calibration {
    pub fn new(near: f32, far: f32) -> Self {
        Self { near, far }
    }

    /// Width of the interpolation band. Non-positive means misconfigured.
    pub fn range(&self) -> f32 {
        self.near - self.far
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self { near: 0.6, far: 0.3 }
    }
}

/// Inference scheduler timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Sleep between polls when no frame is pending
    pub poll_interval_ms: u64,
    /// Minimum spacing between two model invocations
    pub min_inference_interval_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            min_inference_interval_ms: 100,
        }
    }
}

impl SchedulerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn min_inference_interval(&self) -> Duration {
        Duration::from_millis(self.min_inference_interval_ms)
    }
}

/// Haptic pulse cadence
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HapticsConfig {
    /// Inter-pulse interval as the danger level approaches 0
    pub max_interval_ms: u64,
    /// Inter-pulse interval at danger level 1
    pub min_interval_ms: u64,
    /// Sharpness sent with every pulse
    pub sharpness: f32,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            max_interval_ms: 1000,
            min_interval_ms: 150,
            sharpness: 0.5,
        }
    }
}

impl HapticsConfig {
    pub fn max_interval(&self) -> Duration {
        Duration::from_millis(self.max_interval_ms)
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

/// Complete pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    pub calibration: Calibration,
    pub scheduler: SchedulerConfig,
    pub haptics: HapticsConfig,
    /// Side length of the central square region, in samples
    pub region_size: usize,
    /// Publish a renderable depth preview with every reading
    pub debug_mode: bool,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            calibration: Calibration::default(),
            scheduler: SchedulerConfig::default(),
            haptics: HapticsConfig::default(),
            region_size: 80,
            debug_mode: false,
        }
    }
}

impl ProximityConfig {
    /// Load configuration from a JSON or TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        debug!("Loading proximity config from {:?}", path);
        Self::from_str(&content)
    }

    /// Load configuration from a string, JSON first, then TOML
    pub fn from_str(content: &str) -> Result<Self> {
        if let Ok(config) = serde_json::from_str::<ProximityConfig>(content) {
            return Ok(config);
        }

        let config = toml::from_str::<ProximityConfig>(content)?;
        Ok(config)
    }

    /// Defaults overlaid with `PROXIMA_*` environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(near) = lookup("PROXIMA_NEAR").and_then(|v| v.parse().ok()) {
            self.calibration.near = near;
        }

        if let Some(far) = lookup("PROXIMA_FAR").and_then(|v| v.parse().ok()) {
            self.calibration.far = far;
        }

        if let Some(size) = lookup("PROXIMA_REGION_SIZE").and_then(|v| v.parse().ok()) {
            self.region_size = size;
        }

        if let Some(debug) = lookup("PROXIMA_DEBUG") {
            self.debug_mode = matches!(debug.as_str(), "1" | "true" | "yes" | "on");
        }
    }

    /// Validate configuration.
    ///
    /// `near <= far` is accepted: the classifier falls back to a binary rule.
    pub fn validate(&self) -> Result<()> {
        let Calibration { near, far } = self.calibration;
        if !near.is_finite() || !far.is_finite() {
            return Err(ProximaError::Config(
                "Calibration thresholds must be finite".to_string(),
            ));
        }

        if self.region_size == 0 {
            return Err(ProximaError::Config(
                "Region size must be greater than 0".to_string(),
            ));
        }

        if self.scheduler.poll_interval_ms == 0 {
            return Err(ProximaError::Config(
                "Poll interval must be greater than 0".to_string(),
            ));
        }

        if self.scheduler.min_inference_interval_ms == 0 {
            return Err(ProximaError::Config(
                "Minimum inference interval must be greater than 0".to_string(),
            ));
        }

        if self.haptics.min_interval_ms == 0 {
            return Err(ProximaError::Config(
                "Minimum pulse interval must be greater than 0".to_string(),
            ));
        }

        if self.haptics.min_interval_ms > self.haptics.max_interval_ms {
            return Err(ProximaError::Config(format!(
                "Minimum pulse interval ({}ms) exceeds maximum ({}ms)",
                self.haptics.min_interval_ms, self.haptics.max_interval_ms
            )));
        }

        if !(0.0..=1.0).contains(&self.haptics.sharpness) {
            return Err(ProximaError::Config(
                "Haptic sharpness must be between 0 and 1".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = ProximityConfig::default();
        assert_eq!(config.calibration.near, 0.6);
        assert_eq!(config.calibration.far, 0.3);
        assert_eq!(config.region_size, 80);
        assert_eq!(config.scheduler.poll_interval(), Duration::from_millis(10));
        assert_eq!(
            config.scheduler.min_inference_interval(),
            Duration::from_millis(100)
        );
        assert_eq!(config.haptics.max_interval(), Duration::from_secs(1));
        assert_eq!(config.haptics.min_interval(), Duration::from_millis(150));
        assert!(!config.debug_mode);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_misconfigured_thresholds_are_accepted() {
        let mut config = ProximityConfig::default();
        config.calibration = Calibration::new(0.4, 0.4);
        assert!(config.validate().is_ok());
        assert_eq!(config.calibration.range(), 0.0);
    }

    #[test]
    fn test_validation_rejects_nan_threshold() {
        let mut config = ProximityConfig::default();
        config.calibration.near = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_region() {
        let mut config = ProximityConfig::default();
        config.region_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_intervals() {
        let mut config = ProximityConfig::default();
        config.scheduler.poll_interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ProximityConfig::default();
        config.scheduler.min_inference_interval_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_inverted_pulse_intervals() {
        let mut config = ProximityConfig::default();
        config.haptics.min_interval_ms = 2000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_sharpness_out_of_range() {
        let mut config = ProximityConfig::default();
        config.haptics.sharpness = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_str_toml_partial() {
        let config = ProximityConfig::from_str(
            r#"
            region_size = 64

            [calibration]
            near = 0.9
            far = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(config.region_size, 64);
        assert_eq!(config.calibration, Calibration::new(0.9, 0.1));
        assert_eq!(config.scheduler.poll_interval_ms, 10);
    }

    #[test]
    fn test_from_str_json() {
        let config =
            ProximityConfig::from_str(r#"{"debug_mode": true, "scheduler": {"poll_interval_ms": 5}}"#)
                .unwrap();
        assert!(config.debug_mode);
        assert_eq!(config.scheduler.poll_interval_ms, 5);
        assert_eq!(config.scheduler.min_inference_interval_ms, 100);
    }

    #[test]
    fn test_from_str_garbage() {
        assert!(ProximityConfig::from_str("region_size = [").is_err());
    }

    #[test]
    fn test_env_overlay() {
        let vars: HashMap<&str, &str> = [
            ("PROXIMA_NEAR", "0.8"),
            ("PROXIMA_FAR", "0.2"),
            ("PROXIMA_REGION_SIZE", "40"),
            ("PROXIMA_DEBUG", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = ProximityConfig::default();
        config.apply_env(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.calibration, Calibration::new(0.8, 0.2));
        assert_eq!(config.region_size, 40);
        assert!(config.debug_mode);
    }

    #[test]
    fn test_env_overlay_ignores_unparsable() {
        let mut config = ProximityConfig::default();
        config.apply_env(|key| (key == "PROXIMA_NEAR").then(|| "close".to_string()));
        assert_eq!(config.calibration.near, 0.6);
    }
}
