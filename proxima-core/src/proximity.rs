//! Depth reading to danger level classification

use crate::config::Calibration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalised obstacle proximity, always within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(from = "f64")]
pub struct DangerLevel(f64);

impl From<f64> for DangerLevel {
    fn from(value: f64) -> Self {
        DangerLevel::new(value)
    }
}

impl DangerLevel {
    pub const CLEAR: DangerLevel = DangerLevel(0.0);
    pub const MAX: DangerLevel = DangerLevel(1.0);

    /// Clamp `value` into `[0, 1]`. NaN maps to 0.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::CLEAR;
        }
        DangerLevel(value.clamp(0.0, 1.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn is_clear(self) -> bool {
        self.0 <= 0.0
    }

    pub fn category(self) -> FeedbackCategory {
        FeedbackCategory::from_level(self)
    }
}

impl fmt::Display for DangerLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Ordered feedback buckets. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    Clear,
    Caution,
    Warning,
    Critical,
}

impl FeedbackCategory {
    pub fn from_level(level: DangerLevel) -> Self {
        let level = level.value();
        if level > 0.8 {
            FeedbackCategory::Critical
        } else if level > 0.5 {
            FeedbackCategory::Warning
        } else if level > 0.2 {
            FeedbackCategory::Caution
        } else {
            FeedbackCategory::Clear
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackCategory::Clear => "clear",
            FeedbackCategory::Caution => "caution",
            FeedbackCategory::Warning => "warning",
            FeedbackCategory::Critical => "critical",
        }
    }

    /// Text shown to the user for this category
    pub fn message(&self) -> &'static str {
        match self {
            FeedbackCategory::Clear => "Path is clear",
            FeedbackCategory::Caution => "There is room before the obstacle",
            FeedbackCategory::Warning => "Obstacle ahead",
            FeedbackCategory::Critical => "Obstacle very close",
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps central depth readings onto danger levels for a fixed calibration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProximityClassifier {
    calibration: Calibration,
}

impl ProximityClassifier {
    pub fn new(calibration: Calibration) -> Self {
        Self { calibration }
    }

    pub fn calibration(&self) -> Calibration {
        self.calibration
    }

    /// Linear interpolation between `far` (level 0) and `near` (level 1).
    ///
    /// With `near <= far` there is no band to interpolate over, so the
    /// reading is compared against `near` alone.
    pub fn compute_level(&self, depth: f32) -> DangerLevel {
        let Calibration { near, far } = self.calibration;
        let range = self.calibration.range();
        if !(range > 0.0) {
            return if depth > near {
                DangerLevel::MAX
            } else {
                DangerLevel::CLEAR
            };
        }

        let level = (f64::from(depth) - f64::from(far)) / f64::from(range);
        DangerLevel::new(level)
    }

    pub fn classify(&self, depth: f32) -> (DangerLevel, FeedbackCategory) {
        let level = self.compute_level(depth);
        (level, level.category())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn classifier() -> ProximityClassifier {
        ProximityClassifier::new(Calibration::default())
    }

    #[test]
    fn test_deserialized_level_is_clamped() {
        let high: DangerLevel = serde_json::from_str("5.0").unwrap();
        assert_eq!(high, DangerLevel::MAX);
        let low: DangerLevel = serde_json::from_str("-0.5").unwrap();
        assert_eq!(low, DangerLevel::CLEAR);
        let mid: DangerLevel = serde_json::from_str("0.25").unwrap();
        assert_eq!(mid.value(), 0.25);
        assert_eq!(serde_json::to_string(&mid).unwrap(), "0.25");
    }

    #[test]
    fn test_far_threshold_is_clear() {
        let (level, category) = classifier().classify(0.3);
        assert_eq!(level.value(), 0.0);
        assert_eq!(category, FeedbackCategory::Clear);
        assert!(level.is_clear());
    }

    #[test]
    fn test_near_threshold_is_critical() {
        let (level, category) = classifier().classify(0.6);
        assert!((level.value() - 1.0).abs() < 1e-6);
        assert_eq!(category, FeedbackCategory::Critical);
    }

    #[test]
    fn test_midpoint_interpolates() {
        let level = classifier().compute_level(0.45);
        assert!((level.value() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_outside_band_clamps() {
        assert_eq!(classifier().compute_level(-10.0), DangerLevel::CLEAR);
        assert_eq!(classifier().compute_level(10.0), DangerLevel::MAX);
        assert_eq!(classifier().compute_level(f32::INFINITY), DangerLevel::MAX);
        assert_eq!(classifier().compute_level(f32::NEG_INFINITY), DangerLevel::CLEAR);
        assert_eq!(classifier().compute_level(f32::NAN), DangerLevel::CLEAR);
    }

    #[test]
    fn test_equal_thresholds_fall_back_to_binary() {
        let classifier = ProximityClassifier::new(Calibration::new(0.4, 0.4));
        assert_eq!(classifier.compute_level(0.4), DangerLevel::CLEAR);
        assert_eq!(classifier.compute_level(0.41), DangerLevel::MAX);
        assert_eq!(classifier.compute_level(0.1), DangerLevel::CLEAR);
    }

    #[test]
    fn test_inverted_thresholds_fall_back_to_binary() {
        let classifier = ProximityClassifier::new(Calibration::new(0.2, 0.7));
        assert_eq!(classifier.compute_level(0.5), DangerLevel::MAX);
        assert_eq!(classifier.compute_level(0.2), DangerLevel::CLEAR);
    }

    #[test]
    fn test_category_breakpoints() {
        assert_eq!(DangerLevel::new(0.0).category(), FeedbackCategory::Clear);
        assert_eq!(DangerLevel::new(0.2).category(), FeedbackCategory::Clear);
        assert_eq!(DangerLevel::new(0.21).category(), FeedbackCategory::Caution);
        assert_eq!(DangerLevel::new(0.5).category(), FeedbackCategory::Caution);
        assert_eq!(DangerLevel::new(0.51).category(), FeedbackCategory::Warning);
        assert_eq!(DangerLevel::new(0.8).category(), FeedbackCategory::Warning);
        assert_eq!(DangerLevel::new(0.81).category(), FeedbackCategory::Critical);
    }

    #[test]
    fn test_categories_are_ordered() {
        assert!(FeedbackCategory::Clear < FeedbackCategory::Caution);
        assert!(FeedbackCategory::Warning < FeedbackCategory::Critical);
        assert_eq!(FeedbackCategory::Warning.to_string(), "warning");
    }

    proptest! {
        #[test]
        fn prop_level_always_in_unit_range(depth in proptest::num::f32::ANY, near in -10.0f32..10.0, far in -10.0f32..10.0) {
            let level = ProximityClassifier::new(Calibration::new(near, far)).compute_level(depth);
            prop_assert!((0.0..=1.0).contains(&level.value()));
        }

        #[test]
        fn prop_level_monotonic_in_reading(a in -5.0f32..5.0, b in -5.0f32..5.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let classifier = classifier();
            prop_assert!(classifier.compute_level(lo) <= classifier.compute_level(hi));
        }

        #[test]
        fn prop_misconfigured_is_binary(depth in -5.0f32..5.0, t in -1.0f32..1.0) {
            let level = ProximityClassifier::new(Calibration::new(t, t)).compute_level(depth);
            prop_assert!(level.value() == 0.0 || level.value() == 1.0);
        }
    }
}
