//! Scenario tests for proximity classification

use proxima_core::{Calibration, DangerLevel, FeedbackCategory, ProximityClassifier};

#[test]
fn test_reading_at_far_threshold() {
    let classifier = ProximityClassifier::new(Calibration::default());
    let (level, category) = classifier.classify(0.3);
    assert_eq!(level, DangerLevel::CLEAR);
    assert_eq!(category, FeedbackCategory::Clear);
    assert_eq!(category.message(), "Path is clear");
}

#[test]
fn test_reading_at_near_threshold() {
    let classifier = ProximityClassifier::new(Calibration::default());
    let (level, category) = classifier.classify(0.6);
    assert_eq!(level, DangerLevel::MAX);
    assert_eq!(category, FeedbackCategory::Critical);
}

#[test]
fn test_sweep_never_leaves_unit_range() {
    let classifier = ProximityClassifier::new(Calibration::default());
    let mut previous = DangerLevel::CLEAR;
    for step in -100..=200 {
        let reading = step as f32 / 100.0;
        let level = classifier.compute_level(reading);
        assert!((0.0..=1.0).contains(&level.value()));
        assert!(level >= previous, "level dropped at reading {}", reading);
        previous = level;
    }
}

#[test]
fn test_equal_thresholds_never_nan() {
    let classifier = ProximityClassifier::new(Calibration::new(0.5, 0.5));
    for reading in [f32::MIN, -1.0, 0.0, 0.5, 0.5001, 1.0, f32::MAX] {
        let level = classifier.compute_level(reading);
        assert!(!level.value().is_nan());
        assert!(level == DangerLevel::CLEAR || level == DangerLevel::MAX);
    }
}
