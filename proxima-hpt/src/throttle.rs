//! Danger-level dependent pulse cadence

use proxima_core::{DangerLevel, HapticsConfig};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// One transient haptic event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HapticPulse {
    /// In `[0.3, 1.0]` for any valid danger level
    pub intensity: f32,
    pub sharpness: f32,
}

/// What the throttle remembers between updates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FeedbackState {
    pub last_pulse: Option<Instant>,
    pub last_intensity: f32,
}

/// Turns a continuous danger level into discrete, spaced pulses.
///
/// The gap between pulses shrinks linearly from `max_interval` (level near
/// 0) to `min_interval` (level 1). It is evaluated on every level update
/// rather than on its own clock. Level 0 never pulses.
#[derive(Debug, Clone)]
pub struct FeedbackThrottle {
    max_interval: Duration,
    min_interval: Duration,
    sharpness: f32,
    state: FeedbackState,
}

impl Default for FeedbackThrottle {
    fn default() -> Self {
        Self::new(&HapticsConfig::default())
    }
}

impl FeedbackThrottle {
    pub fn new(config: &HapticsConfig) -> Self {
        Self {
            max_interval: config.max_interval(),
            min_interval: config.min_interval(),
            sharpness: config.sharpness,
            state: FeedbackState::default(),
        }
    }

    pub fn state(&self) -> FeedbackState {
        self.state
    }

    /// Required gap since the previous pulse at `level`
    pub fn interval_for(&self, level: DangerLevel) -> Duration {
        let span = self.max_interval.saturating_sub(self.min_interval);
        self.max_interval.saturating_sub(span.mul_f64(level.value()))
    }

    /// Decide whether to pulse at `now`. On a pulse the last-pulse time
    /// moves to `now`; it never moves backwards.
    pub fn evaluate(&mut self, level: DangerLevel, now: Instant) -> Option<HapticPulse> {
        if level.is_clear() {
            return None;
        }

        if let Some(last) = self.state.last_pulse {
            if now.saturating_duration_since(last) < self.interval_for(level) {
                return None;
            }
            if now < last {
                return None;
            }
        }

        let intensity = (0.3 + 0.7 * level.value()).min(1.0) as f32;
        self.state = FeedbackState {
            last_pulse: Some(now),
            last_intensity: intensity,
        };

        Some(HapticPulse {
            intensity,
            sharpness: self.sharpness,
        })
    }

    /// Forget the last pulse so the next non-zero level fires immediately
    pub fn reset(&mut self) {
        self.state = FeedbackState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[test]
    fn test_interval_endpoints() {
        let throttle = FeedbackThrottle::default();
        assert_eq!(throttle.interval_for(DangerLevel::MAX), ms(150));
        assert_eq!(throttle.interval_for(DangerLevel::CLEAR), ms(1000));
        let mid = throttle.interval_for(DangerLevel::new(0.5));
        assert!(mid > ms(574) && mid < ms(576));
    }

    #[test]
    fn test_first_pulse_fires_immediately() {
        let mut throttle = FeedbackThrottle::default();
        let pulse = throttle.evaluate(DangerLevel::new(0.1), Instant::now());
        assert!(pulse.is_some());
    }

    #[test]
    fn test_clear_never_fires() {
        let mut throttle = FeedbackThrottle::default();
        let start = Instant::now();
        for step in 0..20 {
            assert!(throttle.evaluate(DangerLevel::CLEAR, start + ms(step * 1000)).is_none());
        }
        assert_eq!(throttle.state(), FeedbackState::default());
    }

    #[test]
    fn test_intensity_bounds() {
        let start = Instant::now();
        let mut throttle = FeedbackThrottle::default();
        let full = throttle.evaluate(DangerLevel::MAX, start).unwrap();
        assert!((full.intensity - 1.0).abs() < 1e-6);
        assert_eq!(full.sharpness, 0.5);

        let mut throttle = FeedbackThrottle::default();
        let faint = throttle.evaluate(DangerLevel::new(1e-9), start).unwrap();
        assert!((faint.intensity - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_time_going_backwards_does_not_fire_or_rewind() {
        let mut throttle = FeedbackThrottle::default();
        let start = Instant::now() + ms(5000);
        throttle.evaluate(DangerLevel::MAX, start).unwrap();
        assert!(throttle.evaluate(DangerLevel::MAX, start - ms(2000)).is_none());
        assert_eq!(throttle.state().last_pulse, Some(start));
    }

    #[test]
    fn test_reset_allows_immediate_pulse() {
        let mut throttle = FeedbackThrottle::default();
        let start = Instant::now();
        throttle.evaluate(DangerLevel::MAX, start).unwrap();
        assert!(throttle.evaluate(DangerLevel::MAX, start + ms(10)).is_none());
        throttle.reset();
        assert!(throttle.evaluate(DangerLevel::MAX, start + ms(20)).is_some());
    }
}
