//! Step detection.
//!
//! Fixed-threshold detector on the weighted linear-acceleration magnitude:
//! - vertical axis weighted to emphasise walking bounce over lateral shake
//! - magnitude must exceed a device-sensitivity threshold
//! - minimum interval between steps debounces a single footfall that
//!   produces several spikes
//!
//! No auto-calibration. Thresholds are configuration. The debounce anchor is
//! the ledger's last recorded step, passed in by the caller.

use serde::{Deserialize, Serialize};

use crate::types::StepEvent;

/// Configuration for step detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepDetectorConfig {
    /// Magnitude a sample must exceed to count as a step.
    pub threshold: f32,
    /// Time that must have passed since the previous step, in milliseconds.
    pub step_interval_ms: u64,
    /// Weight applied to the z axis before computing the magnitude (> 1).
    pub vertical_weight: f32,
}

impl Default for StepDetectorConfig {
    fn default() -> Self {
        Self {
            threshold: 4.0,
            step_interval_ms: 500, // natural stride cadence
            vertical_weight: 1.2,
        }
    }
}

/// sqrt(x² + y² + (z·k)²)
pub fn weighted_magnitude(linear: [f32; 3], vertical_weight: f32) -> f32 {
    let [x, y, z] = linear;
    let zw = z * vertical_weight;
    (x * x + y * y + zw * zw).sqrt()
}

/// Threshold-and-debounce step detector.
#[derive(Debug, Clone)]
pub struct StepDetector {
    config: StepDetectorConfig,
    total_steps: u64,
}

impl StepDetector {
    pub fn new(config: StepDetectorConfig) -> Self {
        Self {
            config,
            total_steps: 0,
        }
    }

    /// Feed one linear-acceleration vector. Emits at most one step.
    ///
    /// `last_step_ms` is the timestamp of the previous recorded step, `None`
    /// for the first step of a session (never debounced).
    pub fn detect(
        &mut self,
        linear: [f32; 3],
        now_ms: u64,
        last_step_ms: Option<u64>,
    ) -> Option<StepEvent> {
        let magnitude = weighted_magnitude(linear, self.config.vertical_weight);
        if magnitude <= self.config.threshold {
            return None;
        }

        if let Some(last) = last_step_ms {
            if now_ms.saturating_sub(last) <= self.config.step_interval_ms {
                return None;
            }
        }

        self.total_steps += 1;
        Some(StepEvent::new(now_ms, magnitude))
    }

    /// Steps emitted since creation or the last reset.
    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    pub fn config(&self) -> &StepDetectorConfig {
        &self.config
    }

    pub fn reset(&mut self) {
        self.total_steps = 0;
    }
}

impl Default for StepDetector {
    fn default() -> Self {
        Self::new(StepDetectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Runs spikes through the detector, carrying the debounce anchor the
    /// way the session does.
    struct Feed {
        detector: StepDetector,
        last_step_ms: Option<u64>,
    }

    impl Feed {
        fn new() -> Self {
            Self {
                detector: StepDetector::default(),
                last_step_ms: None,
            }
        }

        fn push(&mut self, linear: [f32; 3], now_ms: u64) -> Option<StepEvent> {
            let step = self.detector.detect(linear, now_ms, self.last_step_ms);
            if let Some(step) = step {
                self.last_step_ms = Some(step.timestamp_ms);
            }
            step
        }
    }

    #[test]
    fn test_weighted_magnitude_emphasises_z() {
        assert!((weighted_magnitude([3.0, 4.0, 0.0], 1.2) - 5.0).abs() < 1e-5);
        assert!((weighted_magnitude([0.0, 0.0, 5.0], 1.2) - 6.0).abs() < 1e-5);
    }

    #[test]
    fn test_below_threshold_never_steps() {
        let mut feed = Feed::new();
        for i in 0..100 {
            assert!(feed.push([2.0, 2.0, 2.0], i * 1000).is_none());
        }
        assert_eq!(feed.detector.total_steps(), 0);
        assert_eq!(feed.last_step_ms, None);
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut feed = Feed::new();
        assert!(feed.push([4.0, 0.0, 0.0], 1000).is_none());
        assert!(feed.push([4.01, 0.0, 0.0], 2000).is_some());
    }

    #[test]
    fn test_first_step_has_no_debounce() {
        let mut detector = StepDetector::default();
        let step = detector.detect([10.0, 0.0, 0.0], 0, None);
        assert_eq!(step, Some(StepEvent::new(0, 10.0)));
    }

    #[test]
    fn test_spikes_within_interval_count_once() {
        let mut feed = Feed::new();
        assert!(feed.push([10.0, 0.0, 0.0], 1000).is_some());
        assert!(feed.push([10.0, 0.0, 0.0], 1300).is_none());
        assert!(feed.push([10.0, 0.0, 0.0], 1500).is_none());
        assert_eq!(feed.detector.total_steps(), 1);
        assert_eq!(feed.last_step_ms, Some(1000));
    }

    #[test]
    fn test_spikes_beyond_interval_count_twice() {
        let mut feed = Feed::new();
        assert!(feed.push([10.0, 0.0, 0.0], 1000).is_some());
        assert!(feed.push([10.0, 0.0, 0.0], 1501).is_some());
        assert_eq!(feed.detector.total_steps(), 2);
    }

    #[test]
    fn test_rejected_spike_does_not_move_debounce_window() {
        let mut feed = Feed::new();
        feed.push([10.0, 0.0, 0.0], 1000);
        feed.push([10.0, 0.0, 0.0], 1400);
        // 1600 is 600ms after the accepted step, only 200ms after the rejected one.
        assert!(feed.push([10.0, 0.0, 0.0], 1600).is_some());
    }

    #[test]
    fn test_reset_clears_step_count() {
        let mut feed = Feed::new();
        feed.push([10.0, 0.0, 0.0], 1000);
        feed.detector.reset();
        assert_eq!(feed.detector.total_steps(), 0);
    }
}
