//! Gravity separation.
//!
//! A single-pole low-pass filter tracks the gravity component of the
//! acceleration-with-gravity stream; subtracting it leaves the linear
//! acceleration used for step detection.
//!
//! All updates are incremental (O(1) per sample, no history buffer).

use serde::{Deserialize, Serialize};

use crate::types::MotionSample;

/// Parameters for gravity filtering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Weight of the previous gravity estimate, in (0, 1).
    /// Higher = slower gravity tracking, fewer false positives, slower
    /// adaptation to orientation changes.
    pub gravity_alpha: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self { gravity_alpha: 0.9 }
    }
}

/// Low-pass gravity estimator producing linear acceleration.
///
/// The gravity estimate starts at zero and lives only for one counting
/// session; call [`MotionFilter::reset`] when a new session begins.
#[derive(Debug, Clone)]
pub struct MotionFilter {
    gravity: [f32; 3],
    config: FilterConfig,
    sample_count: u64,
}

impl MotionFilter {
    pub fn new(config: FilterConfig) -> Self {
        Self {
            gravity: [0.0; 3],
            config,
            sample_count: 0,
        }
    }

    /// Update the gravity estimate and return `sample - gravity'`.
    ///
    /// g' = α*g + (1-α)*a
    pub fn filter(&mut self, sample: &MotionSample) -> [f32; 3] {
        let alpha = self.config.gravity_alpha;
        let mut linear = [0.0; 3];
        for axis in 0..3 {
            self.gravity[axis] = alpha * self.gravity[axis] + (1.0 - alpha) * sample.accel[axis];
            linear[axis] = sample.accel[axis] - self.gravity[axis];
        }
        self.sample_count += 1;
        linear
    }

    /// Current gravity estimate.
    pub fn gravity(&self) -> [f32; 3] {
        self.gravity
    }

    pub fn sample_count(&self) -> u64 {
        self.sample_count
    }

    /// Forget the gravity estimate.
    pub fn reset(&mut self) {
        self.gravity = [0.0; 3];
        self.sample_count = 0;
    }
}

impl Default for MotionFilter {
    fn default() -> Self {
        Self::new(FilterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_starts_at_zero_gravity() {
        let filter = MotionFilter::default();
        assert_eq!(filter.gravity(), [0.0, 0.0, 0.0]);
        assert_eq!(filter.sample_count(), 0);
    }

    #[test]
    fn test_first_sample_is_mostly_linear() {
        let mut filter = MotionFilter::default();
        let linear = filter.filter(&MotionSample::new([10.0, 0.0, 0.0]));

        // g' = 0.1 * 10 = 1.0, linear = 9.0
        assert!((filter.gravity()[0] - 1.0).abs() < 1e-5);
        assert!((linear[0] - 9.0).abs() < 1e-5);
        assert_eq!(linear[1], 0.0);
    }

    #[test]
    fn test_gravity_converges_on_steady_signal() {
        let mut filter = MotionFilter::default();
        let mut linear = [0.0; 3];
        for _ in 0..200 {
            linear = filter.filter(&MotionSample::new([0.0, 0.0, 9.81]));
        }

        assert!((filter.gravity()[2] - 9.81).abs() < 0.01);
        assert!(linear[2].abs() < 0.01);
    }

    #[test]
    fn test_reset_clears_gravity() {
        let mut filter = MotionFilter::default();
        for _ in 0..10 {
            filter.filter(&MotionSample::new([0.0, 0.0, 9.81]));
        }
        filter.reset();
        assert_eq!(filter.gravity(), [0.0, 0.0, 0.0]);
        assert_eq!(filter.sample_count(), 0);
    }

    #[test]
    fn test_lower_alpha_tracks_faster() {
        let mut slow = MotionFilter::default();
        let mut fast = MotionFilter::new(FilterConfig { gravity_alpha: 0.5 });
        for _ in 0..5 {
            slow.filter(&MotionSample::new([9.81, 0.0, 0.0]));
            fast.filter(&MotionSample::new([9.81, 0.0, 0.0]));
        }
        assert!(fast.gravity()[0] > slow.gravity()[0]);
    }
}
