//! Core data types for the pedometer engine.
//!
//! This module defines the values that flow between the pipeline stages:
//! raw motion readings, validated samples, step events, the progress ledger,
//! calendar markers, mission descriptors and achievement events.
//!
//! Design principle: if a concept exists, it gets a type. Mission identity,
//! achievement kind and calendar anchors are never passed around as bare
//! integers or tuples across module boundaries.

use serde::{Deserialize, Serialize};

// ============================================================================
// SENSOR TYPES
// ============================================================================

/// A raw device-motion reading as delivered by the platform.
///
/// Mirrors accelerationIncludingGravity: the whole vector may be absent, and
/// individual axes may be null on some devices. Any missing axis makes the
/// reading malformed.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MotionReading {
    pub accel: Option<[Option<f32>; 3]>,
}

impl MotionReading {
    /// Reading with all three axes present.
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            accel: Some([Some(x), Some(y), Some(z)]),
        }
    }

    /// Reading where the platform delivered no acceleration vector at all.
    pub fn missing() -> Self {
        Self { accel: None }
    }

    /// Validate this reading. Returns None if any axis is missing or not finite.
    pub fn sample(&self) -> Option<MotionSample> {
        let [x, y, z] = self.accel?;
        let accel = [x?, y?, z?];
        if accel.iter().all(|v| v.is_finite()) {
            Some(MotionSample { accel })
        } else {
            None
        }
    }
}

/// A validated acceleration-with-gravity sample [x, y, z] in device units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub accel: [f32; 3],
}

impl MotionSample {
    pub fn new(accel: [f32; 3]) -> Self {
        Self { accel }
    }
}

/// A detected step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEvent {
    /// Monotonic timestamp of the sample that produced the step.
    pub timestamp_ms: u64,
    /// Weighted magnitude that crossed the threshold.
    pub magnitude: f32,
}

impl StepEvent {
    pub fn new(timestamp_ms: u64, magnitude: f32) -> Self {
        Self {
            timestamp_ms,
            magnitude,
        }
    }
}

// ============================================================================
// PROGRESS TYPES
// ============================================================================

/// Counters tracked across the day and week.
///
/// All counters only ever increment by one or get zeroed, so they are
/// non-negative by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Ledger {
    pub daily_steps: u32,
    pub weekly_steps: u32,
    pub consecutive_days: u32,
    /// Cursor into the sequential mission list. Equal to the list length
    /// once every mission is complete.
    pub mission_index: usize,
    /// Monotonic timestamp of the last recorded step in this session. The
    /// step detector debounces against it.
    #[serde(skip)]
    pub last_step_ms: Option<u64>,
}

/// Durable date/week anchors compared against the clock at session start.
///
/// Both are None on the first-ever run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalendarMarkers {
    /// "YYYY-MM-DD"
    pub last_date_key: Option<String>,
    /// "YYYY-Www"
    pub last_week_key: Option<String>,
}

impl CalendarMarkers {
    pub fn new(date_key: impl Into<String>, week_key: impl Into<String>) -> Self {
        Self {
            last_date_key: Some(date_key.into()),
            last_week_key: Some(week_key.into()),
        }
    }
}

// ============================================================================
// MISSION TYPES
// ============================================================================

/// A sequential daily goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mission {
    pub id: u32,
    pub goal: u32,
    pub text: &'static str,
    pub icon: &'static str,
}

/// Which counter a bonus mission is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusKind {
    /// Compared against the consecutive-day streak.
    Consecutive,
    /// Compared against the weekly step total.
    Weekly,
}

/// A long-horizon goal evaluated independently of the sequential list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BonusMission {
    pub id: u32,
    pub kind: BonusKind,
    pub goal: u32,
    pub text: &'static str,
    pub icon: &'static str,
    /// Weekly steps required before this mission is visible at all.
    pub unlock_threshold: Option<u32>,
}

impl BonusMission {
    /// Current value of the counter this mission is measured against.
    pub fn counter(&self, ledger: &Ledger) -> u32 {
        match self.kind {
            BonusKind::Consecutive => ledger.consecutive_days,
            BonusKind::Weekly => ledger.weekly_steps,
        }
    }

    pub fn is_unlocked(&self, ledger: &Ledger) -> bool {
        self.unlock_threshold
            .map_or(true, |threshold| ledger.weekly_steps >= threshold)
    }

    pub fn is_satisfied(&self, ledger: &Ledger) -> bool {
        self.counter(ledger) >= self.goal
    }
}

/// Reference to the mission an achievement belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum MissionRef {
    Sequential(u32),
    Bonus(u32),
}

impl MissionRef {
    pub fn id(&self) -> u32 {
        match self {
            MissionRef::Sequential(id) | MissionRef::Bonus(id) => *id,
        }
    }
}

/// Emitted when a mission crosses its completion threshold.
///
/// Transient: consumed by the renderer, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementEvent {
    pub mission: MissionRef,
    pub is_bonus: bool,
}

impl AchievementEvent {
    pub fn sequential(id: u32) -> Self {
        Self {
            mission: MissionRef::Sequential(id),
            is_bonus: false,
        }
    }

    pub fn bonus(id: u32) -> Self {
        Self {
            mission: MissionRef::Bonus(id),
            is_bonus: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_with_all_axes_is_valid() {
        let reading = MotionReading::new(0.1, 0.2, 9.8);
        assert_eq!(reading.sample(), Some(MotionSample::new([0.1, 0.2, 9.8])));
    }

    #[test]
    fn test_reading_missing_vector_is_malformed() {
        assert_eq!(MotionReading::missing().sample(), None);
    }

    #[test]
    fn test_reading_with_null_axis_is_malformed() {
        let reading = MotionReading {
            accel: Some([Some(1.0), None, Some(9.8)]),
        };
        assert_eq!(reading.sample(), None);
    }

    #[test]
    fn test_reading_with_nan_is_malformed() {
        let reading = MotionReading::new(f32::NAN, 0.0, 9.8);
        assert_eq!(reading.sample(), None);
    }

    #[test]
    fn test_bonus_unlock_gate() {
        let secret = BonusMission {
            id: 103,
            kind: BonusKind::Weekly,
            goal: 50_000,
            text: "secret",
            icon: "*",
            unlock_threshold: Some(35_000),
        };
        let mut ledger = Ledger::default();
        ledger.weekly_steps = 34_999;
        assert!(!secret.is_unlocked(&ledger));
        ledger.weekly_steps = 35_000;
        assert!(secret.is_unlocked(&ledger));
        assert!(!secret.is_satisfied(&ledger));
    }

    #[test]
    fn test_achievement_constructors() {
        assert!(!AchievementEvent::sequential(1).is_bonus);
        assert!(AchievementEvent::bonus(101).is_bonus);
        assert_eq!(AchievementEvent::bonus(101).mission.id(), 101);
    }
}
