//! Progress ledger: the only place counters change.

use crate::calendar::RolloverOutcome;
use crate::types::Ledger;

/// Owner of the session's [`Ledger`].
///
/// Exposes increment and zero operations only, which keeps every counter a
/// non-negative integer without further validation.
#[derive(Debug, Clone, Default)]
pub struct ProgressLedger {
    ledger: Ledger,
}

impl ProgressLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self { ledger }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Owned copy for renderers.
    pub fn snapshot(&self) -> Ledger {
        self.ledger
    }

    pub fn record_step(&mut self, at_ms: u64) {
        self.ledger.daily_steps = self.ledger.daily_steps.saturating_add(1);
        self.ledger.weekly_steps = self.ledger.weekly_steps.saturating_add(1);
        self.ledger.last_step_ms = Some(at_ms);
    }

    /// Forget the debounce anchor. The next step of the session is not debounced.
    pub fn clear_last_step(&mut self) {
        self.ledger.last_step_ms = None;
    }

    /// Move the mission cursor forward, clamped at `mission_count`.
    pub fn advance_mission(&mut self, mission_count: usize) {
        self.ledger.mission_index = (self.ledger.mission_index + 1).min(mission_count);
    }

    pub fn apply_rollover(&mut self, outcome: &RolloverOutcome) {
        self.ledger = outcome.ledger;
    }

    /// Zero every counter, including the streak and the mission cursor.
    pub fn reset_all(&mut self) {
        self.ledger = Ledger::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_record_step_increments_day_and_week() {
        let mut ledger = ProgressLedger::default();
        ledger.record_step(100);
        ledger.record_step(700);

        assert_eq!(ledger.ledger().daily_steps, 2);
        assert_eq!(ledger.ledger().weekly_steps, 2);
        assert_eq!(ledger.ledger().last_step_ms, Some(700));
        assert_eq!(ledger.ledger().consecutive_days, 0);
    }

    #[test]
    fn test_clear_last_step_keeps_counters() {
        let mut ledger = ProgressLedger::default();
        ledger.record_step(100);
        ledger.clear_last_step();

        assert_eq!(ledger.ledger().last_step_ms, None);
        assert_eq!(ledger.ledger().daily_steps, 1);
    }

    #[test]
    fn test_advance_mission_clamps() {
        let mut ledger = ProgressLedger::default();
        for _ in 0..10 {
            ledger.advance_mission(5);
        }
        assert_eq!(ledger.ledger().mission_index, 5);
    }

    #[test]
    fn test_reset_all_zeroes_everything() {
        let mut ledger = ProgressLedger::new(Ledger {
            daily_steps: 10,
            weekly_steps: 200,
            consecutive_days: 3,
            mission_index: 2,
            last_step_ms: Some(5),
        });
        ledger.reset_all();
        assert_eq!(ledger.snapshot(), Ledger::default());
    }
}
