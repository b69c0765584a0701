//! Deferred mission advance.
//!
//! When a sequential mission is achieved the cursor does not move at once:
//! the renderer gets a celebration window first. The advance is modelled as
//! an explicit, cancellable deferred action. Its presence is the single
//! in-flight lock for sequential evaluation, so the lock can never outlive
//! the action it guards.

use tracing::debug;

/// A scheduled cursor advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTransition {
    /// Cursor value of the achieved mission.
    pub mission_index: usize,
    pub due_at_ms: u64,
}

/// Emitted when a pending transition completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedTransition {
    pub mission_index: usize,
}

/// Single-flight scheduler for mission transitions.
#[derive(Debug, Clone, Default)]
pub struct MissionTransition {
    pending: Option<PendingTransition>,
}

impl MissionTransition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule an advance `delay_ms` from `now_ms`.
    ///
    /// Returns false without changing anything if one is already pending.
    pub fn schedule(&mut self, mission_index: usize, now_ms: u64, delay_ms: u64) -> bool {
        if self.pending.is_some() {
            return false;
        }
        let due_at_ms = now_ms.saturating_add(delay_ms);
        debug!(mission_index, due_at_ms, "mission transition scheduled");
        self.pending = Some(PendingTransition {
            mission_index,
            due_at_ms,
        });
        true
    }

    /// Complete the pending transition if it is due.
    pub fn poll(&mut self, now_ms: u64) -> Option<CompletedTransition> {
        match self.pending {
            Some(pending) if now_ms >= pending.due_at_ms => self.settle(),
            _ => None,
        }
    }

    /// Complete the pending transition now, regardless of its due time.
    pub fn settle(&mut self) -> Option<CompletedTransition> {
        self.pending.take().map(|pending| CompletedTransition {
            mission_index: pending.mission_index,
        })
    }

    /// Drop the pending transition without completing it.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(mission_index = pending.mission_index, "mission transition cancelled");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<PendingTransition> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_before_due_keeps_pending() {
        let mut transition = MissionTransition::new();
        assert!(transition.schedule(0, 1_000, 1_500));
        assert_eq!(transition.poll(2_499), None);
        assert!(transition.is_pending());
    }

    #[test]
    fn test_poll_at_due_completes() {
        let mut transition = MissionTransition::new();
        transition.schedule(2, 1_000, 1_500);
        assert_eq!(
            transition.poll(2_500),
            Some(CompletedTransition { mission_index: 2 })
        );
        assert!(!transition.is_pending());
        assert_eq!(transition.poll(10_000), None);
    }

    #[test]
    fn test_second_schedule_is_rejected() {
        let mut transition = MissionTransition::new();
        assert!(transition.schedule(0, 0, 1_500));
        assert!(!transition.schedule(1, 100, 1_500));
        assert_eq!(
            transition.pending(),
            Some(PendingTransition {
                mission_index: 0,
                due_at_ms: 1_500
            })
        );
    }

    #[test]
    fn test_cancel_releases_lock() {
        let mut transition = MissionTransition::new();
        transition.schedule(0, 0, 1_500);
        transition.cancel();
        assert!(!transition.is_pending());
        assert_eq!(transition.poll(5_000), None);
    }

    #[test]
    fn test_settle_completes_early() {
        let mut transition = MissionTransition::new();
        transition.schedule(3, 0, 1_500);
        assert_eq!(
            transition.settle(),
            Some(CompletedTransition { mission_index: 3 })
        );
        assert!(!transition.is_pending());
    }
}
