//! Mission catalog and achievement evaluation.
//!
//! Sequential missions form a fixed daily ladder: only the mission at the
//! ledger's cursor is eligible, and the cursor moves only after the
//! achievement's transition completes (see [`crate::transitions`]).
//!
//! Bonus missions are checked independently on every step. Each one fires at
//! most once per tracking period, tracked by an explicit completion set held
//! here rather than derived from anything a renderer displays.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;

use crate::types::{AchievementEvent, BonusKind, BonusMission, Ledger, Mission};

const DEFAULT_MISSIONS: [Mission; 5] = [
    Mission {
        id: 1,
        goal: 100,
        text: "Beginner: 100 steps",
        icon: "👟",
    },
    Mission {
        id: 2,
        goal: 500,
        text: "Warm-up: 500 steps",
        icon: "🏃",
    },
    Mission {
        id: 3,
        goal: 1_000,
        text: "Basic training: 1,000 steps",
        icon: "⛰️",
    },
    Mission {
        id: 4,
        goal: 5_000,
        text: "Daily goal: 5,000 steps",
        icon: "🏅",
    },
    Mission {
        id: 5,
        goal: 7_777,
        text: "Secret bonus: 7,777 steps!",
        icon: "🎁",
    },
];

const DEFAULT_BONUS_MISSIONS: [BonusMission; 3] = [
    BonusMission {
        id: 101,
        kind: BonusKind::Consecutive,
        goal: 5,
        text: "Streak challenger: 5 days in a row",
        icon: "🔥",
        unlock_threshold: None,
    },
    BonusMission {
        id: 102,
        kind: BonusKind::Weekly,
        goal: 35_000,
        text: "Weekly distance runner: 35,000 steps",
        icon: "🗓️",
        unlock_threshold: None,
    },
    BonusMission {
        id: 103,
        kind: BonusKind::Weekly,
        goal: 50_000,
        text: "Hidden marathon: 50,000 steps this week",
        icon: "🌸",
        unlock_threshold: Some(35_000),
    },
];

/// Static mission definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissionCatalog {
    pub missions: Vec<Mission>,
    pub bonus_missions: Vec<BonusMission>,
}

impl MissionCatalog {
    pub fn new(missions: Vec<Mission>, bonus_missions: Vec<BonusMission>) -> Self {
        Self {
            missions,
            bonus_missions,
        }
    }

    /// The sequential mission at the ledger's cursor, or None when all are done.
    pub fn current_mission(&self, ledger: &Ledger) -> Option<&Mission> {
        self.missions.get(ledger.mission_index)
    }

    pub fn all_missions_complete(&self, ledger: &Ledger) -> bool {
        ledger.mission_index >= self.missions.len()
    }

    /// Fraction of the current mission reached, in [0, 1].
    /// 1.0 once every mission is complete.
    pub fn mission_progress(&self, ledger: &Ledger) -> f32 {
        match self.current_mission(ledger) {
            Some(mission) if mission.goal > 0 => {
                (ledger.daily_steps as f32 / mission.goal as f32).min(1.0)
            }
            _ => 1.0,
        }
    }
}

impl Default for MissionCatalog {
    fn default() -> Self {
        Self::new(DEFAULT_MISSIONS.to_vec(), DEFAULT_BONUS_MISSIONS.to_vec())
    }
}

/// Display state of one bonus mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BonusStatus {
    pub id: u32,
    pub kind: BonusKind,
    /// False while the mission is hidden behind its unlock threshold.
    pub visible: bool,
    pub completed: bool,
    pub progress: u32,
    pub goal: u32,
}

/// Decides which missions a ledger update just completed.
#[derive(Debug, Clone)]
pub struct MissionEvaluator {
    catalog: MissionCatalog,
    completed_bonus: BTreeSet<u32>,
}

impl MissionEvaluator {
    pub fn new(catalog: MissionCatalog) -> Self {
        Self {
            catalog,
            completed_bonus: BTreeSet::new(),
        }
    }

    pub fn catalog(&self) -> &MissionCatalog {
        &self.catalog
    }

    /// Recompute bonus completion from the counters without emitting events.
    ///
    /// `persisted` is the state as loaded, `current` the state after the
    /// calendar rollover. A bonus counts as already celebrated only if it was
    /// met before the reload and still is: a week reset or broken streak
    /// re-arms it, and a streak that first reaches its goal through the
    /// rollover still fires on the next step.
    pub fn seed(&mut self, persisted: &Ledger, current: &Ledger) {
        let met = |bonus: &BonusMission, ledger: &Ledger| {
            bonus.is_unlocked(ledger) && bonus.is_satisfied(ledger)
        };
        self.completed_bonus = self
            .catalog
            .bonus_missions
            .iter()
            .filter(|bonus| met(*bonus, persisted) && met(*bonus, current))
            .map(|bonus| bonus.id)
            .collect();
    }

    /// Evaluate all missions against an updated ledger.
    ///
    /// `transition_pending` is the single in-flight lock: while a sequential
    /// achievement is still being celebrated, no sequential evaluation happens.
    pub fn evaluate(&mut self, ledger: &Ledger, transition_pending: bool) -> Vec<AchievementEvent> {
        let mut events = Vec::new();

        if !transition_pending {
            if let Some(mission) = self.catalog.current_mission(ledger) {
                if ledger.daily_steps >= mission.goal {
                    info!(
                        mission = mission.id,
                        daily_steps = ledger.daily_steps,
                        "mission achieved"
                    );
                    events.push(AchievementEvent::sequential(mission.id));
                }
            }
        }

        for bonus in &self.catalog.bonus_missions {
            if !bonus.is_unlocked(ledger) || self.completed_bonus.contains(&bonus.id) {
                continue;
            }
            if bonus.is_satisfied(ledger) {
                info!(bonus = bonus.id, kind = ?bonus.kind, "bonus mission achieved");
                self.completed_bonus.insert(bonus.id);
                events.push(AchievementEvent::bonus(bonus.id));
            }
        }

        events
    }

    pub fn is_bonus_completed(&self, id: u32) -> bool {
        self.completed_bonus.contains(&id)
    }

    pub fn bonus_statuses(&self, ledger: &Ledger) -> Vec<BonusStatus> {
        self.catalog
            .bonus_missions
            .iter()
            .map(|bonus| BonusStatus {
                id: bonus.id,
                kind: bonus.kind,
                visible: bonus.is_unlocked(ledger),
                completed: self.completed_bonus.contains(&bonus.id),
                progress: bonus.counter(ledger),
                goal: bonus.goal,
            })
            .collect()
    }
}

impl Default for MissionEvaluator {
    fn default() -> Self {
        Self::new(MissionCatalog::default())
    }
}
