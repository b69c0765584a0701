//! Renderer-facing update messages.
//!
//! The engine never touches a UI. Every state change it wants displayed is
//! emitted as a [`SessionUpdate`]: a full ledger snapshot plus any
//! achievements that just fired. Renderers subscribe to these and must not
//! feed state back except through user actions.

use serde::Serialize;

use crate::types::{AchievementEvent, Ledger};

/// What produced an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    /// Session started; ledger reflects the rollover.
    Started,
    /// A step was recorded.
    Step,
    /// A mission transition completed and the cursor moved.
    MissionAdvanced,
    Stopped,
    Reset,
}

/// A single update for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUpdate {
    pub kind: UpdateKind,
    pub ledger: Ledger,
    pub achievements: Vec<AchievementEvent>,
}

impl SessionUpdate {
    pub fn new(kind: UpdateKind, ledger: Ledger) -> Self {
        Self {
            kind,
            ledger,
            achievements: Vec::new(),
        }
    }

    pub fn with_achievements(mut self, achievements: Vec<AchievementEvent>) -> Self {
        self.achievements = achievements;
        self
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
