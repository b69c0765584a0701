//! Counting session: the engine that ties every stage together.
//!
//! This module owns the session lifecycle and the per-sample data flow:
//! 1. **Start**: sensor capability and permission checks, then calendar
//!    rollover against the persisted state (always before the first sample)
//! 2. **Per reading**: motion filter → step detector → ledger → mission
//!    evaluator → flush
//! 3. **Deferred advance**: the mission cursor moves when the pending
//!    transition comes due (`tick`, or the next reading)
//! 4. **Stop / reset / page lifecycle**: full-state flushes
//!
//! The rolled-over state is flushed in full at start, so a stored week key
//! never sits next to a previous week's totals.
//!
//! # Concurrency
//! Single-threaded and event-driven. Readings must be fed in arrival order;
//! the filter and detector are stateful. Clocks are passed in by the caller:
//! a monotonic millisecond counter for readings and an offset-aware local
//! time for calendar decisions.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::calendar::{self, RolloverPolicy};
use crate::error::SessionError;
use crate::export::{SessionUpdate, UpdateKind};
use crate::ledger::ProgressLedger;
use crate::missions::{BonusStatus, MissionCatalog, MissionEvaluator};
use crate::signal::{FilterConfig, MotionFilter};
use crate::step_detection::{StepDetector, StepDetectorConfig};
use crate::storage::{self, KeyValueStore};
use crate::transitions::MissionTransition;
use crate::types::{CalendarMarkers, Ledger, Mission, MotionReading};

/// Configuration for a counting session.
///
/// Bundles all stage configurations. Every field has a default, so a partial
/// JSON document is a valid config.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub filter: FilterConfig,
    pub detector: StepDetectorConfig,
    pub rollover: RolloverPolicy,
    /// Celebration pause before the mission cursor moves (milliseconds).
    pub transition_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            filter: FilterConfig::default(),
            detector: StepDetectorConfig::default(),
            rollover: RolloverPolicy::default(),
            transition_delay_ms: 1_500,
        }
    }
}

/// Outcome of a motion permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionState {
    Granted,
    Denied,
    /// The platform delivers motion events without asking.
    NotRequired,
}

/// Source of motion readings, as seen at session start.
pub trait MotionSensor {
    fn is_available(&self) -> bool;

    /// Ask the user for motion access. Failures to prompt count as denial.
    fn request_permission(&mut self) -> PermissionState {
        PermissionState::NotRequired
    }
}

/// A sensor with fixed capability answers. Used for replays and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticSensor {
    pub available: bool,
    pub permission: PermissionState,
}

impl StaticSensor {
    pub fn available() -> Self {
        Self {
            available: true,
            permission: PermissionState::NotRequired,
        }
    }
}

impl MotionSensor for StaticSensor {
    fn is_available(&self) -> bool {
        self.available
    }

    fn request_permission(&mut self) -> PermissionState {
        self.permission
    }
}

/// The step-counting engine for one user.
pub struct PedometerSession<S: KeyValueStore> {
    config: SessionConfig,
    store: S,

    filter: MotionFilter,
    detector: StepDetector,
    ledger: ProgressLedger,
    evaluator: MissionEvaluator,
    transition: MissionTransition,
    markers: CalendarMarkers,

    counting: bool,
    // State has been read from the store (or reset) at least once.
    loaded: bool,
    // Last flush failed; memory is ahead of the store.
    dirty: bool,
}

impl<S: KeyValueStore> PedometerSession<S> {
    pub fn new(config: SessionConfig, catalog: MissionCatalog, store: S) -> Self {
        Self {
            filter: MotionFilter::new(config.filter),
            detector: StepDetector::new(config.detector),
            ledger: ProgressLedger::default(),
            evaluator: MissionEvaluator::new(catalog),
            transition: MissionTransition::new(),
            markers: CalendarMarkers::default(),
            config,
            store,
            counting: false,
            loaded: false,
            dirty: false,
        }
    }

    /// Session with default tuning and the default mission catalog.
    pub fn with_store(store: S) -> Self {
        Self::new(SessionConfig::default(), MissionCatalog::default(), store)
    }

    /// Start counting.
    ///
    /// Checks the sensor, applies the calendar rollover, persists the
    /// rolled-over state and resets the per-session filter state. Calling it
    /// while already counting does nothing.
    pub fn start(
        &mut self,
        sensor: &mut dyn MotionSensor,
        now: DateTime<FixedOffset>,
    ) -> Result<SessionUpdate, SessionError> {
        if self.counting {
            return Ok(SessionUpdate::new(UpdateKind::Started, self.ledger.snapshot()));
        }

        if !sensor.is_available() {
            warn!("motion sensor unavailable; session not started");
            return Err(SessionError::SensorUnavailable);
        }
        if sensor.request_permission() == PermissionState::Denied {
            warn!("motion permission denied; session not started");
            return Err(SessionError::PermissionDenied);
        }

        if self.dirty {
            self.flush();
        }
        let (persisted, markers) = if self.dirty {
            (self.ledger.snapshot(), self.markers.clone())
        } else {
            storage::load_state(&self.store)
        };

        let outcome = calendar::reconcile(&markers, &persisted, &now, &self.config.rollover);
        self.ledger.apply_rollover(&outcome);
        self.markers = outcome.markers;
        self.loaded = true;
        self.flush();

        self.transition.cancel();
        self.filter.reset();
        self.detector.reset();
        self.ledger.clear_last_step();
        self.evaluator.seed(&persisted, self.ledger.ledger());
        self.counting = true;

        let ledger = self.ledger.snapshot();
        info!(
            daily_steps = ledger.daily_steps,
            weekly_steps = ledger.weekly_steps,
            consecutive_days = ledger.consecutive_days,
            mission_index = ledger.mission_index,
            "counting started"
        );
        Ok(SessionUpdate::new(UpdateKind::Started, ledger))
    }

    /// Feed one motion reading taken at monotonic time `now_ms`.
    ///
    /// Returns the updates it caused, in order: a `MissionAdvanced` update if
    /// a due mission transition completed, then a `Step` update if a step was
    /// recorded. Malformed readings and readings outside a session are
    /// dropped without any state change.
    pub fn process_reading(&mut self, reading: &MotionReading, now_ms: u64) -> Vec<SessionUpdate> {
        if !self.counting {
            return Vec::new();
        }
        let mut updates: Vec<SessionUpdate> = self.tick(now_ms).into_iter().collect();

        let Some(sample) = reading.sample() else {
            return updates;
        };
        let linear = self.filter.filter(&sample);
        let last_step_ms = self.ledger.ledger().last_step_ms;
        let Some(step) = self.detector.detect(linear, now_ms, last_step_ms) else {
            return updates;
        };

        self.ledger.record_step(step.timestamp_ms);
        let ledger = self.ledger.snapshot();
        debug!(
            daily_steps = ledger.daily_steps,
            weekly_steps = ledger.weekly_steps,
            magnitude = step.magnitude,
            "step"
        );

        let achievements = self.evaluator.evaluate(&ledger, self.transition.is_pending());
        if achievements.iter().any(|event| !event.is_bonus) {
            self.transition
                .schedule(ledger.mission_index, now_ms, self.config.transition_delay_ms);
        }

        self.flush();
        updates.push(SessionUpdate::new(UpdateKind::Step, ledger).with_achievements(achievements));
        updates
    }

    /// Complete a due mission transition.
    pub fn tick(&mut self, now_ms: u64) -> Option<SessionUpdate> {
        let completed = self.transition.poll(now_ms)?;
        self.complete_transition(completed.mission_index);
        self.flush();
        Some(SessionUpdate::new(UpdateKind::MissionAdvanced, self.ledger.snapshot()))
    }

    /// Stop counting.
    ///
    /// A pending mission transition is completed immediately so the achieved
    /// mission is not celebrated again on the next start.
    pub fn stop(&mut self) -> Option<SessionUpdate> {
        if !self.counting {
            return None;
        }
        self.counting = false;
        if let Some(completed) = self.transition.settle() {
            self.complete_transition(completed.mission_index);
        }
        self.flush();
        info!(daily_steps = self.ledger.ledger().daily_steps, "counting stopped");
        Some(SessionUpdate::new(UpdateKind::Stopped, self.ledger.snapshot()))
    }

    /// User-initiated reset of every counter.
    ///
    /// Stops counting, cancels any pending transition and anchors the
    /// markers to `now`.
    pub fn reset(&mut self, now: DateTime<FixedOffset>) -> SessionUpdate {
        if self.counting {
            self.counting = false;
            info!("counting stopped for reset");
        }
        self.transition.cancel();
        self.ledger.reset_all();
        self.filter.reset();
        self.detector.reset();
        self.markers = CalendarMarkers::new(calendar::date_key(&now), calendar::week_key(&now));
        self.evaluator.seed(&Ledger::default(), &Ledger::default());
        self.loaded = true;
        self.flush();
        info!("progress reset");
        SessionUpdate::new(UpdateKind::Reset, self.ledger.snapshot())
    }

    /// The page or app lost visibility.
    pub fn on_visibility_hidden(&mut self) {
        self.flush();
    }

    /// The page is being unloaded.
    pub fn on_page_hide(&mut self) {
        self.flush();
    }

    fn complete_transition(&mut self, mission_index: usize) {
        // A reset between schedule and completion already moved the cursor.
        if self.ledger.ledger().mission_index != mission_index {
            return;
        }
        self.ledger
            .advance_mission(self.evaluator.catalog().missions.len());
        info!(
            mission_index = self.ledger.ledger().mission_index,
            "advanced to next mission"
        );
    }

    /// Write a full snapshot. Failures are logged and retried on the next flush.
    fn flush(&mut self) {
        if !self.loaded {
            return;
        }
        match storage::save_state(&mut self.store, self.ledger.ledger(), &self.markers) {
            Ok(()) => self.dirty = false,
            Err(err) => {
                warn!(error = %err, "failed to persist pedometer state; keeping it in memory");
                self.dirty = true;
            }
        }
    }

    // ------------------------------------------------------------------
    // Read access for renderers
    // ------------------------------------------------------------------

    pub fn ledger(&self) -> Ledger {
        self.ledger.snapshot()
    }

    pub fn markers(&self) -> &CalendarMarkers {
        &self.markers
    }

    pub fn is_counting(&self) -> bool {
        self.counting
    }

    /// True while a sequential achievement is being celebrated.
    pub fn transition_pending(&self) -> bool {
        self.transition.is_pending()
    }

    pub fn current_mission(&self) -> Option<&Mission> {
        self.evaluator.catalog().current_mission(self.ledger.ledger())
    }

    pub fn mission_progress(&self) -> f32 {
        self.evaluator.catalog().mission_progress(self.ledger.ledger())
    }

    pub fn bonus_statuses(&self) -> Vec<BonusStatus> {
        self.evaluator.bonus_statuses(self.ledger.ledger())
    }

    pub fn gravity(&self) -> [f32; 3] {
        self.filter.gravity()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
