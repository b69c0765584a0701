//! Stride Quest Pedometer Engine
//!
//! Turns a noisy device-motion stream into discrete steps and drives a small
//! game on top of them: a ladder of daily missions, long-horizon bonus
//! missions, a streak of qualifying days, and weekly totals that survive
//! reloads and calendar boundaries.
//!
//! # Pipeline
//!
//! - **Motion filter** ([`signal`]): low-pass gravity separation.
//! - **Step detector** ([`step_detection`]): weighted magnitude, fixed
//!   threshold, minimum step interval.
//! - **Progress ledger** ([`ledger`]): daily/weekly/streak counters and the
//!   mission cursor.
//! - **Calendar rollover** ([`calendar`]): day and week resets at session start.
//! - **Mission evaluation** ([`missions`], [`transitions`]): achievement events,
//!   single-flight deferred mission advance.
//! - **Persistence** ([`storage`]): abstract string key-value store.
//!
//! [`pipeline::PedometerSession`] owns all of it and exposes the user actions
//! (start, stop, reset) and page lifecycle hooks.
//!
//! # Example
//!
//! ```
//! use chrono::{FixedOffset, TimeZone};
//! use stride_quest::{MemoryStore, MotionReading, PedometerSession, StaticSensor};
//!
//! let now = FixedOffset::east_opt(9 * 3600)
//!     .and_then(|tz| tz.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).single())
//!     .unwrap();
//! let mut session = PedometerSession::with_store(MemoryStore::new());
//! session.start(&mut StaticSensor::available(), now).unwrap();
//!
//! let updates = session.process_reading(&MotionReading::new(30.0, 0.0, 0.0), 0);
//! assert_eq!(updates.last().map(|u| u.ledger.daily_steps), Some(1));
//! ```

pub mod calendar;
pub mod error;
pub mod export;
pub mod ledger;
pub mod missions;
pub mod pipeline;
pub mod signal;
pub mod step_detection;
pub mod storage;
pub mod transitions;
pub mod types;


// Re-export commonly used types
pub use error::{SessionError, StoreError};
pub use export::{SessionUpdate, UpdateKind};
pub use missions::{BonusStatus, MissionCatalog, MissionEvaluator};
pub use pipeline::{MotionSensor, PedometerSession, PermissionState, SessionConfig, StaticSensor};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};
pub use types::{
    AchievementEvent, BonusKind, BonusMission, CalendarMarkers, Ledger, Mission, MissionRef,
    MotionReading, MotionSample, StepEvent,
};
