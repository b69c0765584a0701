//! Day and week rollover.
//!
//! Runs once when a counting session starts, before any sample is processed.
//! Compares the persisted date/week anchors against the clock and applies the
//! daily reset, the streak rule and the weekly reset exactly once per
//! boundary crossing.
//!
//! # Week keys
//!
//! Week numbers use a simplified scheme, not ISO-8601:
//! `week = floor((days_since_jan_1 + 7) / 7)`, where the days are counted from
//! Jan 1 00:00 UTC of the local year. The key changes every seven days from
//! that anchor, plus at every year change, so year-boundary weeks are split.
//! East of UTC the first hours of Jan 1 fall before the anchor and map to
//! week 00; the boundary hour shifts with the UTC offset. Both are accepted.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{CalendarMarkers, Ledger};

/// Rules applied on a date change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RolloverPolicy {
    /// Daily steps the last recorded day needs for the streak to continue.
    pub consecutive_target: u32,
}

impl Default for RolloverPolicy {
    fn default() -> Self {
        Self {
            consecutive_target: 100,
        }
    }
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverOutcome {
    pub ledger: Ledger,
    /// Always today's date key and this week's key.
    pub markers: CalendarMarkers,
    pub day_changed: bool,
    pub week_changed: bool,
}

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

/// "YYYY-MM-DD" of the local wall clock.
pub fn date_key(now: &DateTime<FixedOffset>) -> String {
    now.format("%Y-%m-%d").to_string()
}

/// Week number within the local year. 0 only for the hours of Jan 1 that
/// precede Jan 1 00:00 UTC.
pub fn week_number(now: &DateTime<FixedOffset>) -> i64 {
    let days = NaiveDate::from_ymd_opt(now.year(), 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|anchor| (now.naive_utc() - anchor).num_milliseconds().div_euclid(DAY_MS))
        .unwrap_or(0);
    (days + 7).div_euclid(7)
}

/// "YYYY-Www"
pub fn week_key(now: &DateTime<FixedOffset>) -> String {
    format!("{}-W{:02}", now.year(), week_number(now))
}

/// Apply day and week boundary resets to the persisted state.
///
/// Missing markers (first-ever run) count as "no change": the persisted
/// counters are carried over as they are.
pub fn reconcile(
    markers: &CalendarMarkers,
    persisted: &Ledger,
    now: &DateTime<FixedOffset>,
    policy: &RolloverPolicy,
) -> RolloverOutcome {
    let today = date_key(now);
    let this_week = week_key(now);
    let mut ledger = *persisted;

    let week_changed = markers
        .last_week_key
        .as_deref()
        .is_some_and(|key| key != this_week);
    if week_changed {
        ledger.weekly_steps = 0;
    }

    let day_changed = markers
        .last_date_key
        .as_deref()
        .is_some_and(|key| key != today);
    if day_changed {
        // Only the most recently recorded day is judged, however long the gap.
        ledger.consecutive_days = if persisted.daily_steps >= policy.consecutive_target {
            persisted.consecutive_days.saturating_add(1)
        } else {
            0
        };
        ledger.daily_steps = 0;
        ledger.mission_index = 0;
    }

    if day_changed || week_changed {
        info!(
            previous_date = ?markers.last_date_key,
            today = %today,
            week = %this_week,
            day_changed,
            week_changed,
            consecutive_days = ledger.consecutive_days,
            "calendar rollover"
        );
    }

    RolloverOutcome {
        ledger,
        markers: CalendarMarkers::new(today, this_week),
        day_changed,
        week_changed,
    }
}
