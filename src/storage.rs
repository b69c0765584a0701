//! Persistence gateway.
//!
//! The engine only needs string get/set on a durable key-value store. State is
//! kept in six independent entries and every flush writes all of them.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::StoreError;
use crate::types::{CalendarMarkers, Ledger};

pub const KEY_STEPS: &str = "pedometerSteps";
pub const KEY_DATE: &str = "pedometerDate";
pub const KEY_MISSION_INDEX: &str = "missionIndex";
pub const KEY_CONSECUTIVE: &str = "consecutiveDays";
pub const KEY_WEEKLY_STEPS: &str = "weeklySteps";
pub const KEY_WEEK_NUMBER: &str = "pedometerWeekNumber";

/// Abstract durable string store with atomic per-key set.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

fn parse_counter<T: std::str::FromStr + Default>(raw: Option<String>) -> T {
    raw.and_then(|value| value.trim().parse().ok())
        .unwrap_or_default()
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|value| !value.is_empty())
}

/// Read the persisted ledger and calendar markers.
///
/// Missing or unparsable counters read as zero; missing markers stay None.
pub fn load_state(store: &dyn KeyValueStore) -> (Ledger, CalendarMarkers) {
    let ledger = Ledger {
        daily_steps: parse_counter(store.get(KEY_STEPS)),
        weekly_steps: parse_counter(store.get(KEY_WEEKLY_STEPS)),
        consecutive_days: parse_counter(store.get(KEY_CONSECUTIVE)),
        mission_index: parse_counter(store.get(KEY_MISSION_INDEX)),
        last_step_ms: None,
    };
    let markers = CalendarMarkers {
        last_date_key: non_empty(store.get(KEY_DATE)),
        last_week_key: non_empty(store.get(KEY_WEEK_NUMBER)),
    };
    (ledger, markers)
}

/// Write a full snapshot of the ledger and markers.
///
/// Stops at the first failing key; the caller retries with the next flush.
pub fn save_state(
    store: &mut dyn KeyValueStore,
    ledger: &Ledger,
    markers: &CalendarMarkers,
) -> Result<(), StoreError> {
    store.set(KEY_STEPS, &ledger.daily_steps.to_string())?;
    if let Some(date) = &markers.last_date_key {
        store.set(KEY_DATE, date)?;
    }
    store.set(KEY_MISSION_INDEX, &ledger.mission_index.to_string())?;
    store.set(KEY_CONSECUTIVE, &ledger.consecutive_days.to_string())?;
    store.set(KEY_WEEKLY_STEPS, &ledger.weekly_steps.to_string())?;
    if let Some(week) = &markers.last_week_key {
        store.set(KEY_WEEK_NUMBER, week)?;
    }
    Ok(())
}

/// In-memory store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &BTreeMap<String, String> {
        &self.entries
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Every set rewrites the whole file through a temporary file and a rename,
/// so readers never observe a partially written file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_file(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut next = self.entries.clone();
        next.insert(key.to_string(), value.to_string());
        self.write_file(&next)?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Store whose writes always fail.
    #[derive(Debug, Default)]
    pub(crate) struct FailingStore {
        pub(crate) inner: MemoryStore,
        pub(crate) attempts: usize,
    }

    impl KeyValueStore for FailingStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
            self.attempts += 1;
            Err(StoreError::Rejected {
                key: key.to_string(),
                reason: "quota exceeded".to_string(),
            })
        }
    }

    #[test]
    fn test_empty_store_loads_defaults() {
        let store = MemoryStore::new();
        let (ledger, markers) = load_state(&store);
        assert_eq!(ledger, Ledger::default());
        assert_eq!(markers, CalendarMarkers::default());
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let ledger = Ledger {
            daily_steps: 321,
            weekly_steps: 4_321,
            consecutive_days: 2,
            mission_index: 2,
            last_step_ms: Some(99),
        };
        let markers = CalendarMarkers::new("2025-05-10", "2025-W19");
        save_state(&mut store, &ledger, &markers).expect("memory store accepts writes");

        assert_eq!(store.entries().len(), 6);
        assert_eq!(store.get(KEY_STEPS).as_deref(), Some("321"));
        assert_eq!(store.get(KEY_WEEK_NUMBER).as_deref(), Some("2025-W19"));

        let (loaded, loaded_markers) = load_state(&store);
        assert_eq!(loaded, Ledger { last_step_ms: None, ..ledger });
        assert_eq!(loaded_markers, markers);
    }

    #[test]
    fn test_garbage_counters_read_as_zero() {
        let mut store = MemoryStore::new();
        store.set(KEY_STEPS, "NaN").expect("write");
        store.set(KEY_WEEKLY_STEPS, "-5").expect("write");
        store.set(KEY_CONSECUTIVE, " 3 ").expect("write");
        store.set(KEY_DATE, "").expect("write");

        let (ledger, markers) = load_state(&store);
        assert_eq!(ledger.daily_steps, 0);
        assert_eq!(ledger.weekly_steps, 0);
        assert_eq!(ledger.consecutive_days, 3);
        assert_eq!(markers.last_date_key, None);
    }

    #[test]
    fn test_failing_store_reports_error() {
        let mut store = FailingStore::default();
        let result = save_state(&mut store, &Ledger::default(), &CalendarMarkers::default());
        assert!(matches!(result, Err(StoreError::Rejected { .. })));
    }

    #[test]
    fn test_json_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pedometer.json");

        let mut store = JsonFileStore::open(&path).expect("open new store");
        assert_eq!(store.get(KEY_STEPS), None);
        store.set(KEY_STEPS, "42").expect("write");
        store.set(KEY_DATE, "2025-05-10").expect("write");

        let reopened = JsonFileStore::open(&path).expect("reopen store");
        assert_eq!(reopened.get(KEY_STEPS).as_deref(), Some("42"));
        assert_eq!(reopened.get(KEY_DATE).as_deref(), Some("2025-05-10"));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_json_file_store_rejects_corrupt_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("pedometer.json");
        fs::write(&path, "not json").expect("write fixture");
        assert!(matches!(JsonFileStore::open(&path), Err(StoreError::Json(_))));
    }
}
