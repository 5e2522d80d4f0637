//! Flat key/value preference storage.
//!
//! The tracker persists two things between runs: the selected jam and whether
//! the overlay pane is shown. Both are mirrored into a host-owned flat string
//! store so embedders can supply whatever backing they like; the crate ships
//! a JSON file store and an in-memory store.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{error, warn};

use crate::models::GameJam;

const KEY_SELECTED_ID: &str = "selected_jam_id";
const KEY_SELECTED_TITLE: &str = "selected_jam_title";
const KEY_SELECTED_URL: &str = "selected_jam_url";
const KEY_START_DATE: &str = "start_date";
const KEY_END_DATE: &str = "end_date";
const KEY_VOTING_END_DATE: &str = "voting_end_date";
const KEY_SHOW_OVERLAY: &str = "show_overlay";

/// Id stored when no jam is selected.
pub const NO_SELECTION: i64 = -1;

/// Flat string key/value store, host-provided.
pub trait PrefStore {
    /// Read the value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;
    /// Stage `value` under `key`.
    fn set(&mut self, key: &str, value: &str);
    /// Flush staged values to the backing store.
    fn save(&mut self) -> Result<()>;
}

/// Mirror the selection into the store and flush it.
///
/// `None` writes the `-1` id sentinel and empty strings. Participant count
/// and the highlight flag are deliberately not persisted; a restored jam
/// starts with both zeroed until the next fetch re-binds it.
pub fn store_selection(store: &mut dyn PrefStore, jam: Option<&GameJam>) -> Result<()> {
    match jam {
        Some(jam) => {
            store.set(KEY_SELECTED_ID, &jam.id.to_string());
            store.set(KEY_SELECTED_TITLE, &jam.title);
            store.set(KEY_SELECTED_URL, &jam.url);
            store.set(KEY_START_DATE, &jam.start_date.to_rfc3339());
            store.set(KEY_END_DATE, &jam.end_date.to_rfc3339());
            let voting = jam
                .voting_end_date
                .map(|date| date.to_rfc3339())
                .unwrap_or_default();
            store.set(KEY_VOTING_END_DATE, &voting);
        }
        None => {
            store.set(KEY_SELECTED_ID, &NO_SELECTION.to_string());
            store.set(KEY_SELECTED_TITLE, "");
            store.set(KEY_SELECTED_URL, "");
            store.set(KEY_START_DATE, "");
            store.set(KEY_END_DATE, "");
            store.set(KEY_VOTING_END_DATE, "");
        }
    }
    store.save()
}

/// Rebuild the persisted selection, if the store holds one.
///
/// Missing or corrupt dates fall back to the earliest and latest
/// representable instants so the restored jam reads as long over or not yet
/// started instead of aborting the restore.
pub fn load_selection(store: &dyn PrefStore) -> Option<GameJam> {
    let id = store.get(KEY_SELECTED_ID)?.parse::<i64>().ok()?;
    if id == NO_SELECTION {
        return None;
    }
    Some(GameJam {
        id,
        title: store.get(KEY_SELECTED_TITLE).unwrap_or_default(),
        url: store.get(KEY_SELECTED_URL).unwrap_or_default(),
        start_date: parse_stored_date(store.get(KEY_START_DATE), DateTime::<Utc>::MIN_UTC),
        end_date: parse_stored_date(store.get(KEY_END_DATE), DateTime::<Utc>::MAX_UTC),
        voting_end_date: store
            .get(KEY_VOTING_END_DATE)
            .filter(|value| !value.is_empty())
            .map(|value| parse_stored_date(Some(value), DateTime::<Utc>::MIN_UTC)),
        joined_count: 0,
        highlighted: false,
        selected: false,
        cached_remaining: TimeDelta::zero(),
        cached_voting_remaining: TimeDelta::zero(),
    })
}

/// Persist whether the overlay pane is shown.
pub fn store_show_overlay(store: &mut dyn PrefStore, show: bool) -> Result<()> {
    store.set(KEY_SHOW_OVERLAY, if show { "true" } else { "false" });
    store.save()
}

/// Read the overlay visibility, defaulting to shown.
pub fn load_show_overlay(store: &dyn PrefStore) -> bool {
    store
        .get(KEY_SHOW_OVERLAY)
        .map(|value| value != "false")
        .unwrap_or(true)
}

fn parse_stored_date(raw: Option<String>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = raw.filter(|value| !value.is_empty()) else {
        return fallback;
    };
    match DateTime::parse_from_rfc3339(&raw) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(err) => {
            error!("Failed to parse stored date {raw:?}: {err}");
            fallback
        }
    }
}

/// Preference store backed by a flat JSON object on disk.
#[derive(Debug)]
pub struct FilePrefs {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePrefs {
    /// Open the store at `path`, reading existing values when present.
    ///
    /// A file that does not parse is ignored rather than fatal; the next save
    /// rewrites it.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            match serde_json::from_str(&content) {
                Ok(values) => values,
                Err(err) => {
                    warn!("Ignoring unreadable preferences at {}: {err}", path.display());
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, values })
    }

    /// Default location under the user's config directory.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("jamtrack")
            .join("prefs.json")
    }
}

impl PrefStore for FilePrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn save(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(&self.values)
            .context("failed to serialize preferences")?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("failed to write {}", self.path.display()))
    }
}

/// In-memory store for tests and embedders without a config directory.
#[derive(Debug, Default)]
pub struct MemoryPrefs {
    values: BTreeMap<String, String>,
}

impl MemoryPrefs {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PrefStore for MemoryPrefs {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn save(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample_jam() -> GameJam {
        GameJam {
            id: 42,
            title: "Autumn Jam".to_string(),
            url: "https://itch.io/jam/autumn-jam".to_string(),
            start_date: Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 9, 8, 0, 0, 0).unwrap(),
            voting_end_date: Some(Utc.with_ymd_and_hms(2025, 9, 15, 0, 0, 0).unwrap()),
            joined_count: 500,
            highlighted: true,
            selected: true,
            cached_remaining: TimeDelta::zero(),
            cached_voting_remaining: TimeDelta::zero(),
        }
    }

    #[test]
    fn selection_round_trip_drops_the_counters() -> Result<()> {
        let mut store = MemoryPrefs::new();
        let jam = sample_jam();
        store_selection(&mut store, Some(&jam))?;
        let restored = load_selection(&store).unwrap();
        assert_eq!(restored.id, jam.id);
        assert_eq!(restored.title, jam.title);
        assert_eq!(restored.url, jam.url);
        assert_eq!(restored.start_date, jam.start_date);
        assert_eq!(restored.end_date, jam.end_date);
        assert_eq!(restored.voting_end_date, jam.voting_end_date);
        assert_eq!(restored.joined_count, 0);
        assert!(!restored.highlighted);
        assert!(!restored.is_selected());
        Ok(())
    }

    #[test]
    fn clearing_the_selection_writes_the_sentinel() -> Result<()> {
        let mut store = MemoryPrefs::new();
        store_selection(&mut store, Some(&sample_jam()))?;
        store_selection(&mut store, None)?;
        assert_eq!(store.get("selected_jam_id").as_deref(), Some("-1"));
        assert_eq!(store.get("selected_jam_title").as_deref(), Some(""));
        assert!(load_selection(&store).is_none());
        Ok(())
    }

    #[test]
    fn an_empty_store_has_no_selection() {
        assert!(load_selection(&MemoryPrefs::new()).is_none());
    }

    #[test]
    fn missing_dates_fall_back_to_the_extremes() {
        let mut store = MemoryPrefs::new();
        store.set("selected_jam_id", "7");
        store.set("selected_jam_title", "Half saved");
        let restored = load_selection(&store).unwrap();
        assert_eq!(restored.start_date, DateTime::<Utc>::MIN_UTC);
        assert_eq!(restored.end_date, DateTime::<Utc>::MAX_UTC);
        assert_eq!(restored.voting_end_date, None);
    }

    #[test]
    fn corrupt_dates_fall_back_to_the_extremes() {
        let mut store = MemoryPrefs::new();
        store.set("selected_jam_id", "7");
        store.set("start_date", "not a date");
        store.set("end_date", "also not a date");
        let restored = load_selection(&store).unwrap();
        assert_eq!(restored.start_date, DateTime::<Utc>::MIN_UTC);
        assert_eq!(restored.end_date, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn overlay_visibility_defaults_to_shown() -> Result<()> {
        let mut store = MemoryPrefs::new();
        assert!(load_show_overlay(&store));
        store_show_overlay(&mut store, false)?;
        assert!(!load_show_overlay(&store));
        store_show_overlay(&mut store, true)?;
        assert!(load_show_overlay(&store));
        Ok(())
    }

    #[test]
    fn file_store_round_trips_through_disk() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("prefs.json");
        let mut store = FilePrefs::open(&path)?;
        store_selection(&mut store, Some(&sample_jam()))?;
        let reopened = FilePrefs::open(&path)?;
        let restored = load_selection(&reopened).unwrap();
        assert_eq!(restored.id, 42);
        assert_eq!(restored.title, "Autumn Jam");
        Ok(())
    }

    #[test]
    fn unreadable_file_starts_empty() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json at all")?;
        let store = FilePrefs::open(&path)?;
        assert!(store.get("selected_jam_id").is_none());
        Ok(())
    }

    #[test]
    fn save_creates_missing_parent_directories() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("nested").join("deeper").join("prefs.json");
        let mut store = FilePrefs::open(&path)?;
        store.set("show_overlay", "false");
        store.save()?;
        assert!(path.exists());
        Ok(())
    }
}
