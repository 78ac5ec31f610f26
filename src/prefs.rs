//! Recruiter preferences that survive between runs.
//!
//! Preferences are loaded once at startup and written back after every
//! change through a [`PreferenceStore`].

use crate::model::{DateFilter, ViewMode};
use crate::ClientError;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Most recent searches kept in the history
pub const MAX_HISTORY: usize = 10;

/// A search the recruiter ran
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHistoryItem {
    pub query: String,
    #[serde(default)]
    pub location: String,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Preferences {
    pub search_history: Vec<SearchHistoryItem>,
    pub date_filter: DateFilter,
    pub view_mode: ViewMode,
}

impl Preferences {
    /// Decode stored preferences, keeping whatever part of them is valid.
    ///
    /// A malformed history becomes empty and unknown filter or view values
    /// fall back to their defaults.
    pub fn from_json(value: &Value) -> Self {
        let search_history = value
            .get("search_history")
            .cloned()
            .and_then(|history| serde_json::from_value(history).ok())
            .unwrap_or_default();
        let date_filter = value
            .get("date_filter")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let view_mode = value
            .get("view_mode")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();

        Self {
            search_history,
            date_filter,
            view_mode,
        }
    }

    /// Put a search at the top of the history.
    ///
    /// A previous entry with the same query (ignoring case) is replaced;
    /// otherwise the history is capped at [`MAX_HISTORY`] entries.
    pub fn record_search(&mut self, query: &str, location: &str, timestamp: i64) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        let item = SearchHistoryItem {
            query: query.to_string(),
            location: location.trim().to_string(),
            timestamp,
        };

        let normalized = query.to_lowercase();
        match self
            .search_history
            .iter()
            .position(|h| h.query.to_lowercase() == normalized)
        {
            Some(existing) => {
                self.search_history.remove(existing);
                self.search_history.insert(0, item);
            }
            None => {
                self.search_history.insert(0, item);
                self.search_history.truncate(MAX_HISTORY);
            }
        }
    }

    /// Remove a search by its exact query. Returns whether anything was removed.
    pub fn remove_search(&mut self, query: &str) -> bool {
        let before = self.search_history.len();
        self.search_history.retain(|h| h.query != query);
        self.search_history.len() != before
    }

    pub fn clear_history(&mut self) {
        self.search_history.clear();
    }
}

/// Where preferences are persisted
pub trait PreferenceStore: Send + Sync {
    fn load(&self) -> Result<Preferences, ClientError>;
    fn save(&self, preferences: &Preferences) -> Result<(), ClientError>;
}

/// Preferences kept in a JSON file
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FileStore {
    fn load(&self) -> Result<Preferences, ClientError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No preference file at {}, using defaults", self.path.display());
                return Ok(Preferences::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => Ok(Preferences::from_json(&value)),
            Err(e) => {
                warn!(
                    "Ignoring unreadable preference file {}: {}",
                    self.path.display(),
                    e
                );
                Ok(Preferences::default())
            }
        }
    }

    fn save(&self, preferences: &Preferences) -> Result<(), ClientError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(preferences)?;
        fs::write(&self.path, json)?;
        debug!("Saved preferences to {}", self.path.display());
        Ok(())
    }
}

/// Preferences held in memory only
#[derive(Debug, Default)]
pub struct MemoryStore {
    saved: Mutex<Option<Preferences>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last saved preferences, if any were saved
    pub fn saved(&self) -> Option<Preferences> {
        self.saved.lock().ok().and_then(|saved| saved.clone())
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self) -> Result<Preferences, ClientError> {
        Ok(self.saved().unwrap_or_default())
    }

    fn save(&self, preferences: &Preferences) -> Result<(), ClientError> {
        if let Ok(mut saved) = self.saved.lock() {
            *saved = Some(preferences.clone());
        }
        Ok(())
    }
}

/// Preferences loaded from a store and saved back on every change
#[derive(Debug)]
pub struct PreferenceSession<S: PreferenceStore> {
    store: S,
    preferences: Preferences,
}

impl<S: PreferenceStore> PreferenceSession<S> {
    pub fn load(store: S) -> Result<Self, ClientError> {
        let preferences = store.load()?;
        Ok(Self { store, preferences })
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn record_search(
        &mut self,
        query: &str,
        location: &str,
        timestamp: i64,
    ) -> Result<(), ClientError> {
        self.update(|p| p.record_search(query, location, timestamp))
    }

    pub fn remove_search(&mut self, query: &str) -> Result<bool, ClientError> {
        let mut removed = false;
        self.update(|p| removed = p.remove_search(query))?;
        Ok(removed)
    }

    pub fn clear_history(&mut self) -> Result<(), ClientError> {
        self.update(Preferences::clear_history)
    }

    pub fn set_date_filter(&mut self, date_filter: DateFilter) -> Result<(), ClientError> {
        self.update(|p| p.date_filter = date_filter)
    }

    pub fn set_view_mode(&mut self, view_mode: ViewMode) -> Result<(), ClientError> {
        self.update(|p| p.view_mode = view_mode)
    }

    /// Apply a change and persist it if anything actually changed
    fn update(&mut self, change: impl FnOnce(&mut Preferences)) -> Result<(), ClientError> {
        let before = self.preferences.clone();
        change(&mut self.preferences);
        if self.preferences != before {
            self.store.save(&self.preferences)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_search_moves_existing_to_front() {
        let mut prefs = Preferences::default();
        prefs.record_search("Rust Developer", "Berlin", 1);
        prefs.record_search("Nurse", "", 2);
        prefs.record_search("rust developer ", "Munich", 3);

        let queries: Vec<_> = prefs.search_history.iter().map(|h| h.query.as_str()).collect();
        assert_eq!(queries, vec!["rust developer", "Nurse"]);
        assert_eq!(prefs.search_history[0].location, "Munich");
        assert_eq!(prefs.search_history[0].timestamp, 3);
    }

    #[test]
    fn test_record_search_caps_history() {
        let mut prefs = Preferences::default();
        for i in 0..15 {
            prefs.record_search(&format!("role {i}"), "", i);
        }
        assert_eq!(prefs.search_history.len(), MAX_HISTORY);
        assert_eq!(prefs.search_history[0].query, "role 14");
        assert_eq!(prefs.search_history[9].query, "role 5");
    }

    #[test]
    fn test_blank_search_is_not_recorded() {
        let mut prefs = Preferences::default();
        prefs.record_search("   ", "Paris", 1);
        assert!(prefs.search_history.is_empty());
    }

    #[test]
    fn test_remove_search_is_exact() {
        let mut prefs = Preferences::default();
        prefs.record_search("Nurse", "", 1);
        assert!(!prefs.remove_search("nurse"));
        assert!(prefs.remove_search("Nurse"));
        assert!(prefs.search_history.is_empty());
    }

    #[test]
    fn test_from_json_tolerates_bad_values() {
        let prefs = Preferences::from_json(&json!({
            "search_history": "not a list",
            "date_filter": "fortnight",
            "view_mode": "companies"
        }));
        assert!(prefs.search_history.is_empty());
        assert_eq!(prefs.date_filter, DateFilter::All);
        assert_eq!(prefs.view_mode, ViewMode::Companies);
    }

    #[test]
    fn test_session_saves_only_on_change() {
        let mut session = PreferenceSession::load(MemoryStore::new()).unwrap();
        assert!(session.store().saved().is_none());

        session.set_date_filter(DateFilter::All).unwrap();
        assert!(session.store().saved().is_none());

        session.set_date_filter(DateFilter::Week).unwrap();
        assert_eq!(
            session.store().saved().map(|p| p.date_filter),
            Some(DateFilter::Week)
        );

        session.record_search("Analyst", "Oslo", 10).unwrap();
        assert!(!session.remove_search("Designer").unwrap());
        assert_eq!(session.store().saved().unwrap().search_history.len(), 1);
    }
}
