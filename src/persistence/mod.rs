//! Key/value persistence for scores, stats, settings and achievements
//!
//! Storage backends only move strings. `JsonStore` layers the typed
//! `PersistenceStore` interface on top and never fails outward: missing or
//! malformed blobs come back as defaults, write failures are logged.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::achievements::{Achievement, Achievements};
use crate::highscores::{HighScoreEntry, HighScores};
use crate::settings::Settings;
use crate::stats::Stats;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(target_arch = "wasm32")]
mod local;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

/// Storage keys
pub const HIGH_SCORES_KEY: &str = "brickfall_highscores";
pub const STATS_KEY: &str = "brickfall_stats";
pub const SETTINGS_KEY: &str = "brickfall_settings";
pub const ACHIEVEMENTS_KEY: &str = "brickfall_achievements";

#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Storage backend error: {0}")]
    Backend(String),

    #[error("Expected a JSON object")]
    NotAnObject,
}

/// Raw string key/value storage
pub trait Storage {
    /// `Ok(None)` when the key has never been written
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError>;
}

/// In-memory storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    items: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PersistError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed persistence used by the game driver. Loads never fail; saves are
/// best-effort.
pub trait PersistenceStore {
    fn load_high_scores(&self) -> HighScores;
    fn save_high_scores(&mut self, scores: &HighScores);
    fn load_stats(&self) -> Stats;
    fn save_stats(&mut self, stats: &Stats);
    fn load_settings(&self) -> Settings;
    fn save_settings(&mut self, settings: &Settings);
    fn load_achievements(&self) -> Achievements;
    fn save_achievements(&mut self, achievements: &Achievements);
}

/// Store that does nothing (defaults in, nothing out)
#[derive(Debug, Default)]
pub struct NullStore;

impl PersistenceStore for NullStore {
    fn load_high_scores(&self) -> HighScores {
        HighScores::default()
    }
    fn save_high_scores(&mut self, _scores: &HighScores) {}
    fn load_stats(&self) -> Stats {
        Stats::default()
    }
    fn save_stats(&mut self, _stats: &Stats) {}
    fn load_settings(&self) -> Settings {
        Settings::default()
    }
    fn save_settings(&mut self, _settings: &Settings) {}
    fn load_achievements(&self) -> Achievements {
        Achievements::default()
    }
    fn save_achievements(&mut self, _achievements: &Achievements) {}
}

/// JSON blobs over any `Storage`
#[derive(Debug, Clone)]
pub struct JsonStore<S: Storage> {
    storage: S,
}

impl<S: Storage> JsonStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistError> {
        match self.storage.get(key)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Like `read`, but only a JSON object is accepted. serde would
    /// otherwise fill struct fields from an array by position.
    fn read_object<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, PersistError> {
        let Some(json) = self.storage.get(key)? else {
            return Ok(None);
        };
        let value: serde_json::Value = serde_json::from_str(&json)?;
        if !value.is_object() {
            return Err(PersistError::NotAnObject);
        }
        Ok(Some(serde_json::from_value(value)?))
    }

    fn write<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<(), PersistError> {
        let json = serde_json::to_string(value)?;
        self.storage.set(key, &json)
    }

    /// Load a value, substituting the default for anything unreadable
    fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        Self::or_default(key, self.read(key))
    }

    /// `load_or_default` for struct-shaped blobs
    fn load_object_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        Self::or_default(key, self.read_object(key))
    }

    fn or_default<T: Default>(key: &str, loaded: Result<Option<T>, PersistError>) -> T {
        match loaded {
            Ok(Some(value)) => value,
            Ok(None) => {
                log::debug!("No stored '{}', using defaults", key);
                T::default()
            }
            Err(e) => {
                log::warn!("Ignoring stored '{}': {}", key, e);
                T::default()
            }
        }
    }

    fn save_logged<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) {
        if let Err(e) = self.write(key, value) {
            log::warn!("Failed to save '{}': {}", key, e);
        }
    }
}

impl<S: Storage> PersistenceStore for JsonStore<S> {
    fn load_high_scores(&self) -> HighScores {
        let entries: Vec<HighScoreEntry> = self.load_or_default(HIGH_SCORES_KEY);
        let scores = HighScores::from_entries(entries);
        log::info!("Loaded {} high scores", scores.entries.len());
        scores
    }

    fn save_high_scores(&mut self, scores: &HighScores) {
        self.save_logged(HIGH_SCORES_KEY, &scores.entries);
    }

    fn load_stats(&self) -> Stats {
        self.load_object_or_default(STATS_KEY)
    }

    fn save_stats(&mut self, stats: &Stats) {
        self.save_logged(STATS_KEY, stats);
    }

    fn load_settings(&self) -> Settings {
        self.load_object_or_default::<Settings>(SETTINGS_KEY).sanitized()
    }

    fn save_settings(&mut self, settings: &Settings) {
        self.save_logged(SETTINGS_KEY, settings);
    }

    fn load_achievements(&self) -> Achievements {
        let unlocked: Vec<Achievement> = self.load_or_default(ACHIEVEMENTS_KEY);
        Achievements::from_unlocked(unlocked)
    }

    fn save_achievements(&mut self, achievements: &Achievements) {
        let unlocked: Vec<Achievement> = achievements.unlocked().collect();
        self.save_logged(ACHIEVEMENTS_KEY, &unlocked);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Difficulty;

    /// Backend that is always broken
    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, PersistError> {
            Err(PersistError::Backend("unavailable".into()))
        }
        fn set(&mut self, _key: &str, _value: &str) -> Result<(), PersistError> {
            Err(PersistError::Backend("unavailable".into()))
        }
    }

    #[test]
    fn test_missing_data_gives_defaults() {
        let store = JsonStore::new(MemoryStorage::new());
        assert!(store.load_high_scores().is_empty());
        assert_eq!(store.load_stats(), Stats::default());
        assert_eq!(store.load_settings(), Settings::default());
        assert!(store.load_achievements().is_empty());
    }

    #[test]
    fn test_malformed_data_gives_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set(HIGH_SCORES_KEY, "{not json").unwrap();
        storage.set(STATS_KEY, "[1, 2, 3]").unwrap();
        storage.set(SETTINGS_KEY, "[\"hard\", 0.1]").unwrap();
        let store = JsonStore::new(storage);
        assert!(store.load_high_scores().is_empty());
        assert_eq!(store.load_stats(), Stats::default());
        assert_eq!(store.load_settings(), Settings::default());
    }

    #[test]
    fn test_partial_stats_object_keeps_known_fields() {
        let mut storage = MemoryStorage::new();
        storage.set(STATS_KEY, r#"{"games_played": 4, "mystery": true}"#).unwrap();
        let stats = JsonStore::new(storage).load_stats();
        assert_eq!(stats.games_played, 4);
        assert_eq!(stats.games_won, 0);
    }

    #[test]
    fn test_values_survive_a_reload() {
        let storage = MemoryStorage::new();
        let mut store = JsonStore::new(storage.clone());

        let mut scores = HighScores::new();
        scores.add_score(1200, 3, "2026-05-01");
        store.save_high_scores(&scores);

        let settings = Settings {
            difficulty: Difficulty::Hard,
            ..Settings::default()
        };
        store.save_settings(&settings);

        store.save_achievements(&Achievements::from_unlocked([Achievement::Demolition]));

        let reloaded = JsonStore::new(storage);
        assert_eq!(reloaded.load_high_scores(), scores);
        assert_eq!(reloaded.load_settings().difficulty, Difficulty::Hard);
        assert!(reloaded.load_achievements().is_unlocked(Achievement::Demolition));
    }

    #[test]
    fn test_broken_backend_is_not_fatal() {
        let mut store = JsonStore::new(FailingStorage);
        store.save_stats(&Stats::default());
        assert_eq!(store.load_stats(), Stats::default());
    }

    #[test]
    fn test_high_score_blob_is_a_plain_list() {
        let storage = MemoryStorage::new();
        let mut store = JsonStore::new(storage.clone());
        let mut scores = HighScores::new();
        scores.add_score(50, 1, "2026-01-02");
        store.save_high_scores(&scores);
        let raw = storage.get(HIGH_SCORES_KEY).unwrap().unwrap();
        assert!(raw.starts_with('['));
    }
}
