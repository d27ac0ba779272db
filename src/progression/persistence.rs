//! Key-value persistence for the game snapshot and the learning progress map.
//!
//! Values are JSON strings. [`FileStore`] keeps one `<key>.json` file per key;
//! [`MemoryStore`] is used when no data directory is configured and in tests.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::AppConfig;
use crate::error::StoreError;

pub const GAME_STATE_KEY: &str = "cfa_game_state";
pub const PROGRESS_KEY: &str = "cfa_progress";

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_entries<T>(&self, f: impl FnOnce(&mut HashMap<String, String>) -> T) -> T {
        match self.entries.lock() {
            Ok(mut g) => f(&mut *g),
            Err(e) => f(&mut *e.into_inner()),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.with_entries(|m| m.get(key).cloned()))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_entries(|m| m.insert(key.to_string(), value.to_string()));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.with_entries(|m| m.remove(key));
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` for storage, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let path = self.path(key);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path(key);
        // write then rename so a crash never leaves a truncated file
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        log::debug!("saved {}", path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        let path = self.path(key);
        if path.exists() {
            fs::remove_file(&path)?;
        }
        Ok(())
    }
}

/// File store under the configured data directory, or memory when unset or
/// when the directory cannot be created.
pub fn open_store(config: &AppConfig) -> Box<dyn KeyValueStore> {
    match &config.data_dir {
        Some(dir) => match FileStore::new(dir) {
            Ok(store) => {
                log::info!("persisting game state in {}", dir.display());
                Box::new(store)
            }
            Err(e) => {
                log::warn!(
                    "cannot use data directory {}: {}; state will not survive restarts",
                    dir.display(),
                    e
                );
                Box::new(MemoryStore::new())
            }
        },
        None => Box::new(MemoryStore::new()),
    }
}

pub fn save_json<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value)?;
    store.set(key, &json)
}

pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Load `key`, falling back to `T::default()` when it is absent or unreadable.
pub fn load_json_or_default<T: DeserializeOwned + Default>(
    store: &dyn KeyValueStore,
    key: &str,
) -> T {
    match load_json(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("failed to load {}: {}. Using defaults.", key, e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("vocab_quest_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn memory_store_clones_share_data() {
        let mut a = MemoryStore::new();
        let b = a.clone();
        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
        a.remove("k").unwrap();
        assert_eq!(b.get("k").unwrap(), None);
    }

    #[test]
    fn file_store_round_trip() {
        let dir = temp_dir("file_store");
        let mut store = FileStore::new(&dir).unwrap();
        assert_eq!(store.get(GAME_STATE_KEY).unwrap(), None);
        save_json(&mut store, GAME_STATE_KEY, &vec![1, 2, 3]).unwrap();
        assert!(dir.join("cfa_game_state.json").exists());
        let back: Option<Vec<u32>> = load_json(&store, GAME_STATE_KEY).unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
        store.remove(GAME_STATE_KEY).unwrap();
        assert!(!dir.join("cfa_game_state.json").exists());
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn corrupt_value_falls_back_to_default() {
        let mut store = MemoryStore::new();
        store.set(PROGRESS_KEY, "{not json").unwrap();
        let value: Vec<u32> = load_json_or_default(&store, PROGRESS_KEY);
        assert!(value.is_empty());
    }

    #[test]
    fn open_store_without_dir_is_in_memory() {
        let mut store = open_store(&AppConfig::default());
        store.set("a", "b").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("b"));
    }
}
