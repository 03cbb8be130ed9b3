// src/storage.rs
//! Durable key-value state: the cached entry list, the last-seen watermark and
//! the hours-back preference. `PersistentCache` is the only component that
//! touches a store; every failure is logged and replaced by a default.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::feed::{FeedEntry, HoursBack};

pub const KEY_ENTRIES: &str = "cached_entries";
pub const KEY_LAST_SEEN: &str = "last_seen_ts";
pub const KEY_HOURS_BACK: &str = "hours_back";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] std::io::Error),
    #[error("storage file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// All keys in one JSON object on disk (`{"last_seen_ts": "1700000000", ...}`).
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

    fn read_map(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read_to_string(&self.path) {
            Ok(s) if s.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(s) => Ok(serde_json::from_str(&s)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        fs::write(&self.path, serde_json::to_vec_pretty(map)?)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = match self.read_map() {
            Ok(map) => map,
            Err(e) => {
                tracing::warn!(
                    target: "storage",
                    key,
                    path = %self.path.display(),
                    error = %e,
                    "state file unreadable; rewriting it with this key only"
                );
                BTreeMap::new()
            }
        };
        map.insert(key.to_string(), value.to_string());
        self.write_map(&map)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut map = self.read_map()?;
        if map.remove(key).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// Shared in-memory store; clones see the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> HashMap<String, String> {
        self.inner.lock().expect("memory store mutex poisoned").clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .inner
            .lock()
            .expect("memory store mutex poisoned")
            .get(key)
            .cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .lock()
            .expect("memory store mutex poisoned")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.inner
            .lock()
            .expect("memory store mutex poisoned")
            .remove(key);
        Ok(())
    }
}

/// Typed, best-effort view over a `KeyValueStore`.
///
/// Reads: absent or malformed → `[]`, `0`, `4h`. Writes: fire-and-forget.
pub struct PersistentCache {
    store: Box<dyn KeyValueStore>,
}

impl PersistentCache {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn entries(&mut self) -> Vec<FeedEntry> {
        self.read_parsed(KEY_ENTRIES, |raw| {
            serde_json::from_str::<Vec<FeedEntry>>(raw).ok()
        })
        .unwrap_or_default()
    }

    pub fn save_entries(&mut self, entries: &[FeedEntry]) {
        match serde_json::to_string(entries) {
            Ok(raw) => self.write(KEY_ENTRIES, &raw),
            Err(e) => tracing::warn!(target: "storage", error = %e, "serialize cached entries"),
        }
    }

    pub fn last_seen(&mut self) -> i64 {
        self.read_parsed(KEY_LAST_SEEN, |raw| raw.trim().parse::<i64>().ok())
            .unwrap_or(0)
    }

    pub fn set_last_seen(&mut self, ts: i64) {
        self.write(KEY_LAST_SEEN, &ts.to_string());
    }

    pub fn hours_back(&mut self) -> HoursBack {
        self.read_parsed(KEY_HOURS_BACK, |raw| {
            raw.trim().parse::<u32>().ok().and_then(HoursBack::new)
        })
        .unwrap_or_default()
    }

    pub fn set_hours_back(&mut self, hours: HoursBack) {
        self.write(KEY_HOURS_BACK, &hours.hours().to_string());
    }

    fn read_parsed<T>(&mut self, key: &str, parse: impl FnOnce(&str) -> Option<T>) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(target: "storage", key, error = %e, "read failed; using default");
                return None;
            }
        };
        let parsed = parse(&raw);
        if parsed.is_none() {
            tracing::warn!(target: "storage", key, "malformed stored value; removing");
            if let Err(e) = self.store.remove(key) {
                tracing::warn!(target: "storage", key, error = %e, "remove failed");
            }
        }
        parsed
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::warn!(target: "storage", key, error = %e, "write failed; keeping in-memory state");
        }
    }
}
