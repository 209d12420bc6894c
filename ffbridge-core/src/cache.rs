// ============================================================================
// ffbridge-core/src/cache.rs
// ============================================================================
//
// CACHE: Key/Value Stores for Probe Results
//
// The options tester and the ffprobe wrapper memoize their answers in a
// `CacheStore`. Stores are handed to components as `Arc<dyn CacheStore>`;
// components sharing a handle share entries. Expiry and persistence belong to
// the backend.
//
// KEY COMPONENTS:
// - CacheStore: has/get/set over string keys and JSON values
// - MemoryCache: process-lifetime store
// - FileCache: JSON file store, rewritten atomically on every write

use crate::error::{CoreError, CoreResult};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tempfile::NamedTempFile;

/// A key/value store shared by the components that memoize probe output.
pub trait CacheStore: Send + Sync {
    /// Returns the value stored under `key`.
    fn get(&self, key: &str) -> Option<Value>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, value: Value) -> CoreResult<()>;

    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Entries are plain values; a panic elsewhere cannot leave them half-written.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory store. Entries live as long as the store.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheStore for MemoryCache {
    fn get(&self, key: &str) -> Option<Value> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) -> CoreResult<()> {
        lock(&self.entries).insert(key.to_string(), value);
        Ok(())
    }

    fn has(&self, key: &str) -> bool {
        lock(&self.entries).contains_key(key)
    }
}

/// Store backed by a JSON object on disk.
///
/// The file is read once when the cache is opened. Each `set` rewrites the
/// whole file through a temporary file in the same directory, so readers never
/// observe a partial write.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl FileCache {
    /// Opens the cache at `path`. A missing file starts an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> CoreResult<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => match serde_json::from_str::<Value>(&content)? {
                Value::Object(map) => map,
                other => {
                    return Err(CoreError::Cache(format!(
                        "{} does not hold a JSON object (found {})",
                        path.display(),
                        json_kind(&other)
                    )));
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(e.into()),
        };

        log::debug!(
            "Opened cache {} with {} entries",
            path.display(),
            entries.len()
        );
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &Map<String, Value>) -> CoreResult<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;

        let mut tmp = NamedTempFile::new_in(&dir)?;
        serde_json::to_writer(&mut tmp, entries)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| {
            CoreError::Cache(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        Ok(())
    }
}

impl CacheStore for FileCache {
    fn get(&self, key: &str) -> Option<Value> {
        lock(&self.entries).get(key).cloned()
    }

    /// The entry becomes visible only once the file has been rewritten.
    fn set(&self, key: &str, value: Value) -> CoreResult<()> {
        let mut entries = lock(&self.entries);
        let mut updated = entries.clone();
        updated.insert(key.to_string(), value);
        self.persist(&updated)?;
        *entries = updated;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
