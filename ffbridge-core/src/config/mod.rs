//! Configuration structures and constants for the ffbridge-core library.
//!
//! Each binary driver owns a [`Configuration`], a small key/value bag that
//! mirrors the settings a driver is created with (`binaries`, `threads`).
//! [`Settings`] groups the ffmpeg and ffprobe configurations with the cache
//! location and is what consumers load from a TOML file and the environment.

mod utils;

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub use utils::{EnvLookup, get_env_path, get_env_u32};

// Default constants

/// Thread count passed to ffmpeg when the driver configuration has no `threads` entry.
pub const DEFAULT_THREADS: u32 = 2;

/// Configuration key holding the binary path, or a list of candidate paths.
pub const BINARIES_KEY: &str = "binaries";

/// Configuration key holding the ffmpeg thread count.
pub const THREADS_KEY: &str = "threads";

/// Environment variable overriding the ffmpeg binary candidates (comma-separated).
pub const ENV_FFMPEG_BINARIES: &str = "FFBRIDGE_FFMPEG_BINARIES";

/// Environment variable overriding the ffprobe binary candidates (comma-separated).
pub const ENV_FFPROBE_BINARIES: &str = "FFBRIDGE_FFPROBE_BINARIES";

/// Environment variable overriding the ffmpeg thread count.
pub const ENV_THREADS: &str = "FFBRIDGE_THREADS";

/// Environment variable setting the file-backed cache location.
pub const ENV_CACHE_PATH: &str = "FFBRIDGE_CACHE_PATH";

/// Key/value configuration attached to a binary driver.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    values: BTreeMap<String, Value>,
}

impl Configuration {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    /// Builder-style variant of [`Configuration::set`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Returns the configured thread count, if any.
    ///
    /// Accepts an integer or a numeric string. Any other value is a
    /// configuration error rather than being silently replaced by the default.
    pub fn threads(&self) -> CoreResult<Option<u32>> {
        let Some(value) = self.get(THREADS_KEY) else {
            return Ok(None);
        };

        let parsed = match value {
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            Value::String(s) => s.trim().parse::<u32>().ok(),
            _ => None,
        };

        parsed.map(Some).ok_or_else(|| {
            CoreError::Config(format!(
                "`{THREADS_KEY}` must be a non-negative integer, got {value}"
            ))
        })
    }

    /// Returns the candidate binary paths, in the order they should be tried.
    pub fn binaries(&self) -> CoreResult<Vec<String>> {
        match self.get(BINARIES_KEY) {
            None => Ok(Vec::new()),
            Some(Value::String(s)) => Ok(vec![s.clone()]),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        CoreError::Config(format!(
                            "`{BINARIES_KEY}` entries must be strings, got {item}"
                        ))
                    })
                })
                .collect(),
            Some(other) => Err(CoreError::Config(format!(
                "`{BINARIES_KEY}` must be a string or a list of strings, got {other}"
            ))),
        }
    }
}

/// Cache settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Location of the JSON cache file. When unset an in-memory cache is used.
    pub path: Option<PathBuf>,
}

/// Top-level settings for building drivers.
///
/// # Examples
///
/// ```rust
/// use ffbridge_core::config::Settings;
///
/// let settings = Settings::from_toml_str(r#"
/// [ffmpeg]
/// binaries = ["/usr/local/bin/ffmpeg", "ffmpeg"]
/// threads = 8
///
/// [cache]
/// path = "/tmp/ffbridge-cache.json"
/// "#).unwrap();
///
/// assert_eq!(settings.ffmpeg.threads().unwrap(), Some(8));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Configuration handed to the ffmpeg driver
    pub ffmpeg: Configuration,

    /// Configuration handed to the ffprobe driver
    pub ffprobe: Configuration,

    /// Cache backend settings
    pub cache: CacheSettings,
}

impl Settings {
    /// Parses settings from TOML text.
    pub fn from_toml_str(content: &str) -> CoreResult<Self> {
        toml::from_str(content).map_err(|e| CoreError::Config(e.to_string()))
    }

    /// Reads settings from a TOML file.
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Loads settings from an optional file, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        settings.apply_overrides(&utils::process_env);
        Ok(settings)
    }

    /// Applies overrides read through `lookup`.
    ///
    /// Binary lists are comma-separated. A thread count that does not parse is
    /// ignored with a warning and leaves the current value in place.
    pub fn apply_overrides(&mut self, lookup: &EnvLookup) {
        if let Some(list) = lookup(ENV_FFMPEG_BINARIES) {
            self.ffmpeg.set(BINARIES_KEY, split_list(&list));
        }
        if let Some(list) = lookup(ENV_FFPROBE_BINARIES) {
            self.ffprobe.set(BINARIES_KEY, split_list(&list));
        }

        if lookup(ENV_THREADS).is_some() {
            let current = self.ffmpeg.threads().ok().flatten().unwrap_or(DEFAULT_THREADS);
            self.ffmpeg.set(THREADS_KEY, get_env_u32(lookup, ENV_THREADS, current));
        }

        if let Some(path) = get_env_path(lookup, ENV_CACHE_PATH) {
            self.cache.path = Some(path);
        }
    }
}

fn split_list(list: &str) -> Vec<Value> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| Value::String(s.to_string()))
        .collect()
}
