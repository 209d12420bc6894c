//! Configuration utility functions
//!
//! This module provides helper functions for reading configuration values
//! from environment variables. Lookups go through an [`EnvLookup`] so the
//! override logic can be exercised without touching the process environment.

use std::path::PathBuf;

/// Resolves a variable name to its value, if set.
pub type EnvLookup = dyn Fn(&str) -> Option<String>;

/// Reads from the real process environment.
pub(crate) fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get a path value from an environment variable, ignoring empty values
pub fn get_env_path(lookup: &EnvLookup, key: &str) -> Option<PathBuf> {
    lookup(key).filter(|val| !val.trim().is_empty()).map(PathBuf::from)
}

/// Get a u32 value from an environment variable or use the default
pub fn get_env_u32(lookup: &EnvLookup, key: &str, default: u32) -> u32 {
    match lookup(key) {
        Some(val) => val.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring {}={:?}: not a non-negative integer", key, val);
            default
        }),
        None => default,
    }
}
