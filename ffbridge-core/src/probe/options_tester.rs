//! Detection of the command-line options an ffprobe binary supports.
//!
//! The help text and every answer are memoized in the cache store the tester
//! is given, so each option costs at most one ffprobe invocation per cache
//! lifetime, and the help text is fetched at most once.

use crate::cache::CacheStore;
use crate::error::{CoreError, CoreResult};
use crate::external::BinaryDriver;

use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Cache key of the raw `-help` output.
pub const HELP_CACHE_KEY: &str = "help";

/// Arguments used to obtain the help text.
pub const HELP_ARGS: [&str; 3] = ["-help", "-loglevel", "quiet"];

/// Cache key holding the answer for `option`.
pub fn option_cache_key(option: &str) -> String {
    format!("option-{option}")
}

/// Answers whether the ffprobe binary lists a given option in its help.
#[derive(Clone)]
pub struct OptionsTester {
    ffprobe: Arc<dyn BinaryDriver>,
    cache: Arc<dyn CacheStore>,
}

impl OptionsTester {
    pub fn new(ffprobe: Arc<dyn BinaryDriver>, cache: Arc<dyn CacheStore>) -> Self {
        Self { ffprobe, cache }
    }

    /// Returns whether `option` (e.g. `-show_streams`) starts a line of the
    /// help text.
    ///
    /// # Errors
    ///
    /// * `CoreError::ProbeUnavailable` - ffprobe could not produce its help text
    ///
    /// A failure to store the answer is logged and does not fail the lookup.
    pub fn has(&self, option: &str) -> CoreResult<bool> {
        let key = option_cache_key(option);

        if let Some(Value::Bool(supported)) = self.cache.get(&key) {
            log::debug!("Option {} support (cached): {}", option, supported);
            return Ok(supported);
        }

        let help = self.retrieve_help_output()?;
        let supported = line_starts_with(&help, option)?;

        self.remember(&key, Value::Bool(supported));
        log::debug!("Option {} support: {}", option, supported);

        Ok(supported)
    }

    fn retrieve_help_output(&self) -> CoreResult<String> {
        if let Some(Value::String(help)) = self.cache.get(HELP_CACHE_KEY) {
            return Ok(help);
        }

        let args: Vec<String> = HELP_ARGS.iter().map(|s| s.to_string()).collect();
        let help = self.ffprobe.command(&args, false, None).map_err(|failure| {
            log::error!("{} does not answer to -help: {}", self.ffprobe.name(), failure);
            CoreError::ProbeUnavailable {
                code: failure.code,
                source: failure,
            }
        })?;

        self.remember(HELP_CACHE_KEY, Value::String(help.clone()));
        Ok(help)
    }

    // A store that cannot be written only costs a later ffprobe call.
    fn remember(&self, key: &str, value: Value) {
        if let Err(e) = self.cache.set(key, value) {
            log::warn!("Could not cache {}: {}", key, e);
        }
    }
}

/// Whether any line of `text` begins with `prefix`, taken literally.
fn line_starts_with(text: &str, prefix: &str) -> CoreResult<bool> {
    let pattern = Regex::new(&format!("(?m)^{}", regex::escape(prefix)))
        .map_err(|e| CoreError::InvalidArgument(format!("option {prefix:?}: {e}")))?;
    Ok(pattern.is_match(text))
}
