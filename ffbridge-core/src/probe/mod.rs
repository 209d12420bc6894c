//! ffprobe integration for media analysis and option detection
//!
//! [`FfProbe`] queries the `format` and `streams` sections of a media file.
//! Before each query it asks the [`OptionsTester`] whether the binary supports
//! the flags involved, and it caches the parsed JSON per file so repeated
//! lookups do not spawn ffprobe again.

mod options_tester;
mod types;

pub use options_tester::{HELP_ARGS, HELP_CACHE_KEY, OptionsTester, option_cache_key};
pub use types::{Format, Stream, StreamCollection};

use crate::cache::{CacheStore, FileCache, MemoryCache};
use crate::config::Settings;
use crate::error::{CoreError, CoreResult};
use crate::external::{BinaryDriver, ProcessDriver};

use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;

const SHOW_FORMAT: &str = "-show_format";
const SHOW_STREAMS: &str = "-show_streams";
const PRINT_FORMAT: &str = "-print_format";

/// Media metadata queries backed by an ffprobe driver.
#[derive(Clone)]
pub struct FfProbe {
    driver: Arc<dyn BinaryDriver>,
    options: OptionsTester,
    cache: Arc<dyn CacheStore>,
}

impl FfProbe {
    /// Creates a probe whose option tester shares `cache`.
    pub fn new(driver: Arc<dyn BinaryDriver>, cache: Arc<dyn CacheStore>) -> Self {
        let options = OptionsTester::new(Arc::clone(&driver), Arc::clone(&cache));
        Self {
            driver,
            options,
            cache,
        }
    }

    /// Locates ffprobe and opens the cache named by `settings`.
    ///
    /// # Errors
    ///
    /// * `CoreError::DependencyNotFound` - no ffprobe candidate can be started
    /// * `CoreError::Cache` - the cache file exists but is unusable
    pub fn create(settings: &Settings) -> CoreResult<Self> {
        let cache: Arc<dyn CacheStore> = match &settings.cache.path {
            Some(path) => {
                log::debug!("Using cache file {}", path.display());
                Arc::new(FileCache::open(path)?)
            }
            None => Arc::new(MemoryCache::new()),
        };
        let driver = ProcessDriver::create("ffprobe", settings.ffprobe.clone())?;
        log::debug!("Using ffprobe binary {}", driver.binary());

        Ok(Self::new(Arc::new(driver), cache))
    }

    pub fn options_tester(&self) -> &OptionsTester {
        &self.options
    }

    pub fn driver(&self) -> &Arc<dyn BinaryDriver> {
        &self.driver
    }

    /// Returns the container information of `path`.
    pub fn format(&self, path: &Path) -> CoreResult<Format> {
        let output = self.probe(path, SHOW_FORMAT)?;
        let properties = output
            .get("format")
            .and_then(Value::as_object)
            .cloned()
            .ok_or_else(|| {
                CoreError::ProbeOutput(format!(
                    "no `format` section for {}",
                    path.display()
                ))
            })?;
        Ok(Format::new(properties))
    }

    /// Returns the streams of `path`.
    pub fn streams(&self, path: &Path) -> CoreResult<StreamCollection> {
        let output = self.probe(path, SHOW_STREAMS)?;
        let streams = output
            .get("streams")
            .and_then(Value::as_array)
            .ok_or_else(|| {
                CoreError::ProbeOutput(format!(
                    "no `streams` section for {}",
                    path.display()
                ))
            })?;

        let streams = streams
            .iter()
            .map(|stream| {
                stream.as_object().cloned().map(Stream::new).ok_or_else(|| {
                    CoreError::ProbeOutput(format!(
                        "stream entry for {} is not an object",
                        path.display()
                    ))
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(StreamCollection::new(streams))
    }

    fn probe(&self, path: &Path, section: &str) -> CoreResult<Map<String, Value>> {
        let pathfile = path.to_string_lossy().into_owned();
        let key = format!("{section}-{pathfile}");

        if let Some(Value::Object(cached)) = self.cache.get(&key) {
            log::debug!("Using cached ffprobe {} output for {}", section, pathfile);
            return Ok(cached);
        }

        for option in [section, PRINT_FORMAT] {
            if !self.options.has(option)? {
                return Err(CoreError::InvalidArgument(format!(
                    "this version of ffprobe is too old and does not support the `{option}` option, please upgrade"
                )));
            }
        }

        let args = vec![
            pathfile.clone(),
            section.to_string(),
            PRINT_FORMAT.to_string(),
            "json".to_string(),
        ];
        let output = self.driver.command(&args, false, None).map_err(|source| {
            log::error!("ffprobe {} failed for {}: {}", section, pathfile, source);
            CoreError::ProbeFailed {
                path: pathfile.clone(),
                source,
            }
        })?;

        let parsed = match serde_json::from_str::<Value>(&output) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                return Err(CoreError::ProbeOutput(format!(
                    "ffprobe output for {pathfile} is not a JSON object"
                )));
            }
            Err(e) => {
                return Err(CoreError::ProbeOutput(format!(
                    "invalid JSON for {pathfile}: {e}"
                )));
            }
        };

        if let Err(e) = self.cache.set(&key, Value::Object(parsed.clone())) {
            log::warn!("Could not cache ffprobe {} output for {}: {}", section, pathfile, e);
        }
        Ok(parsed)
    }
}
