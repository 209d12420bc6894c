//! Entry point tying drivers, cache and probe together.

use crate::config::Settings;
use crate::error::{CoreError, CoreResult};
use crate::external::{BinaryDriver, ProcessDriver};
use crate::media::Audio;
use crate::probe::FfProbe;

use std::path::Path;
use std::sync::Arc;

/// Opens media files for transcoding.
#[derive(Clone)]
pub struct FfMpeg {
    driver: Arc<dyn BinaryDriver>,
    probe: FfProbe,
}

impl FfMpeg {
    /// Locates the binaries named by `settings` and opens the configured cache.
    ///
    /// # Errors
    ///
    /// * `CoreError::DependencyNotFound` - ffmpeg or ffprobe cannot be started
    /// * `CoreError::Cache` - the cache file exists but is unusable
    pub fn create(settings: &Settings) -> CoreResult<Self> {
        let probe = FfProbe::create(settings)?;
        let ffmpeg = ProcessDriver::create("ffmpeg", settings.ffmpeg.clone())?;
        log::debug!("Using ffmpeg binary {}", ffmpeg.binary());

        Ok(Self::new(Arc::new(ffmpeg), probe))
    }

    pub fn new(driver: Arc<dyn BinaryDriver>, probe: FfProbe) -> Self {
        Self { driver, probe }
    }

    pub fn driver(&self) -> &Arc<dyn BinaryDriver> {
        &self.driver
    }

    pub fn probe(&self) -> &FfProbe {
        &self.probe
    }

    /// Opens an audio file.
    ///
    /// # Errors
    ///
    /// * `CoreError::InvalidArgument` - the file does not exist or has no audio stream
    /// * any probe error raised while reading its streams
    pub fn open(&self, path: impl AsRef<Path>) -> CoreResult<Audio> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CoreError::InvalidArgument(format!(
                "file {} does not exist",
                path.display()
            )));
        }

        let streams = self.probe.streams(path)?;
        if streams.audios().next().is_none() {
            return Err(CoreError::InvalidArgument(format!(
                "{} contains no audio stream",
                path.display()
            )));
        }

        Ok(Audio::new(path, Arc::clone(&self.driver), self.probe.clone()))
    }
}
