// ============================================================================
// ffbridge-core/src/media/mod.rs
// ============================================================================
//
// MEDIA: Opened Inputs and Transcode Command Assembly
//
// An `Audio` couples an input path with the ffmpeg driver, the probe and the
// filters registered on it. `save` turns a format and output path into the
// ffmpeg argument vector and runs it.
//
// KEY COMPONENTS:
// - Audio: input file plus its filter collection
// - build_command: deterministic argument assembly, never touches the filters
// - save: submits the command with the format's progress listeners

// ---- Internal crate imports ----
use crate::config::DEFAULT_THREADS;
use crate::error::{CoreError, CoreResult};
use crate::external::BinaryDriver;
use crate::filters::{AudioFilters, FilterCollection, MediaFilter};
use crate::format::AudioFormat;
use crate::probe::FfProbe;

// ---- Standard library imports ----
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An audio input ready to be transcoded.
pub struct Audio {
    path: PathBuf,
    driver: Arc<dyn BinaryDriver>,
    probe: FfProbe,
    filters: FilterCollection,
}

impl Audio {
    /// Wraps `path` without checking it. [`crate::FfMpeg::open`] is the
    /// checked entry point.
    pub fn new(path: impl Into<PathBuf>, driver: Arc<dyn BinaryDriver>, probe: FfProbe) -> Self {
        Self {
            path: path.into(),
            driver,
            probe,
            filters: FilterCollection::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn driver(&self) -> &Arc<dyn BinaryDriver> {
        &self.driver
    }

    pub fn probe(&self) -> &FfProbe {
        &self.probe
    }

    /// Helper for registering the built-in audio filters.
    pub fn filters(&mut self) -> AudioFilters<'_> {
        AudioFilters::new(self)
    }

    pub fn filter_collection(&self) -> &FilterCollection {
        &self.filters
    }

    /// Replaces the registered filters.
    ///
    /// # Errors
    ///
    /// * `CoreError::InvalidFilter` - `filters` holds a video filter; the
    ///   current collection is kept
    pub fn set_filter_collection(&mut self, filters: FilterCollection) -> CoreResult<&mut Self> {
        if let Some(MediaFilter::Video(video)) = filters
            .iter()
            .find(|filter| matches!(filter, MediaFilter::Video(_)))
        {
            return Err(CoreError::InvalidFilter(format!(
                "audio media only accept audio filters, got video filter `{}`",
                video.name()
            )));
        }

        self.filters = filters;
        Ok(self)
    }

    pub(crate) fn filter_collection_mut(&mut self) -> &mut FilterCollection {
        &mut self.filters
    }

    /// Registers a filter. Only audio filters are accepted.
    ///
    /// # Errors
    ///
    /// * `CoreError::InvalidFilter` - `filter` is a video filter; the
    ///   collection is left unchanged
    pub fn add_filter(&mut self, filter: MediaFilter) -> CoreResult<&mut Self> {
        match filter {
            MediaFilter::Audio(_) => {
                self.filters.add(filter);
                Ok(self)
            }
            MediaFilter::Video(video) => Err(CoreError::InvalidFilter(format!(
                "audio media only accept audio filters, got video filter `{}`",
                video.name()
            ))),
        }
    }

    /// Builds the ffmpeg arguments that transcode this input into `output`.
    ///
    /// # Errors
    ///
    /// * `CoreError::Config` - the driver's `threads` setting is not a number
    pub fn build_command(&self, format: &dyn AudioFormat, output: &Path) -> CoreResult<Vec<String>> {
        let threads = self
            .driver
            .configuration()
            .threads()?
            .unwrap_or(DEFAULT_THREADS);

        let mut commands = vec![
            "-y".to_string(),
            "-i".to_string(),
            self.path.to_string_lossy().into_owned(),
        ];

        let codec = format.audio_codec().filter(|codec| !codec.is_empty());
        let bitrate = format.audio_kilo_bitrate();
        let channels = format.audio_channels();
        let extra = format.extra_params().iter().cloned();

        if codec.is_none() && bitrate.is_none() && channels.is_none() {
            commands.extend(extra);
            commands.push("-threads".to_string());
            commands.push(threads.to_string());
        } else {
            commands.push("-threads".to_string());
            commands.push(threads.to_string());
            commands.extend(extra);
        }

        if let Some(codec) = codec {
            commands.push("-acodec".to_string());
            commands.push(codec.to_string());
        }
        if let Some(kbps) = bitrate {
            commands.push("-b:a".to_string());
            commands.push(format!("{kbps}k"));
        }
        if let Some(channels) = channels {
            commands.push("-ac".to_string());
            commands.push(channels.to_string());
        }

        for filter in &self.filters {
            if let MediaFilter::Audio(filter) = filter {
                commands.extend(filter.apply(self, format));
            }
        }

        commands.push(output.to_string_lossy().into_owned());
        Ok(commands)
    }

    /// Transcodes this input into `output` using `format`.
    ///
    /// # Errors
    ///
    /// * `CoreError::EncodingFailed` - ffmpeg failed
    /// * `CoreError::Config` - see [`Audio::build_command`]
    pub fn save(&self, format: &dyn AudioFormat, output: &Path) -> CoreResult<&Self> {
        let commands = self.build_command(format, output)?;
        let listeners = format
            .progress()
            .map(|progress| progress.create_progress_listeners(self));

        log::info!("Encoding {} to {}", self.path.display(), output.display());
        log::debug!("{} arguments: {:?}", self.driver.name(), commands);

        self.driver
            .command(&commands, false, listeners)
            .map_err(|source| {
                log::error!("Encoding {} failed: {}", self.path.display(), source);
                CoreError::EncodingFailed { source }
            })?;

        log::info!("Wrote {}", output.display());
        Ok(self)
    }
}

impl fmt::Debug for Audio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Audio")
            .field("path", &self.path)
            .field("driver", &self.driver.name())
            .field("filters", &self.filters)
            .finish()
    }
}
