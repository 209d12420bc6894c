//! Audio filters and the [`AudioFilters`] registration helper.

use super::MediaFilter;
use crate::format::AudioFormat;
use crate::media::Audio;

use std::collections::BTreeMap;
use std::time::Duration;

/// A filter operating on the audio stream.
pub trait AudioFilter: Send {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Argument fragment appended to the transcode of `audio` into `format`.
    fn apply(&self, audio: &Audio, format: &dyn AudioFormat) -> Vec<String>;
}

/// Emits a fixed list of arguments.
#[derive(Debug, Clone)]
pub struct SimpleFilter {
    params: Vec<String>,
}

impl SimpleFilter {
    pub fn new<I, S>(params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
        }
    }
}

impl AudioFilter for SimpleFilter {
    fn name(&self) -> &str {
        "simple"
    }

    fn apply(&self, _audio: &Audio, _format: &dyn AudioFormat) -> Vec<String> {
        self.params.clone()
    }
}

/// Changes the output sample rate (`-ar`).
#[derive(Debug, Clone, Copy)]
pub struct ResampleFilter {
    rate: u32,
}

impl ResampleFilter {
    pub fn new(rate: u32) -> Self {
        Self { rate }
    }

    pub fn rate(&self) -> u32 {
        self.rate
    }
}

impl AudioFilter for ResampleFilter {
    fn name(&self) -> &str {
        "resample"
    }

    fn apply(&self, _audio: &Audio, _format: &dyn AudioFormat) -> Vec<String> {
        vec!["-ar".to_string(), self.rate.to_string()]
    }
}

/// Writes container metadata tags, one `-metadata key=value` pair per entry.
#[derive(Debug, Clone, Default)]
pub struct MetadataFilter {
    entries: BTreeMap<String, String>,
}

impl MetadataFilter {
    pub fn new<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl AudioFilter for MetadataFilter {
    fn name(&self) -> &str {
        "metadata"
    }

    fn apply(&self, _audio: &Audio, _format: &dyn AudioFormat) -> Vec<String> {
        self.entries
            .iter()
            .flat_map(|(key, value)| ["-metadata".to_string(), format!("{key}={value}")])
            .collect()
    }
}

/// Keeps a section of the input, starting at `start` and lasting `duration`
/// (to the end when absent).
#[derive(Debug, Clone, Copy)]
pub struct ClipFilter {
    start: Duration,
    duration: Option<Duration>,
}

impl ClipFilter {
    pub fn new(start: Duration, duration: Option<Duration>) -> Self {
        Self { start, duration }
    }
}

impl AudioFilter for ClipFilter {
    fn name(&self) -> &str {
        "clip"
    }

    fn apply(&self, _audio: &Audio, _format: &dyn AudioFormat) -> Vec<String> {
        let mut params = vec!["-ss".to_string(), format_timestamp(self.start)];
        if let Some(duration) = self.duration {
            params.push("-t".to_string());
            params.push(format_timestamp(duration));
        }
        params
    }
}

/// Formats a duration as ffmpeg's `HH:MM:SS.mmm`.
fn format_timestamp(value: Duration) -> String {
    let total_millis = value.as_millis();
    let hours = total_millis / 3_600_000;
    let minutes = (total_millis / 60_000) % 60;
    let seconds = (total_millis / 1000) % 60;
    let millis = total_millis % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Registers audio filters on an [`Audio`], returned by [`Audio::filters`].
///
/// # Examples
///
/// ```no_run
/// use ffbridge_core::{FfMpeg, Settings};
/// use std::time::Duration;
///
/// let ffmpeg = FfMpeg::create(&Settings::default())?;
/// let mut audio = ffmpeg.open("track.flac")?;
/// audio
///     .filters()
///     .resample(44100)
///     .clip(Duration::from_secs(30), Some(Duration::from_secs(15)));
/// # Ok::<(), ffbridge_core::CoreError>(())
/// ```
pub struct AudioFilters<'a> {
    audio: &'a mut Audio,
}

impl<'a> AudioFilters<'a> {
    pub(crate) fn new(audio: &'a mut Audio) -> Self {
        Self { audio }
    }

    pub fn resample(self, rate: u32) -> Self {
        self.push(ResampleFilter::new(rate))
    }

    pub fn add_metadata<I, K, V>(self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.push(MetadataFilter::new(entries))
    }

    pub fn clip(self, start: Duration, duration: Option<Duration>) -> Self {
        self.push(ClipFilter::new(start, duration))
    }

    pub fn custom<I, S>(self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(SimpleFilter::new(params))
    }

    fn push(self, filter: impl AudioFilter + 'static) -> Self {
        self.audio
            .filter_collection_mut()
            .add(MediaFilter::audio(filter));
        self
    }
}
