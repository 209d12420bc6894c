//! Ready-made audio encodings.

use super::{AudioFormat, ProgressableFormat};
use crate::error::{CoreError, CoreResult};
use crate::external::Listeners;
use crate::media::Audio;
use crate::progress::{AudioProgressListener, ProgressCallback, ProgressEvent};

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Bitrate used when none is set explicitly, in kbit/s.
pub const DEFAULT_KILO_BITRATE: u32 = 128;

/// The encodings [`StandardAudioFormat`] knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioPreset {
    Mp3,
    Aac,
    Flac,
    Vorbis,
    Wav,
    Opus,
}

impl AudioPreset {
    pub const ALL: [AudioPreset; 6] = [
        AudioPreset::Mp3,
        AudioPreset::Aac,
        AudioPreset::Flac,
        AudioPreset::Vorbis,
        AudioPreset::Wav,
        AudioPreset::Opus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AudioPreset::Mp3 => "mp3",
            AudioPreset::Aac => "aac",
            AudioPreset::Flac => "flac",
            AudioPreset::Vorbis => "vorbis",
            AudioPreset::Wav => "wav",
            AudioPreset::Opus => "opus",
        }
    }

    /// Codecs accepted for this preset. The first one is the default.
    pub fn available_codecs(self) -> &'static [&'static str] {
        match self {
            AudioPreset::Mp3 => &["libmp3lame"],
            AudioPreset::Aac => &["aac", "libfdk_aac"],
            AudioPreset::Flac => &["flac"],
            AudioPreset::Vorbis => &["libvorbis", "vorbis"],
            AudioPreset::Wav => &["pcm_s16le"],
            AudioPreset::Opus => &["libopus"],
        }
    }

    pub fn default_codec(self) -> &'static str {
        self.available_codecs()[0]
    }
}

impl fmt::Display for AudioPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AudioPreset {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        AudioPreset::ALL
            .into_iter()
            .find(|preset| preset.name() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = AudioPreset::ALL.iter().map(|p| p.name()).collect();
                CoreError::InvalidArgument(format!(
                    "unknown audio format {s:?}, expected one of: {}",
                    known.join(", ")
                ))
            })
    }
}

/// An audio encoding built from an [`AudioPreset`].
///
/// # Examples
///
/// ```
/// use ffbridge_core::format::{AudioFormat, AudioPreset, StandardAudioFormat};
///
/// let mut format = StandardAudioFormat::new(AudioPreset::Aac);
/// format.set_audio_kilo_bitrate(192)?.set_audio_channels(2)?;
///
/// assert_eq!(format.audio_codec(), Some("aac"));
/// assert_eq!(format.audio_kilo_bitrate(), Some(192));
/// # Ok::<(), ffbridge_core::CoreError>(())
/// ```
#[derive(Clone)]
pub struct StandardAudioFormat {
    preset: AudioPreset,
    audio_codec: String,
    audio_kilo_bitrate: u32,
    audio_channels: Option<u32>,
    extra_params: Vec<String>,
    callbacks: Vec<ProgressCallback>,
}

impl StandardAudioFormat {
    pub fn new(preset: AudioPreset) -> Self {
        Self {
            preset,
            audio_codec: preset.default_codec().to_string(),
            audio_kilo_bitrate: DEFAULT_KILO_BITRATE,
            audio_channels: None,
            extra_params: Vec::new(),
            callbacks: Vec::new(),
        }
    }

    pub fn preset(&self) -> AudioPreset {
        self.preset
    }

    /// # Errors
    ///
    /// * `CoreError::InvalidArgument` - the codec is not available for the preset
    pub fn set_audio_codec(&mut self, codec: &str) -> CoreResult<&mut Self> {
        if !self.preset.available_codecs().contains(&codec) {
            return Err(CoreError::InvalidArgument(format!(
                "wrong audio codec {codec:?} for {}, available codecs are: {}",
                self.preset,
                self.preset.available_codecs().join(", ")
            )));
        }
        self.audio_codec = codec.to_string();
        Ok(self)
    }

    /// # Errors
    ///
    /// * `CoreError::InvalidArgument` - the bitrate is zero
    pub fn set_audio_kilo_bitrate(&mut self, kbps: u32) -> CoreResult<&mut Self> {
        if kbps == 0 {
            return Err(CoreError::InvalidArgument(
                "audio kilobitrate must be greater than 0".to_string(),
            ));
        }
        self.audio_kilo_bitrate = kbps;
        Ok(self)
    }

    /// # Errors
    ///
    /// * `CoreError::InvalidArgument` - the channel count is zero
    pub fn set_audio_channels(&mut self, channels: u32) -> CoreResult<&mut Self> {
        if channels == 0 {
            return Err(CoreError::InvalidArgument(
                "audio channel count must be greater than 0".to_string(),
            ));
        }
        self.audio_channels = Some(channels);
        Ok(self)
    }

    pub fn set_extra_params(&mut self, params: Vec<String>) -> &mut Self {
        self.extra_params = params;
        self
    }

    /// Registers a callback for progress events. Once at least one callback
    /// is registered the format becomes progress-capable.
    pub fn on_progress<F>(&mut self, callback: F) -> &mut Self
    where
        F: Fn(&ProgressEvent) + Send + Sync + 'static,
    {
        self.callbacks.push(Arc::new(callback));
        self
    }
}

impl fmt::Debug for StandardAudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardAudioFormat")
            .field("preset", &self.preset)
            .field("audio_codec", &self.audio_codec)
            .field("audio_kilo_bitrate", &self.audio_kilo_bitrate)
            .field("audio_channels", &self.audio_channels)
            .field("extra_params", &self.extra_params)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl AudioFormat for StandardAudioFormat {
    fn audio_codec(&self) -> Option<&str> {
        Some(&self.audio_codec)
    }

    fn audio_kilo_bitrate(&self) -> Option<u32> {
        Some(self.audio_kilo_bitrate)
    }

    fn audio_channels(&self) -> Option<u32> {
        self.audio_channels
    }

    fn extra_params(&self) -> &[String] {
        &self.extra_params
    }

    fn progress(&self) -> Option<&dyn ProgressableFormat> {
        if self.callbacks.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

impl ProgressableFormat for StandardAudioFormat {
    fn create_progress_listeners(&self, media: &Audio) -> Listeners {
        let duration = match media.probe().format(media.path()) {
            Ok(format) => format.duration(),
            Err(e) => {
                log::warn!(
                    "Could not determine duration of {}, progress will not be reported in percent: {}",
                    media.path().display(),
                    e
                );
                None
            }
        };

        vec![Box::new(AudioProgressListener::new(
            duration,
            self.callbacks.clone(),
        ))]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_defaults() {
        let format = StandardAudioFormat::new(AudioPreset::Mp3);
        assert_eq!(format.audio_codec(), Some("libmp3lame"));
        assert_eq!(format.audio_kilo_bitrate(), Some(DEFAULT_KILO_BITRATE));
        assert_eq!(format.audio_channels(), None);
        assert!(format.extra_params().is_empty());
        assert!(format.progress().is_none());
    }

    #[test]
    fn test_codec_must_belong_to_preset() {
        let mut format = StandardAudioFormat::new(AudioPreset::Aac);
        assert!(format.set_audio_codec("libfdk_aac").is_ok());
        assert_eq!(format.audio_codec(), Some("libfdk_aac"));

        let err = format.set_audio_codec("libmp3lame").unwrap_err();
        assert!(matches!(err, CoreError::InvalidArgument(_)));
        assert_eq!(format.audio_codec(), Some("libfdk_aac"));
    }

    #[test]
    fn test_aac_defaults_to_native_encoder() {
        assert_eq!(AudioPreset::Aac.default_codec(), "aac");
        let format = StandardAudioFormat::new(AudioPreset::Aac);
        assert_eq!(format.audio_codec(), Some("aac"));
    }

    #[test]
    fn test_zero_values_are_rejected() {
        let mut format = StandardAudioFormat::new(AudioPreset::Opus);
        assert!(format.set_audio_kilo_bitrate(0).is_err());
        assert!(format.set_audio_channels(0).is_err());
        assert_eq!(format.audio_kilo_bitrate(), Some(DEFAULT_KILO_BITRATE));
        assert_eq!(format.audio_channels(), None);
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("FLAC".parse::<AudioPreset>().unwrap(), AudioPreset::Flac);
        assert_eq!("vorbis".parse::<AudioPreset>().unwrap(), AudioPreset::Vorbis);
        assert!("mp4".parse::<AudioPreset>().is_err());
    }

    #[test]
    fn test_callbacks_enable_progress() {
        let mut format = StandardAudioFormat::new(AudioPreset::Wav);
        format.on_progress(|_| {});
        assert!(format.progress().is_some());
    }
}
