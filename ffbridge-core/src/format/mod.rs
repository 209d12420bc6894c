//! Output encoding descriptions.
//!
//! An [`AudioFormat`] tells the command builder which codec, bitrate, channel
//! count and extra parameters to request. A format can additionally expose the
//! [`ProgressableFormat`] capability, in which case the transcode is run with
//! the listeners it creates.

mod audio;

pub use audio::{AudioPreset, StandardAudioFormat};

use crate::external::Listeners;
use crate::media::Audio;

/// Parameters of a desired audio encoding.
///
/// Every accessor defaults to "not declared"; the corresponding flag is then
/// left out of the command line.
pub trait AudioFormat {
    /// Codec passed to `-acodec`.
    fn audio_codec(&self) -> Option<&str> {
        None
    }

    /// Bitrate passed to `-b:a`, in kbit/s.
    fn audio_kilo_bitrate(&self) -> Option<u32> {
        None
    }

    /// Channel count passed to `-ac`.
    fn audio_channels(&self) -> Option<u32> {
        None
    }

    /// Tokens inserted verbatim into the command line.
    fn extra_params(&self) -> &[String] {
        &[]
    }

    /// The progress capability, if the format has one.
    fn progress(&self) -> Option<&dyn ProgressableFormat> {
        None
    }
}

/// Formats that can observe the progress of the transcode they describe.
pub trait ProgressableFormat {
    /// Creates the listeners attached to the transcode of `media`.
    fn create_progress_listeners(&self, media: &Audio) -> Listeners;
}
