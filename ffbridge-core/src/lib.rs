//! Driver layer for the ffmpeg and ffprobe binaries.
//!
//! This crate builds the argument vectors for ffmpeg audio transcodes, runs
//! them through a [`BinaryDriver`], and answers which options the installed
//! ffprobe supports, caching the answers in a [`CacheStore`].
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use ffbridge_core::{FfMpeg, Settings};
//! use ffbridge_core::format::{AudioPreset, StandardAudioFormat};
//! use std::path::Path;
//!
//! let settings = Settings::load(None)?;
//! let ffmpeg = FfMpeg::create(&settings)?;
//!
//! let mut audio = ffmpeg.open("input.wav")?;
//! audio.filters().resample(44100);
//!
//! let mut format = StandardAudioFormat::new(AudioPreset::Mp3);
//! format.set_audio_kilo_bitrate(256)?;
//! format.on_progress(|event| println!("{}%", event.percent));
//!
//! audio.save(&format, Path::new("output.mp3"))?;
//! # Ok::<(), ffbridge_core::CoreError>(())
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod external;
pub mod ffmpeg;
pub mod filters;
pub mod format;
pub mod media;
pub mod probe;
pub mod progress;

// Re-exports for public API
pub use cache::{CacheStore, FileCache, MemoryCache};
pub use config::{Configuration, Settings};
pub use error::{CoreError, CoreResult, ExecutionFailure};
pub use external::{BinaryDriver, Listener, Listeners, ProcessDriver};
pub use ffmpeg::FfMpeg;
pub use filters::{FilterCollection, MediaFilter};
pub use format::{AudioFormat, ProgressableFormat};
pub use media::Audio;
pub use probe::{FfProbe, OptionsTester};
pub use progress::{ProgressEvent, parse_ffmpeg_time};
