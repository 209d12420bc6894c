// ffbridge-core/tests/audio_save_tests.rs

use ffbridge_core::cache::{CacheStore, MemoryCache};
use ffbridge_core::config::Configuration;
use ffbridge_core::error::CoreError;
use ffbridge_core::external::mocks::MockDriver;
use ffbridge_core::external::{BinaryDriver, Listeners};
use ffbridge_core::filters::{
    AudioFilter, CustomVideoFilter, FilterCollection, MediaFilter, SimpleFilter,
};
use ffbridge_core::format::{AudioFormat, AudioPreset, ProgressableFormat, StandardAudioFormat};
use ffbridge_core::media::Audio;
use ffbridge_core::probe::FfProbe;
use ffbridge_core::progress::ProgressEvent;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const INPUT: &str = "/media/input.mp3";
const OUTPUT: &str = "/media/output.mp3";

const HELP: &str = "\
-show_format        show format/container info
-show_streams       show streams info
-print_format format  set the output printing format
";

/// A format declaring exactly what the test gives it.
#[derive(Default)]
struct TestFormat {
    codec: Option<String>,
    kbps: Option<u32>,
    channels: Option<u32>,
    extra: Vec<String>,
}

impl AudioFormat for TestFormat {
    fn audio_codec(&self) -> Option<&str> {
        self.codec.as_deref()
    }

    fn audio_kilo_bitrate(&self) -> Option<u32> {
        self.kbps
    }

    fn audio_channels(&self) -> Option<u32> {
        self.channels
    }

    fn extra_params(&self) -> &[String] {
        &self.extra
    }
}

/// Supports progress but has nothing to listen with.
struct SilentProgressFormat;

impl AudioFormat for SilentProgressFormat {
    fn audio_kilo_bitrate(&self) -> Option<u32> {
        Some(96)
    }

    fn progress(&self) -> Option<&dyn ProgressableFormat> {
        Some(self)
    }
}

impl ProgressableFormat for SilentProgressFormat {
    fn create_progress_listeners(&self, _media: &Audio) -> Listeners {
        Vec::new()
    }
}

/// Emits the codec of the format it is applied with.
struct CodecEchoFilter;

impl AudioFilter for CodecEchoFilter {
    fn name(&self) -> &str {
        "codec-echo"
    }

    fn apply(&self, audio: &Audio, format: &dyn AudioFormat) -> Vec<String> {
        vec![
            "-comment".to_string(),
            format!(
                "{}:{}",
                audio.path().display(),
                format.audio_codec().unwrap_or("none")
            ),
        ]
    }
}

struct Fixture {
    ffmpeg: Arc<MockDriver>,
    ffprobe: Arc<MockDriver>,
    audio: Audio,
}

fn fixture(configuration: Configuration) -> Fixture {
    let ffmpeg = Arc::new(MockDriver::new("ffmpeg").with_configuration(configuration));
    let ffprobe = Arc::new(MockDriver::new("ffprobe"));
    let cache: Arc<dyn CacheStore> = Arc::new(MemoryCache::new());

    let probe_driver: Arc<dyn BinaryDriver> = ffprobe.clone();
    let ffmpeg_driver: Arc<dyn BinaryDriver> = ffmpeg.clone();
    let audio = Audio::new(INPUT, ffmpeg_driver, FfProbe::new(probe_driver, cache));

    Fixture {
        ffmpeg,
        ffprobe,
        audio,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_bitrate_and_channels() -> Result<(), Box<dyn std::error::Error>> {
    let f = fixture(Configuration::new());
    let format = TestFormat {
        kbps: Some(663),
        channels: Some(5),
        ..Default::default()
    };

    f.audio.save(&format, Path::new(OUTPUT))?;

    let calls = f.ffmpeg.get_received_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].args,
        strings(&["-y", "-i", INPUT, "-threads", "2", "-b:a", "663k", "-ac", "5", OUTPUT])
    );
    assert!(!calls[0].bypass_errors);
    assert_eq!(calls[0].listener_count, None);
    assert_eq!(f.ffprobe.call_count(), 0);
    Ok(())
}

#[test]
fn test_codec_is_emitted_before_bitrate() -> Result<(), Box<dyn std::error::Error>> {
    let f = fixture(Configuration::new());
    let format = TestFormat {
        codec: Some("patati-patata-audio".to_string()),
        kbps: Some(664),
        channels: Some(5),
        ..Default::default()
    };

    f.audio.save(&format, Path::new(OUTPUT))?;

    assert_eq!(
        f.ffmpeg.get_received_calls()[0].args,
        strings(&[
            "-y", "-i", INPUT, "-threads", "2", "-acodec", "patati-patata-audio", "-b:a",
            "664k", "-ac", "5", OUTPUT,
        ])
    );
    Ok(())
}

#[test]
fn test_empty_codec_is_omitted() -> Result<(), Box<dyn std::error::Error>> {
    let f = fixture(Configuration::new());
    let format = TestFormat {
        codec: Some(String::new()),
        kbps: Some(128),
        ..Default::default()
    };

    f.audio.save(&format, Path::new(OUTPUT))?;

    assert_eq!(
        f.ffmpeg.get_received_calls()[0].args,
        strings(&["-y", "-i", INPUT, "-threads", "2", "-b:a", "128k", OUTPUT])
    );
    Ok(())
}

#[test]
fn test_extra_params_follow_threads_when_format_has_bitrate() -> Result<(), Box<dyn std::error::Error>> {
    let f = fixture(Configuration::new());
    let format = TestFormat {
        kbps: Some(665),
        channels: Some(5),
        extra: strings(&["extra", "param"]),
        ..Default::default()
    };

    f.audio.save(&format, Path::new(OUTPUT))?;

    assert_eq!(
        f.ffmpeg.get_received_calls()[0].args,
        strings(&[
            "-y", "-i", INPUT, "-threads", "2", "extra", "param", "-b:a", "665k", "-ac", "5",
            OUTPUT,
        ])
    );
    Ok(())
}

#[test]
fn test_extra_params_precede_threads_without_encoding_flags() -> Result<(), Box<dyn std::error::Error>> {
    let f = fixture(Configuration::new().with("threads", 24));
    let format = TestFormat {
        extra: strings(&["param"]),
        ..Default::default()
    };

    f.audio.save(&format, Path::new(OUTPUT))?;

    assert_eq!(
        f.ffmpeg.get_received_calls()[0].args,
        strings(&["-y", "-i", INPUT, "param", "-threads", "24", OUTPUT])
    );
    Ok(())
}

#[test]
fn test_threads_from_configuration() -> Result<(), Box<dyn std::error::Error>> {
    let f = fixture(Configuration::new().with("threads", 24));
    let format = TestFormat {
        kbps: Some(663),
        channels: Some(5),
        ..Default::default()
    };

    f.audio.save(&format, Path::new(OUTPUT))?;

    assert_eq!(
        f.ffmpeg.get_received_calls()[0].args,
        strings(&["-y", "-i", INPUT, "-threads", "24", "-b:a", "663k", "-ac", "5", OUTPUT])
    );
    Ok(())
}

#[test]
fn test_invalid_threads_setting_is_a_config_error() {
    let f = fixture(Configuration::new().with("threads", "many"));
    let result = f.audio.build_command(&TestFormat::default(), Path::new(OUTPUT));

    assert!(matches!(result, Err(CoreError::Config(_))));
    assert_eq!(f.ffmpeg.call_count(), 0);
}

#[test]
fn test_repeated_saves_are_identical() -> Result<(), Box<dyn std::error::Error>> {
    let mut f = fixture(Configuration::new());
    f.audio.filters().resample(44100);
    let format = TestFormat {
        codec: Some("libmp3lame".to_string()),
        kbps: Some(320),
        extra: strings(&["-map_metadata", "0"]),
        ..Default::default()
    };

    f.audio.save(&format, Path::new(OUTPUT))?;
    f.audio.save(&format, Path::new(OUTPUT))?;

    let calls = f.ffmpeg.get_received_calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0].args, calls[1].args);
    assert_eq!(f.audio.filter_collection().len(), 1);
    Ok(())
}

#[test]
fn test_filter_fragments_in_registration_order() -> Result<(), Box<dyn std::error::Error>> {
    let mut f = fixture(Configuration::new());
    f.audio
        .filters()
        .clip(Duration::from_secs(30), Some(Duration::from_millis(15_250)))
        .add_metadata([("title", "Song"), ("artist", "Band")])
        .resample(22050);
    f.audio.add_filter(MediaFilter::audio(CodecEchoFilter))?;
    let format = TestFormat {
        codec: Some("flac".to_string()),
        ..Default::default()
    };

    f.audio.save(&format, Path::new(OUTPUT))?;

    assert_eq!(
        f.ffmpeg.get_received_calls()[0].args,
        strings(&[
            "-y",
            "-i",
            INPUT,
            "-threads",
            "2",
            "-acodec",
            "flac",
            "-ss",
            "00:00:30.000",
            "-t",
            "00:00:15.250",
            "-metadata",
            "artist=Band",
            "-metadata",
            "title=Song",
            "-ar",
            "22050",
            "-comment",
            "/media/input.mp3:flac",
            OUTPUT,
        ])
    );
    Ok(())
}

#[test]
fn test_custom_filter_params() -> Result<(), Box<dyn std::error::Error>> {
    let mut f = fixture(Configuration::new());
    f.audio.filters().custom(["-af", "volume=0.5"]);
    f.audio
        .add_filter(MediaFilter::audio(SimpleFilter::new(["-vn"])))?;

    let args = f.audio.build_command(&TestFormat::default(), Path::new(OUTPUT))?;

    assert_eq!(
        args,
        strings(&["-y", "-i", INPUT, "-threads", "2", "-af", "volume=0.5", "-vn", OUTPUT])
    );
    assert_eq!(f.ffmpeg.call_count(), 0);
    Ok(())
}

#[test]
fn test_video_filter_is_rejected() {
    let mut f = fixture(Configuration::new());

    let result = f
        .audio
        .add_filter(MediaFilter::video(CustomVideoFilter::new("scale=320:240")));

    assert!(matches!(result, Err(CoreError::InvalidFilter(_))));
    assert!(f.audio.filter_collection().is_empty());
}

#[test]
fn test_replacing_the_filter_collection() -> Result<(), Box<dyn std::error::Error>> {
    let mut f = fixture(Configuration::new());
    f.audio.filters().resample(8000);

    let mut replacement = FilterCollection::new();
    replacement.add(MediaFilter::audio(SimpleFilter::new(["-vn"])));
    f.audio.set_filter_collection(replacement)?;

    let args = f.audio.build_command(&TestFormat::default(), Path::new(OUTPUT))?;
    assert_eq!(args, strings(&["-y", "-i", INPUT, "-threads", "2", "-vn", OUTPUT]));
    Ok(())
}

#[test]
fn test_replacement_with_video_filter_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut f = fixture(Configuration::new());
    f.audio.filters().resample(8000);

    let mut replacement = FilterCollection::new();
    replacement
        .add(MediaFilter::audio(SimpleFilter::new(["-vn"])))
        .add(MediaFilter::video(CustomVideoFilter::new("scale=1:1")));
    let result = f.audio.set_filter_collection(replacement);

    assert!(matches!(result, Err(CoreError::InvalidFilter(_))));
    assert_eq!(f.audio.filter_collection().len(), 1);
    let args = f.audio.build_command(&TestFormat::default(), Path::new(OUTPUT))?;
    assert_eq!(args, strings(&["-y", "-i", INPUT, "-threads", "2", "-ar", "8000", OUTPUT]));
    Ok(())
}

#[test]
fn test_encoding_failure_is_wrapped() {
    let f = fixture(Configuration::new());
    f.ffmpeg.add_failure(Some(1), "Unknown encoder 'nope'");

    match f.audio.save(&TestFormat::default(), Path::new(OUTPUT)) {
        Err(CoreError::EncodingFailed { source }) => {
            assert_eq!(source.command, "ffmpeg");
            assert_eq!(source.code, Some(1));
            assert_eq!(source.message, "Unknown encoder 'nope'");
        }
        other => panic!("expected EncodingFailed, got {other:?}"),
    }
}

#[test]
fn test_progress_capable_format_forwards_listeners() -> Result<(), Box<dyn std::error::Error>> {
    let f = fixture(Configuration::new());
    f.ffprobe.add_success(HELP);
    f.ffprobe
        .add_success(r#"{"format": {"filename": "/media/input.mp3", "duration": "200.000000"}}"#);
    f.ffmpeg.emit_stderr(&[
        "Input #0, mp3, from '/media/input.mp3':",
        "size=     256kB time=00:00:50.00 bitrate= 128.0kbits/s speed=50x",
        "size=     512kB time=00:01:40.00 bitrate= 128.0kbits/s speed=50x",
    ]);

    let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut format = StandardAudioFormat::new(AudioPreset::Mp3);
    format.on_progress(move |event| sink.lock().unwrap().push(event.clone()));

    f.audio.save(&format, Path::new(OUTPUT))?;

    let calls = f.ffmpeg.get_received_calls();
    assert_eq!(calls[0].listener_count, Some(1));
    assert_eq!(
        calls[0].args,
        strings(&[
            "-y", "-i", INPUT, "-threads", "2", "-acodec", "libmp3lame", "-b:a", "128k", OUTPUT,
        ])
    );

    let percents: Vec<u32> = events.lock().unwrap().iter().map(|e| e.percent).collect();
    assert_eq!(percents, vec![25, 50]);
    Ok(())
}

#[test]
fn test_progress_without_probe_still_attaches_listener() -> Result<(), Box<dyn std::error::Error>> {
    let f = fixture(Configuration::new());
    f.ffprobe.add_failure(Some(1), "ffprobe: not available");
    f.ffmpeg.emit_stderr(&["size=     256kB time=00:00:50.00 bitrate= 128.0kbits/s"]);

    let events: Arc<Mutex<Vec<ProgressEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut format = StandardAudioFormat::new(AudioPreset::Opus);
    format.on_progress(move |event| sink.lock().unwrap().push(event.clone()));

    f.audio.save(&format, Path::new(OUTPUT))?;

    assert_eq!(f.ffmpeg.get_received_calls()[0].listener_count, Some(1));
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].percent, 0);
    Ok(())
}

#[test]
fn test_progress_capable_format_without_listeners() -> Result<(), Box<dyn std::error::Error>> {
    let f = fixture(Configuration::new());

    f.audio.save(&SilentProgressFormat, Path::new(OUTPUT))?;
    f.audio.save(&TestFormat::default(), Path::new(OUTPUT))?;

    let calls = f.ffmpeg.get_received_calls();
    assert_eq!(calls[0].listener_count, Some(0));
    assert_eq!(calls[1].listener_count, None);
    assert_eq!(
        calls[0].args,
        strings(&["-y", "-i", INPUT, "-threads", "2", "-b:a", "96k", OUTPUT])
    );
    Ok(())
}
