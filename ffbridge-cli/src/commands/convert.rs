// ffbridge-cli/src/commands/convert.rs
//
// Implementation of the `convert` command: builds a StandardAudioFormat and
// the requested filters from the arguments, then runs the transcode with a
// progress bar on stderr.

use super::ensure_input_exists;
use crate::cli::ConvertArgs;

use anyhow::{Context, Result, anyhow, bail};
use ffbridge_core::config::THREADS_KEY;
use ffbridge_core::format::{AudioPreset, StandardAudioFormat};
use ffbridge_core::{FfMpeg, Settings};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use std::path::Path;
use std::time::{Duration, Instant};

/// Converts `args.input` into `args.output`.
pub fn run_convert(mut settings: Settings, args: &ConvertArgs) -> Result<()> {
    ensure_input_exists(&args.input)?;
    let preset = resolve_preset(args.format.as_deref(), &args.output)?;
    let mut format = build_format(preset, args)?;

    if let Some(threads) = args.threads {
        settings.ffmpeg.set(THREADS_KEY, threads);
    }

    let ffmpeg = FfMpeg::create(&settings).context("Failed to set up ffmpeg")?;
    let mut audio = ffmpeg
        .open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?;

    if let Some(rate) = args.sample_rate {
        audio.filters().resample(rate);
    }
    if !args.metadata.is_empty() {
        audio.filters().add_metadata(args.metadata.iter().cloned());
    }
    if let Some(start) = args.clip_start {
        let duration = args.clip_duration.map(seconds).transpose()?;
        audio.filters().clip(seconds(start)?, duration);
    }

    let bar = progress_bar();
    let reporter = bar.clone();
    format.on_progress(move |event| {
        reporter.set_position(u64::from(event.percent));
        if let Some(remaining) = event.remaining {
            reporter.set_message(format!("{}s left", remaining.as_secs()));
        }
    });

    log::info!(
        "Converting {} to {} ({})",
        args.input.display(),
        args.output.display(),
        preset
    );
    let started = Instant::now();
    let result = audio.save(&format, &args.output);
    bar.finish_and_clear();
    result.with_context(|| format!("Failed to convert {}", args.input.display()))?;

    println!(
        "{} {} ({:.1}s)",
        "Wrote".green().bold(),
        args.output.display(),
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

/// Picks the preset named by `--format`, or the one matching the output
/// file extension.
fn resolve_preset(format: Option<&str>, output: &Path) -> Result<AudioPreset> {
    if let Some(name) = format {
        return Ok(name.parse::<AudioPreset>()?);
    }

    let extension = output
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| {
            anyhow!(
                "Cannot infer the format of '{}', pass --format",
                output.display()
            )
        })?;

    let preset = match extension.as_str() {
        "mp3" => AudioPreset::Mp3,
        "aac" | "m4a" => AudioPreset::Aac,
        "flac" => AudioPreset::Flac,
        "ogg" | "oga" => AudioPreset::Vorbis,
        "wav" => AudioPreset::Wav,
        "opus" => AudioPreset::Opus,
        other => bail!("Unknown output extension '.{other}', pass --format"),
    };
    Ok(preset)
}

fn build_format(preset: AudioPreset, args: &ConvertArgs) -> Result<StandardAudioFormat> {
    let mut format = StandardAudioFormat::new(preset);
    if let Some(codec) = &args.codec {
        format.set_audio_codec(codec)?;
    }
    if let Some(kbps) = args.bitrate {
        format.set_audio_kilo_bitrate(kbps)?;
    }
    if let Some(channels) = args.channels {
        format.set_audio_channels(channels)?;
    }
    if !args.extra.is_empty() {
        format.set_extra_params(args.extra.clone());
    }
    Ok(format)
}

fn seconds(value: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(value).map_err(|_| anyhow!("Invalid number of seconds: {value}"))
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(100);
    match ProgressStyle::default_bar()
        .template("Encoding: {percent:>3}% [{bar:30}] {elapsed_precise} {msg}")
    {
        Ok(style) => bar.set_style(style.progress_chars("##.")),
        Err(e) => log::debug!("Falling back to the default progress style: {}", e),
    }

    if !std::io::stderr().is_terminal() {
        bar.set_draw_target(ProgressDrawTarget::hidden());
    }
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_from_extension() {
        assert_eq!(resolve_preset(None, Path::new("a/b.MP3")).unwrap(), AudioPreset::Mp3);
        assert_eq!(resolve_preset(None, Path::new("b.m4a")).unwrap(), AudioPreset::Aac);
        assert_eq!(resolve_preset(None, Path::new("b.ogg")).unwrap(), AudioPreset::Vorbis);
        assert!(resolve_preset(None, Path::new("b.mkv")).is_err());
        assert!(resolve_preset(None, Path::new("noext")).is_err());
    }

    #[test]
    fn test_explicit_format_wins() {
        assert_eq!(
            resolve_preset(Some("flac"), Path::new("out.mp3")).unwrap(),
            AudioPreset::Flac
        );
        assert!(resolve_preset(Some("mp4"), Path::new("out.mp3")).is_err());
    }

    #[test]
    fn test_seconds() {
        assert_eq!(seconds(1.5).unwrap(), Duration::from_millis(1500));
        assert!(seconds(-1.0).is_err());
    }
}
