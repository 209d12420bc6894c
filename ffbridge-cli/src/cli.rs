// ffbridge-cli/src/cli.rs
//
// Defines the command-line argument structures using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

// --- CLI Argument Definition ---

#[derive(Parser, Debug)]
#[command(
    author,
    version, // Reads from Cargo.toml via "cargo" feature in clap
    about = "ffbridge: ffmpeg/ffprobe driver",
    long_about = "Queries ffprobe capabilities, probes media files and converts audio using ffmpeg via ffbridge-core."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// TOML settings file ([ffmpeg], [ffprobe] and [cache] tables)
    #[arg(long, global = true, value_name = "FILE", env = "FFBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reports whether the installed ffprobe supports the given options
    Supports(SupportsArgs),
    /// Prints ffprobe format or stream information as JSON
    Probe(ProbeArgs),
    /// Converts an audio file
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
pub struct SupportsArgs {
    /// Options to look up, e.g. -show_streams
    #[arg(required = true, value_name = "OPTION", allow_hyphen_values = true)]
    pub options: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Media file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the streams instead of the container format
    #[arg(long)]
    pub streams: bool,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Audio file to convert
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Destination file
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Output format (mp3, aac, flac, vorbis, wav, opus). Defaults to the output extension
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Audio codec, must be one the format supports
    #[arg(long, value_name = "CODEC")]
    pub codec: Option<String>,

    /// Audio bitrate in kbit/s
    #[arg(short, long, value_name = "KBPS")]
    pub bitrate: Option<u32>,

    /// Number of output channels
    #[arg(long, value_name = "COUNT")]
    pub channels: Option<u32>,

    /// Output sample rate in Hz
    #[arg(long, value_name = "HZ")]
    pub sample_rate: Option<u32>,

    /// Metadata tag to write, may be repeated
    #[arg(long = "metadata", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub metadata: Vec<(String, String)>,

    /// Start of the section to keep, in seconds
    #[arg(long, value_name = "SECONDS")]
    pub clip_start: Option<f64>,

    /// Length of the section to keep, in seconds (requires --clip-start)
    #[arg(long, value_name = "SECONDS", requires = "clip_start")]
    pub clip_duration: Option<f64>,

    /// Extra argument passed to ffmpeg verbatim, may be repeated
    #[arg(long = "extra", value_name = "ARG", allow_hyphen_values = true)]
    pub extra: Vec<String>,

    /// Number of ffmpeg threads (overrides settings)
    #[arg(long, value_name = "N")]
    pub threads: Option<u32>,
}

/// Parses a `KEY=VALUE` pair.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}
