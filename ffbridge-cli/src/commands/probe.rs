// ffbridge-cli/src/commands/probe.rs
//
// Implementation of the `probe` command.

use super::ensure_input_exists;
use crate::cli::ProbeArgs;

use anyhow::{Context, Result};
use ffbridge_core::{FfProbe, Settings};
use serde_json::Value;

/// Prints the container format of a file, or its streams, as JSON.
pub fn run_probe(settings: &Settings, args: &ProbeArgs) -> Result<()> {
    ensure_input_exists(&args.file)?;
    let probe = FfProbe::create(settings).context("Failed to set up ffprobe")?;

    let output = if args.streams {
        let streams = probe
            .streams(&args.file)
            .with_context(|| format!("Failed to read streams of {}", args.file.display()))?;
        Value::Array(
            streams
                .iter()
                .map(|stream| Value::Object(stream.properties().clone()))
                .collect(),
        )
    } else {
        let format = probe
            .format(&args.file)
            .with_context(|| format!("Failed to read format of {}", args.file.display()))?;
        Value::Object(format.properties().clone())
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
