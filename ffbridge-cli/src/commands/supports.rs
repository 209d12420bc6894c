// ffbridge-cli/src/commands/supports.rs
//
// Implementation of the `supports` command.

use crate::cli::SupportsArgs;

use anyhow::{Context, Result};
use ffbridge_core::{FfProbe, Settings};
use owo_colors::OwoColorize;

/// Prints one line per option with whether ffprobe supports it.
pub fn run_supports(settings: &Settings, args: &SupportsArgs) -> Result<()> {
    let probe = FfProbe::create(settings).context("Failed to set up ffprobe")?;
    let tester = probe.options_tester();

    for option in &args.options {
        let supported = tester
            .has(option)
            .with_context(|| format!("Failed to check support for {option}"))?;
        let answer = if supported {
            "yes".green().to_string()
        } else {
            "no".red().to_string()
        };
        println!("{option:<24} {answer}");
    }

    Ok(())
}
