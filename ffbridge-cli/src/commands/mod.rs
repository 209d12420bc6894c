//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// `supports`: asks ffprobe which options it understands.
pub mod supports;

/// `probe`: prints ffprobe's format or stream information.
pub mod probe;

/// `convert`: transcodes an audio file with a progress bar.
pub mod convert;

pub use convert::run_convert;
pub use probe::run_probe;
pub use supports::run_supports;

use anyhow::{Result, bail};
use std::path::Path;

/// Fails early, before any binary is looked up, when `path` is missing.
fn ensure_input_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        bail!("Invalid input path '{}': no such file", path.display());
    }
    Ok(())
}
