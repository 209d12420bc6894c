// ============================================================================
// ffbridge-core/src/external/mod.rs
// ============================================================================
//
// EXTERNAL TOOLS: Interactions with the ffmpeg and ffprobe Binaries
//
// This module encapsulates every invocation of an external binary. Consumers
// depend on the `BinaryDriver` trait, so tests substitute the mocks in
// `mocks` and production code uses `ProcessDriver`.
//
// KEY COMPONENTS:
// - BinaryDriver: runs a binary with an argument vector and optional listeners
// - Listener: receives the binary's error output line by line
// - ProcessDriver: std::process implementation
// - Dependency checking functions

// ---- Internal crate imports ----
use crate::config::Configuration;
use crate::error::{CoreError, CoreResult, ExecutionFailure};

// ---- Standard library imports ----
use std::io;
use std::process::{Command, Stdio};

// ============================================================================
// SUBMODULES
// ============================================================================

/// Contains the std::process backed driver
pub mod process_driver;

/// Test doubles for drivers (requires the `test-mocks` feature)
#[cfg(feature = "test-mocks")]
pub mod mocks;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use process_driver::ProcessDriver;

// ============================================================================
// DRIVER ABSTRACTION
// ============================================================================

/// Receives output from a running binary.
///
/// ffmpeg reports progress on stderr, terminating status lines with `\r`.
/// Drivers split that stream on both `\r` and `\n` and call `handle` once per
/// non-empty line.
pub trait Listener: Send {
    fn handle(&mut self, line: &str);
}

/// Listeners handed to a single invocation.
pub type Listeners = Vec<Box<dyn Listener>>;

/// Something that can run an external binary.
pub trait BinaryDriver: Send + Sync {
    /// Name of the binary, used in logs and errors.
    fn name(&self) -> &str;

    /// Configuration the driver was created with.
    fn configuration(&self) -> &Configuration;

    /// Runs the binary with `args` and returns its standard output.
    ///
    /// A non-zero exit is an `ExecutionFailure` unless `bypass_errors` is set.
    /// `listeners`, when given, receive each line of error output as it arrives.
    fn command(
        &self,
        args: &[String],
        bypass_errors: bool,
        listeners: Option<Listeners>,
    ) -> Result<String, ExecutionFailure>;
}

// ============================================================================
// DEPENDENCY CHECKING
// ============================================================================

/// Checks if a required external command is available and executable.
///
/// Runs `cmd_name -version`, discarding its output. Only the ability to start
/// the process matters; the exit status is not inspected.
///
/// # Returns
///
/// * `Ok(())` - If the command could be started
/// * `Err(CoreError::DependencyNotFound)` - If the command is not found
/// * `Err(CoreError::Io)` - If the command exists but fails to start
pub fn check_dependency(cmd_name: &str) -> CoreResult<()> {
    let result = Command::new(cmd_name)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match result {
        Ok(_) => {
            log::debug!("Found dependency: {}", cmd_name);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Dependency '{}' not found.", cmd_name);
            Err(CoreError::DependencyNotFound(cmd_name.to_string()))
        }
        Err(e) => {
            log::warn!("Failed to start dependency check command '{}': {}", cmd_name, e);
            Err(CoreError::Io(e))
        }
    }
}

/// Returns the first candidate that passes [`check_dependency`].
///
/// # Returns
///
/// * `Ok(String)` - The usable binary
/// * `Err(CoreError::DependencyNotFound)` - If no candidate can be started
pub fn find_binary(name: &str, candidates: &[String]) -> CoreResult<String> {
    let defaults = [name.to_string()];
    let candidates = if candidates.is_empty() {
        &defaults[..]
    } else {
        candidates
    };

    for candidate in candidates {
        match check_dependency(candidate) {
            Ok(()) => return Ok(candidate.clone()),
            Err(e) => log::debug!("Skipping {} candidate '{}': {}", name, candidate, e),
        }
    }

    log::warn!("No usable {} binary among {:?}", name, candidates);
    Err(CoreError::DependencyNotFound(format!(
        "{} (tried: {})",
        name,
        candidates.join(", ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_dependency_missing_binary() {
        let result = check_dependency("ffbridge-surely-not-a-real-binary");
        assert!(matches!(result, Err(CoreError::DependencyNotFound(_))));
    }

    #[test]
    fn test_find_binary_reports_all_candidates() {
        let candidates = vec![
            "/nonexistent/ffprobe".to_string(),
            "ffbridge-missing-ffprobe".to_string(),
        ];
        match find_binary("ffprobe", &candidates) {
            Err(CoreError::DependencyNotFound(msg)) => {
                assert!(msg.contains("/nonexistent/ffprobe"));
                assert!(msg.contains("ffbridge-missing-ffprobe"));
            }
            other => panic!("expected DependencyNotFound, got {other:?}"),
        }
    }
}
