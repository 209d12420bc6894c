//! Error types for the ffbridge-core library.
//!
//! `ExecutionFailure` describes a failed invocation of an external binary and
//! is what every `BinaryDriver` returns. `CoreError` is the library-level error;
//! each variant that stems from a process invocation keeps the failure as its
//! source so callers can walk the chain.

use thiserror::Error;

/// A failed invocation of an external binary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{command} failed{}: {message}", describe_exit_code(.code))]
pub struct ExecutionFailure {
    /// Name of the binary that was invoked (e.g. "ffprobe")
    pub command: String,
    /// Exit code, if the process ran to completion
    pub code: Option<i32>,
    /// Captured error output, or the spawn error message
    pub message: String,
}

impl ExecutionFailure {
    pub fn new(command: impl Into<String>, code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            code,
            message: message.into(),
        }
    }
}

fn describe_exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" with exit code {code}"),
        None => String::new(),
    }
}

/// Custom error types for ffbridge
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(
        "ffprobe does not support the `-help` option (missing or too old), please upgrade: {source}"
    )]
    ProbeUnavailable {
        code: Option<i32>,
        #[source]
        source: ExecutionFailure,
    },

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Encoding failed: {source}")]
    EncodingFailed {
        #[source]
        source: ExecutionFailure,
    },

    #[error("Unable to probe {path}: {source}")]
    ProbeFailed {
        path: String,
        #[source]
        source: ExecutionFailure,
    },

    #[error("Failed to parse ffprobe output: {0}")]
    ProbeOutput(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Required dependency not found: {0}")]
    DependencyNotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Cache error: {0}")]
    Cache(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for ffbridge operations
pub type CoreResult<T> = std::result::Result<T, CoreError>;
