// ffbridge-cli/src/lib.rs
//
// Library portion of the ffbridge CLI application.
// Contains argument definitions and command logic.

pub mod cli;
pub mod commands;
pub mod logging;

// Re-export items needed by the binary or integration tests
pub use cli::{Cli, Commands, ConvertArgs, ProbeArgs, SupportsArgs};
pub use commands::{run_convert, run_probe, run_supports};
