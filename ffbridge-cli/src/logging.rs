// ============================================================================
// ffbridge-cli/src/logging.rs
// ============================================================================
//
// LOGGING: env_logger Setup for the CLI
//
// The CLI logs through the standard `log` macros with `env_logger` as the
// backend. RUST_LOG takes precedence over the level chosen here:
// - RUST_LOG=info (default): Normal operation logs
// - RUST_LOG=debug or --verbose: ffmpeg arguments, cache hits, binary lookup
// - RUST_LOG=trace: Very verbose debugging information

use env_logger::Env;
use log::{Level, LevelFilter};
use owo_colors::OwoColorize;
use std::io::Write;

/// Returns the level used when RUST_LOG is not set.
pub fn default_level(verbose: bool) -> LevelFilter {
    if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Initialize the logger for ffbridge.
pub fn init(verbose: bool) {
    let level = default_level(verbose);

    env_logger::Builder::from_env(Env::default().default_filter_or(level.to_string()))
        .format(|buf, record| {
            let level = match record.level() {
                Level::Error => "ERROR".bright_red().to_string(),
                Level::Warn => "WARN ".yellow().to_string(),
                Level::Info => "INFO ".green().to_string(),
                Level::Debug => "DEBUG".blue().to_string(),
                Level::Trace => "TRACE".magenta().to_string(),
            };
            writeln!(buf, "{} {}", level, record.args())
        })
        .init();

    log::debug!("Logger initialized with level: {}", level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level() {
        assert_eq!(default_level(true), LevelFilter::Debug);
        assert_eq!(default_level(false), LevelFilter::Info);
    }
}
