//! Progress reporting for transcodes.
//!
//! ffmpeg prints status lines such as
//! `size=  512kB time=00:00:32.65 bitrate= 128.4kbits/s speed=41.2x` on its
//! error output. [`AudioProgressListener`] turns those into [`ProgressEvent`]s
//! relative to the input duration and hands them to the registered callbacks.

use crate::external::Listener;

use regex::Regex;
use std::sync::{Arc, LazyLock};
use std::time::{Duration, Instant};

static TIME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"time=\s*(\d+:\d{2}:\d{2}(?:\.\d+)?)").expect("static time pattern compiles")
});

static BITRATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"bitrate=\s*([\d.]+)kbits/s").expect("static bitrate pattern compiles")
});

/// A progress update for one transcode.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressEvent {
    /// Completion in whole percent, 0 to 100
    pub percent: u32,
    /// Position reached in the input, in seconds
    pub position_secs: f64,
    /// Estimated time left, once it can be estimated
    pub remaining: Option<Duration>,
    /// Output bitrate reported on the same line
    pub bitrate_kbps: Option<f64>,
}

/// Callback receiving progress events.
pub type ProgressCallback = Arc<dyn Fn(&ProgressEvent) + Send + Sync>;

/// Parses ffmpeg's `HH:MM:SS.ms` time format to seconds.
#[must_use]
pub fn parse_ffmpeg_time(time: &str) -> Option<f64> {
    let parts: Vec<&str> = time.split(':').collect();
    if parts.len() == 3 {
        let hours = parts[0].parse::<f64>().ok()?;
        let minutes = parts[1].parse::<f64>().ok()?;
        let seconds = parts[2].parse::<f64>().ok()?;
        Some(hours * 3600.0 + minutes * 60.0 + seconds)
    } else {
        None
    }
}

/// Listener converting ffmpeg status lines into [`ProgressEvent`]s.
///
/// Callbacks fire only when the whole-percent value increases, so a fast
/// encode that prints hundreds of status lines produces at most 101 events.
pub struct AudioProgressListener {
    duration: Option<f64>,
    callbacks: Vec<ProgressCallback>,
    started: Instant,
    last_percent: Option<u32>,
}

impl AudioProgressListener {
    /// `duration` is the input duration in seconds, when known. Without it
    /// percent stays at 0 and no remaining time is estimated.
    pub fn new(duration: Option<f64>, callbacks: Vec<ProgressCallback>) -> Self {
        Self {
            duration: duration.filter(|d| *d > 0.0),
            callbacks,
            started: Instant::now(),
            last_percent: None,
        }
    }

    fn parse(&self, line: &str) -> Option<ProgressEvent> {
        let time = TIME_PATTERN.captures(line)?.get(1)?.as_str();
        let position_secs = parse_ffmpeg_time(time)?;

        let bitrate_kbps = BITRATE_PATTERN
            .captures(line)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse().ok());

        let (percent, remaining) = match self.duration {
            Some(total) => {
                let fraction = (position_secs / total).clamp(0.0, 1.0);
                let elapsed = self.started.elapsed().as_secs_f64();
                let remaining = (fraction > 0.0)
                    .then(|| Duration::from_secs_f64(elapsed / fraction * (1.0 - fraction)));
                ((fraction * 100.0).floor() as u32, remaining)
            }
            None => (0, None),
        };

        Some(ProgressEvent {
            percent,
            position_secs,
            remaining,
            bitrate_kbps,
        })
    }
}

impl Listener for AudioProgressListener {
    fn handle(&mut self, line: &str) {
        let Some(event) = self.parse(line) else {
            return;
        };

        if self.last_percent.is_some_and(|last| event.percent <= last) {
            return;
        }
        self.last_percent = Some(event.percent);

        log::debug!("Transcode progress: {}%", event.percent);
        for callback in &self.callbacks {
            callback(&event);
        }
    }
}
