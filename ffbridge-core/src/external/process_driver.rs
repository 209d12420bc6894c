//! `BinaryDriver` implementation on top of `std::process`.
//!
//! Standard output is collected on a helper thread while the calling thread
//! reads standard error, feeding each line to the listeners. Both pipes are
//! drained before waiting on the child so neither can fill up and stall it.
//! Only the last [`STDERR_TAIL_LINES`] lines of error output are kept for the
//! failure message.

use super::{BinaryDriver, Listeners, find_binary};
use crate::config::Configuration;
use crate::error::{CoreResult, ExecutionFailure};

use std::collections::VecDeque;
use std::io::{self, BufRead, BufReader, Read};
use std::process::{Child, Command, Stdio};
use std::thread;

/// Number of trailing stderr lines reported when a process fails.
pub const STDERR_TAIL_LINES: usize = 50;

/// Runs a binary found on the configured candidate list.
#[derive(Debug, Clone)]
pub struct ProcessDriver {
    name: String,
    binary: String,
    configuration: Configuration,
}

impl ProcessDriver {
    /// Creates a driver for `name`, resolving the binary from the
    /// configuration's `binaries` candidates (or `name` itself).
    pub fn create(name: &str, configuration: Configuration) -> CoreResult<Self> {
        let binary = find_binary(name, &configuration.binaries()?)?;
        log::debug!("{} driver using binary '{}'", name, binary);
        Ok(Self::with_binary(name, binary, configuration))
    }

    /// Creates a driver for an already-resolved binary, without checking it.
    pub fn with_binary(
        name: impl Into<String>,
        binary: impl Into<String>,
        configuration: Configuration,
    ) -> Self {
        Self {
            name: name.into(),
            binary: binary.into(),
            configuration,
        }
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn failure(&self, code: Option<i32>, message: impl Into<String>) -> ExecutionFailure {
        ExecutionFailure::new(self.name.clone(), code, message)
    }
}

impl BinaryDriver for ProcessDriver {
    fn name(&self) -> &str {
        &self.name
    }

    fn configuration(&self) -> &Configuration {
        &self.configuration
    }

    fn command(
        &self,
        args: &[String],
        bypass_errors: bool,
        listeners: Option<Listeners>,
    ) -> Result<String, ExecutionFailure> {
        log::debug!("Running {} {}", self.binary, args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                log::error!("Failed to start {}: {}", self.binary, e);
                self.failure(None, format!("failed to start '{}': {}", self.binary, e))
            })?;

        let stdout = child.stdout.take();
        let stdout_reader = thread::spawn(move || {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout {
                out.read_to_end(&mut buf)?;
            }
            Ok::<_, std::io::Error>(String::from_utf8_lossy(&buf).into_owned())
        });

        let mut listeners = listeners.unwrap_or_default();
        let mut stderr_tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
        if let Some(stderr) = child.stderr.take() {
            if let Err(e) = read_stderr(stderr, &mut listeners, &mut stderr_tail) {
                log::error!("Lost stderr of {}: {}", self.binary, e);
                terminate(&mut child);
                let _ = stdout_reader.join();
                return Err(self.failure(None, format!("failed to read stderr: {e}")));
            }
        }

        let stdout_text = stdout_reader
            .join()
            .map_err(|_| self.failure(None, "stdout reader thread panicked"))?
            .map_err(|e| self.failure(None, e.to_string()))?;

        let status = child
            .wait()
            .map_err(|e| self.failure(None, format!("failed to wait for process: {e}")))?;

        if !status.success() && !bypass_errors {
            log::error!("{} exited with {}", self.name, status);
            let message = Vec::from(stderr_tail).join("\n");
            return Err(self.failure(status.code(), message));
        }

        Ok(stdout_text)
    }
}

/// Feeds every non-empty line of `stderr` to `listeners`, keeping the last
/// [`STDERR_TAIL_LINES`] in `tail`. ffmpeg ends status lines with `\r`.
fn read_stderr<R: Read>(
    stderr: R,
    listeners: &mut Listeners,
    tail: &mut VecDeque<String>,
) -> io::Result<()> {
    for chunk in BufReader::new(stderr).split(b'\r') {
        let chunk = chunk?;
        let chunk = String::from_utf8_lossy(&chunk);
        for line in chunk.lines().filter(|l| !l.trim().is_empty()) {
            for listener in listeners.iter_mut() {
                listener.handle(line);
            }
            if tail.len() == STDERR_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line.to_string());
        }
    }
    Ok(())
}

/// Kills `child` and reaps it.
fn terminate(child: &mut Child) {
    if let Err(e) = child.kill() {
        log::debug!("Kill failed, process probably exited already: {}", e);
    }
    if let Err(e) = child.wait() {
        log::warn!("Failed to reap process {}: {}", child.id(), e);
    }
}
