// ffbridge-core/src/external/mocks.rs

// --- Mocking Infrastructure (for testing) ---

// This module is only compiled when the "test-mocks" feature is enabled.

use super::{BinaryDriver, Listeners};
use crate::config::Configuration;
use crate::error::ExecutionFailure;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A call received by [`MockDriver`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedCall {
    pub args: Vec<String>,
    pub bypass_errors: bool,
    /// `None` when the caller passed no listeners, otherwise how many it passed.
    pub listener_count: Option<usize>,
}

/// Mock implementation of BinaryDriver.
///
/// Responses are consumed in the order they were queued; once the queue is
/// empty every call succeeds with empty output. Lines queued with
/// [`MockDriver::emit_stderr`] are fed to the listeners of every call.
#[derive(Debug, Default)]
pub struct MockDriver {
    name: String,
    configuration: Configuration,
    responses: Mutex<VecDeque<Result<String, ExecutionFailure>>>,
    stderr_lines: Mutex<Vec<String>>,
    received_calls: Mutex<Vec<ReceivedCall>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MockDriver {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = configuration;
        self
    }

    /// Queues a successful response.
    pub fn add_success(&self, output: &str) {
        lock(&self.responses).push_back(Ok(output.to_string()));
    }

    /// Queues a failing response.
    pub fn add_failure(&self, code: Option<i32>, message: &str) {
        let failure = ExecutionFailure::new(self.name.clone(), code, message);
        lock(&self.responses).push_back(Err(failure));
    }

    /// Sets the error-output lines replayed to listeners on each call.
    pub fn emit_stderr(&self, lines: &[&str]) {
        *lock(&self.stderr_lines) = lines.iter().map(|l| l.to_string()).collect();
    }

    pub fn get_received_calls(&self) -> Vec<ReceivedCall> {
        lock(&self.received_calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.received_calls).len()
    }
}

impl BinaryDriver for MockDriver {
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
        lock(&self.received_calls).push(ReceivedCall {
            args: args.to_vec(),
            bypass_errors,
            listener_count: listeners.as_ref().map(Vec::len),
        });
        log::info!("MockDriver({}): received {:?}", self.name, args);

        if let Some(mut listeners) = listeners {
            let lines = lock(&self.stderr_lines).clone();
            for line in &lines {
                for listener in listeners.iter_mut() {
                    listener.handle(line);
                }
            }
        }

        match lock(&self.responses).pop_front() {
            Some(Err(failure)) if bypass_errors => {
                log::warn!("MockDriver({}): bypassing {}", self.name, failure);
                Ok(String::new())
            }
            Some(response) => response,
            None => Ok(String::new()),
        }
    }
}
