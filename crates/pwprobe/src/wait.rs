//! Wait mechanisms: bounded polling until the page settles.
//!
//! Every read with an expectation attached is polled. A [`Poller`] sleeps
//! between attempts and, once the budget is spent, turns a still-missing
//! element into [`ProbeError::Timeout`] while letting content failures
//! (oracle or length mismatch) through with the last observed value.

use crate::result::{FailureKind, ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Default timeout for wait operations (4 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 4000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Retry budget for one expectation.
///
/// ```ignore
/// let mut poller = Poller::new(options, "generated value");
/// loop {
///     match read_and_check(page).await {
///         Ok(value) => return Ok(value),
///         Err(e) => poller.retry(e).await?,
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Poller {
    options: WaitOptions,
    waited_for: String,
    started: Instant,
    attempts: u32,
}

impl Poller {
    /// Start a new budget now
    #[must_use]
    pub fn new(options: WaitOptions, waited_for: impl Into<String>) -> Self {
        Self {
            options,
            waited_for: waited_for.into(),
            started: Instant::now(),
            attempts: 0,
        }
    }

    /// Failed attempts so far
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Time since the budget started
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Record a failed attempt.
    ///
    /// Returns `Ok(())` after sleeping one poll interval if another attempt
    /// is allowed, otherwise the error to surface.
    pub async fn retry(&mut self, error: ProbeError) -> ProbeResult<()> {
        self.attempts += 1;
        if !error.is_retryable() {
            return Err(error);
        }
        if self.elapsed() >= self.options.timeout() {
            return Err(self.expire(error));
        }
        tracing::trace!(
            waited_for = %self.waited_for,
            attempt = self.attempts,
            error = %error,
            "retrying"
        );
        tokio::time::sleep(self.options.poll_interval()).await;
        Ok(())
    }

    fn expire(&self, last: ProbeError) -> ProbeError {
        tracing::debug!(
            waited_for = %self.waited_for,
            attempts = self.attempts,
            last = %last,
            "wait budget exhausted"
        );
        if last.kind() == FailureKind::Timeout {
            ProbeError::Timeout {
                waited_for: self.waited_for.clone(),
                ms: self.options.timeout_ms,
            }
        } else {
            last
        }
    }
}
