//! Wait Mechanisms
//!
//! Bounded polling used by every element lookup.
//!
//! A wait checks its condition at least once, then at a fixed interval until
//! the condition yields a value or the timeout elapses. A timeout is reported
//! once and never retried.

use crate::result::{SondeoError, SondeoResult};
use std::time::{Duration, Instant};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for strict lookups (10 seconds)
pub const DEFAULT_FIND_TIMEOUT_MS: u64 = 10_000;

/// Default timeout for probe lookups (5 seconds)
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;

/// Default polling interval (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout for strict lookups in milliseconds
    pub timeout_ms: u64,
    /// Timeout for probe lookups in milliseconds
    pub probe_timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_FIND_TIMEOUT_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
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

    /// Set strict timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set probe timeout in milliseconds
    #[must_use]
    pub const fn with_probe_timeout(mut self, timeout_ms: u64) -> Self {
        self.probe_timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get strict timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get probe timeout as Duration
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// WAITER
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Waited<T> {
    /// Value the condition produced
    pub value: T,
    /// Time spent waiting
    pub elapsed: Duration,
    /// Number of times the condition was checked
    pub attempts: u32,
}

/// Polls a condition at a fixed interval until it yields or times out
#[derive(Debug, Clone, Copy)]
pub struct Waiter {
    timeout: Duration,
    poll_interval: Duration,
}

impl Waiter {
    /// Create a waiter with an explicit timeout and interval
    #[must_use]
    pub const fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Poll `check` until it returns `Ok(Some(_))`.
    ///
    /// `Ok(None)` means "not yet"; an `Err` aborts the wait and is returned
    /// unchanged. Fails with [`SondeoError::Timeout`] once the timeout elapses.
    pub fn until<T, F>(&self, mut check: F) -> SondeoResult<Waited<T>>
    where
        F: FnMut() -> SondeoResult<Option<T>>,
    {
        let start = Instant::now();
        let mut attempts = 0;

        loop {
            attempts += 1;
            if let Some(value) = check()? {
                return Ok(Waited {
                    value,
                    elapsed: start.elapsed(),
                    attempts,
                });
            }

            let elapsed = start.elapsed();
            if elapsed >= self.timeout {
                break;
            }
            std::thread::sleep(self.poll_interval.min(self.timeout - elapsed));
        }

        Err(SondeoError::Timeout {
            ms: self.timeout.as_millis() as u64,
        })
    }
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Wait for a predicate to become true
pub fn wait_until<F>(mut predicate: F, options: &WaitOptions) -> SondeoResult<()>
where
    F: FnMut() -> bool,
{
    Waiter::new(options.timeout(), options.poll_interval())
        .until(|| Ok(predicate().then_some(())))?;
    Ok(())
}

/// Sleep for a fixed duration (discouraged - use wait conditions instead)
pub fn pause(duration_ms: u64) {
    if duration_ms > 0 {
        std::thread::sleep(Duration::from_millis(duration_ms));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::cell::Cell;

    mod wait_options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let options = WaitOptions::default();
            assert_eq!(options.timeout_ms, DEFAULT_FIND_TIMEOUT_MS);
            assert_eq!(options.probe_timeout_ms, DEFAULT_PROBE_TIMEOUT_MS);
            assert_eq!(options.poll_interval_ms, DEFAULT_POLL_INTERVAL_MS);
        }

        #[test]
        fn test_chained() {
            let options = WaitOptions::new()
                .with_timeout(300)
                .with_probe_timeout(100)
                .with_poll_interval(5);
            assert_eq!(options.timeout(), Duration::from_millis(300));
            assert_eq!(options.probe_timeout(), Duration::from_millis(100));
            assert_eq!(options.poll_interval(), Duration::from_millis(5));
        }
    }

    mod waiter_tests {
        use super::*;

        #[test]
        fn test_immediate_success() {
            let waiter = Waiter::new(Duration::from_millis(100), Duration::from_millis(10));
            let waited = waiter.until(|| Ok(Some(7))).unwrap();
            assert_eq!(waited.value, 7);
            assert_eq!(waited.attempts, 1);
        }

        #[test]
        fn test_zero_timeout_still_checks_once() {
            let waiter = Waiter::new(Duration::ZERO, Duration::from_millis(10));
            assert_eq!(waiter.until(|| Ok(Some("x"))).unwrap().value, "x");
        }

        #[test]
        fn test_becomes_ready_after_polls() {
            let calls = Cell::new(0);
            let waiter = Waiter::new(Duration::from_millis(500), Duration::from_millis(1));
            let waited = waiter
                .until(|| {
                    calls.set(calls.get() + 1);
                    Ok((calls.get() >= 3).then_some(calls.get()))
                })
                .unwrap();
            assert_eq!(waited.value, 3);
            assert_eq!(waited.attempts, 3);
        }

        #[test]
        fn test_timeout() {
            let waiter = Waiter::new(Duration::from_millis(30), Duration::from_millis(5));
            match waiter.until(|| Ok(None::<()>)) {
                Err(SondeoError::Timeout { ms }) => assert_eq!(ms, 30),
                other => panic!("Expected Timeout error, got {other:?}"),
            }
        }

        #[test]
        fn test_error_aborts_immediately() {
            let calls = Cell::new(0);
            let waiter = Waiter::new(Duration::from_secs(5), Duration::from_millis(1));
            let result = waiter.until(|| -> SondeoResult<Option<()>> {
                calls.set(calls.get() + 1);
                Err(SondeoError::session("boom"))
            });
            assert!(matches!(result, Err(SondeoError::Session { .. })));
            assert_eq!(calls.get(), 1);
        }
    }

    mod convenience_tests {
        use super::*;

        #[test]
        fn test_wait_until_success() {
            let options = WaitOptions::new().with_timeout(100);
            assert!(wait_until(|| true, &options).is_ok());
        }

        #[test]
        fn test_wait_until_timeout() {
            let options = WaitOptions::new().with_timeout(20).with_poll_interval(5);
            assert!(wait_until(|| false, &options).is_err());
        }

        #[test]
        fn test_pause_zero_returns() {
            pause(0);
        }
    }
}
