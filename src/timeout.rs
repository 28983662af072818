//! Timeout enforcement for operation waits
//!
//! Two bounds apply to a wait:
//! - `wait_seconds`: wall-clock budget for the whole wait
//! - `request_seconds`: budget for one status query (enforced by the transport)
//!
//! Cancellation is deadline-based only. The enforcer never interrupts a
//! request in flight; the wait driver checks it between polls.

use std::time::{Duration, Instant};

/// Timeout configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutConfig {
    /// Maximum wall-clock time per wait (default: 1200 = 20 min)
    pub wait_seconds: u64,

    /// Per-request HTTP timeout (default: 60)
    pub request_seconds: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            wait_seconds: 1200,
            request_seconds: 60,
        }
    }
}

impl TimeoutConfig {
    /// Validate bounds
    pub fn validate(&self) -> Result<(), TimeoutValidationError> {
        if self.wait_seconds == 0 || self.wait_seconds > 86_400 {
            return Err(TimeoutValidationError::WaitOutOfBounds {
                value: self.wait_seconds,
            });
        }

        if self.request_seconds == 0 || self.request_seconds > 600 {
            return Err(TimeoutValidationError::RequestOutOfBounds {
                value: self.request_seconds,
            });
        }

        Ok(())
    }

    /// Create from optional overrides, falling back to defaults
    pub fn from_config(wait: Option<u64>, request: Option<u64>) -> Self {
        let defaults = Self::default();
        Self {
            wait_seconds: wait.unwrap_or(defaults.wait_seconds),
            request_seconds: request.unwrap_or(defaults.request_seconds),
        }
    }

    pub fn wait(&self) -> Duration {
        Duration::from_secs(self.wait_seconds)
    }
}

/// Timeout validation errors
#[derive(Debug, thiserror::Error)]
pub enum TimeoutValidationError {
    #[error("wait timeout must be in (0, 86400] seconds, got {value}")]
    WaitOutOfBounds { value: u64 },

    #[error("request timeout must be in (0, 600] seconds, got {value}")]
    RequestOutOfBounds { value: u64 },
}

/// Timeout check result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutStatus {
    Ok,
    Expired,
}

impl TimeoutStatus {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TimeoutStatus::Expired)
    }
}

/// Deadline tracker for a single wait
#[derive(Debug)]
pub struct TimeoutEnforcer {
    timeout: Duration,
    start_time: Instant,
}

impl TimeoutEnforcer {
    /// Start the clock now
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            start_time: Instant::now(),
        }
    }

    pub fn check(&self) -> TimeoutStatus {
        if self.start_time.elapsed() >= self.timeout {
            TimeoutStatus::Expired
        } else {
            TimeoutStatus::Ok
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Time left before the deadline; zero once expired
    pub fn remaining(&self) -> Duration {
        self.timeout.saturating_sub(self.elapsed())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}
