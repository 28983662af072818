//! Wait driver: polls a [`Pollable`] until it reaches a target state.

use std::thread;
use std::time::Duration;

use log::{debug, info};
use lro_protocol::OperationError;
use serde_json::Value;

use super::common::CommonOperationWaiter;
use crate::config::Config;
use crate::error::{WaitError, WaitResult};
use crate::timeout::TimeoutEnforcer;

/// First delay of the backoff used when no poll interval is configured
const INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Ceiling of that backoff
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// An operation whose status can be queried.
///
/// Implementors supply the status query for their resource family and
/// expose the shared [`CommonOperationWaiter`] that records results.
pub trait Pollable {
    /// Perform exactly one status query and return the decoded payload
    fn query_op(&self) -> WaitResult<Value>;

    fn common(&self) -> &CommonOperationWaiter;

    fn common_mut(&mut self) -> &mut CommonOperationWaiter;

    /// Whether an operation-level error should be polled through
    fn is_retryable(&self, _error: &OperationError) -> bool {
        false
    }

    fn state(&self) -> &'static str {
        self.common().state()
    }

    fn pending_states(&self) -> &'static [&'static str] {
        self.common().pending_states()
    }

    fn target_states(&self) -> &'static [&'static str] {
        self.common().target_states()
    }
}

/// Bounds and cadence of one wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    pub timeout: Duration,
    /// Fixed delay between queries; zero selects exponential backoff
    pub poll_interval: Duration,
    /// Floor of the exponential backoff
    pub min_timeout: Duration,
    /// Consecutive rounds without a usable status tolerated
    pub not_found_checks: u32,
}

impl WaitOptions {
    pub fn from_config(config: &Config, timeout: Duration) -> Self {
        Self {
            timeout,
            poll_interval: config.poll_interval,
            min_timeout: config.min_timeout,
            not_found_checks: config.not_found_checks,
        }
    }

    /// Delay before the query following `attempt` (0-based)
    fn delay(&self, attempt: u32) -> Duration {
        if !self.poll_interval.is_zero() {
            return self.poll_interval;
        }
        let base = INITIAL_BACKOFF.as_millis() as u64;
        let delay = Duration::from_millis(base.saturating_mul(2u64.saturating_pow(attempt)));
        delay.max(self.min_timeout).min(MAX_BACKOFF)
    }
}

/// True when the waiter's current snapshot is already in a target state
pub fn operation_done<W: Pollable + ?Sized>(waiter: &W) -> bool {
    waiter.target_states().contains(&waiter.state())
}

/// Outcome of one refresh round
enum Refresh {
    /// No usable status this round (404 or a retryable operation error)
    Missing,
    State(&'static str),
}

fn refresh<W: Pollable>(waiter: &mut W, activity: &str) -> WaitResult<Refresh> {
    let op = match waiter.query_op() {
        Ok(op) => op,
        Err(WaitError::Transport(e)) if e.status_code() == Some(404) => {
            debug!(
                "Dismissed retryable error on GET operation {:?}: {}",
                waiter.common().op_name(),
                e
            );
            return Ok(Refresh::Missing);
        }
        Err(e) => {
            return Err(WaitError::Query {
                activity: activity.to_string(),
                source: Box::new(e),
            })
        }
    };

    waiter.common_mut().set_op(&op)?;

    if let Some(error) = waiter.common().error() {
        if waiter.is_retryable(error) {
            debug!("Retrying operation GET based on retryable err: {}", error);
            return Ok(Refresh::Missing);
        }
        return Err(WaitError::Operation(error.clone()));
    }

    let state = waiter.state();
    debug!(
        "Got {} while polling for operation {}'s status",
        state,
        waiter.common().op_name()
    );
    Ok(Refresh::State(state))
}

/// Poll `waiter` until it reaches a target state, fails, or times out.
///
/// Blocks the calling thread. A snapshot that is already terminal returns
/// without any query. Once terminal, an operation-level error in the final
/// snapshot is returned as [`WaitError::Operation`].
pub fn operation_wait<W: Pollable>(
    waiter: &mut W,
    activity: &str,
    options: &WaitOptions,
) -> WaitResult<()> {
    if operation_done(waiter) {
        return terminal_result(waiter.common());
    }

    let enforcer = TimeoutEnforcer::new(options.timeout);
    let targets = waiter.target_states();
    let pending = waiter.pending_states();
    let mut last_state = waiter.state();
    let mut not_found = 0u32;
    let mut attempt = 0u32;

    loop {
        match refresh(waiter, activity)? {
            Refresh::Missing => {
                not_found += 1;
                if not_found > options.not_found_checks {
                    return Err(WaitError::NotFound {
                        activity: activity.to_string(),
                        retries: not_found,
                    });
                }
            }
            Refresh::State(state) => {
                not_found = 0;
                last_state = state;
                if targets.contains(&state) {
                    break;
                }
                if !pending.contains(&state) {
                    return Err(WaitError::UnexpectedState {
                        state: state.to_string(),
                        target: targets.join(", "),
                    });
                }
            }
        }

        if enforcer.check().is_timeout() {
            return Err(WaitError::Timeout {
                activity: activity.to_string(),
                last_state: last_state.to_string(),
                target: targets.join(", "),
                timeout: options.timeout,
            });
        }

        let delay = options.delay(attempt).min(enforcer.remaining());
        attempt = attempt.saturating_add(1);
        debug!("Waiting {:?} before next try", delay);
        thread::sleep(delay);
    }

    info!("{} completed after {:?}", activity, enforcer.elapsed());
    terminal_result(waiter.common())
}

fn terminal_result(common: &CommonOperationWaiter) -> WaitResult<()> {
    match common.error() {
        Some(error) => Err(WaitError::Operation(error.clone())),
        None => Ok(()),
    }
}
