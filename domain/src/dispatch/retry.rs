//! Retry policy for upstream calls
//!
//! The policy is a pure function from (attempt, failure kind) to a decision,
//! so the backoff schedule is unit-testable without timers or I/O. The
//! gateway owns the loop and the actual sleeping.

use crate::dispatch::error_kind::ErrorKind;
use std::time::Duration;

/// What the gateway should do after a failed attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Sleep for the given backoff, then try again
    RetryAfter(Duration),
    /// Surface the classified error
    GiveUp,
}

/// Bounded exponential-backoff retry policy
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self { max_attempts }
    }

    /// Decide the next action after attempt `attempt` (0-indexed) failed
    /// with `kind`.
    ///
    /// Transient failures retry with `2^attempt` seconds of backoff while
    /// attempts remain; non-transient failures (and hard-cap rate limits)
    /// give up immediately.
    pub fn next_action(&self, attempt: u32, kind: &ErrorKind) -> RetryDecision {
        if !kind.is_transient() {
            return RetryDecision::GiveUp;
        }

        if attempt + 1 >= self.max_attempts {
            return RetryDecision::GiveUp;
        }

        // Cap the exponent so absurd max_attempts settings cannot overflow
        // the shift.
        RetryDecision::RetryAfter(Duration::from_secs(1u64 << attempt.min(MAX_BACKOFF_EXPONENT)))
    }
}

const MAX_BACKOFF_EXPONENT: u32 = 16;
