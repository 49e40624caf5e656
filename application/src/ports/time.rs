//! Time port
//!
//! Backoff sleeps and inter-chunk pauses go through this trait so tests can
//! observe the schedule without real timers.

use async_trait::async_trait;
use std::time::Duration;

/// Asynchronous sleep abstraction
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeper that returns immediately (for tests)
pub struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}
