//! Tokio-backed sleeper

use async_trait::async_trait;
use polychat_application::ports::time::Sleeper;
use std::time::Duration;

/// Sleeper that actually waits on the tokio timer
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
