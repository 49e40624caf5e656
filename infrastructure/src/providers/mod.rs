//! Upstream provider adapters
//!
//! Two lanes exist: the Primary multi-model gateway (OpenRouter) and the
//! Restricted single-purpose gateway (Perplexity). Credentials and
//! authorization differ between them, so a model must only ever travel on
//! its own lane; the dispatch gateway enforces this as a hard invariant.

pub mod dispatch_gateway;
pub mod openrouter;
pub mod perplexity;
pub mod protocol;
pub mod routing;

use async_trait::async_trait;
use polychat_domain::Message;
use routing::Lane;
use std::time::Duration;

/// Reply from one upstream call, before classification
#[derive(Debug, Clone)]
pub struct UpstreamReply {
    pub content: String,
    pub model: String,
    pub usage: Option<polychat_domain::Usage>,
}

/// Failure of one upstream call, before classification
#[derive(Debug, Clone)]
pub enum UpstreamFailure {
    /// Non-2xx response
    Http {
        status: u16,
        body: String,
        reset_hint: Option<String>,
    },
    /// The call exceeded its time budget
    TimedOut,
    /// The request never completed (DNS, TLS, connect errors)
    Transport(String),
}

/// One upstream chat-completion endpoint
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Which lane this client serves
    fn lane(&self) -> Lane;

    /// Perform a single chat completion call. `model` is the upstream's own
    /// model identifier, already translated by the router.
    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        timeout: Duration,
    ) -> Result<UpstreamReply, UpstreamFailure>;
}
