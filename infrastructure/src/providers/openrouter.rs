//! OpenRouter upstream client (Primary lane)

use crate::providers::protocol::{ChatCompletionRequest, ChatCompletionResponse};
use crate::providers::routing::Lane;
use crate::providers::{UpstreamClient, UpstreamFailure, UpstreamReply};
use async_trait::async_trait;
use polychat_domain::Message;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Attribution headers OpenRouter uses for app rankings
const REFERER: &str = "https://github.com/polychat/polychat";
const TITLE: &str = "polychat";

/// Primary-lane client for the OpenRouter multi-model gateway
pub struct OpenRouterClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl OpenRouterClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl UpstreamClient for OpenRouterClient {
    fn lane(&self) -> Lane {
        Lane::Primary
    }

    async fn complete(
        &self,
        model: &str,
        messages: &[Message],
        timeout: Duration,
    ) -> Result<UpstreamReply, UpstreamFailure> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(model, url = %url, "calling OpenRouter");

        let request = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", REFERER)
            .header("X-Title", TITLE)
            .json(&ChatCompletionRequest::new(model, messages))
            .send();

        let response = match tokio::time::timeout(timeout, request).await {
            Err(_) => return Err(UpstreamFailure::TimedOut),
            Ok(Err(e)) if e.is_timeout() => return Err(UpstreamFailure::TimedOut),
            Ok(Err(e)) => return Err(UpstreamFailure::Transport(e.to_string())),
            Ok(Ok(response)) => response,
        };

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let reset_hint = response
                .headers()
                .get("X-RateLimit-Reset")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamFailure::Http {
                status,
                body,
                reset_hint,
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| UpstreamFailure::Transport(format!("bad response body: {}", e)))?;

        let Some(content) = parsed.content() else {
            return Err(UpstreamFailure::Transport(
                "no response content received from provider".to_string(),
            ));
        };

        Ok(UpstreamReply {
            content: content.to_string(),
            model: if parsed.model.is_empty() {
                model.to_string()
            } else {
                parsed.model.clone()
            },
            usage: parsed.usage.map(Into::into),
        })
    }
}
