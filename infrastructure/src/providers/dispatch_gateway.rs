//! Dispatching chat gateway
//!
//! Implements the application-layer [`ChatGateway`] port: resolves the
//! route, short-circuits models in cooldown, enforces the lane invariant,
//! applies the provider-triggered system-fold pass, and drives the retry
//! loop with health bookkeeping as a best-effort side effect.

use crate::providers::routing::{Lane, ModelRouter, Route};
use crate::providers::{UpstreamClient, UpstreamFailure};
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use polychat_application::ports::chat_gateway::{ChatGateway, GatewayError};
use polychat_application::ports::health_store::{HealthRecord, HealthStore};
use polychat_application::ports::time::Sleeper;
use polychat_domain::dispatch::error_kind::extract_provider_message;
use polychat_domain::{ErrorKind, Message, ModelReply, RetryDecision, RetryPolicy, fold_system_messages};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Cooldown window after a model is observed unavailable
pub const MODEL_COOLDOWN: ChronoDuration = ChronoDuration::minutes(30);

/// Client-perceived time budget for one interactive call
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(15);

/// Gateway that routes each call to its lane's upstream client
pub struct DispatchGateway {
    router: ModelRouter,
    primary: Arc<dyn UpstreamClient>,
    restricted: Arc<dyn UpstreamClient>,
    health: Arc<dyn HealthStore>,
    sleeper: Arc<dyn Sleeper>,
    retry: RetryPolicy,
    call_timeout: Duration,
}

impl DispatchGateway {
    pub fn new(
        router: ModelRouter,
        primary: Arc<dyn UpstreamClient>,
        restricted: Arc<dyn UpstreamClient>,
        health: Arc<dyn HealthStore>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            router,
            primary,
            restricted,
            health,
            sleeper,
            retry: RetryPolicy::default(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Pick the client for a route and verify the lane invariant. A model of
    /// the Restricted family must never reach the Primary client, and vice
    /// versa; a mismatch is a wiring bug, never a fallback choice.
    fn client_for(&self, route: &Route) -> Result<&dyn UpstreamClient, GatewayError> {
        let client: &dyn UpstreamClient = match route.lane {
            Lane::Primary => self.primary.as_ref(),
            Lane::Restricted => self.restricted.as_ref(),
        };

        if client.lane() != route.lane {
            return Err(GatewayError::Misconfigured(format!(
                "client lane {:?} does not match route lane {:?}",
                client.lane(),
                route.lane
            )));
        }

        Ok(client)
    }

    /// Health rows are keyed by the public catalog id, so advisory consumers
    /// like the model listing can match them against catalog entries. Bare
    /// Restricted-lane aliases normalize to the full catalog id.
    fn health_key(model_id: &str, route: &Route) -> String {
        match route.lane {
            Lane::Primary => model_id.to_string(),
            Lane::Restricted => format!("perplexity/{}", route.upstream_id),
        }
    }

    fn in_cooldown(&self, health_key: &str) -> bool {
        match self.health.get(health_key) {
            Some(record) if !record.is_available => {
                Utc::now() - record.checked_at < MODEL_COOLDOWN
            }
            _ => false,
        }
    }

    /// Record the health outcome of one attempt. Rate limiting is not
    /// unavailability; only 404/5xx-class failures open a cooldown window.
    fn record_health(&self, health_key: &str, kind: Option<&ErrorKind>, detail: Option<String>) {
        let now = Utc::now();
        let record = match kind {
            None => HealthRecord::available(health_key, now),
            Some(kind) if kind.marks_unavailable() => HealthRecord::unavailable(
                health_key,
                now,
                detail.unwrap_or_else(|| "upstream failure".to_string()),
            ),
            Some(_) => HealthRecord {
                error_message: detail,
                ..HealthRecord::available(health_key, now)
            },
        };
        self.health.upsert(record);
    }
}

#[async_trait]
impl ChatGateway for DispatchGateway {
    async fn send(&self, model_id: &str, messages: &[Message]) -> Result<ModelReply, GatewayError> {
        let route = self.router.resolve(model_id);
        let health_key = Self::health_key(model_id, &route);

        if self.in_cooldown(&health_key) {
            debug!(model_id, "short-circuiting call: model in cooldown");
            return Err(GatewayError::Cooldown {
                model_id: model_id.to_string(),
            });
        }

        let client = self.client_for(&route)?;

        let folded;
        let outbound: &[Message] = if route.fold_system {
            folded = fold_system_messages(messages);
            &folded
        } else {
            messages
        };

        let mut attempt = 0;
        loop {
            match client
                .complete(&route.upstream_id, outbound, self.call_timeout)
                .await
            {
                Ok(reply) => {
                    self.record_health(&health_key, None, None);
                    return Ok(ModelReply {
                        content: reply.content,
                        model: reply.model,
                        usage: reply.usage,
                    });
                }
                Err(UpstreamFailure::Http {
                    status,
                    body,
                    reset_hint,
                }) => {
                    let provider_message = extract_provider_message(&body);
                    let kind = ErrorKind::classify(status, &provider_message, reset_hint);
                    warn!(
                        model_id,
                        status,
                        attempt,
                        provider_message = %provider_message,
                        "upstream call failed"
                    );
                    self.record_health(
                        &health_key,
                        Some(&kind),
                        Some(format!("{}: {}", status, provider_message)),
                    );

                    match self.retry.next_action(attempt, &kind) {
                        RetryDecision::RetryAfter(delay) => self.sleeper.sleep(delay).await,
                        RetryDecision::GiveUp => {
                            return Err(GatewayError::Upstream {
                                model_id: model_id.to_string(),
                                kind,
                            });
                        }
                    }
                }
                Err(UpstreamFailure::TimedOut) => {
                    warn!(model_id, attempt, "upstream call timed out");
                    match self.retry.next_action(attempt, &ErrorKind::Timeout) {
                        RetryDecision::RetryAfter(delay) => self.sleeper.sleep(delay).await,
                        RetryDecision::GiveUp => {
                            return Err(GatewayError::Upstream {
                                model_id: model_id.to_string(),
                                kind: ErrorKind::Timeout,
                            });
                        }
                    }
                }
                Err(UpstreamFailure::Transport(message)) => {
                    return Err(GatewayError::Transport {
                        model_id: model_id.to_string(),
                        message,
                    });
                }
            }
            attempt += 1;
        }
    }
}
