//! Chat gateway port
//!
//! Defines the interface for one chat completion call against an upstream
//! provider. The adapter owns routing, retry/backoff, failure classification
//! and health bookkeeping; callers only see a [`ModelReply`] or a
//! [`GatewayError`].

use async_trait::async_trait;
use polychat_domain::{ErrorKind, Message, ModelReply};
use thiserror::Error;

/// Errors that can surface from a gateway call
#[derive(Error, Debug, Clone)]
pub enum GatewayError {
    /// Classified upstream failure, after the retry budget is exhausted
    #[error("{}", kind.user_message(model_id))]
    Upstream { model_id: String, kind: ErrorKind },

    /// The model was recently observed unavailable; the call was
    /// short-circuited without a network attempt
    #[error("Model {model_id} is temporarily unavailable (cooldown active)")]
    Cooldown { model_id: String },

    /// Missing credential or broken wiring
    #[error("Server misconfiguration: {0}")]
    Misconfigured(String),

    /// The request never reached the upstream (DNS, TLS, connect errors)
    #[error("Transport error calling {model_id}: {message}")]
    Transport { model_id: String, message: String },
}

impl GatewayError {
    /// The stable error category, when one applies
    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            GatewayError::Upstream { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Collapse this error into a dispatch-level [`ErrorKind`] for
    /// aggregation in fan-out results.
    pub fn into_error_kind(self) -> ErrorKind {
        match self {
            GatewayError::Upstream { kind, .. } => kind,
            GatewayError::Cooldown { .. } => ErrorKind::CooldownActive,
            // Wiring failures have no upstream status; surface them as a
            // generic category so aggregation stays uniform.
            GatewayError::Misconfigured(_) => ErrorKind::GenericUpstream { status: 500 },
            GatewayError::Transport { .. } => ErrorKind::Timeout,
        }
    }
}

/// Gateway for chat completion calls
///
/// `model_id` is the public catalog id; translation to the upstream id and
/// the choice of lane happen inside the adapter.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send(&self, model_id: &str, messages: &[Message]) -> Result<ModelReply, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_keeps_its_own_category_in_aggregation() {
        let err = GatewayError::Cooldown {
            model_id: "gpt-4o".into(),
        };
        assert_eq!(err.into_error_kind(), ErrorKind::CooldownActive);
    }

    #[test]
    fn wiring_failures_collapse_to_generic_categories() {
        assert_eq!(
            GatewayError::Misconfigured("no key".into()).into_error_kind(),
            ErrorKind::GenericUpstream { status: 500 }
        );
        assert_eq!(
            GatewayError::Transport {
                model_id: "gpt-4o".into(),
                message: "dns".into(),
            }
            .into_error_kind(),
            ErrorKind::Timeout
        );
    }
}
