//! Send Message use case
//!
//! The single-model path: access check, history normalization, one gateway
//! call, best-effort audit.

use crate::ports::audit_sink::{AuditEvent, AuditSink};
use crate::ports::chat_gateway::{ChatGateway, GatewayError};
use crate::ports::identity::IdentityProvider;
use crate::ports::model_catalog::ModelCatalog;
use crate::use_cases::shared;
use polychat_domain::{AccessDecision, DenyReason, Message, ModelReply};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Errors that can occur on the single-model path
#[derive(Error, Debug)]
pub enum SendMessageError {
    #[error("Model {0} requires an authenticated user")]
    AuthRequired(String),

    #[error("Model {0} is restricted to admin users")]
    Forbidden(String),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// Use case for sending one conversation to one model
pub struct SendMessageUseCase<G: ChatGateway> {
    gateway: Arc<G>,
    catalog: Arc<dyn ModelCatalog>,
    identity: Arc<dyn IdentityProvider>,
    audit: Arc<dyn AuditSink>,
}

impl<G: ChatGateway> SendMessageUseCase<G> {
    pub fn new(
        gateway: Arc<G>,
        catalog: Arc<dyn ModelCatalog>,
        identity: Arc<dyn IdentityProvider>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            gateway,
            catalog,
            identity,
            audit,
        }
    }

    pub async fn execute(
        &self,
        messages: &[Message],
        model_id: &str,
    ) -> Result<ModelReply, SendMessageError> {
        let caller = self.identity.current_caller();

        if let AccessDecision::Deny(reason) =
            shared::access_for(self.catalog.as_ref(), &caller, model_id)
        {
            return Err(match reason {
                DenyReason::AuthRequired => SendMessageError::AuthRequired(model_id.to_string()),
                DenyReason::Forbidden => SendMessageError::Forbidden(model_id.to_string()),
            });
        }

        let outbound = shared::outbound_messages(messages);
        debug!(model_id, messages = outbound.len(), "dispatching chat request");

        let reply = self.gateway.send(model_id, &outbound).await?;
        info!(model_id, "chat completion successful");

        self.audit.record(AuditEvent::new(
            shared::audit_prompt(messages),
            &reply.content,
            model_id,
            caller.email.clone(),
        ));

        Ok(reply)
    }
}
