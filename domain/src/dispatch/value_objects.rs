//! Dispatch value objects - immutable results of model calls
//!
//! - [`ModelReply`] - one successful chat completion
//! - [`DispatchResult`] - outcome of one model in a fan-out, success or not
//! - [`ModelAnswer`] - surviving per-model answer handed to the caller
//! - [`SynthesisOutcome`] - everything a synthesis turn produces

use crate::dispatch::error_kind::ErrorKind;
use serde::{Deserialize, Serialize};

/// Token usage reported by the upstream, when available
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// One successful chat completion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReply {
    pub content: String,
    /// Upstream's own name for the model that answered
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

/// Outcome of one model within a fan-out batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchResult {
    pub model_id: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl DispatchResult {
    pub fn success(model_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            content: content.into(),
            error_kind: None,
        }
    }

    pub fn failure(model_id: impl Into<String>, kind: ErrorKind) -> Self {
        Self {
            model_id: model_id.into(),
            content: String::new(),
            error_kind: Some(kind),
        }
    }

    /// A result counts as usable only when it succeeded with actual content.
    pub fn is_usable(&self) -> bool {
        self.error_kind.is_none() && !self.content.is_empty()
    }
}

/// A surviving per-model answer, labelled by the public model id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelAnswer {
    pub model_id: String,
    pub content: String,
}

/// Result of one synthesis turn. Ownership transfers to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisOutcome {
    pub per_model_responses: Vec<ModelAnswer>,
    pub synthesis: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_with_empty_content_is_not_usable() {
        assert!(!DispatchResult::success("m", "").is_usable());
        assert!(DispatchResult::success("m", "answer").is_usable());
        assert!(!DispatchResult::failure("m", ErrorKind::Timeout).is_usable());
    }
}
