//! Audit sink port
//!
//! Best-effort recording of prompts and results. A failing sink must never
//! fail the user-facing call; implementations log a warning and move on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit record per completed model call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub prompt: String,
    pub result: String,
    pub model_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_email: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        prompt: impl Into<String>,
        result: impl Into<String>,
        model_id: impl Into<String>,
        owner_email: Option<String>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            result: result.into(),
            model_id: model_id.into(),
            owner_email,
            timestamp: Utc::now(),
        }
    }
}

/// Fire-and-forget audit sink
pub trait AuditSink: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// No-op audit sink
pub struct NoAudit;

impl AuditSink for NoAudit {
    fn record(&self, _event: AuditEvent) {}
}
