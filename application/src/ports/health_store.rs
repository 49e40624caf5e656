//! Health advisory store port
//!
//! A shared, read-mostly cache of per-model availability. Writers upsert by
//! model id, last write wins; each row is independently owned by whichever
//! call most recently finished.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the health advisory cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthRecord {
    pub model_id: String,
    pub is_available: bool,
    pub checked_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl HealthRecord {
    pub fn available(model_id: impl Into<String>, checked_at: DateTime<Utc>) -> Self {
        Self {
            model_id: model_id.into(),
            is_available: true,
            checked_at,
            error_message: None,
        }
    }

    pub fn unavailable(
        model_id: impl Into<String>,
        checked_at: DateTime<Utc>,
        error_message: impl Into<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            is_available: false,
            checked_at,
            error_message: Some(error_message.into()),
        }
    }
}

/// Injectable health advisory store
pub trait HealthStore: Send + Sync {
    /// Insert or replace the row for `record.model_id`
    fn upsert(&self, record: HealthRecord);

    /// The most recent row for a model, if any
    fn get(&self, model_id: &str) -> Option<HealthRecord>;

    /// All rows, for advisory listings
    fn snapshot(&self) -> Vec<HealthRecord>;
}
