//! In-process health advisory cache
//!
//! Backs the [`HealthStore`] port with a `RwLock`ed map. Rows are advisory:
//! readers treat them as hints, and a stale row is no worse than no row.

use chrono::{Duration, Utc};
use polychat_application::ports::health_store::{HealthRecord, HealthStore};
use std::collections::HashMap;
use std::sync::RwLock;

mod file_store;

pub use file_store::FileHealthStore;

/// A row older than this is not worth showing in listings
pub const FRESHNESS_WINDOW: Duration = Duration::minutes(10);

/// Keep only rows recent enough to present as current availability
pub fn fresh_rows(rows: Vec<HealthRecord>) -> Vec<HealthRecord> {
    let cutoff = Utc::now() - FRESHNESS_WINDOW;
    rows.into_iter().filter(|r| r.checked_at >= cutoff).collect()
}

/// Map-backed health store, shared via `Arc`
#[derive(Default)]
pub struct InMemoryHealthStore {
    rows: RwLock<HashMap<String, HealthRecord>>,
}

impl InMemoryHealthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows recent enough to present as current availability
    pub fn fresh_snapshot(&self) -> Vec<HealthRecord> {
        fresh_rows(self.snapshot())
    }
}

impl HealthStore for InMemoryHealthStore {
    fn upsert(&self, record: HealthRecord) {
        self.rows
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(record.model_id.clone(), record);
    }

    fn get(&self, model_id: &str) -> Option<HealthRecord> {
        self.rows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(model_id)
            .cloned()
    }

    fn snapshot(&self) -> Vec<HealthRecord> {
        let mut rows: Vec<_> = self
            .rows
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.model_id.cmp(&b.model_id));
        rows
    }
}
