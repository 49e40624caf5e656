//! File-backed health advisory store.
//!
//! Persists the health map as a JSON snapshot so observations made by one
//! invocation (an `ask` or `synthesize` run) are visible to the next, in
//! particular to the model listing. Writes are best-effort: a failed save
//! is logged and the in-memory map stays authoritative for this process.

use polychat_application::ports::health_store::{HealthRecord, HealthStore};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::warn;

/// Health store that mirrors its rows into a JSON file on every upsert
pub struct FileHealthStore {
    rows: RwLock<HashMap<String, HealthRecord>>,
    path: PathBuf,
}

impl FileHealthStore {
    /// Open the snapshot file, creating parent directories if needed and
    /// loading any rows a previous invocation left behind. Returns `None`
    /// if the location is unusable. A corrupt snapshot is discarded, not
    /// fatal.
    pub fn open(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(
                "Could not create health snapshot directory {}: {}",
                parent.display(),
                e
            );
            return None;
        }

        let rows = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Vec<HealthRecord>>(&raw) {
                Ok(list) => list.into_iter().map(|r| (r.model_id.clone(), r)).collect(),
                Err(e) => {
                    warn!(
                        "Discarding unreadable health snapshot {}: {}",
                        path.display(),
                        e
                    );
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Some(Self {
            rows: RwLock::new(rows),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, rows: &HashMap<String, HealthRecord>) {
        let mut list: Vec<_> = rows.values().cloned().collect();
        list.sort_by(|a, b| a.model_id.cmp(&b.model_id));

        match serde_json::to_string_pretty(&list) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    warn!(
                        "Could not save health snapshot {}: {}",
                        self.path.display(),
                        e
                    );
                }
            }
            Err(e) => warn!("Could not serialize health snapshot: {}", e),
        }
    }
}

impl HealthStore for FileHealthStore {
    fn upsert(&self, record: HealthRecord) {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        rows.insert(record.model_id.clone(), record);
        self.persist(&rows);
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

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn observations_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("health.json");

        {
            let store = FileHealthStore::open(&path).unwrap();
            store.upsert(HealthRecord::unavailable("gpt-4o", Utc::now(), "404"));
            store.upsert(HealthRecord::available("deepseek-chat", Utc::now()));
        }

        let store = FileHealthStore::open(&path).unwrap();
        assert!(!store.get("gpt-4o").unwrap().is_available);
        assert!(store.get("deepseek-chat").unwrap().is_available);
        assert_eq!(store.snapshot().len(), 2);
    }

    #[test]
    fn corrupt_snapshot_starts_empty_instead_of_failing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("health.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = FileHealthStore::open(&path).unwrap();
        assert!(store.snapshot().is_empty());

        // The next upsert replaces the corrupt content with a valid snapshot.
        store.upsert(HealthRecord::available("m1", Utc::now()));
        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<HealthRecord> = serde_json::from_str(&raw).unwrap();
        assert_eq!(parsed.len(), 1);
    }

    #[test]
    fn missing_parent_directories_are_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("health.json");

        let store = FileHealthStore::open(&path).unwrap();
        store.upsert(HealthRecord::available("m1", Utc::now()));
        assert!(path.exists());
    }
}
