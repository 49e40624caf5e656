//! JSONL file writer for audit events.
//!
//! Each [`AuditEvent`] is serialized as a single JSON line and appended to
//! the file via a buffered writer. The sink is best-effort: any failure is
//! logged and swallowed, never surfaced to the caller.

use polychat_application::ports::audit_sink::{AuditEvent, AuditSink};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// JSONL audit sink that writes one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlAuditSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlAuditSink {
    /// Open the audit log for appending, creating the file (and parent
    /// directories) if they don't exist. Returns `None` if the file cannot
    /// be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!("Could not create audit log directory {}: {}", parent.display(), e);
            return None;
        }

        let file = match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!("Could not open audit log file {}: {}", path.display(), e);
                return None;
            }
        };

        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    /// Get the path to the log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AuditSink for JsonlAuditSink {
    fn record(&self, event: AuditEvent) {
        let Ok(line) = serde_json::to_string(&event) else {
            warn!("Could not serialize audit event, dropping it");
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            // Flush each line so a crash loses at most the current record
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlAuditSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_sink_writes_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let sink = JsonlAuditSink::new(&path).unwrap();

        sink.record(AuditEvent::new(
            "what is rust",
            "a systems language",
            "deepseek-chat",
            Some("me@example.com".to_string()),
        ));
        sink.record(AuditEvent::new("second", "answer", "gpt-4o-mini", None));
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: AuditEvent = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.model_id, "deepseek-chat");
        assert_eq!(first.owner_email.as_deref(), Some("me@example.com"));

        // owner_email is omitted, not null, when absent.
        assert!(!lines[1].contains("owner_email"));
    }

    #[test]
    fn test_audit_sink_appends_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        {
            let sink = JsonlAuditSink::new(&path).unwrap();
            sink.record(AuditEvent::new("p1", "r1", "m1", None));
        }
        {
            let sink = JsonlAuditSink::new(&path).unwrap();
            sink.record(AuditEvent::new("p2", "r2", "m2", None));
        }

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }
}
