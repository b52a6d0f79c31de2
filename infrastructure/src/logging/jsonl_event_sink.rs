//! JSONL file writer for debate events.
//!
//! Each [`DebateEvent`] is serialized as a single JSON line with `stage`,
//! `status` and `timestamp` fields merged into its payload.

use council_application::ports::event_sink::{DebateEvent, DebateEventSink};
use serde_json::{Value, json};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Event sink that appends one JSON object per line.
///
/// Thread-safe via `Mutex<BufWriter<File>>`. Flushes on `Drop`.
pub struct JsonlEventSink {
    writer: Mutex<BufWriter<File>>,
    path: PathBuf,
}

impl JsonlEventSink {
    /// Open the file for appending, creating it and its parent directories.
    ///
    /// Returns `None` if the file cannot be opened.
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        let file = open_append(path, "event log")?;
        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(super) fn open_append(path: &Path, what: &str) -> Option<File> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && let Err(e) = std::fs::create_dir_all(parent)
    {
        warn!("Could not create {} directory {}: {}", what, parent.display(), e);
        return None;
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            warn!("Could not open {} {}: {}", what, path.display(), e);
            None
        }
    }
}

impl DebateEventSink for JsonlEventSink {
    fn emit(&self, event: DebateEvent) {
        let timestamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true);

        let record = match event.payload {
            Value::Object(mut map) => {
                map.insert("stage".to_string(), Value::String(event.stage));
                map.insert(
                    "status".to_string(),
                    Value::String(event.status.as_str().to_string()),
                );
                map.insert("timestamp".to_string(), Value::String(timestamp));
                Value::Object(map)
            }
            other => json!({
                "stage": event.stage,
                "status": event.status.as_str(),
                "timestamp": timestamp,
                "data": other,
            }),
        };

        let Ok(line) = serde_json::to_string(&record) else {
            return;
        };

        if let Ok(mut writer) = self.writer.lock() {
            let _ = writeln!(writer, "{}", line);
            let _ = writer.flush();
        }
    }
}

impl Drop for JsonlEventSink {
    fn drop(&mut self) {
        if let Ok(mut writer) = self.writer.lock() {
            let _ = writer.flush();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_events_are_valid_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("debate.events.jsonl");
        let sink = JsonlEventSink::new(&path).unwrap();

        sink.emit(DebateEvent::started("opening", json!({ "allocated": 6 })));
        sink.emit(DebateEvent::turn(
            "opening",
            json!({ "ordinal": 1, "speaker": "economist", "content": "Demand is rising" }),
        ));
        drop(sink);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["stage"], "opening");
        assert_eq!(lines[0]["status"], "started");
        assert_eq!(lines[0]["allocated"], 6);
        assert_eq!(lines[1]["status"], "turn");
        assert_eq!(lines[1]["speaker"], "economist");
        assert!(lines.iter().all(|l| l["timestamp"].is_string()));
    }

    #[test]
    fn test_non_object_payload_is_wrapped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");
        let sink = JsonlEventSink::new(&path).unwrap();
        sink.emit(DebateEvent::skipped("risk_analysis", json!("budget")));
        drop(sink);

        let value: Value = serde_json::from_str(fs::read_to_string(&path).unwrap().trim()).unwrap();
        assert_eq!(value["status"], "skipped");
        assert_eq!(value["data"], "budget");
    }

    #[test]
    fn test_reopening_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.jsonl");
        for _ in 0..2 {
            let sink = JsonlEventSink::new(&path).unwrap();
            sink.emit(DebateEvent::completed("classification", json!({})));
        }
        assert_eq!(fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
