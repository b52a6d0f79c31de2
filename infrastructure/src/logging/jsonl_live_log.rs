//! JSONL live transcript.

use super::jsonl_event_sink::open_append;
use async_trait::async_trait;
use council_application::ports::live_log::{LiveLog, LiveLogEntry, LiveLogError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;

/// Appends each [`LiveLogEntry`] as a JSON line and flushes immediately,
/// so the file can be tailed while a debate runs.
pub struct JsonlLiveLog {
    writer: Mutex<BufWriter<File>>,
}

impl JsonlLiveLog {
    pub fn new(path: impl AsRef<Path>) -> Option<Self> {
        let file = open_append(path.as_ref(), "live log")?;
        Some(Self {
            writer: Mutex::new(BufWriter::new(file)),
        })
    }
}

#[async_trait]
impl LiveLog for JsonlLiveLog {
    async fn record(&self, entry: &LiveLogEntry) -> Result<(), LiveLogError> {
        let mut record = serde_json::to_value(entry)
            .map_err(|e| LiveLogError::WriteFailed(e.to_string()))?;
        if let Some(map) = record.as_object_mut() {
            map.insert(
                "timestamp".to_string(),
                chrono::Utc::now()
                    .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
                    .into(),
            );
        }

        let mut writer = self
            .writer
            .lock()
            .map_err(|_| LiveLogError::WriteFailed("live log writer poisoned".to_string()))?;
        writeln!(writer, "{}", record)
            .and_then(|_| writer.flush())
            .map_err(|e| LiveLogError::WriteFailed(e.to_string()))
    }
}
