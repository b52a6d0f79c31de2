//! Live transcript port.
//!
//! Receives each appended turn as it happens. Failures are reported back
//! but never interrupt the debate.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LiveLogError {
    #[error("Live log write failed: {0}")]
    WriteFailed(String),
}

/// One transcript line, tagged with the engine run it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiveLogEntry {
    pub engine_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scenario_name: Option<String>,
    pub turn_number: usize,
    pub phase: String,
    pub turn_type: String,
    pub participant: String,
    pub content: String,
}

#[async_trait]
pub trait LiveLog: Send + Sync {
    async fn record(&self, entry: &LiveLogEntry) -> Result<(), LiveLogError>;
}

pub struct NoLiveLog;

#[async_trait]
impl LiveLog for NoLiveLog {
    async fn record(&self, _entry: &LiveLogEntry) -> Result<(), LiveLogError> {
        Ok(())
    }
}
