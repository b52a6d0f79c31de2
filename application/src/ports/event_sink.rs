//! Port for structured debate events.
//!
//! Separate from `tracing`-based operation logs: this port carries the
//! machine-readable progress of a debate (phase starts, turns, skips) for
//! progress displays and JSONL recorders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Started,
    Completed,
    Skipped,
    Turn,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Started => "started",
            EventStatus::Completed => "completed",
            EventStatus::Skipped => "skipped",
            EventStatus::Turn => "turn",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DebateEvent {
    /// "classification", a phase name, "resolution", "intervention", ...
    pub stage: String,
    pub status: EventStatus,
    pub payload: Value,
}

impl DebateEvent {
    pub fn new(stage: impl Into<String>, status: EventStatus, payload: Value) -> Self {
        Self {
            stage: stage.into(),
            status,
            payload,
        }
    }

    pub fn started(stage: impl Into<String>, payload: Value) -> Self {
        Self::new(stage, EventStatus::Started, payload)
    }

    pub fn completed(stage: impl Into<String>, payload: Value) -> Self {
        Self::new(stage, EventStatus::Completed, payload)
    }

    pub fn skipped(stage: impl Into<String>, payload: Value) -> Self {
        Self::new(stage, EventStatus::Skipped, payload)
    }

    pub fn turn(stage: impl Into<String>, payload: Value) -> Self {
        Self::new(stage, EventStatus::Turn, payload)
    }
}

/// Receives debate events.
///
/// `emit` is synchronous and non-fallible; sinks swallow their own failures.
pub trait DebateEventSink: Send + Sync {
    fn emit(&self, event: DebateEvent);
}

/// No-op implementation for tests and when events are not needed.
pub struct NoEventSink;

impl DebateEventSink for NoEventSink {
    fn emit(&self, _event: DebateEvent) {}
}

/// Fans one event out to several sinks
pub struct CompositeEventSink {
    sinks: Vec<std::sync::Arc<dyn DebateEventSink>>,
}

impl CompositeEventSink {
    pub fn new(sinks: Vec<std::sync::Arc<dyn DebateEventSink>>) -> Self {
        Self { sinks }
    }
}

impl DebateEventSink for CompositeEventSink {
    fn emit(&self, event: DebateEvent) {
        for sink in &self.sinks {
            sink.emit(event.clone());
        }
    }
}
