//! Logging infrastructure: structured debate records.
//!
//! - [`JsonlEventSink`]: every [`DebateEvent`](council_application::DebateEvent)
//!   as one JSON line
//! - [`JsonlLiveLog`]: every appended turn as one JSON line, written as the
//!   debate runs

mod jsonl_event_sink;
mod jsonl_live_log;

pub use jsonl_event_sink::JsonlEventSink;
pub use jsonl_live_log::JsonlLiveLog;
