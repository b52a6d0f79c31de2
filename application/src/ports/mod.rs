//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod event_sink;
pub mod live_log;
pub mod participant;
pub mod summarizer;
