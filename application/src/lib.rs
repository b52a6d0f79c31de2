//! Application layer for council
//!
//! This crate contains the debate use case, port definitions, and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::ExecutionParams;
pub use ports::{
    event_sink::{CompositeEventSink, DebateEvent, DebateEventSink, EventStatus, NoEventSink},
    live_log::{LiveLog, LiveLogEntry, LiveLogError, NoLiveLog},
    participant::{Participant, ParticipantError},
    summarizer::{Summarizer, SummarizerError, SummaryRequest, SummaryTask},
};
pub use use_cases::conduct_debate::{
    ConductDebateError, ConductDebateUseCase, ConsensusSynthesizer, DebateRequest,
    ResolutionSynthesizer, SynthesisResult, conduct_debate,
};
