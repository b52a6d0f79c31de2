//! Domain error types

use crate::debate::phase::DebatePhase;
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Unknown depth label: {0}")]
    UnknownDepth(String),

    #[error("Illegal phase transition: {from} -> {to}")]
    IllegalTransition { from: DebatePhase, to: DebatePhase },
}

impl DomainError {
    /// Check if this error came from the phase state machine guard
    pub fn is_illegal_transition(&self) -> bool {
        matches!(self, DomainError::IllegalTransition { .. })
    }
}
