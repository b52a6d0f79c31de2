//! Phase state machine: legal transitions and an auditable transition log.
//!
//! ```text
//! OPENING           → ADVOCACY | CHALLENGE_DEFENSE
//! ADVOCACY          → CROSS_EXAMINATION
//! CROSS_EXAMINATION → CHALLENGE_DEFENSE
//! CHALLENGE_DEFENSE → EDGE_CASE | RISK_ANALYSIS | CONSENSUS
//! EDGE_CASE         → RISK_ANALYSIS | CONSENSUS
//! RISK_ANALYSIS     → CONSENSUS
//! CONSENSUS         → FINAL_SYNTHESIS
//! FINAL_SYNTHESIS   → DONE
//! ```
//!
//! Any non-terminal phase may also jump straight to FINAL_SYNTHESIS, which
//! is what guarantees a report after cancellation.

use super::phase::DebatePhase;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

pub fn is_legal_transition(from: DebatePhase, to: DebatePhase) -> bool {
    use DebatePhase::*;

    if to == FinalSynthesis && !from.is_terminal() && from != FinalSynthesis {
        return true;
    }

    matches!(
        (from, to),
        (Opening, Advocacy)
            | (Opening, ChallengeDefense)
            | (Advocacy, CrossExamination)
            | (CrossExamination, ChallengeDefense)
            | (ChallengeDefense, EdgeCase)
            | (ChallengeDefense, RiskAnalysis)
            | (ChallengeDefense, Consensus)
            | (EdgeCase, RiskAnalysis)
            | (EdgeCase, Consensus)
            | (RiskAnalysis, Consensus)
            | (FinalSynthesis, Done)
    )
}

/// A single recorded transition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: DebatePhase,
    pub to: DebatePhase,
    /// Session turns consumed when the transition happened
    pub turns_consumed: usize,
    pub reason: Option<String>,
}

/// Guards the phase sequence of one session.
///
/// Starts in OPENING. Phases not in the tier's sequence can never be entered.
#[derive(Debug, Clone)]
pub struct PhaseStateMachine {
    current: DebatePhase,
    sequence: Vec<DebatePhase>,
    transitions: Vec<TransitionRecord>,
}

impl PhaseStateMachine {
    pub fn new(sequence: Vec<DebatePhase>) -> Self {
        Self {
            current: DebatePhase::Opening,
            sequence,
            transitions: Vec::new(),
        }
    }

    pub fn current(&self) -> DebatePhase {
        self.current
    }

    pub fn is_done(&self) -> bool {
        self.current.is_terminal()
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    /// Phases of the sequence strictly between the current phase and `to`
    pub fn bypassed(&self, to: DebatePhase) -> Vec<DebatePhase> {
        self.sequence
            .iter()
            .copied()
            .filter(|p| *p > self.current && *p < to)
            .collect()
    }

    /// Move to `to`, recording the transition.
    pub fn advance(
        &mut self,
        to: DebatePhase,
        turns_consumed: usize,
        reason: Option<String>,
    ) -> Result<(), DomainError> {
        let in_sequence = to.is_terminal() || self.sequence.contains(&to);
        if !in_sequence || !is_legal_transition(self.current, to) {
            return Err(DomainError::IllegalTransition {
                from: self.current,
                to,
            });
        }
        self.transitions.push(TransitionRecord {
            from: self.current,
            to,
            turns_consumed,
            reason,
        });
        self.current = to;
        Ok(())
    }
}
