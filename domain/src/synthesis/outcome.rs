//! Result of a complete debate.

use super::contradiction::Resolution;
use super::report::ConsensusReport;
use super::scenario::EdgeCaseScenario;
use crate::debate::{ComplexityTier, PhaseRecord, TransitionRecord, Turn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebateOutcome {
    pub question: String,
    pub tier: ComplexityTier,
    pub total_budget: usize,
    pub total_turns: usize,
    /// Phases that ran to completion, DONE excluded
    pub phases_completed: usize,
    pub phase_log: Vec<PhaseRecord>,
    pub transitions: Vec<TransitionRecord>,
    pub transcript: Vec<Turn>,
    /// Markdown; never empty
    pub final_report: String,
    pub resolutions: Vec<Resolution>,
    pub edge_cases: Vec<EdgeCaseScenario>,
    pub consensus: ConsensusReport,
    pub participant_turn_counts: BTreeMap<String, usize>,
    pub execution_time_minutes: f64,
    /// The debate was cut short by the circuit breaker or cancellation
    pub truncated: bool,
    /// The consensus came from the emergency path
    pub emergency: bool,
    /// Why CHALLENGE_DEFENSE ended early, if it did
    pub early_exit_reason: Option<String>,
}

impl DebateOutcome {
    pub fn participant_turns(&self) -> usize {
        self.participant_turn_counts.values().sum()
    }

    pub fn moderator_turns(&self) -> usize {
        self.transcript.iter().filter(|t| t.is_moderator()).count()
    }
}
