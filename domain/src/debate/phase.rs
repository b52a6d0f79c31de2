//! Debate phases
//!
//! A debate moves through its phases strictly in order; exactly one phase is
//! active at a time and [`DebatePhase::Done`] is terminal.

use serde::{Deserialize, Serialize};

/// Phase of a debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebatePhase {
    /// Every participant states an opening case
    Opening,
    /// Comparative tier only: each participant argues for one option
    Advocacy,
    /// Comparative tier only: pairwise challenge and response
    CrossExamination,
    /// Rotating challenge/response rounds with moderator interventions
    ChallengeDefense,
    /// Scenario analysis by the most relevant participants
    EdgeCase,
    /// Catastrophic risk identification and likelihood assessment
    RiskAnalysis,
    /// Final positions with extracted confidence
    Consensus,
    /// Compilation of the consensus report
    FinalSynthesis,
    /// Terminal
    Done,
}

impl DebatePhase {
    /// Lowercase identifier used for events and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            DebatePhase::Opening => "opening",
            DebatePhase::Advocacy => "advocacy",
            DebatePhase::CrossExamination => "cross_examination",
            DebatePhase::ChallengeDefense => "challenge_defense",
            DebatePhase::EdgeCase => "edge_case",
            DebatePhase::RiskAnalysis => "risk_analysis",
            DebatePhase::Consensus => "consensus",
            DebatePhase::FinalSynthesis => "final_synthesis",
            DebatePhase::Done => "done",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            DebatePhase::Opening => "Opening Statements",
            DebatePhase::Advocacy => "Advocacy",
            DebatePhase::CrossExamination => "Cross-Examination",
            DebatePhase::ChallengeDefense => "Challenge & Defense",
            DebatePhase::EdgeCase => "Edge Cases",
            DebatePhase::RiskAnalysis => "Risk Analysis",
            DebatePhase::Consensus => "Consensus",
            DebatePhase::FinalSynthesis => "Final Synthesis",
            DebatePhase::Done => "Done",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DebatePhase::Done)
    }
}

impl std::fmt::Display for DebatePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str().to_uppercase())
    }
}

/// Lifecycle status of an entered phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Active,
    Completed,
    Skipped,
}

/// Budget bookkeeping for one phase of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseRecord {
    pub phase: DebatePhase,
    pub allocated: usize,
    pub consumed: usize,
    pub status: PhaseStatus,
}

impl PhaseRecord {
    pub fn active(phase: DebatePhase, allocated: usize) -> Self {
        Self {
            phase,
            allocated,
            consumed: 0,
            status: PhaseStatus::Active,
        }
    }

    pub fn skipped(phase: DebatePhase, allocated: usize) -> Self {
        Self {
            phase,
            allocated,
            consumed: 0,
            status: PhaseStatus::Skipped,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == PhaseStatus::Completed
    }
}
