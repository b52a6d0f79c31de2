//! Domain layer for council
//!
//! This crate contains the deliberation engine's pure logic: entities,
//! value objects, budgets, heuristics and parsers. It has no dependencies
//! on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Debate
//!
//! A question is debated by a fixed set of participants in a sequence of
//! phases. Every turn is charged against a per-phase ceiling and a
//! session-wide cap, so a debate always terminates.
//!
//! - **Tier**: question complexity picks the phase set and budget
//! - **Phase machine**: legal transitions only, with a jump to final
//!   synthesis from anywhere
//! - **Monitors**: convergence, devil's advocate, topic drift, meta-debate
//!
//! ## Synthesis
//!
//! Contradictions are resolved in short mini-debates, and the debate ends
//! in a [`ConsensusReport`], built by a summarizer or, failing that, from
//! participants' final positions.

pub mod config;
pub mod core;
pub mod debate;
pub mod heuristics;
pub mod parsing;
pub mod participant;
pub mod prompt;
pub mod synthesis;

// Re-export commonly used types
pub use config::{ConfigIssue, ConfigIssueCode, OutputFormat, Severity};
pub use core::error::DomainError;
pub use debate::{
    BudgetTable, Classification, ComplexityClassifier, ComplexityTier, DebatePhase, DebatePolicy,
    DebateSession, DepthOverride, MODERATOR, ParticipantRotationManager, PhaseRecord,
    PhaseStateMachine, PhaseStatus, Speaker, TransitionRecord, Turn, TurnBudgetScheduler,
    TurnContext, TurnType,
};
pub use heuristics::{
    ConfidenceExtractor, ConfidenceLabel, ConvergenceDetector, ConvergenceSignal,
    InterventionScheduler, MetaVerdict, ScoringStrategy,
};
pub use parsing::{ParseFailure, RobustTextParser};
pub use participant::{Capability, CapabilitySet, ParticipantArchetype, RiskMode};
pub use prompt::{ConsensusPromptInput, DebatePromptTemplate};
pub use synthesis::{
    ConsensusReport, Contradiction, DebateOutcome, EdgeCaseScenario, QuantifiedAssessment,
    Resolution, ResolutionAction, ResolutionOutcome,
};
