//! Input and error types for the ConductDebate use case.

use crate::ports::participant::Participant;
use council_domain::{Contradiction, DepthOverride};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Input validation failures.
///
/// Once a debate has started it always produces a `DebateOutcome`; these
/// errors are only returned before the first turn.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConductDebateError {
    #[error("No participants provided")]
    NoParticipants,

    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Duplicate participant name: {0}")]
    DuplicateParticipant(String),

    #[error("Invalid debate policy: {0}")]
    InvalidPolicy(String),
}

/// Input for the ConductDebate use case
#[derive(Clone)]
pub struct DebateRequest {
    pub question: String,
    /// Registration order is the tie-breaker everywhere
    pub participants: Vec<Arc<dyn Participant>>,
    pub contradictions: Vec<Contradiction>,
    /// Earlier per-participant reports, keyed by participant name
    pub prior_reports: BTreeMap<String, String>,
    pub extracted_facts: Vec<String>,
    pub depth_override: Option<DepthOverride>,
    pub precomputed_numeric_results: Option<Value>,
    pub cross_scenario_context: Option<String>,
    /// Identifies this engine run in live-log entries
    pub engine_id: String,
    pub scenario_id: Option<String>,
    pub scenario_name: Option<String>,
}

impl DebateRequest {
    pub fn new(question: impl Into<String>, participants: Vec<Arc<dyn Participant>>) -> Self {
        Self {
            question: question.into(),
            participants,
            contradictions: Vec::new(),
            prior_reports: BTreeMap::new(),
            extracted_facts: Vec::new(),
            depth_override: None,
            precomputed_numeric_results: None,
            cross_scenario_context: None,
            engine_id: "council".to_string(),
            scenario_id: None,
            scenario_name: None,
        }
    }

    pub fn with_contradictions(mut self, contradictions: Vec<Contradiction>) -> Self {
        self.contradictions = contradictions;
        self
    }

    pub fn with_prior_report(mut self, participant: impl Into<String>, report: impl Into<String>) -> Self {
        self.prior_reports.insert(participant.into(), report.into());
        self
    }

    pub fn with_extracted_facts(mut self, facts: Vec<String>) -> Self {
        self.extracted_facts = facts;
        self
    }

    pub fn with_depth_override(mut self, depth: Option<DepthOverride>) -> Self {
        self.depth_override = depth;
        self
    }

    pub fn with_numeric_results(mut self, results: Value) -> Self {
        self.precomputed_numeric_results = Some(results);
        self
    }

    pub fn with_cross_scenario_context(mut self, context: impl Into<String>) -> Self {
        self.cross_scenario_context = Some(context.into());
        self
    }

    pub fn with_engine_id(mut self, engine_id: impl Into<String>) -> Self {
        self.engine_id = engine_id.into();
        self
    }

    pub fn with_scenario(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.scenario_id = Some(id.into());
        self.scenario_name = Some(name.into());
        self
    }

    /// Reject empty questions and empty or duplicate participant lists
    pub fn validate(&self) -> Result<(), ConductDebateError> {
        if self.question.trim().is_empty() {
            return Err(ConductDebateError::EmptyQuestion);
        }
        if self.participants.is_empty() {
            return Err(ConductDebateError::NoParticipants);
        }
        let mut seen = std::collections::HashSet::new();
        for participant in &self.participants {
            if !seen.insert(participant.name()) {
                return Err(ConductDebateError::DuplicateParticipant(
                    participant.name().to_string(),
                ));
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for DebateRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebateRequest")
            .field("question", &self.question)
            .field(
                "participants",
                &self.participants.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .field("contradictions", &self.contradictions.len())
            .field("depth_override", &self.depth_override)
            .finish_non_exhaustive()
    }
}
