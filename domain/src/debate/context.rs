//! What a participant sees when asked for a turn.

use super::phase::DebatePhase;
use super::turn::Turn;
use serde::{Deserialize, Serialize};

/// Snapshot handed to a participant with every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnContext {
    pub question: String,
    pub phase: DebatePhase,
    /// Most recent turns, oldest first
    pub recent: Vec<Turn>,
    /// This participant's report from an earlier analysis stage
    pub prior_report: Option<String>,
    pub extracted_facts: Vec<String>,
    /// Option the participant argues for during ADVOCACY
    pub assigned_option: Option<String>,
    pub cross_scenario_context: Option<String>,
    /// Extra instruction from the moderator (refocus, cross-examination target)
    pub directive: Option<String>,
}

impl TurnContext {
    pub fn new(question: impl Into<String>, phase: DebatePhase) -> Self {
        Self {
            question: question.into(),
            phase,
            recent: Vec::new(),
            prior_report: None,
            extracted_facts: Vec::new(),
            assigned_option: None,
            cross_scenario_context: None,
            directive: None,
        }
    }

    pub fn with_recent(mut self, recent: Vec<Turn>) -> Self {
        self.recent = recent;
        self
    }

    pub fn with_prior_report(mut self, report: Option<String>) -> Self {
        self.prior_report = report;
        self
    }

    pub fn with_extracted_facts(mut self, facts: Vec<String>) -> Self {
        self.extracted_facts = facts;
        self
    }

    pub fn with_assigned_option(mut self, option: impl Into<String>) -> Self {
        self.assigned_option = Some(option.into());
        self
    }

    pub fn with_cross_scenario_context(mut self, context: Option<String>) -> Self {
        self.cross_scenario_context = context;
        self
    }

    pub fn with_directive(mut self, directive: impl Into<String>) -> Self {
        self.directive = Some(directive.into());
        self
    }
}
