//! Participant port
//!
//! A participant is an opaque text-generation capability taking part in the
//! debate. Implementations (adapters) live in the infrastructure layer.

use async_trait::async_trait;
use council_domain::{Capability, CapabilitySet, EdgeCaseScenario, RiskMode, TurnContext};
use thiserror::Error;

/// Errors a participant can return for a single request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParticipantError {
    #[error("Operation not supported: {0}")]
    Unsupported(Capability),

    /// The participant refused the framing (e.g. a content filter); the
    /// engine may retry once in neutral mode.
    #[error("Content rejected: {0}")]
    ContentRejected(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,
}

impl ParticipantError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, ParticipantError::Unsupported(_))
    }
}

/// One debate participant.
///
/// Every operation defaults to [`ParticipantError::Unsupported`], so an
/// implementation only overrides what it can do and advertises it through
/// [`capabilities`](Participant::capabilities).
#[async_trait]
pub trait Participant: Send + Sync {
    /// Unique name within a debate
    fn name(&self) -> &str;

    fn capabilities(&self) -> CapabilitySet;

    /// Domain terms used to match the participant to scenarios and risks
    fn focus_terms(&self) -> Vec<String> {
        Vec::new()
    }

    async fn present_case(&self, _ctx: &TurnContext) -> Result<String, ParticipantError> {
        Err(ParticipantError::Unsupported(Capability::PresentCase))
    }

    async fn challenge(
        &self,
        _ctx: &TurnContext,
        _target: &str,
        _claim: &str,
    ) -> Result<String, ParticipantError> {
        Err(ParticipantError::Unsupported(Capability::Challenge))
    }

    async fn respond(
        &self,
        _ctx: &TurnContext,
        _challenger: &str,
        _challenge: &str,
    ) -> Result<String, ParticipantError> {
        Err(ParticipantError::Unsupported(Capability::Respond))
    }

    async fn analyze_edge_case(
        &self,
        _ctx: &TurnContext,
        _scenario: &EdgeCaseScenario,
    ) -> Result<String, ParticipantError> {
        Err(ParticipantError::Unsupported(Capability::AnalyzeEdgeCase))
    }

    async fn identify_risks(
        &self,
        _ctx: &TurnContext,
        _mode: RiskMode,
    ) -> Result<String, ParticipantError> {
        Err(ParticipantError::Unsupported(Capability::IdentifyRisks))
    }

    async fn assess_risk_likelihood(
        &self,
        _ctx: &TurnContext,
        _risk: &str,
    ) -> Result<String, ParticipantError> {
        Err(ParticipantError::Unsupported(Capability::AssessRiskLikelihood))
    }

    async fn state_final_position(
        &self,
        _ctx: &TurnContext,
        _require_confidence: bool,
    ) -> Result<String, ParticipantError> {
        Err(ParticipantError::Unsupported(Capability::FinalPosition))
    }
}
