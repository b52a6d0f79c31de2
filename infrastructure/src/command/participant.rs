//! Participant adapter backed by an external program.

use super::runner::{CommandError, CommandSpec};
use async_trait::async_trait;
use council_application::ports::participant::{Participant, ParticipantError};
use council_domain::{
    Capability, CapabilitySet, DebatePromptTemplate, EdgeCaseScenario, RiskMode, TurnContext,
};
use tracing::debug;

/// A debate participant answering through a local command.
///
/// Each request writes the participant's system prompt followed by the turn
/// prompt to the program's stdin. The program also sees
/// `COUNCIL_PARTICIPANT`, `COUNCIL_OPERATION` and `COUNCIL_PHASE` in its
/// environment.
pub struct CommandParticipant {
    name: String,
    capabilities: CapabilitySet,
    focus_terms: Vec<String>,
    spec: CommandSpec,
}

impl CommandParticipant {
    pub fn new(name: impl Into<String>, capabilities: CapabilitySet, spec: CommandSpec) -> Self {
        Self {
            name: name.into(),
            capabilities,
            focus_terms: Vec::new(),
            spec,
        }
    }

    pub fn with_focus_terms(mut self, terms: Vec<String>) -> Self {
        self.focus_terms = terms;
        self
    }

    pub fn spec(&self) -> &CommandSpec {
        &self.spec
    }

    async fn ask(
        &self,
        capability: Capability,
        ctx: &TurnContext,
        prompt: String,
    ) -> Result<String, ParticipantError> {
        if !self.capabilities.contains(capability) {
            return Err(ParticipantError::Unsupported(capability));
        }

        let input = format!(
            "{}\n\n{}",
            DebatePromptTemplate::participant_system(&self.name, &self.focus_terms),
            prompt
        );
        let env = [
            ("COUNCIL_PARTICIPANT", self.name.clone()),
            ("COUNCIL_OPERATION", capability.as_str().to_string()),
            ("COUNCIL_PHASE", ctx.phase.as_str().to_string()),
        ];
        debug!("{}: {} ({} bytes)", self.name, capability, input.len());

        let answer = self.spec.run(&input, &env).await.map_err(to_participant_error)?;
        if answer.is_empty() {
            return Err(ParticipantError::RequestFailed(format!(
                "{} produced no output",
                self.spec.program
            )));
        }
        Ok(answer)
    }
}

fn to_participant_error(error: CommandError) -> ParticipantError {
    match error {
        CommandError::Timeout { .. } => ParticipantError::Timeout,
        CommandError::Rejected { stderr, .. } => ParticipantError::ContentRejected(stderr),
        other => ParticipantError::RequestFailed(other.to_string()),
    }
}

#[async_trait]
impl Participant for CommandParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    fn focus_terms(&self) -> Vec<String> {
        self.focus_terms.clone()
    }

    async fn present_case(&self, ctx: &TurnContext) -> Result<String, ParticipantError> {
        self.ask(
            Capability::PresentCase,
            ctx,
            DebatePromptTemplate::present_case(ctx),
        )
        .await
    }

    async fn challenge(
        &self,
        ctx: &TurnContext,
        target: &str,
        claim: &str,
    ) -> Result<String, ParticipantError> {
        self.ask(
            Capability::Challenge,
            ctx,
            DebatePromptTemplate::challenge(ctx, target, claim),
        )
        .await
    }

    async fn respond(
        &self,
        ctx: &TurnContext,
        challenger: &str,
        challenge: &str,
    ) -> Result<String, ParticipantError> {
        self.ask(
            Capability::Respond,
            ctx,
            DebatePromptTemplate::respond(ctx, challenger, challenge),
        )
        .await
    }

    async fn analyze_edge_case(
        &self,
        ctx: &TurnContext,
        scenario: &EdgeCaseScenario,
    ) -> Result<String, ParticipantError> {
        self.ask(
            Capability::AnalyzeEdgeCase,
            ctx,
            DebatePromptTemplate::analyze_edge_case(ctx, scenario),
        )
        .await
    }

    async fn identify_risks(
        &self,
        ctx: &TurnContext,
        mode: RiskMode,
    ) -> Result<String, ParticipantError> {
        self.ask(
            Capability::IdentifyRisks,
            ctx,
            DebatePromptTemplate::identify_risks(ctx, mode),
        )
        .await
    }

    async fn assess_risk_likelihood(
        &self,
        ctx: &TurnContext,
        risk: &str,
    ) -> Result<String, ParticipantError> {
        self.ask(
            Capability::AssessRiskLikelihood,
            ctx,
            DebatePromptTemplate::assess_risk_likelihood(ctx, risk),
        )
        .await
    }

    async fn state_final_position(
        &self,
        ctx: &TurnContext,
        require_confidence: bool,
    ) -> Result<String, ParticipantError> {
        self.ask(
            Capability::FinalPosition,
            ctx,
            DebatePromptTemplate::final_position(ctx, require_confidence),
        )
        .await
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use council_domain::DebatePhase;

    fn participant(script: &str, capabilities: CapabilitySet) -> CommandParticipant {
        let spec = CommandSpec::new("sh")
            .with_args(vec!["-c".to_string(), script.to_string()])
            .with_rejection_exit_code(3);
        CommandParticipant::new("economist", capabilities, spec)
    }

    fn ctx() -> TurnContext {
        TurnContext::new("Should we enter Brazil?", DebatePhase::Opening)
    }

    #[tokio::test]
    async fn test_prompt_reaches_the_program() {
        let p = participant("cat", CapabilitySet::all());
        let answer = p.present_case(&ctx()).await.unwrap();
        assert!(answer.starts_with("You are economist"));
        assert!(answer.contains("Question: Should we enter Brazil?"));
    }

    #[tokio::test]
    async fn test_operation_is_in_the_environment() {
        let p = participant("printf '%s/%s' \"$COUNCIL_OPERATION\" \"$COUNCIL_PHASE\"", CapabilitySet::all());
        let answer = p.challenge(&ctx(), "engineer", "costs are low").await.unwrap();
        assert_eq!(answer, "challenge/opening");
    }

    #[tokio::test]
    async fn test_undeclared_capability_is_unsupported() {
        let caps = CapabilitySet::empty().with(Capability::PresentCase);
        let p = participant("cat", caps);
        let err = p.identify_risks(&ctx(), RiskMode::Standard).await.unwrap_err();
        assert_eq!(err, ParticipantError::Unsupported(Capability::IdentifyRisks));
    }

    #[tokio::test]
    async fn test_rejection_maps_to_content_rejected() {
        let p = participant("echo 'unsafe framing' >&2; exit 3", CapabilitySet::all());
        let err = p.identify_risks(&ctx(), RiskMode::Standard).await.unwrap_err();
        assert_eq!(err, ParticipantError::ContentRejected("unsafe framing".to_string()));
    }

    #[tokio::test]
    async fn test_empty_answer_is_a_failure() {
        let p = participant("cat >/dev/null", CapabilitySet::all());
        let err = p.present_case(&ctx()).await.unwrap_err();
        assert!(matches!(err, ParticipantError::RequestFailed(_)));
    }
}
