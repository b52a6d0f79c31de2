//! CONSENSUS and FINAL_SYNTHESIS.

use super::DebateRun;
use super::synthesis::ConsensusSynthesizer;
use crate::ports::event_sink::DebateEvent;
use council_domain::{
    Capability, ConfidenceExtractor, ConsensusPromptInput, ConsensusReport, DebatePhase,
    DebatePromptTemplate, Speaker, TurnType,
};
use serde_json::json;
use tracing::{debug, info, warn};

impl DebateRun<'_> {
    /// Final position with an explicit confidence from every capable
    /// participant.
    pub(super) async fn run_consensus(&mut self) {
        let phase = DebatePhase::Consensus;
        let threshold = self.env.policy.low_confidence_threshold;

        for name in self.names_with(Capability::FinalPosition) {
            if self.cancelled() || !self.session.can_emit(phase) {
                return;
            }
            let Some(participant) = self.participant(&name) else {
                continue;
            };
            let ctx = self.context_for(&name, phase);
            let position = match participant.state_final_position(&ctx, true).await {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => {
                    warn!("{} returned an empty final position", name);
                    continue;
                }
                Err(e) => {
                    warn!("{} failed to state a final position: {}", name, e);
                    continue;
                }
            };
            if !self
                .append(
                    phase,
                    Speaker::participant(&name),
                    TurnType::FinalPosition,
                    position.clone(),
                )
                .await
            {
                return;
            }

            let confidence = ConfidenceExtractor::extract(&position);
            debug!("{} final confidence {:.2}", name, confidence);
            if confidence < threshold {
                self.warnings.push(format!(
                    "{}: confidence {:.0}% is below the {:.0}% threshold",
                    name,
                    confidence * 100.0,
                    threshold * 100.0
                ));
            }
            self.confidences.push((name.clone(), confidence));
            self.final_positions.push((name, position));
        }
    }

    /// Compile the report, then close the transcript with one moderator turn.
    ///
    /// Returns the report and whether the emergency path produced it.
    pub(super) async fn run_final_synthesis(&mut self) -> (ConsensusReport, bool) {
        let highlights = self.digest();
        let input = ConsensusPromptInput {
            question: &self.request.question,
            final_positions: &self.final_positions,
            highlights: &highlights,
            resolutions: &self.resolutions,
            edge_cases: &self.edge_cases,
            risk_assessments: &self.risk_assessments,
            extracted_facts: &self.request.extracted_facts,
            numeric_results: self.request.precomputed_numeric_results.as_ref(),
            cross_scenario_context: self.request.cross_scenario_context.as_deref(),
        };
        let result = ConsensusSynthesizer::new(self.env.summarizer, self.env.policy)
            .synthesize(
                &input,
                self.session.transcript(),
                &self.confidences,
                &self.warnings,
            )
            .await;

        info!(
            "Consensus: confidence {:.0}%{}",
            result.report.confidence_level * 100.0,
            if result.emergency { " (emergency)" } else { "" }
        );
        self.env.event_sink.emit(DebateEvent::completed(
            "consensus_report",
            json!({
                "confidence": result.report.confidence_level,
                "emergency": result.emergency,
                "warnings": result.report.low_confidence_warnings.len(),
            }),
        ));

        self.append(
            DebatePhase::FinalSynthesis,
            Speaker::Moderator,
            TurnType::ConsensusSynthesis,
            DebatePromptTemplate::consensus_turn(&result.report),
        )
        .await;

        (result.report, result.emergency)
    }
}

#[cfg(test)]
mod tests {
    use crate::ports::participant::Participant;
    use crate::use_cases::conduct_debate::testing::{FakeParticipant, FakeSummarizer};
    use crate::use_cases::conduct_debate::{ConductDebateUseCase, DebateRequest};
    use council_domain::{
        Capability, CapabilitySet, DepthOverride, ParticipantArchetype, Speaker, TurnType,
    };
    use std::sync::Arc;

    const QUESTION: &str = "Should we expand our logistics network into Brazil?";

    #[tokio::test]
    async fn test_only_final_position_holders_close() {
        let participants: Vec<Arc<dyn Participant>> = vec![
            Arc::new(FakeParticipant::on_topic("economist")),
            Arc::new(
                FakeParticipant::on_topic("risk_officer")
                    .with_archetype(ParticipantArchetype::RiskAssessor),
            ),
        ];
        let request = DebateRequest::new(QUESTION, participants)
            .with_depth_override(Some(DepthOverride::Standard));
        let outcome = ConductDebateUseCase::new()
            .with_summarizer(Arc::new(FakeSummarizer::valid()))
            .execute(request)
            .await
            .unwrap();

        let closers: Vec<&str> = outcome
            .transcript
            .iter()
            .filter(|t| t.turn_type == TurnType::FinalPosition)
            .map(|t| t.speaker_name())
            .collect();
        assert_eq!(closers, vec!["economist"]);
        assert!(outcome.consensus.low_confidence_warnings.is_empty());
        assert_eq!(outcome.consensus.direct_answer, "Expand in two stages");
    }

    #[tokio::test]
    async fn test_transcript_ends_with_moderator_synthesis() {
        let silent = CapabilitySet::empty().with(Capability::PresentCase);
        let participants: Vec<Arc<dyn Participant>> = vec![
            Arc::new(FakeParticipant::on_topic("economist")),
            Arc::new(FakeParticipant::on_topic("observer").with_capabilities(silent)),
        ];
        let request = DebateRequest::new(QUESTION, participants)
            .with_depth_override(Some(DepthOverride::Standard));
        let outcome = ConductDebateUseCase::new().execute(request).await.unwrap();

        let last = outcome.transcript.last().unwrap();
        assert_eq!(last.speaker, Speaker::Moderator);
        assert_eq!(last.turn_type, TurnType::ConsensusSynthesis);
        assert!(last.content.starts_with("Consensus synthesis:"));
        assert!(outcome.consensus.emergency);
    }
}
