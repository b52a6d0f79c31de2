//! Consensus compilation with a guaranteed emergency path.

use crate::ports::summarizer::{Summarizer, SummaryRequest, SummaryTask};
use council_domain::core::string::excerpt;
use council_domain::{
    ConfidenceLabel, ConsensusPromptInput, ConsensusReport, DebatePolicy, DebatePromptTemplate,
    QuantifiedAssessment, Turn,
};
use tracing::{info, warn};

pub struct SynthesisResult {
    pub report: ConsensusReport,
    pub emergency: bool,
}

/// Compiles the [`ConsensusReport`].
///
/// | Summarizer result | Report |
/// |-------------------|--------|
/// | parseable JSON | parsed report |
/// | unparseable text | conservative report keeping the raw text |
/// | error, or no summarizer | emergency synthesis from the transcript |
pub struct ConsensusSynthesizer<'a> {
    summarizer: Option<&'a dyn Summarizer>,
    low_threshold: f64,
    high_threshold: f64,
}

impl<'a> ConsensusSynthesizer<'a> {
    pub fn new(summarizer: Option<&'a dyn Summarizer>, policy: &DebatePolicy) -> Self {
        Self {
            summarizer,
            low_threshold: policy.low_confidence_threshold,
            high_threshold: policy.high_confidence_threshold,
        }
    }

    /// `confidences` are the extracted final-position confidences,
    /// `warnings` are appended to the report verbatim.
    pub async fn synthesize(
        &self,
        input: &ConsensusPromptInput<'_>,
        transcript: &[Turn],
        confidences: &[(String, f64)],
        warnings: &[String],
    ) -> SynthesisResult {
        let (mut report, emergency) = match self.summarizer {
            Some(summarizer) => {
                let request = SummaryRequest::new(
                    SummaryTask::ConsensusSynthesis,
                    DebatePromptTemplate::consensus_system(),
                    DebatePromptTemplate::consensus_prompt(input),
                );
                match summarizer.generate(&request).await {
                    Ok(text) => match ConsensusReport::parse(&text) {
                        Some(report) => (report, false),
                        None => {
                            warn!("Consensus synthesis was not valid JSON, keeping raw text");
                            (ConsensusReport::conservative(&text), false)
                        }
                    },
                    Err(e) => {
                        warn!("Consensus summarizer failed, using emergency synthesis: {}", e);
                        (self.emergency(input, transcript, confidences), true)
                    }
                }
            }
            None => {
                info!("No summarizer configured, using emergency synthesis");
                (self.emergency(input, transcript, confidences), true)
            }
        };

        report.low_confidence_warnings.extend(warnings.iter().cloned());
        SynthesisResult { report, emergency }
    }

    /// Deterministic report from in-memory transcript statistics only
    pub fn emergency(
        &self,
        input: &ConsensusPromptInput<'_>,
        transcript: &[Turn],
        confidences: &[(String, f64)],
    ) -> ConsensusReport {
        let mut speakers: Vec<&str> = Vec::new();
        for turn in transcript.iter().filter(|t| !t.is_moderator()) {
            if !speakers.contains(&turn.speaker_name()) {
                speakers.push(turn.speaker_name());
            }
        }

        let mean_confidence = if confidences.is_empty() {
            council_domain::heuristics::NEUTRAL_CONFIDENCE
        } else {
            confidences.iter().map(|(_, c)| c).sum::<f64>() / confidences.len() as f64
        };
        let label = ConfidenceLabel::for_value(mean_confidence, self.low_threshold, self.high_threshold);

        let leading = input.final_positions.iter().max_by(|a, b| {
            let ca = confidence_of(confidences, &a.0);
            let cb = confidence_of(confidences, &b.0);
            ca.total_cmp(&cb)
        });
        let direct_answer = match leading {
            Some((name, position)) => format!(
                "Emergency synthesis of {} final positions after {} turns. Most confident position ({}): {}",
                input.final_positions.len(),
                transcript.len(),
                name,
                excerpt(position, 200)
            ),
            None if speakers.is_empty() => format!(
                "Emergency synthesis: no participant contributions were recorded for \"{}\".",
                input.question
            ),
            None => format!(
                "Emergency synthesis after {} turns among {}; no final positions were recorded.",
                transcript.len(),
                speakers.join(", ")
            ),
        };

        let key_findings = speakers
            .iter()
            .filter_map(|name| {
                let turns: Vec<&Turn> = transcript
                    .iter()
                    .filter(|t| !t.is_moderator() && t.speaker_name() == *name)
                    .collect();
                turns.last().map(|last| {
                    format!(
                        "{} ({} turns): {}",
                        name,
                        turns.len(),
                        excerpt(&last.content, 160)
                    )
                })
            })
            .collect();

        ConsensusReport {
            direct_answer,
            quantified_assessment: QuantifiedAssessment {
                metric_type: "mean_confidence".to_string(),
                value: format!("{:.0}%", mean_confidence * 100.0),
                reasoning: "Mean confidence extracted from final positions.".to_string(),
            },
            key_findings,
            agreements: Vec::new(),
            disagreements: Vec::new(),
            confidence_level: mean_confidence,
            recommendation: format!(
                "Treat this result as {} confidence and review the transcript before acting.",
                label
            ),
            risks_and_mitigations: input
                .risk_assessments
                .iter()
                .map(|(name, text)| format!("{}: {}", name, excerpt(text, 160)))
                .collect(),
            next_steps: vec!["Re-run the synthesis once a summarizer is available.".to_string()],
            low_confidence_warnings: Vec::new(),
            raw_synthesis: None,
            emergency: true,
        }
    }
}

fn confidence_of(confidences: &[(String, f64)], name: &str) -> f64 {
    confidences
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, c)| *c)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::summarizer::SummarizerError;
    use async_trait::async_trait;
    use council_domain::{DebatePhase, Speaker, TurnType};

    struct FixedSummarizer(Result<String, SummarizerError>);

    #[async_trait]
    impl Summarizer for FixedSummarizer {
        async fn generate(&self, _request: &SummaryRequest) -> Result<String, SummarizerError> {
            self.0.clone()
        }
    }

    fn transcript() -> Vec<Turn> {
        vec![
            Turn::new(1, Speaker::participant("alice"), DebatePhase::Opening, TurnType::Opening, "Expand now"),
            Turn::new(2, Speaker::participant("bob"), DebatePhase::Opening, TurnType::Opening, "Wait"),
            Turn::new(3, Speaker::Moderator, DebatePhase::ChallengeDefense, TurnType::Redirect, "Focus"),
            Turn::new(4, Speaker::participant("alice"), DebatePhase::Consensus, TurnType::FinalPosition, "Expand, 80% confident"),
        ]
    }

    fn input<'a>(positions: &'a [(String, String)]) -> ConsensusPromptInput<'a> {
        ConsensusPromptInput {
            question: "Expand to Brazil?",
            final_positions: positions,
            highlights: &[],
            resolutions: &[],
            edge_cases: &[],
            risk_assessments: &[],
            extracted_facts: &[],
            numeric_results: None,
            cross_scenario_context: None,
        }
    }

    #[tokio::test]
    async fn test_parsed_report_gets_warnings() {
        let summarizer = FixedSummarizer(Ok(
            r#"{"direct_answer": "Expand", "confidence_level": 0.7}"#.to_string(),
        ));
        let synth = ConsensusSynthesizer::new(Some(&summarizer), &DebatePolicy::default());
        let positions = vec![("alice".to_string(), "Expand".to_string())];
        let warnings = vec!["bob: confidence 25% is below the 40% threshold".to_string()];
        let result = synth
            .synthesize(&input(&positions), &transcript(), &[], &warnings)
            .await;
        assert!(!result.emergency);
        assert_eq!(result.report.direct_answer, "Expand");
        assert_eq!(result.report.low_confidence_warnings, warnings);
    }

    #[tokio::test]
    async fn test_malformed_output_is_conservative() {
        let summarizer = FixedSummarizer(Ok("We should probably expand.".to_string()));
        let synth = ConsensusSynthesizer::new(Some(&summarizer), &DebatePolicy::default());
        let result = synth.synthesize(&input(&[]), &transcript(), &[], &[]).await;
        assert!(!result.emergency);
        assert_eq!(result.report.confidence_level, 0.5);
        assert_eq!(
            result.report.raw_synthesis.as_deref(),
            Some("We should probably expand.")
        );
    }

    #[tokio::test]
    async fn test_failure_builds_emergency_report() {
        let summarizer = FixedSummarizer(Err(SummarizerError::Timeout));
        let synth = ConsensusSynthesizer::new(Some(&summarizer), &DebatePolicy::default());
        let positions = vec![
            ("alice".to_string(), "Expand, 80% confident".to_string()),
            ("bob".to_string(), "Wait, 30% confident".to_string()),
        ];
        let confidences = vec![("alice".to_string(), 0.8), ("bob".to_string(), 0.3)];
        let result = synth
            .synthesize(&input(&positions), &transcript(), &confidences, &[])
            .await;
        assert!(result.emergency);
        let report = result.report;
        assert!(report.emergency);
        assert!(report.direct_answer.contains("(alice)"));
        assert!((report.confidence_level - 0.55).abs() < 1e-9);
        assert_eq!(report.key_findings.len(), 2);
        assert!(report.key_findings[0].starts_with("alice (2 turns)"));
        assert!(!report.render_markdown("Q", 0.4, 0.65).is_empty());
    }

    #[tokio::test]
    async fn test_emergency_with_empty_transcript() {
        let synth = ConsensusSynthesizer::new(None, &DebatePolicy::default());
        let result = synth.synthesize(&input(&[]), &[], &[], &[]).await;
        assert!(result.emergency);
        assert!(result.report.direct_answer.contains("no participant contributions"));
    }
}
