//! Contradiction verdicts.

use crate::ports::summarizer::{Summarizer, SummaryRequest, SummaryTask};
use council_domain::heuristics::lexicon::{RESOLUTION_AGREEMENT_PHRASES, count_phrase_hits};
use council_domain::{Contradiction, DebatePromptTemplate, Resolution};
use tracing::{debug, warn};

/// Turns a contradiction and its mini-debate into a [`Resolution`].
///
/// Primary path is a strict-JSON summarizer verdict; any call or parse
/// failure falls back to a lexical reading of the last response.
pub struct ResolutionSynthesizer<'a> {
    summarizer: Option<&'a dyn Summarizer>,
}

impl<'a> ResolutionSynthesizer<'a> {
    pub fn new(summarizer: Option<&'a dyn Summarizer>) -> Self {
        Self { summarizer }
    }

    /// `exchange` is the mini-transcript as `(speaker, content)` pairs.
    pub async fn resolve(
        &self,
        question: &str,
        contradiction: &Contradiction,
        exchange: &[(String, String)],
    ) -> Resolution {
        if contradiction.claims_identical() {
            return Resolution::identical_claims(contradiction.clone());
        }
        let turns_used = exchange.len();

        if let Some(summarizer) = self.summarizer {
            let request = SummaryRequest::new(
                SummaryTask::ContradictionResolution,
                DebatePromptTemplate::resolution_system(),
                DebatePromptTemplate::resolution_prompt(question, contradiction, exchange),
            );
            match summarizer.generate(&request).await {
                Ok(text) => {
                    if let Some(resolution) =
                        Resolution::parse(&text, contradiction.clone(), turns_used)
                    {
                        return resolution;
                    }
                    debug!(topic = %contradiction.topic, "Unparseable resolution verdict, using fallback");
                }
                Err(e) => {
                    warn!(topic = %contradiction.topic, "Resolution summarizer failed: {}", e);
                }
            }
        }

        Resolution::fallback(
            contradiction.clone(),
            last_response_agrees(exchange),
            turns_used,
        )
    }
}

fn last_response_agrees(exchange: &[(String, String)]) -> bool {
    exchange
        .last()
        .is_some_and(|(_, content)| count_phrase_hits(content, RESOLUTION_AGREEMENT_PHRASES) > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::summarizer::SummarizerError;
    use async_trait::async_trait;
    use council_domain::{ResolutionAction, ResolutionOutcome};
    use std::sync::Mutex;

    struct ScriptedSummarizer {
        reply: Result<String, SummarizerError>,
        calls: Mutex<usize>,
    }

    impl ScriptedSummarizer {
        fn new(reply: Result<String, SummarizerError>) -> Self {
            Self {
                reply,
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl Summarizer for ScriptedSummarizer {
        async fn generate(&self, request: &SummaryRequest) -> Result<String, SummarizerError> {
            assert_eq!(request.task, SummaryTask::ContradictionResolution);
            *self.calls.lock().unwrap() += 1;
            self.reply.clone()
        }
    }

    fn contradiction(a: &str, b: &str) -> Contradiction {
        Contradiction::new("growth", "alice", a, "bob", b)
    }

    fn exchange(last: &str) -> Vec<(String, String)> {
        vec![
            ("alice".to_string(), "Growth is 5%".to_string()),
            ("bob".to_string(), last.to_string()),
        ]
    }

    #[tokio::test]
    async fn test_identical_claims_skip_summarizer() {
        let summarizer = ScriptedSummarizer::new(Ok("{}".to_string()));
        let synth = ResolutionSynthesizer::new(Some(&summarizer));
        let r = synth
            .resolve("Q", &contradiction("Growth is 5%", "growth IS  5%"), &[])
            .await;
        assert_eq!(r.outcome, ResolutionOutcome::BothValid);
        assert_eq!(*summarizer.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_summarizer_verdict() {
        let summarizer = ScriptedSummarizer::new(Ok(
            r#"{"outcome": "agent1_correct", "explanation": "A cites data", "confidence": 0.9}"#
                .to_string(),
        ));
        let synth = ResolutionSynthesizer::new(Some(&summarizer));
        let r = synth
            .resolve("Q", &contradiction("5%", "2%"), &exchange("No, 2%"))
            .await;
        assert_eq!(r.outcome, ResolutionOutcome::Agent1Correct);
        assert_eq!(r.action, ResolutionAction::UseAgent1);
        assert_eq!(r.turns_used, 2);
    }

    #[tokio::test]
    async fn test_failure_falls_back_on_last_response() {
        let summarizer =
            ScriptedSummarizer::new(Err(SummarizerError::RequestFailed("down".to_string())));
        let synth = ResolutionSynthesizer::new(Some(&summarizer));
        let agreed = synth
            .resolve("Q", &contradiction("5%", "2%"), &exchange("Fair point, I agree it is 5%"))
            .await;
        assert_eq!(agreed.outcome, ResolutionOutcome::BothValid);
        assert_eq!(agreed.confidence, 0.6);

        let unparsed = ScriptedSummarizer::new(Ok("I think A is right".to_string()));
        let synth = ResolutionSynthesizer::new(Some(&unparsed));
        let flagged = synth
            .resolve("Q", &contradiction("5%", "2%"), &exchange("Still 2%"))
            .await;
        assert_eq!(flagged.outcome, ResolutionOutcome::NeitherValid);
        assert_eq!(flagged.action, ResolutionAction::FlagForReview);
    }

    #[tokio::test]
    async fn test_without_summarizer() {
        let synth = ResolutionSynthesizer::new(None);
        let r = synth
            .resolve("Q", &contradiction("5%", "2%"), &exchange("Still 2%"))
            .await;
        assert_eq!(r.outcome, ResolutionOutcome::NeitherValid);
        assert_eq!(r.confidence, 0.4);
    }
}
