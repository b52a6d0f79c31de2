//! EDGE_CASE and RISK_ANALYSIS.
//!
//! Failures here are contained per call: a failed participant call is
//! replaced by a short fallback turn and the phase continues.

use super::DebateRun;
use super::relevance::select_relevant;
use crate::ports::event_sink::DebateEvent;
use crate::ports::participant::ParticipantError;
use crate::ports::summarizer::{SummaryRequest, SummaryTask};
use council_domain::core::string::excerpt;
use council_domain::{
    Capability, DebatePhase, DebatePromptTemplate, EdgeCaseScenario, RiskMode, Speaker, TurnType,
};
use serde_json::json;
use tracing::{debug, info, warn};

const MIN_SCENARIO_ANALYSTS: usize = 2;
const MAX_SCENARIO_ANALYSTS: usize = 3;

impl DebateRun<'_> {
    pub(super) async fn run_edge_cases(&mut self) {
        let phase = DebatePhase::EdgeCase;
        let scenarios = self.generate_scenarios().await;
        if scenarios.is_empty() {
            return;
        }
        self.env.event_sink.emit(DebateEvent::completed(
            "edge_case_generation",
            json!({ "scenarios": scenarios.iter().map(|s| &s.name).collect::<Vec<_>>() }),
        ));

        let per_scenario = (self.session.budget().phase_remaining(phase) / scenarios.len())
            .clamp(MIN_SCENARIO_ANALYSTS, MAX_SCENARIO_ANALYSTS);

        for mut scenario in scenarios {
            if self.cancelled() || !self.session.can_emit(phase) {
                self.edge_cases.push(scenario);
                continue;
            }

            let analysts = {
                let pool = self.profiles_with(Capability::AnalyzeEdgeCase);
                select_relevant(
                    &pool,
                    &scenario.matching_text(),
                    &scenario.impacted_participants,
                    per_scenario,
                )
            };
            if analysts.is_empty() {
                warn!("No participant can analyse edge cases");
            }
            if scenario.impacted_participants.is_empty() {
                scenario.impacted_participants = analysts.clone();
            }

            for name in analysts {
                if self.cancelled() || !self.session.can_emit(phase) {
                    break;
                }
                let Some(participant) = self.participant(&name) else {
                    continue;
                };
                let ctx = self.context_for(&name, phase);
                let content = match participant.analyze_edge_case(&ctx, &scenario).await {
                    Ok(text) if !text.trim().is_empty() => text,
                    Ok(_) => format!("{} had no analysis for \"{}\".", name, scenario.name),
                    Err(e) => {
                        warn!("{} failed to analyse '{}': {}", name, scenario.name, e);
                        format!(
                            "{} could not analyse \"{}\" and defers to the other analysts.",
                            name, scenario.name
                        )
                    }
                };
                self.append(
                    phase,
                    Speaker::participant(&name),
                    TurnType::EdgeCaseAnalysis,
                    content,
                )
                .await;
            }
            self.edge_cases.push(scenario);
        }
    }

    /// Scenarios from the summarizer, or templates built from the question.
    async fn generate_scenarios(&self) -> Vec<EdgeCaseScenario> {
        let max = self.env.policy.max_edge_case_scenarios;
        if max == 0 {
            return Vec::new();
        }

        if let Some(summarizer) = self.env.summarizer {
            let request = SummaryRequest::new(
                SummaryTask::EdgeCaseGeneration,
                DebatePromptTemplate::edge_case_system(),
                DebatePromptTemplate::edge_case_prompt(
                    &self.request.question,
                    self.session.participants(),
                    &self.digest(),
                    max,
                ),
            );
            match summarizer.generate(&request).await {
                Ok(text) => {
                    let scenarios = EdgeCaseScenario::parse_list(&text);
                    if !scenarios.is_empty() {
                        debug!("Summarizer proposed {} scenarios", scenarios.len());
                        return scenarios.into_iter().take(max).collect();
                    }
                    warn!("Edge-case generation returned no usable scenarios, using templates");
                }
                Err(e) => warn!("Edge-case generation failed, using templates: {}", e),
            }
        }

        EdgeCaseScenario::fallback(&self.request.question, max)
    }

    pub(super) async fn run_risk_analysis(&mut self) {
        let phase = DebatePhase::RiskAnalysis;
        let identifiers = self.names_with(Capability::IdentifyRisks);
        if identifiers.is_empty() {
            info!("No participant identifies risks, nothing to assess");
            return;
        }

        for name in identifiers {
            if self.cancelled() || !self.session.can_emit(phase) {
                return;
            }
            let Some(identified) = self.identify_risks(&name).await else {
                let placeholder = format!(
                    "{} could not complete the risk review; risks remain unassessed for this participant.",
                    name
                );
                self.append(
                    phase,
                    Speaker::participant(&name),
                    TurnType::RiskIdentification,
                    placeholder,
                )
                .await;
                continue;
            };
            if !self
                .append(
                    phase,
                    Speaker::participant(&name),
                    TurnType::RiskIdentification,
                    identified.clone(),
                )
                .await
            {
                return;
            }
            self.risk_assessments.push((name.clone(), identified.clone()));
            self.assess_likelihood(&name, &identified).await;
        }
    }

    /// Standard prompt first; one neutral retry after a content rejection.
    async fn identify_risks(&self, name: &str) -> Option<String> {
        let participant = self.participant(name)?;
        let ctx = self.context_for(name, DebatePhase::RiskAnalysis);
        let result = match participant.identify_risks(&ctx, RiskMode::Standard).await {
            Err(ParticipantError::ContentRejected(reason)) => {
                warn!("{}: risk prompt rejected ({}), retrying in neutral mode", name, reason);
                participant.identify_risks(&ctx, RiskMode::Neutral).await
            }
            other => other,
        };
        match result {
            Ok(text) if !text.trim().is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                warn!("{} failed to identify risks: {}", name, e);
                None
            }
        }
    }

    /// Likelihood assessments by the most relevant other participants
    async fn assess_likelihood(&mut self, identifier: &str, risks: &str) {
        let phase = DebatePhase::RiskAnalysis;
        let assessors = {
            let pool: Vec<_> = self
                .profiles_with(Capability::AssessRiskLikelihood)
                .into_iter()
                .filter(|p| p.name != identifier)
                .collect();
            select_relevant(&pool, risks, &[], self.env.policy.risk_assessors)
        };
        let risk = excerpt(risks, 600);

        for name in assessors {
            if self.cancelled() || !self.session.can_emit(phase) {
                return;
            }
            let Some(participant) = self.participant(&name) else {
                continue;
            };
            let ctx = self.context_for(&name, phase);
            let content = match participant.assess_risk_likelihood(&ctx, &risk).await {
                Ok(text) if !text.trim().is_empty() => {
                    self.risk_assessments.push((name.clone(), text.clone()));
                    text
                }
                Ok(_) => format!("{} gave no likelihood estimate.", name),
                Err(e) => {
                    warn!("{} failed to assess risks from {}: {}", name, identifier, e);
                    format!("{} could not estimate the likelihood of these risks.", name)
                }
            };
            self.append(phase, Speaker::participant(&name), TurnType::RiskAssessment, content)
                .await;
        }
    }
}
