//! Conduct Debate use case
//!
//! Drives one debate through its phases:
//!
//! ```text
//! OPENING → [ADVOCACY → CROSS_EXAMINATION] → CHALLENGE_DEFENSE
//!         → [EDGE_CASE] → [RISK_ANALYSIS] → CONSENSUS → FINAL_SYNTHESIS → DONE
//! ```
//!
//! Every participant and summarizer call is awaited before the next one is
//! made. Once input validation passed, [`ConductDebateUseCase::execute`]
//! always yields a [`DebateOutcome`].

mod challenge;
mod closing;
mod exploration;
mod opening;
mod relevance;
pub mod resolution;
pub mod synthesis;
mod types;

#[cfg(test)]
mod testing;

pub use resolution::ResolutionSynthesizer;
pub use synthesis::{ConsensusSynthesizer, SynthesisResult};
pub use types::{ConductDebateError, DebateRequest};

use crate::config::ExecutionParams;
use crate::ports::event_sink::{DebateEvent, DebateEventSink, NoEventSink};
use crate::ports::live_log::{LiveLog, LiveLogEntry, NoLiveLog};
use crate::ports::participant::Participant;
use crate::ports::summarizer::Summarizer;
use council_domain::{
    BudgetTable, Capability, CapabilitySet, ComplexityClassifier, ConsensusReport,
    ConvergenceDetector, DebateOutcome, DebatePhase, DebatePolicy, DebateSession,
    EdgeCaseScenario, InterventionScheduler, PhaseStateMachine, Resolution, Speaker, Turn,
    TurnContext, TurnType,
};
use relevance::ParticipantProfile;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Use case for running one debate
pub struct ConductDebateUseCase {
    summarizer: Option<Arc<dyn Summarizer>>,
    policy: DebatePolicy,
    params: ExecutionParams,
    event_sink: Arc<dyn DebateEventSink>,
    live_log: Arc<dyn LiveLog>,
    cancellation: Option<CancellationToken>,
}

impl Default for ConductDebateUseCase {
    fn default() -> Self {
        Self::new()
    }
}

impl ConductDebateUseCase {
    pub fn new() -> Self {
        Self {
            summarizer: None,
            policy: DebatePolicy::default(),
            params: ExecutionParams::default(),
            event_sink: Arc::new(NoEventSink),
            live_log: Arc::new(NoLiveLog),
            cancellation: None,
        }
    }

    pub fn with_summarizer(mut self, summarizer: Arc<dyn Summarizer>) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub fn with_policy(mut self, policy: DebatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_params(mut self, params: ExecutionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn DebateEventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    pub fn with_live_log(mut self, live_log: Arc<dyn LiveLog>) -> Self {
        self.live_log = live_log;
        self
    }

    /// Set a cancellation token; once cancelled no further participant turn
    /// is requested and the debate jumps to FINAL_SYNTHESIS.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn policy(&self) -> &DebatePolicy {
        &self.policy
    }

    pub async fn execute(&self, request: DebateRequest) -> Result<DebateOutcome, ConductDebateError> {
        request.validate()?;

        let issues = self.policy.validate();
        if !issues.is_empty() {
            let messages: Vec<&str> = issues.iter().map(|i| i.message.as_str()).collect();
            return Err(ConductDebateError::InvalidPolicy(messages.join("; ")));
        }

        let classification =
            ComplexityClassifier::classify(&request.question, request.depth_override);
        let mut table = classification.budget.clone();
        if let Some(total) = self.policy.total_budget_override {
            table = table.with_total(total);
        }

        info!(
            "Starting debate: tier={}, budget={}, participants={}",
            table.tier,
            table.total,
            request.participants.len()
        );
        self.event_sink.emit(DebateEvent::completed(
            "classification",
            json!({
                "tier": table.tier.as_str(),
                "total_budget": table.total,
                "score": classification.score,
                "overridden": classification.overridden,
            }),
        ));

        let run = DebateRun::new(
            &request,
            &table,
            RunEnv {
                policy: &self.policy,
                params: &self.params,
                summarizer: self.summarizer.as_deref(),
                event_sink: self.event_sink.as_ref(),
                live_log: self.live_log.as_ref(),
                cancellation: self.cancellation.as_ref(),
            },
        );
        Ok(run.run().await)
    }
}

/// Run one debate with default policy and parameters.
pub async fn conduct_debate(
    request: DebateRequest,
    summarizer: Option<Arc<dyn Summarizer>>,
    event_sink: Arc<dyn DebateEventSink>,
) -> Result<DebateOutcome, ConductDebateError> {
    let mut use_case = ConductDebateUseCase::new().with_event_sink(event_sink);
    if let Some(summarizer) = summarizer {
        use_case = use_case.with_summarizer(summarizer);
    }
    use_case.execute(request).await
}

/// Collaborators borrowed from the use case for one run
#[derive(Clone, Copy)]
struct RunEnv<'a> {
    policy: &'a DebatePolicy,
    params: &'a ExecutionParams,
    summarizer: Option<&'a dyn Summarizer>,
    event_sink: &'a dyn DebateEventSink,
    live_log: &'a dyn LiveLog,
    cancellation: Option<&'a CancellationToken>,
}

/// State of one debate; lives exactly as long as one `execute` call.
struct DebateRun<'a> {
    env: RunEnv<'a>,
    request: &'a DebateRequest,
    started: Instant,
    /// Phases of this tier, in order
    phases: Vec<DebatePhase>,
    min_challenge_rounds: usize,
    /// Turns kept free for CONSENSUS and FINAL_SYNTHESIS
    closing_reserve: usize,
    profiles: Vec<ParticipantProfile>,
    session: DebateSession,
    machine: PhaseStateMachine,
    interventions: InterventionScheduler,
    convergence: ConvergenceDetector,
    resolutions: Vec<Resolution>,
    edge_cases: Vec<EdgeCaseScenario>,
    final_positions: Vec<(String, String)>,
    risk_assessments: Vec<(String, String)>,
    confidences: Vec<(String, f64)>,
    warnings: Vec<String>,
    /// Challenger and challenge text, keyed by the challenged participant
    pending_challenges: HashMap<String, (String, String)>,
    warned_missing: HashSet<(String, Capability)>,
    truncated: bool,
    early_exit_reason: Option<String>,
}

impl<'a> DebateRun<'a> {
    fn new(request: &'a DebateRequest, table: &BudgetTable, env: RunEnv<'a>) -> Self {
        let names: Vec<String> = request
            .participants
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        let profiles = request
            .participants
            .iter()
            .map(|p| {
                ParticipantProfile::new(
                    p.name(),
                    &p.focus_terms(),
                    request.prior_reports.get(p.name()).map(String::as_str),
                )
            })
            .collect();
        let closers = request
            .participants
            .iter()
            .filter(|p| p.capabilities().contains(Capability::FinalPosition))
            .count();
        let closing_reserve = closers.min(table.allocation(DebatePhase::Consensus))
            + table.allocation(DebatePhase::FinalSynthesis);

        Self {
            env,
            request,
            started: Instant::now(),
            phases: table.phase_sequence(),
            min_challenge_rounds: table.min_challenge_rounds,
            closing_reserve,
            profiles,
            session: DebateSession::new(request.question.clone(), table, names),
            machine: PhaseStateMachine::new(table.phase_sequence()),
            interventions: InterventionScheduler::new(&request.question, env.policy),
            convergence: ConvergenceDetector::new(env.policy, table.tier),
            resolutions: Vec::new(),
            edge_cases: Vec::new(),
            final_positions: Vec::new(),
            risk_assessments: Vec::new(),
            confidences: Vec::new(),
            warnings: Vec::new(),
            pending_challenges: HashMap::new(),
            warned_missing: HashSet::new(),
            truncated: false,
            early_exit_reason: None,
        }
    }

    async fn run(mut self) -> DebateOutcome {
        self.session.enter_phase(DebatePhase::Opening);
        self.env
            .event_sink
            .emit(DebateEvent::started(DebatePhase::Opening.as_str(), json!({})));

        self.run_phases().await;

        let reason = if self.cancelled() {
            info!("Debate cancelled, jumping to final synthesis");
            self.truncated = true;
            Some("cancelled")
        } else {
            None
        };
        self.transition(DebatePhase::FinalSynthesis, reason);
        let (consensus, emergency) = self.run_final_synthesis().await;
        self.transition(DebatePhase::Done, None);

        self.into_outcome(consensus, emergency)
    }

    async fn run_phases(&mut self) {
        self.run_opening().await;
        if self.cancelled() {
            return;
        }

        if self.tier_includes(DebatePhase::Advocacy) {
            self.transition(DebatePhase::Advocacy, None);
            self.run_advocacy().await;
            if self.cancelled() {
                return;
            }
            self.transition(DebatePhase::CrossExamination, None);
            self.run_cross_examination().await;
            if self.cancelled() {
                return;
            }
        }

        self.transition(DebatePhase::ChallengeDefense, None);
        self.run_challenge_defense().await;
        if self.cancelled() {
            return;
        }

        let policy = self.env.policy;
        if self
            .session
            .budget()
            .near_exhaustion(policy.circuit_breaker_fraction)
        {
            info!(
                "Circuit breaker: {}/{} turns consumed, skipping to consensus",
                self.session.budget().total_consumed(),
                self.session.budget().total_budget()
            );
            self.truncated = true;
            self.transition(DebatePhase::Consensus, Some("circuit breaker"));
        } else {
            self.transition(DebatePhase::EdgeCase, None);
            self.run_edge_cases().await;
            if self.cancelled() {
                return;
            }

            if self.session.budget().near_exhaustion(policy.risk_skip_fraction) {
                info!("Skipping risk analysis near budget exhaustion");
                self.transition(DebatePhase::Consensus, Some("risk analysis skipped"));
            } else {
                self.transition(DebatePhase::RiskAnalysis, None);
                self.run_risk_analysis().await;
                if self.cancelled() {
                    return;
                }
                self.transition(DebatePhase::Consensus, None);
            }
        }

        self.run_consensus().await;
    }

    fn into_outcome(self, consensus: ConsensusReport, emergency: bool) -> DebateOutcome {
        let policy = self.env.policy;
        let final_report = consensus.render_markdown(
            &self.request.question,
            policy.low_confidence_threshold,
            policy.high_confidence_threshold,
        );
        let participant_turn_counts: BTreeMap<String, usize> = self
            .session
            .turn_counts()
            .iter()
            .map(|(name, count)| (name.clone(), *count))
            .collect();
        let execution_time_minutes = self.started.elapsed().as_secs_f64() / 60.0;
        let budget = self.session.budget();

        info!(
            "Debate finished: {} turns, {} phases completed{}",
            self.session.transcript().len(),
            self.session.phases_completed(),
            if self.truncated { " (truncated)" } else { "" }
        );

        DebateOutcome {
            question: self.request.question.clone(),
            tier: self.session.tier(),
            total_budget: budget.total_budget(),
            total_turns: self.session.transcript().len(),
            phases_completed: self.session.phases_completed(),
            phase_log: self.session.phases().to_vec(),
            transitions: self.machine.transitions().to_vec(),
            final_report,
            resolutions: self.resolutions,
            edge_cases: self.edge_cases,
            consensus,
            participant_turn_counts,
            execution_time_minutes,
            truncated: self.truncated,
            emergency,
            early_exit_reason: self.early_exit_reason,
            transcript: self.session.into_transcript(),
        }
    }

    // ==================== Shared helpers ====================

    fn cancelled(&self) -> bool {
        self.env.cancellation.is_some_and(|t| t.is_cancelled())
    }

    fn tier_includes(&self, phase: DebatePhase) -> bool {
        self.phases.contains(&phase)
    }

    fn participant(&self, name: &str) -> Option<Arc<dyn Participant>> {
        self.request
            .participants
            .iter()
            .find(|p| p.name() == name)
            .cloned()
    }

    fn capabilities_of(&self, name: &str) -> CapabilitySet {
        self.participant(name)
            .map(|p| p.capabilities())
            .unwrap_or_default()
    }

    /// Participant names declaring `capability`, in registration order
    fn names_with(&self, capability: Capability) -> Vec<String> {
        self.request
            .participants
            .iter()
            .filter(|p| p.capabilities().contains(capability))
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Profiles of the participants declaring `capability`
    fn profiles_with(&self, capability: Capability) -> Vec<&ParticipantProfile> {
        self.profiles
            .iter()
            .filter(|p| self.capabilities_of(&p.name).contains(capability))
            .collect()
    }

    fn context_for(&self, name: &str, phase: DebatePhase) -> TurnContext {
        let transcript = self.session.transcript();
        let start = transcript
            .len()
            .saturating_sub(self.env.params.context_turns);
        TurnContext::new(self.request.question.clone(), phase)
            .with_recent(transcript[start..].to_vec())
            .with_prior_report(self.request.prior_reports.get(name).cloned())
            .with_extracted_facts(self.request.extracted_facts.clone())
            .with_cross_scenario_context(self.request.cross_scenario_context.clone())
    }

    /// Latest participant turns as `(speaker, content)` pairs
    fn digest(&self) -> Vec<(String, String)> {
        self.session
            .recent_participant_turns(self.env.params.digest_turns)
            .into_iter()
            .map(|t| (t.speaker_name().to_string(), t.content.clone()))
            .collect()
    }

    /// Warn once per participant and capability about a substitution
    fn warn_missing(&mut self, name: &str, capability: Capability, substitute: &str) {
        if self.warned_missing.insert((name.to_string(), capability)) {
            warn!(
                "{} does not support {}, substituting {}",
                name, capability, substitute
            );
            self.env.event_sink.emit(DebateEvent::skipped(
                "capability",
                json!({
                    "participant": name,
                    "capability": capability.as_str(),
                    "substitute": substitute,
                }),
            ));
        }
    }

    /// Append a turn if the budget allows, then publish it.
    async fn append(
        &mut self,
        phase: DebatePhase,
        speaker: Speaker,
        turn_type: TurnType,
        content: String,
    ) -> bool {
        let Some(turn) = self
            .session
            .try_append(phase, speaker, turn_type, content)
            .cloned()
        else {
            debug!("Budget refused {} turn in {}", turn_type, phase);
            return false;
        };
        self.publish(&turn).await;
        true
    }

    async fn publish(&self, turn: &Turn) {
        let budget = self.session.budget();
        self.env.event_sink.emit(DebateEvent::turn(
            turn.phase.as_str(),
            json!({
                "ordinal": turn.ordinal,
                "speaker": turn.speaker_name(),
                "turn_type": turn.turn_type.as_str(),
                "content": turn.content,
                "total_consumed": budget.total_consumed(),
                "total_budget": budget.total_budget(),
            }),
        ));

        let entry = LiveLogEntry {
            engine_id: self.request.engine_id.clone(),
            scenario_id: self.request.scenario_id.clone(),
            scenario_name: self.request.scenario_name.clone(),
            turn_number: turn.ordinal,
            phase: turn.phase.as_str().to_string(),
            turn_type: turn.turn_type.as_str().to_string(),
            participant: turn.speaker_name().to_string(),
            content: turn.content.clone(),
        };
        if let Err(e) = self.env.live_log.record(&entry).await {
            debug!("Ignoring live log failure: {}", e);
        }
    }

    /// Leave the current phase for `to`, marking bypassed phases as skipped.
    fn transition(&mut self, to: DebatePhase, reason: Option<&str>) {
        let from = self.machine.current();
        let consumed = self.session.budget().total_consumed();

        self.session.complete_phase(from);
        self.env.event_sink.emit(DebateEvent::completed(
            from.as_str(),
            json!({ "total_consumed": consumed }),
        ));

        let mut target = to;
        if let Err(e) = self
            .machine
            .advance(to, consumed, reason.map(str::to_string))
        {
            warn!("{}, jumping to final synthesis", e);
            target = DebatePhase::FinalSynthesis;
            if let Err(e) = self.machine.advance(
                target,
                consumed,
                Some(format!("recovered from illegal transition to {}", to)),
            ) {
                warn!("{}", e);
                return;
            }
        }

        for skipped in self.bypassed_since(from, target) {
            debug!("Skipping phase {}", skipped);
            self.session.skip_phase(skipped);
            self.env.event_sink.emit(DebateEvent::skipped(
                skipped.as_str(),
                json!({ "reason": reason }),
            ));
        }

        if !target.is_terminal() {
            info!("Entering phase {}", target);
            self.session.enter_phase(target);
            self.env.event_sink.emit(DebateEvent::started(
                target.as_str(),
                json!({ "allocated": self.session.budget().allocation(target) }),
            ));
        }
    }

    /// Phases of this tier strictly between `from` and `to`
    fn bypassed_since(&self, from: DebatePhase, to: DebatePhase) -> Vec<DebatePhase> {
        self.phases
            .iter()
            .copied()
            .filter(|p| *p > from && *p < to)
            .collect()
    }
}
