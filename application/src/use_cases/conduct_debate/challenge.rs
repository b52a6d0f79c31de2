//! CHALLENGE_DEFENSE: contradiction mini-debates, rotation rounds and
//! moderator interventions.

use super::DebateRun;
use super::resolution::ResolutionSynthesizer;
use crate::ports::event_sink::DebateEvent;
use council_domain::heuristics::lexicon::{RESOLUTION_AGREEMENT_PHRASES, count_phrase_hits};
use council_domain::{
    Capability, Contradiction, DebatePhase, DebatePromptTemplate, MetaVerdict,
    ParticipantRotationManager, Speaker, TurnType,
};
use serde_json::json;
use tracing::{debug, info, warn};

/// Mini-debates are short; repetition is judged over this many turns
const MINI_DEBATE_WINDOW: usize = 4;

/// What a speaker does on its rotation turn
enum Move {
    Respond { challenger: String, challenge: String },
    Challenge { target: String, claim: String },
    WeighIn,
}

impl DebateRun<'_> {
    pub(super) async fn run_challenge_defense(&mut self) {
        self.resolve_contradictions().await;
        if self.cancelled() {
            return;
        }

        let active: Vec<String> = self
            .request
            .participants
            .iter()
            .filter(|p| {
                let caps = p.capabilities();
                caps.contains(Capability::Challenge) || caps.contains(Capability::PresentCase)
            })
            .map(|p| p.name().to_string())
            .collect();
        if active.is_empty() {
            warn!("No participant can take part in challenge rounds");
            return;
        }

        let allocation = self
            .session
            .budget()
            .allocation(DebatePhase::ChallengeDefense);
        let rounds = (allocation / active.len()).max(self.min_challenge_rounds);
        debug!("Challenge/defense: up to {} rounds among {}", rounds, active.len());

        for round in 1..=rounds {
            if !self.session.can_emit(DebatePhase::ChallengeDefense) {
                debug!("Challenge/defense allocation spent after {} rounds", round - 1);
                return;
            }
            if !self.challenge_room() {
                self.early_exit("turn budget exhausted");
                return;
            }

            let speakers = ParticipantRotationManager::round(&active, self.session.turn_counts());
            for speaker in speakers {
                if self.cancelled() {
                    return;
                }
                self.flush_redirect().await;
                if !self.challenge_room() {
                    break;
                }
                if !self.rotation_turn(&speaker).await {
                    continue;
                }

                let plan = {
                    let budget = self.session.budget();
                    let phase_turns = self
                        .session
                        .phase_participant_turns(DebatePhase::ChallengeDefense);
                    let recent = self
                        .session
                        .recent_participant_turns(self.env.policy.meta_window);
                    self.interventions.after_participant_turn(
                        &phase_turns,
                        &recent,
                        budget.total_consumed(),
                        budget.total_budget(),
                    )
                };
                if plan.redirect_scheduled {
                    debug!("Topic drift detected, redirect scheduled");
                }
                if plan.meta == MetaVerdict::LimitReached {
                    info!(
                        "Meta-debate limit reached after {} detections, forcing refocus",
                        self.interventions.meta_detections()
                    );
                    self.hard_refocus(&active).await;
                    self.early_exit("meta-debate limit reached");
                    return;
                }

                let consumed = self.session.budget().total_consumed();
                if self.interventions.should_fire_devils_advocate(consumed) && self.challenge_room() {
                    self.devils_advocate(&active).await;
                }
            }

            let signal = {
                let budget = self.session.budget();
                let recent = self
                    .session
                    .recent_participant_turns(self.env.policy.repetition_window);
                self.convergence
                    .evaluate(&recent, budget.total_consumed(), budget.total_budget())
            };
            if let Some(signal) = signal {
                info!("Converged after round {}: {}", round, signal.describe());
                self.early_exit(&signal.describe());
                return;
            }
        }
    }

    /// Turns left for this phase without eating into the closing reserve
    fn challenge_room(&self) -> bool {
        self.session.can_emit(DebatePhase::ChallengeDefense)
            && self.session.budget().remaining() > self.closing_reserve
    }

    fn early_exit(&mut self, reason: &str) {
        if self.early_exit_reason.is_none() {
            self.early_exit_reason = Some(reason.to_string());
            self.env.event_sink.emit(DebateEvent::completed(
                "early_exit",
                json!({ "phase": DebatePhase::ChallengeDefense.as_str(), "reason": reason }),
            ));
        }
    }

    // ==================== Rotation turns ====================

    fn next_move(&mut self, speaker: &str) -> Option<Move> {
        let caps = self.capabilities_of(speaker);

        if let Some((challenger, challenge)) = self.pending_challenges.remove(speaker)
            && caps.contains(Capability::Respond)
        {
            return Some(Move::Respond { challenger, challenge });
        }

        if caps.contains(Capability::Challenge) {
            let latest = self
                .session
                .participant_turns()
                .rev()
                .find(|t| t.speaker_name() != speaker)
                .map(|t| (t.speaker_name().to_string(), t.content.clone()));
            if let Some((target, claim)) = latest {
                return Some(Move::Challenge { target, claim });
            }
        } else {
            self.warn_missing(speaker, Capability::Challenge, "a weigh-in");
        }

        caps.contains(Capability::PresentCase).then_some(Move::WeighIn)
    }

    /// One speaker's turn; false when nothing was appended.
    async fn rotation_turn(&mut self, speaker: &str) -> bool {
        let phase = DebatePhase::ChallengeDefense;
        let Some(next) = self.next_move(speaker) else {
            return false;
        };

        let spoke = match next {
            Move::Respond {
                challenger,
                challenge,
            } => self
                .response_turn(phase, speaker, &challenger, &challenge)
                .await
                .is_some(),
            Move::Challenge { target, claim } => {
                match self.challenge_turn(phase, speaker, &target, &claim).await {
                    Some(text) => {
                        self.pending_challenges
                            .insert(target, (speaker.to_string(), text));
                        true
                    }
                    None => false,
                }
            }
            Move::WeighIn => self.weigh_in(speaker).await,
        };
        if spoke {
            return true;
        }

        // A failed call still costs the speaker its slot
        let fallback = format!(
            "{} could not add a new argument this round and keeps its previous position.",
            speaker
        );
        self.append(phase, Speaker::participant(speaker), TurnType::WeighIn, fallback)
            .await
    }

    async fn weigh_in(&mut self, speaker: &str) -> bool {
        let phase = DebatePhase::ChallengeDefense;
        let Some(participant) = self.participant(speaker) else {
            return false;
        };
        let ctx = self
            .context_for(speaker, phase)
            .with_directive(DebatePromptTemplate::weigh_in_directive());
        match participant.present_case(&ctx).await {
            Ok(text) if !text.trim().is_empty() => {
                self.append(phase, Speaker::participant(speaker), TurnType::WeighIn, text)
                    .await
            }
            Ok(_) => false,
            Err(e) => {
                warn!("{} failed to weigh in: {}", speaker, e);
                false
            }
        }
    }

    /// `challenger` challenges `claim` by `target`; returns the appended text.
    pub(super) async fn challenge_turn(
        &mut self,
        phase: DebatePhase,
        challenger: &str,
        target: &str,
        claim: &str,
    ) -> Option<String> {
        let participant = self.participant(challenger)?;
        if !participant.capabilities().contains(Capability::Challenge) {
            debug!("{} cannot challenge", challenger);
            return None;
        }
        let ctx = self.context_for(challenger, phase);
        match participant.challenge(&ctx, target, claim).await {
            Ok(text) if !text.trim().is_empty() => self
                .append(
                    phase,
                    Speaker::participant(challenger),
                    TurnType::Challenge,
                    text.clone(),
                )
                .await
                .then_some(text),
            Ok(_) => {
                warn!("{} returned an empty challenge", challenger);
                None
            }
            Err(e) => {
                warn!("{} failed to challenge {}: {}", challenger, target, e);
                None
            }
        }
    }

    /// `responder` answers `challenge` from `challenger`; returns the appended text.
    pub(super) async fn response_turn(
        &mut self,
        phase: DebatePhase,
        responder: &str,
        challenger: &str,
        challenge: &str,
    ) -> Option<String> {
        let participant = self.participant(responder)?;
        if !participant.capabilities().contains(Capability::Respond) {
            debug!("{} cannot respond", responder);
            return None;
        }
        let ctx = self.context_for(responder, phase);
        match participant.respond(&ctx, challenger, challenge).await {
            Ok(text) if !text.trim().is_empty() => self
                .append(
                    phase,
                    Speaker::participant(responder),
                    TurnType::Response,
                    text.clone(),
                )
                .await
                .then_some(text),
            Ok(_) => {
                warn!("{} returned an empty response", responder);
                None
            }
            Err(e) => {
                warn!("{} failed to respond to {}: {}", responder, challenger, e);
                None
            }
        }
    }

    // ==================== Interventions ====================

    async fn flush_redirect(&mut self) {
        if !self.interventions.has_pending_redirect() || !self.challenge_room() {
            return;
        }
        self.interventions.take_pending_redirect();
        let text = DebatePromptTemplate::redirect(&self.request.question);
        if self
            .append(
                DebatePhase::ChallengeDefense,
                Speaker::Moderator,
                TurnType::Redirect,
                text,
            )
            .await
        {
            self.env.event_sink.emit(DebateEvent::completed(
                "intervention",
                json!({ "kind": "redirect" }),
            ));
        }
    }

    async fn devils_advocate(&mut self, active: &[String]) {
        let text = {
            let recent = self.session.recent_participant_turns(10);
            let next: Vec<String> =
                ParticipantRotationManager::order(active, self.session.turn_counts())
                    .into_iter()
                    .take(3)
                    .collect();
            DebatePromptTemplate::devils_advocate(&self.request.question, &recent, &next)
        };
        if self
            .append(
                DebatePhase::ChallengeDefense,
                Speaker::Moderator,
                TurnType::DevilsAdvocate,
                text,
            )
            .await
        {
            let consumed = self.session.budget().total_consumed();
            self.interventions.record_devils_advocate(consumed);
            self.env.event_sink.emit(DebateEvent::completed(
                "intervention",
                json!({ "kind": "devils_advocate", "total_consumed": consumed }),
            ));
        }
    }

    /// One short final-position-style turn per active participant.
    async fn hard_refocus(&mut self, active: &[String]) {
        let phase = DebatePhase::ChallengeDefense;
        for name in active {
            if self.cancelled() || !self.challenge_room() {
                return;
            }
            let Some(participant) = self.participant(name) else {
                continue;
            };
            let ctx = self
                .context_for(name, phase)
                .with_directive(DebatePromptTemplate::refocus_directive());
            let result = if participant.capabilities().contains(Capability::FinalPosition) {
                participant.state_final_position(&ctx, false).await
            } else {
                participant.present_case(&ctx).await
            };
            match result {
                Ok(text) if !text.trim().is_empty() => {
                    self.append(phase, Speaker::participant(name), TurnType::Refocus, text)
                        .await;
                }
                Ok(_) => warn!("{} returned an empty refocus turn", name),
                Err(e) => warn!("{} failed to refocus: {}", name, e),
            }
        }
    }

    // ==================== Contradictions ====================

    async fn resolve_contradictions(&mut self) {
        for contradiction in self.request.contradictions.clone() {
            if self.cancelled() {
                return;
            }
            let exchange = if contradiction.claims_identical() {
                Vec::new()
            } else {
                self.mini_debate(&contradiction).await
            };
            let resolution = ResolutionSynthesizer::new(self.env.summarizer)
                .resolve(&self.request.question, &contradiction, &exchange)
                .await;
            info!(
                "Resolved '{}' between {} and {}: {}",
                contradiction.topic,
                contradiction.participant_a,
                contradiction.participant_b,
                resolution.outcome
            );
            self.env.event_sink.emit(DebateEvent::completed(
                "resolution",
                json!({
                    "topic": contradiction.topic,
                    "outcome": resolution.outcome.as_str(),
                    "action": resolution.action.as_str(),
                    "turns_used": resolution.turns_used,
                }),
            ));
            self.resolutions.push(resolution);
        }
    }

    /// Alternating challenge/response between the two disputing
    /// participants, as `(speaker, content)` pairs.
    async fn mini_debate(&mut self, contradiction: &Contradiction) -> Vec<(String, String)> {
        let phase = DebatePhase::ChallengeDefense;
        let a = contradiction.participant_a.clone();
        let b = contradiction.participant_b.clone();
        if self.participant(&a).is_none() || self.participant(&b).is_none() {
            warn!(
                "Contradiction '{}' names an unknown participant, resolving without debate",
                contradiction.topic
            );
            return Vec::new();
        }

        let mut exchange: Vec<(String, String)> = Vec::new();
        let mut claim_a = contradiction.claim_a.clone();
        let mut claim_b = contradiction.claim_b.clone();

        for round in 0..self.env.policy.max_resolution_rounds {
            if self.cancelled() || !self.challenge_room() {
                break;
            }
            let (challenger, defender, claim) = if round % 2 == 0 {
                (&a, &b, claim_b.clone())
            } else {
                (&b, &a, claim_a.clone())
            };

            let Some(challenge) = self.challenge_turn(phase, challenger, defender, &claim).await
            else {
                break;
            };
            exchange.push((challenger.clone(), challenge.clone()));
            if !self.challenge_room() {
                break;
            }

            let Some(response) = self
                .response_turn(phase, defender, challenger, &challenge)
                .await
            else {
                break;
            };
            exchange.push((defender.clone(), response.clone()));
            if defender == &a {
                claim_a = response.clone();
            } else {
                claim_b = response.clone();
            }

            let texts: Vec<&str> = exchange.iter().map(|(_, t)| t.as_str()).collect();
            if self
                .convergence
                .repetition_within(&texts, MINI_DEBATE_WINDOW)
                .is_some()
            {
                debug!("Mini-debate on '{}' is repeating itself", contradiction.topic);
                break;
            }
            if count_phrase_hits(&response, RESOLUTION_AGREEMENT_PHRASES) > 0 {
                debug!("Mini-debate on '{}' reached agreement", contradiction.topic);
                break;
            }
        }

        exchange
    }
}

#[cfg(test)]
mod tests {
    use crate::ports::event_sink::EventStatus;
    use crate::ports::participant::Participant;
    use crate::use_cases::conduct_debate::testing::{
        FakeParticipant, FakeSummarizer, RecordingSink,
    };
    use crate::use_cases::conduct_debate::{ConductDebateUseCase, DebateRequest};
    use council_domain::{
        BudgetTable, Capability, CapabilitySet, DebatePhase, DebatePolicy, DepthOverride,
        TurnType,
    };
    use std::sync::Arc;

    const QUESTION: &str = "Should we expand our logistics network into Brazil?";

    #[tokio::test]
    async fn test_devils_advocate_cadence() {
        for interval in [5usize, 10, 15] {
            let participants: Vec<Arc<dyn Participant>> = vec![
                Arc::new(FakeParticipant::on_topic("economist")),
                Arc::new(FakeParticipant::on_topic("engineer")),
                Arc::new(FakeParticipant::on_topic("lawyer")),
            ];
            let request = DebateRequest::new(QUESTION, participants)
                .with_depth_override(Some(DepthOverride::Deep));
            let policy = DebatePolicy {
                devils_advocate_interval: interval,
                ..DebatePolicy::default()
            };
            let outcome = ConductDebateUseCase::new()
                .with_policy(policy)
                .execute(request)
                .await
                .unwrap();

            let fired: Vec<usize> = outcome
                .transcript
                .iter()
                .filter(|t| t.turn_type == TurnType::DevilsAdvocate)
                .map(|t| t.ordinal)
                .collect();
            assert!(!fired.is_empty(), "interval {}", interval);
            assert!(fired[0] > interval);
            for pair in fired.windows(2) {
                assert!(pair[1] - pair[0] >= interval, "interval {}: {:?}", interval, fired);
            }
        }
    }

    #[tokio::test]
    async fn test_participant_without_challenge_weighs_in() {
        let observer: CapabilitySet = [Capability::PresentCase, Capability::FinalPosition]
            .into_iter()
            .collect();
        let participants: Vec<Arc<dyn Participant>> = vec![
            Arc::new(FakeParticipant::on_topic("economist")),
            Arc::new(FakeParticipant::on_topic("observer").with_capabilities(observer)),
        ];
        let request = DebateRequest::new(QUESTION, participants)
            .with_depth_override(Some(DepthOverride::Standard));
        let sink = Arc::new(RecordingSink::default());
        let outcome = ConductDebateUseCase::new()
            .with_event_sink(sink.clone())
            .execute(request)
            .await
            .unwrap();

        let observer_turns: Vec<_> = outcome
            .transcript
            .iter()
            .filter(|t| t.phase == DebatePhase::ChallengeDefense && t.speaker_name() == "observer")
            .collect();
        assert!(observer_turns.len() >= 2);
        assert!(observer_turns
            .iter()
            .all(|t| t.turn_type == TurnType::WeighIn));

        let substitutions: Vec<_> = sink
            .events()
            .into_iter()
            .filter(|e| e.stage == "capability" && e.status == EventStatus::Skipped)
            .collect();
        assert_eq!(substitutions.len(), 1);
        assert_eq!(substitutions[0].payload["participant"], "observer");
        assert_eq!(substitutions[0].payload["capability"], "challenge");
        assert_eq!(substitutions[0].payload["substitute"], "a weigh-in");
    }

    #[tokio::test]
    async fn test_challenge_allocation_leaves_room_for_later_phases() {
        for depth in [
            DepthOverride::Standard,
            DepthOverride::Deep,
            DepthOverride::Legendary,
        ] {
            let participants: Vec<Arc<dyn Participant>> = vec![
                Arc::new(FakeParticipant::on_topic("economist")),
                Arc::new(FakeParticipant::on_topic("engineer")),
                Arc::new(FakeParticipant::on_topic("lawyer")),
            ];
            let request =
                DebateRequest::new(QUESTION, participants).with_depth_override(Some(depth));
            let outcome = ConductDebateUseCase::new()
                .with_summarizer(Arc::new(FakeSummarizer::valid()))
                .execute(request)
                .await
                .unwrap();

            let table = BudgetTable::for_tier(depth.tier());
            let challenge_turns = outcome
                .transcript
                .iter()
                .filter(|t| t.phase == DebatePhase::ChallengeDefense)
                .count();
            assert!(challenge_turns <= table.allocation(DebatePhase::ChallengeDefense));
            assert!(!outcome.truncated, "{:?}", depth);
            assert_ne!(
                outcome.early_exit_reason.as_deref(),
                Some("turn budget exhausted"),
                "{:?}",
                depth
            );
            for phase in [DebatePhase::EdgeCase, DebatePhase::RiskAnalysis] {
                assert!(
                    outcome
                        .transcript
                        .iter()
                        .any(|t| t.phase == phase && !t.is_moderator()),
                    "{:?} has no {} turns",
                    depth,
                    phase
                );
            }
        }
    }

    #[tokio::test]
    async fn test_challenges_are_answered_by_their_target() {
        let participants: Vec<Arc<dyn Participant>> = vec![
            Arc::new(FakeParticipant::on_topic("economist")),
            Arc::new(FakeParticipant::on_topic("engineer")),
        ];
        let request = DebateRequest::new(QUESTION, participants)
            .with_depth_override(Some(DepthOverride::Standard));
        let outcome = ConductDebateUseCase::new().execute(request).await.unwrap();

        let turns: Vec<_> = outcome
            .transcript
            .iter()
            .filter(|t| t.phase == DebatePhase::ChallengeDefense && !t.is_moderator())
            .collect();
        for pair in turns.windows(2) {
            if pair[0].turn_type == TurnType::Challenge && pair[1].turn_type == TurnType::Response {
                assert!(pair[0].content.contains(&format!("challenge to {}", pair[1].speaker_name())));
            }
        }
        assert!(turns.iter().any(|t| t.turn_type == TurnType::Response));
    }
}
