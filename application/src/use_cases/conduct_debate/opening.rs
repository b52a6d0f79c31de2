//! OPENING, ADVOCACY and CROSS_EXAMINATION.

use super::DebateRun;
use council_domain::{Capability, DebatePhase, Speaker, TurnType};
use tracing::{debug, warn};

impl DebateRun<'_> {
    /// One opening case per participant, then the optional scripted
    /// challenge/response between the first capable pair.
    pub(super) async fn run_opening(&mut self) {
        let phase = DebatePhase::Opening;
        for participant in self.request.participants.clone() {
            let name = participant.name().to_string();
            if self.cancelled() || !self.session.can_emit(phase) {
                return;
            }
            if !participant.capabilities().contains(Capability::PresentCase) {
                warn!("{} cannot present a case, skipping its opening", name);
                continue;
            }
            let ctx = self.context_for(&name, phase);
            match participant.present_case(&ctx).await {
                Ok(text) if !text.trim().is_empty() => {
                    self.append(phase, Speaker::participant(&name), TurnType::Opening, text)
                        .await;
                }
                Ok(_) => warn!("{} returned an empty opening", name),
                Err(e) => warn!("{} failed to present its case: {}", name, e),
            }
        }

        if self.env.params.opening_exchange {
            self.opening_exchange().await;
        }
    }

    async fn opening_exchange(&mut self) {
        let phase = DebatePhase::Opening;
        let challengers = self.names_with(Capability::Challenge);
        let responders = self.names_with(Capability::Respond);

        let pair = challengers.iter().find_map(|challenger| {
            responders
                .iter()
                .find(|r| *r != challenger && self.session.last_turn_by(r).is_some())
                .map(|r| (challenger.clone(), r.clone()))
        });
        let Some((challenger, target)) = pair else {
            debug!("No participant pair for the opening exchange");
            return;
        };

        let claim = self
            .session
            .last_turn_by(&target)
            .map(|t| t.content.clone())
            .unwrap_or_default();
        if let Some(challenge) = self.challenge_turn(phase, &challenger, &target, &claim).await {
            self.response_turn(phase, &target, &challenger, &challenge)
                .await;
        }
    }

    /// Each presenting participant argues for one option of the question.
    pub(super) async fn run_advocacy(&mut self) {
        let phase = DebatePhase::Advocacy;
        let options = comparison_options(&self.request.question);
        if options.is_empty() {
            warn!("No options found in a comparative question");
        }

        for (i, name) in self
            .names_with(Capability::PresentCase)
            .into_iter()
            .enumerate()
        {
            if self.cancelled() || !self.session.can_emit(phase) {
                return;
            }
            let Some(participant) = self.participant(&name) else {
                continue;
            };
            let mut ctx = self.context_for(&name, phase);
            if !options.is_empty() {
                let option = &options[i % options.len()];
                ctx = ctx
                    .with_assigned_option(option.clone())
                    .with_directive(format!("Argue for \"{}\".", option));
            }
            match participant.present_case(&ctx).await {
                Ok(text) if !text.trim().is_empty() => {
                    self.append(phase, Speaker::participant(&name), TurnType::Opening, text)
                        .await;
                }
                Ok(_) => warn!("{} returned an empty advocacy case", name),
                Err(e) => warn!("{} failed to advocate: {}", name, e),
            }
        }
    }

    /// Consecutive pairs: participant i challenges participant i+1.
    pub(super) async fn run_cross_examination(&mut self) {
        let phase = DebatePhase::CrossExamination;
        let speakers: Vec<String> = self
            .request
            .participants
            .iter()
            .filter(|p| self.session.last_turn_by(p.name()).is_some())
            .map(|p| p.name().to_string())
            .collect();
        if speakers.len() < 2 {
            return;
        }

        for i in 0..speakers.len() {
            if self.cancelled() || !self.session.can_emit(phase) {
                return;
            }
            let challenger = &speakers[i];
            let target = &speakers[(i + 1) % speakers.len()];
            let claim = self
                .session
                .last_turn_by(target)
                .map(|t| t.content.clone())
                .unwrap_or_default();
            if let Some(challenge) = self.challenge_turn(phase, challenger, target, &claim).await {
                self.response_turn(phase, target, challenger, &challenge)
                    .await;
            }
        }
    }
}

/// Options of an "X vs Y" / "X or Y" question.
///
/// The left option is the phrase after the last preposition or comma
/// before the connective; the right option ends at the question mark.
pub(crate) fn comparison_options(question: &str) -> Vec<String> {
    const CONNECTIVES: &[&str] = &[" versus ", " vs. ", " vs ", " or "];
    const LEAD_INS: &[&str] = &[
        " in ", " into ", " on ", " between ", " for ", " to ", " choose ", ": ", ", ",
    ];

    // ASCII lowercase keeps byte offsets aligned with the original text
    let lower = question.to_ascii_lowercase();
    let Some((start, connective)) = CONNECTIVES
        .iter()
        .filter_map(|c| lower.find(c).map(|i| (i, *c)))
        .min_by_key(|(i, _)| *i)
    else {
        return Vec::new();
    };

    let left_part = &question[..start];
    let left_lower = &lower[..start];
    let left_start = LEAD_INS
        .iter()
        .filter_map(|l| left_lower.rfind(l).map(|i| i + l.len()))
        .max()
        .unwrap_or(0);
    let left = &left_part[left_start..];

    let right = &question[start + connective.len()..];
    let right_end = right.find(['?', ',', ';']).unwrap_or(right.len());
    let right = &right[..right_end];

    [left, right]
        .into_iter()
        .map(|s| s.trim().trim_end_matches('.').trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
