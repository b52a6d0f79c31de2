//! The running debate: transcript, budget and per-phase bookkeeping.

use super::budget::TurnBudgetScheduler;
use super::phase::{DebatePhase, PhaseRecord, PhaseStatus};
use super::tier::{BudgetTable, ComplexityTier};
use super::turn::{Speaker, Turn, TurnType};
use std::collections::HashMap;

/// Mutable state of one debate.
///
/// Every turn goes through [`DebateSession::try_append`], which charges the
/// [`TurnBudgetScheduler`] first; a refused charge leaves the transcript
/// untouched.
#[derive(Debug, Clone)]
pub struct DebateSession {
    question: String,
    tier: ComplexityTier,
    budget: TurnBudgetScheduler,
    transcript: Vec<Turn>,
    participants: Vec<String>,
    turn_counts: HashMap<String, usize>,
    phases: Vec<PhaseRecord>,
}

impl DebateSession {
    pub fn new(question: impl Into<String>, table: &BudgetTable, participants: Vec<String>) -> Self {
        let turn_counts = participants.iter().map(|p| (p.clone(), 0)).collect();
        Self {
            question: question.into(),
            tier: table.tier,
            budget: TurnBudgetScheduler::new(table),
            transcript: Vec::new(),
            participants,
            turn_counts,
            phases: Vec::new(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn tier(&self) -> ComplexityTier {
        self.tier
    }

    pub fn budget(&self) -> &TurnBudgetScheduler {
        &self.budget
    }

    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    pub fn can_emit(&self, phase: DebatePhase) -> bool {
        self.budget.can_emit(phase)
    }

    /// Append a turn if the budget allows it.
    pub fn try_append(
        &mut self,
        phase: DebatePhase,
        speaker: Speaker,
        turn_type: TurnType,
        content: impl Into<String>,
    ) -> Option<&Turn> {
        if !self.budget.try_record(phase) {
            return None;
        }

        if let Speaker::Participant(name) = &speaker {
            *self.turn_counts.entry(name.clone()).or_insert(0) += 1;
        }
        if let Some(record) = self.phases.iter_mut().rev().find(|r| r.phase == phase) {
            record.consumed += 1;
        }

        let ordinal = self.transcript.len() + 1;
        self.transcript
            .push(Turn::new(ordinal, speaker, phase, turn_type, content));
        self.transcript.last()
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn into_transcript(self) -> Vec<Turn> {
        self.transcript
    }

    pub fn turn_counts(&self) -> &HashMap<String, usize> {
        &self.turn_counts
    }

    pub fn turn_count(&self, name: &str) -> usize {
        self.turn_counts.get(name).copied().unwrap_or(0)
    }

    pub fn participant_turns(&self) -> impl DoubleEndedIterator<Item = &Turn> {
        self.transcript.iter().filter(|t| !t.is_moderator())
    }

    /// The last `n` participant turns in chronological order
    pub fn recent_participant_turns(&self, n: usize) -> Vec<&Turn> {
        let mut recent: Vec<&Turn> = self
            .transcript
            .iter()
            .rev()
            .filter(|t| !t.is_moderator())
            .take(n)
            .collect();
        recent.reverse();
        recent
    }

    /// Participant turns of one phase in chronological order
    pub fn phase_participant_turns(&self, phase: DebatePhase) -> Vec<&Turn> {
        self.transcript
            .iter()
            .filter(|t| t.phase == phase && !t.is_moderator())
            .collect()
    }

    pub fn phase_turns(&self, phase: DebatePhase) -> Vec<&Turn> {
        self.transcript.iter().filter(|t| t.phase == phase).collect()
    }

    pub fn last_turn_by(&self, name: &str) -> Option<&Turn> {
        self.transcript
            .iter()
            .rev()
            .find(|t| !t.is_moderator() && t.speaker_name() == name)
    }

    pub fn enter_phase(&mut self, phase: DebatePhase) {
        let allocated = self.budget.allocation(phase);
        self.phases.push(PhaseRecord::active(phase, allocated));
    }

    pub fn complete_phase(&mut self, phase: DebatePhase) {
        if let Some(record) = self
            .phases
            .iter_mut()
            .rev()
            .find(|r| r.phase == phase && r.status == PhaseStatus::Active)
        {
            record.status = PhaseStatus::Completed;
        }
    }

    pub fn skip_phase(&mut self, phase: DebatePhase) {
        let allocated = self.budget.allocation(phase);
        self.phases.push(PhaseRecord::skipped(phase, allocated));
    }

    pub fn phases(&self) -> &[PhaseRecord] {
        &self.phases
    }

    /// Phases that ran to completion, DONE excluded
    pub fn phases_completed(&self) -> usize {
        self.phases
            .iter()
            .filter(|r| r.is_completed() && r.phase != DebatePhase::Done)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(total: usize) -> DebateSession {
        let table = BudgetTable::for_tier(ComplexityTier::Simple).with_total(total);
        DebateSession::new(
            "Should we adopt Rust?",
            &table,
            vec!["alice".to_string(), "bob".to_string()],
        )
    }

    #[test]
    fn test_append_assigns_ordinals_and_counts() {
        let mut s = session(40);
        s.enter_phase(DebatePhase::Opening);
        s.try_append(
            DebatePhase::Opening,
            Speaker::participant("alice"),
            TurnType::Opening,
            "case A",
        )
        .unwrap();
        let turn = s
            .try_append(
                DebatePhase::Opening,
                Speaker::Moderator,
                TurnType::Redirect,
                "focus",
            )
            .unwrap();
        assert_eq!(turn.ordinal, 2);
        assert_eq!(s.turn_count("alice"), 1);
        assert_eq!(s.turn_count("bob"), 0);
        assert_eq!(s.phases()[0].consumed, 2);
        assert_eq!(s.participant_turns().count(), 1);
    }

    #[test]
    fn test_refused_append_leaves_transcript_untouched() {
        let mut s = session(1);
        assert!(
            s.try_append(
                DebatePhase::Opening,
                Speaker::participant("alice"),
                TurnType::Opening,
                "one",
            )
            .is_some()
        );
        assert!(
            s.try_append(
                DebatePhase::Opening,
                Speaker::participant("bob"),
                TurnType::Opening,
                "two",
            )
            .is_none()
        );
        assert_eq!(s.transcript().len(), 1);
        assert_eq!(s.turn_count("bob"), 0);
        assert_eq!(s.budget().total_consumed(), 1);
    }

    #[test]
    fn test_recent_participant_turns_skip_moderator() {
        let mut s = session(40);
        for (speaker, text) in [
            (Speaker::participant("alice"), "a1"),
            (Speaker::Moderator, "m"),
            (Speaker::participant("bob"), "b1"),
            (Speaker::participant("alice"), "a2"),
        ] {
            s.try_append(DebatePhase::Opening, speaker, TurnType::Opening, text);
        }
        let recent: Vec<&str> = s
            .recent_participant_turns(2)
            .iter()
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(recent, vec!["b1", "a2"]);
        assert_eq!(s.last_turn_by("alice").unwrap().content, "a2");
    }

    #[test]
    fn test_participant_turns_walk_backwards() {
        let mut s = session(40);
        for (speaker, text) in [
            (Speaker::participant("alice"), "a1"),
            (Speaker::participant("bob"), "b1"),
            (Speaker::Moderator, "m"),
        ] {
            s.try_append(DebatePhase::Opening, speaker, TurnType::Opening, text);
        }
        let latest_other = s
            .participant_turns()
            .rev()
            .find(|t| t.speaker_name() != "alice")
            .map(|t| t.content.as_str());
        assert_eq!(latest_other, Some("b1"));
        assert_eq!(s.participant_turns().next_back().unwrap().content, "b1");
    }

    #[test]
    fn test_phases_completed_excludes_skipped_and_done() {
        let mut s = session(40);
        s.enter_phase(DebatePhase::Opening);
        s.complete_phase(DebatePhase::Opening);
        s.skip_phase(DebatePhase::EdgeCase);
        s.enter_phase(DebatePhase::Done);
        s.complete_phase(DebatePhase::Done);
        assert_eq!(s.phases_completed(), 1);
    }
}
