//! Moderator interventions during CHALLENGE_DEFENSE.
//!
//! [`InterventionScheduler`] combines three monitors:
//!
//! | Monitor | Cadence | Effect |
//! |---------|---------|--------|
//! | [`DevilsAdvocateMonitor`] | every `interval` turns of total consumption | moderator `devils_advocate` turn |
//! | [`TopicDriftMonitor`] | every `check_interval` participant turns | `redirect` before the next participant turn |
//! | [`MetaDebateMonitor`] | every participant turn past the activation fraction | hard refocus at the trigger limit |
//!
//! A pending redirect takes precedence: no devil's-advocate turn fires
//! while one is waiting.

use super::keywords::extract_key_terms;
use super::lexicon::{ANALYTICAL_MARKERS, META_PHRASES};
use super::scoring::{KeyTermScorer, PhraseLexiconScorer, ScoringStrategy};
use crate::debate::{DebatePolicy, Turn};

/// Fires when `consumed >= interval` and `consumed - last_fire >= interval`
#[derive(Debug, Clone)]
pub struct DevilsAdvocateMonitor {
    interval: usize,
    last_fire: usize,
}

impl DevilsAdvocateMonitor {
    pub fn new(interval: usize) -> Self {
        Self {
            interval,
            last_fire: 0,
        }
    }

    pub fn should_fire(&self, total_consumed: usize) -> bool {
        self.interval > 0
            && total_consumed >= self.interval
            && total_consumed.saturating_sub(self.last_fire) >= self.interval
    }

    /// Record a fire at `total_consumed` (the count including the
    /// intervention itself).
    pub fn record_fire(&mut self, total_consumed: usize) {
        self.last_fire = total_consumed;
    }

    pub fn last_fire(&self) -> usize {
        self.last_fire
    }
}

/// Scans windows of participant turns for the question's key terms and for
/// generic analytical language.
pub struct TopicDriftMonitor {
    check_interval: usize,
    window: usize,
    min_key_terms: usize,
    relevance: Box<dyn ScoringStrategy>,
    analytical: Box<dyn ScoringStrategy>,
    since_check: usize,
}

impl TopicDriftMonitor {
    pub fn new(question: &str, policy: &DebatePolicy) -> Self {
        Self {
            check_interval: policy.drift_check_interval,
            window: policy.drift_window,
            min_key_terms: policy.drift_min_key_terms,
            relevance: Box::new(KeyTermScorer::from_text(question)),
            analytical: Box::new(PhraseLexiconScorer::new(ANALYTICAL_MARKERS)),
            since_check: 0,
        }
    }

    pub fn with_scorers(
        mut self,
        relevance: Box<dyn ScoringStrategy>,
        analytical: Box<dyn ScoringStrategy>,
    ) -> Self {
        self.relevance = relevance;
        self.analytical = analytical;
        self
    }

    /// Count one participant turn; on every `check_interval`-th call, judge
    /// the last `window` turns of `participant_turns`.
    pub fn observe(&mut self, participant_turns: &[&Turn]) -> bool {
        if self.check_interval == 0 {
            return false;
        }
        self.since_check += 1;
        if self.since_check < self.check_interval {
            return false;
        }
        self.since_check = 0;
        let start = participant_turns.len().saturating_sub(self.window);
        self.is_drifting(&participant_turns[start..])
    }

    /// True when the turns jointly carry fewer than the minimum key terms and
    /// no analytical markers.
    pub fn is_drifting(&self, turns: &[&Turn]) -> bool {
        if turns.is_empty() {
            return false;
        }
        let text = turns
            .iter()
            .map(|t| t.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        let on_topic = self.relevance.score(&text) >= self.min_key_terms as f64;
        let analytical = self.analytical.score(&text) >= 1.0;
        !on_topic && !analytical
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaVerdict {
    /// Below the activation fraction
    Inactive,
    Clear,
    Detected { count: usize },
    /// The trigger limit was reached; the phase must be refocused and ended
    LimitReached,
}

pub struct MetaDebateMonitor {
    window: usize,
    min_phrase_hits: usize,
    qualifying_turns: usize,
    trigger_limit: usize,
    activation_fraction: f64,
    scorer: Box<dyn ScoringStrategy>,
    detections: usize,
}

impl MetaDebateMonitor {
    pub fn new(policy: &DebatePolicy) -> Self {
        Self {
            window: policy.meta_window,
            min_phrase_hits: policy.meta_min_phrase_hits,
            qualifying_turns: policy.meta_qualifying_turns,
            trigger_limit: policy.meta_trigger_limit,
            activation_fraction: policy.meta_activation_fraction,
            scorer: Box::new(PhraseLexiconScorer::new(META_PHRASES)),
            detections: 0,
        }
    }

    pub fn with_scorer(mut self, scorer: Box<dyn ScoringStrategy>) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn detections(&self) -> usize {
        self.detections
    }

    pub fn observe(
        &mut self,
        recent_participant_turns: &[&Turn],
        total_consumed: usize,
        total_budget: usize,
    ) -> MetaVerdict {
        if (total_consumed as f64) < self.activation_fraction * total_budget as f64 {
            return MetaVerdict::Inactive;
        }
        let start = recent_participant_turns.len().saturating_sub(self.window);
        let qualifying = recent_participant_turns[start..]
            .iter()
            .filter(|t| self.scorer.score(&t.content) >= self.min_phrase_hits as f64)
            .count();
        if qualifying < self.qualifying_turns {
            return MetaVerdict::Clear;
        }
        self.detections += 1;
        if self.detections >= self.trigger_limit {
            MetaVerdict::LimitReached
        } else {
            MetaVerdict::Detected {
                count: self.detections,
            }
        }
    }
}

/// What the engine must do after a participant turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterventionPlan {
    pub redirect_scheduled: bool,
    pub meta: MetaVerdict,
}

pub struct InterventionScheduler {
    devils_advocate: DevilsAdvocateMonitor,
    drift: TopicDriftMonitor,
    meta: MetaDebateMonitor,
    question_terms: Vec<String>,
    pending_redirect: bool,
}

impl InterventionScheduler {
    pub fn new(question: &str, policy: &DebatePolicy) -> Self {
        Self {
            devils_advocate: DevilsAdvocateMonitor::new(policy.devils_advocate_interval),
            drift: TopicDriftMonitor::new(question, policy),
            meta: MetaDebateMonitor::new(policy),
            question_terms: extract_key_terms(question),
            pending_redirect: false,
        }
    }

    pub fn question_terms(&self) -> &[String] {
        &self.question_terms
    }

    /// Run the drift and meta monitors after a participant turn.
    ///
    /// `phase_turns` are the participant turns of the current phase,
    /// `recent` the most recent participant turns of the whole debate.
    pub fn after_participant_turn(
        &mut self,
        phase_turns: &[&Turn],
        recent: &[&Turn],
        total_consumed: usize,
        total_budget: usize,
    ) -> InterventionPlan {
        if self.drift.observe(phase_turns) {
            self.pending_redirect = true;
        }
        let meta = self.meta.observe(recent, total_consumed, total_budget);
        InterventionPlan {
            redirect_scheduled: self.pending_redirect,
            meta,
        }
    }

    pub fn has_pending_redirect(&self) -> bool {
        self.pending_redirect
    }

    /// Consume the pending redirect, if any
    pub fn take_pending_redirect(&mut self) -> bool {
        std::mem::take(&mut self.pending_redirect)
    }

    pub fn should_fire_devils_advocate(&self, total_consumed: usize) -> bool {
        !self.pending_redirect && self.devils_advocate.should_fire(total_consumed)
    }

    pub fn record_devils_advocate(&mut self, total_consumed: usize) {
        self.devils_advocate.record_fire(total_consumed);
    }

    pub fn meta_detections(&self) -> usize {
        self.meta.detections()
    }
}
