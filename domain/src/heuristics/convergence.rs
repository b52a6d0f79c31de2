//! Convergence detection.
//!
//! Two signals end CHALLENGE_DEFENSE early:
//!
//! - **Repetition**: the last N participant turns collapse to at most K
//!   distinct fingerprints. Checked at any budget fraction.
//! - **Explicit agreement**: agreement language from at least two distinct
//!   recent speakers, forming a majority of them. Only evaluated once the
//!   tier's agreement fraction of the total budget has been consumed.

use super::lexicon::CONSENSUS_PHRASES;
use super::scoring::{PhraseLexiconScorer, ScoringStrategy};
use crate::core::string::fingerprint;
use crate::debate::{ComplexityTier, DebatePolicy, Turn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum ConvergenceSignal {
    Repetition { distinct: usize },
    ExplicitAgreement { agreeing: Vec<String> },
}

impl ConvergenceSignal {
    pub fn describe(&self) -> String {
        match self {
            ConvergenceSignal::Repetition { distinct } => {
                format!("repetition ({distinct} distinct recent contributions)")
            }
            ConvergenceSignal::ExplicitAgreement { agreeing } => {
                format!("explicit agreement from {}", agreeing.join(", "))
            }
        }
    }
}

pub struct ConvergenceDetector {
    repetition_window: usize,
    max_distinct: usize,
    fingerprint_len: usize,
    agreement_fraction: f64,
    agreement: Box<dyn ScoringStrategy>,
}

impl ConvergenceDetector {
    pub fn new(policy: &DebatePolicy, tier: ComplexityTier) -> Self {
        Self {
            repetition_window: policy.repetition_window,
            max_distinct: policy.repetition_max_distinct,
            fingerprint_len: policy.repetition_fingerprint_len,
            agreement_fraction: policy.agreement_fraction_for(tier),
            agreement: Box::new(PhraseLexiconScorer::new(CONSENSUS_PHRASES)),
        }
    }

    pub fn with_agreement_scorer(mut self, scorer: Box<dyn ScoringStrategy>) -> Self {
        self.agreement = scorer;
        self
    }

    /// Turn count before which explicit agreement is ignored
    pub fn agreement_threshold(&self, total_budget: usize) -> f64 {
        self.agreement_fraction * total_budget as f64
    }

    /// Repetition over the detector's own window
    pub fn repetition(&self, texts: &[&str]) -> Option<usize> {
        self.repetition_within(texts, self.repetition_window)
    }

    /// Distinct fingerprint count of the last `window` texts, if it is at
    /// most the configured maximum. Fewer than `window` texts never count.
    pub fn repetition_within(&self, texts: &[&str], window: usize) -> Option<usize> {
        if window == 0 || texts.len() < window {
            return None;
        }
        let distinct: HashSet<String> = texts[texts.len() - window..]
            .iter()
            .map(|t| fingerprint(t, self.fingerprint_len))
            .collect();
        (distinct.len() <= self.max_distinct).then_some(distinct.len())
    }

    /// Evaluate recent participant turns (chronological, moderator turns
    /// excluded by the caller).
    pub fn evaluate(
        &self,
        recent: &[&Turn],
        total_consumed: usize,
        total_budget: usize,
    ) -> Option<ConvergenceSignal> {
        let texts: Vec<&str> = recent.iter().map(|t| t.content.as_str()).collect();
        if let Some(distinct) = self.repetition(&texts) {
            return Some(ConvergenceSignal::Repetition { distinct });
        }

        if (total_consumed as f64) < self.agreement_threshold(total_budget) {
            return None;
        }
        self.explicit_agreement(recent)
            .map(|agreeing| ConvergenceSignal::ExplicitAgreement { agreeing })
    }

    fn explicit_agreement(&self, recent: &[&Turn]) -> Option<Vec<String>> {
        let start = recent.len().saturating_sub(self.repetition_window);
        let window = &recent[start..];

        let mut speakers: Vec<&str> = Vec::new();
        let mut agreeing: Vec<String> = Vec::new();
        for turn in window.iter().rev() {
            let name = turn.speaker_name();
            if speakers.contains(&name) {
                continue;
            }
            speakers.push(name);
            if self.agreement.score(&turn.content) >= 1.0 {
                agreeing.push(name.to_string());
            }
        }

        (agreeing.len() >= 2 && agreeing.len() * 2 > speakers.len()).then(|| {
            agreeing.sort();
            agreeing
        })
    }
}
