//! Pluggable text scoring.
//!
//! The monitors never hard-code how text is judged; each holds a boxed
//! [`ScoringStrategy`] so a lexicon can be swapped for another scorer.

use super::keywords::{extract_key_terms, term_hits};
use super::lexicon::count_phrase_hits;

pub trait ScoringStrategy: Send + Sync {
    /// Higher means a stronger signal; the scale is scorer-specific.
    fn score(&self, text: &str) -> f64;
}

/// Counts distinct phrases of a lexicon present in the text
#[derive(Debug, Clone)]
pub struct PhraseLexiconScorer {
    phrases: Vec<String>,
}

impl PhraseLexiconScorer {
    pub fn new<S: AsRef<str>>(phrases: &[S]) -> Self {
        Self {
            phrases: phrases.iter().map(|p| p.as_ref().to_lowercase()).collect(),
        }
    }
}

impl ScoringStrategy for PhraseLexiconScorer {
    fn score(&self, text: &str) -> f64 {
        count_phrase_hits(text, &self.phrases) as f64
    }
}

/// Counts distinct key terms of a reference text present in the text
#[derive(Debug, Clone)]
pub struct KeyTermScorer {
    terms: Vec<String>,
}

impl KeyTermScorer {
    pub fn from_text(reference: &str) -> Self {
        Self {
            terms: extract_key_terms(reference),
        }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }
}

impl ScoringStrategy for KeyTermScorer {
    fn score(&self, text: &str) -> f64 {
        term_hits(text, &self.terms) as f64
    }
}
