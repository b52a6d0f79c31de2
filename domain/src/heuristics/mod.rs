//! Textual heuristics: key terms, confidence, convergence and the
//! moderator's intervention monitors.
//!
//! These are approximate lexicon scans. Each monitor scores text through a
//! [`ScoringStrategy`] so it can be replaced and tested in isolation.

pub mod confidence;
pub mod convergence;
pub mod intervention;
pub mod keywords;
pub mod lexicon;
pub mod scoring;

pub use confidence::{ConfidenceExtractor, ConfidenceLabel, NEUTRAL_CONFIDENCE};
pub use convergence::{ConvergenceDetector, ConvergenceSignal};
pub use intervention::{
    DevilsAdvocateMonitor, InterventionPlan, InterventionScheduler, MetaDebateMonitor,
    MetaVerdict, TopicDriftMonitor,
};
pub use keywords::{extract_key_terms, relevance, term_hits};
pub use scoring::{KeyTermScorer, PhraseLexiconScorer, ScoringStrategy};
