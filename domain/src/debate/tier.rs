//! Complexity classification and fixed turn-budget tables.
//!
//! [`ComplexityClassifier::classify`] is a pure function of the question text
//! and an optional explicit depth label.

use super::phase::DebatePhase;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Depth tier of a debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityTier {
    Simple,
    Standard,
    Complex,
    /// Option-versus-option questions; adds advocacy and cross-examination
    Comparative,
}

impl ComplexityTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComplexityTier::Simple => "simple",
            ComplexityTier::Standard => "standard",
            ComplexityTier::Complex => "complex",
            ComplexityTier::Comparative => "comparative",
        }
    }

    pub fn budget(&self) -> BudgetTable {
        BudgetTable::for_tier(*self)
    }
}

impl std::fmt::Display for ComplexityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Explicit depth label supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthOverride {
    Standard,
    Deep,
    Legendary,
}

impl DepthOverride {
    pub fn tier(&self) -> ComplexityTier {
        match self {
            DepthOverride::Standard => ComplexityTier::Simple,
            DepthOverride::Deep => ComplexityTier::Standard,
            DepthOverride::Legendary => ComplexityTier::Complex,
        }
    }
}

impl FromStr for DepthOverride {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" => Ok(DepthOverride::Standard),
            "deep" => Ok(DepthOverride::Deep),
            "legendary" => Ok(DepthOverride::Legendary),
            other => Err(DomainError::UnknownDepth(other.to_string())),
        }
    }
}

/// Fixed turn budget for one tier
///
/// Phase allocations are ceilings that add up to `total`. A total override
/// keeps the ceilings, and `total` stays the hard cap for the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetTable {
    pub tier: ComplexityTier,
    pub total: usize,
    pub allocations: BTreeMap<DebatePhase, usize>,
    /// Lower bound on CHALLENGE_DEFENSE rounds
    pub min_challenge_rounds: usize,
}

impl BudgetTable {
    pub fn for_tier(tier: ComplexityTier) -> Self {
        use DebatePhase::*;

        let (total, min_rounds, entries): (usize, usize, Vec<(DebatePhase, usize)>) = match tier {
            ComplexityTier::Simple => (
                40,
                6,
                vec![
                    (Opening, 6),
                    (ChallengeDefense, 18),
                    (EdgeCase, 6),
                    (RiskAnalysis, 4),
                    (Consensus, 5),
                    (FinalSynthesis, 1),
                ],
            ),
            ComplexityTier::Standard => (
                80,
                8,
                vec![
                    (Opening, 8),
                    (ChallengeDefense, 40),
                    (EdgeCase, 12),
                    (RiskAnalysis, 8),
                    (Consensus, 11),
                    (FinalSynthesis, 1),
                ],
            ),
            ComplexityTier::Complex => (
                150,
                12,
                vec![
                    (Opening, 10),
                    (ChallengeDefense, 80),
                    (EdgeCase, 24),
                    (RiskAnalysis, 16),
                    (Consensus, 19),
                    (FinalSynthesis, 1),
                ],
            ),
            ComplexityTier::Comparative => (
                150,
                10,
                vec![
                    (Opening, 8),
                    (Advocacy, 10),
                    (CrossExamination, 12),
                    (ChallengeDefense, 60),
                    (EdgeCase, 20),
                    (RiskAnalysis, 14),
                    (Consensus, 25),
                    (FinalSynthesis, 1),
                ],
            ),
        };

        Self {
            tier,
            total,
            allocations: entries.into_iter().collect(),
            min_challenge_rounds: min_rounds,
        }
    }

    /// Replace the session total, keeping the phase ceilings
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = total;
        self
    }

    /// Allocation for a phase; phases absent from the table get nothing
    pub fn allocation(&self, phase: DebatePhase) -> usize {
        self.allocations.get(&phase).copied().unwrap_or(0)
    }

    /// Phases this tier runs, in order, ending with DONE
    pub fn phase_sequence(&self) -> Vec<DebatePhase> {
        let mut phases: Vec<DebatePhase> = self.allocations.keys().copied().collect();
        phases.push(DebatePhase::Done);
        phases
    }

    pub fn includes(&self, phase: DebatePhase) -> bool {
        self.allocations.contains_key(&phase)
    }
}

/// Result of classifying a question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub tier: ComplexityTier,
    pub budget: BudgetTable,
    /// Weighted lexical score; zero when an explicit depth was given
    pub score: f64,
    pub overridden: bool,
}

const DECISION_VERBS: &[&str] = &[
    "should", "decide", "choose", "invest", "allocate", "approve", "prioritize", "select",
    "adopt", "recommend", "acquire", "launch",
];

const MONETARY_TERMS: &[&str] = &[
    "budget", "cost", "costs", "price", "pricing", "revenue", "funding", "million", "billion",
    "investment", "roi", "spend", "capex", "opex", "dollars", "euros", "margin", "profit",
];

const STRATEGIC_TERMS: &[&str] = &[
    "strategy", "strategic", "policy", "regulation", "regulatory", "long-term", "market",
    "expansion", "governance", "compliance", "roadmap", "competitive", "geopolitical",
];

const REGION_TERMS: &[&str] = &[
    "europe", "eu", "asia", "china", "india", "africa", "apac", "emea", "latam", "usa",
    "region", "regional", "country", "national",
];

const COMPARATIVE_CONNECTIVES: &[&str] = &["vs", "vs.", "versus", "or"];

const FACTUAL_PREFIXES: &[&str] = &[
    "what is", "what are", "who is", "who was", "when did", "when was", "where is", "how many",
    "define", "list",
];

const LONG_QUESTION_WORDS: usize = 25;
const FACTUAL_MAX_WORDS: usize = 12;

/// Heuristic mapping from question text to a depth tier
pub struct ComplexityClassifier;

impl ComplexityClassifier {
    /// Classify a question, honouring an explicit depth label when given
    pub fn classify(question: &str, depth: Option<DepthOverride>) -> Classification {
        if let Some(depth) = depth {
            let tier = depth.tier();
            return Classification {
                tier,
                budget: tier.budget(),
                score: 0.0,
                overridden: true,
            };
        }

        let lower = question.to_lowercase();
        let words: Vec<&str> = lower
            .split_whitespace()
            .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '.'))
            .map(|w| w.trim_end_matches('.'))
            .filter(|w| !w.is_empty())
            .collect();
        let has_any = |terms: &[&str]| words.iter().any(|w| terms.contains(w));

        let decision = has_any(DECISION_VERBS);
        let monetary = has_any(MONETARY_TERMS) || lower.contains('$') || lower.contains('€');
        let strategic = has_any(STRATEGIC_TERMS);
        let comparative = lower.contains(" vs")
            || lower.contains(" versus ")
            || words.iter().any(|w| COMPARATIVE_CONNECTIVES.contains(w));
        let regional = has_any(REGION_TERMS);

        let mut score = 0.0;
        if decision {
            score += 1.0;
        }
        if monetary {
            score += 1.0;
        }
        if strategic {
            score += 1.0;
        }
        if comparative && monetary {
            score += 1.0;
        }
        if regional {
            score += 0.5;
        }
        if words.len() > LONG_QUESTION_WORDS {
            score += 0.5;
        }

        let tier = if comparative && (monetary || strategic) {
            ComplexityTier::Comparative
        } else if Self::is_factual_lookup(&lower, words.len()) && !strategic && !monetary {
            ComplexityTier::Simple
        } else if score >= 2.0 {
            ComplexityTier::Complex
        } else {
            ComplexityTier::Standard
        };

        Classification {
            tier,
            budget: tier.budget(),
            score,
            overridden: false,
        }
    }

    fn is_factual_lookup(lower: &str, word_count: usize) -> bool {
        word_count <= FACTUAL_MAX_WORDS
            && FACTUAL_PREFIXES
                .iter()
                .any(|prefix| lower.trim_start().starts_with(prefix))
    }
}
