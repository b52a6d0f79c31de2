//! Confidence extraction from free text.
//!
//! Explicit statements ("80% confidence", "confidence of 0.7", "75% certain")
//! win; otherwise a lexical estimate is derived from certainty and
//! uncertainty phrases.

use super::lexicon::{CERTAINTY_PHRASES, UNCERTAINTY_PHRASES, count_phrase_hits};
use super::scoring::ScoringStrategy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// "80% confidence", "75 % certain", "90% sure"
static PERCENT_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,3}(?:\.\d+)?)\s*%\s*(?:confidence|confident|certain|certainty|sure)\b")
        .expect("valid confidence pattern")
});

/// "confidence of 80%", "Confidence: 0.7", "confidence level is 75"
static CONFIDENCE_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bconfidence(?:\s+level)?\s*(?:of|:|is|at|=)\s*(\d{1,3}(?:\.\d+)?)\s*%?")
        .expect("valid confidence pattern")
});

pub const NEUTRAL_CONFIDENCE: f64 = 0.5;
const LEXICAL_STEP: f64 = 0.1;
const LEXICAL_FLOOR: f64 = 0.3;
const LEXICAL_CEILING: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
}

impl ConfidenceLabel {
    pub fn for_value(value: f64, low_threshold: f64, high_threshold: f64) -> Self {
        if value >= high_threshold {
            ConfidenceLabel::High
        } else if value >= low_threshold {
            ConfidenceLabel::Medium
        } else {
            ConfidenceLabel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLabel::High => "high",
            ConfidenceLabel::Medium => "medium",
            ConfidenceLabel::Low => "low",
        }
    }
}

impl std::fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceExtractor;

impl ConfidenceExtractor {
    /// Confidence in [0, 1]: the last explicit statement, else the lexical
    /// estimate, else 0.5.
    pub fn extract(text: &str) -> f64 {
        Self::explicit(text).unwrap_or_else(|| Self::lexical(text))
    }

    /// The last explicitly stated confidence, normalized to [0, 1].
    ///
    /// Values above 1 are read as percentages.
    pub fn explicit(text: &str) -> Option<f64> {
        let mut found: Vec<(usize, f64)> = Vec::new();
        for re in [&*PERCENT_FIRST_RE, &*CONFIDENCE_FIRST_RE] {
            for caps in re.captures_iter(text) {
                if let Some(m) = caps.get(1)
                    && let Ok(raw) = m.as_str().parse::<f64>()
                {
                    found.push((m.start(), raw));
                }
            }
        }
        found
            .into_iter()
            .max_by_key(|(pos, _)| *pos)
            .map(|(_, raw)| normalize(raw))
    }

    /// 0.5 moved by 0.1 per certainty phrase and -0.1 per uncertainty
    /// phrase, kept within [0.3, 0.9].
    pub fn lexical(text: &str) -> f64 {
        let certain = count_phrase_hits(text, CERTAINTY_PHRASES) as f64;
        let uncertain = count_phrase_hits(text, UNCERTAINTY_PHRASES) as f64;
        if certain == 0.0 && uncertain == 0.0 {
            return NEUTRAL_CONFIDENCE;
        }
        (NEUTRAL_CONFIDENCE + LEXICAL_STEP * (certain - uncertain)).clamp(LEXICAL_FLOOR, LEXICAL_CEILING)
    }
}

impl ScoringStrategy for ConfidenceExtractor {
    fn score(&self, text: &str) -> f64 {
        Self::extract(text)
    }
}

fn normalize(raw: f64) -> f64 {
    let value = if raw > 1.0 { raw / 100.0 } else { raw };
    value.clamp(0.0, 1.0)
}
