//! Tunable debate heuristics.
//!
//! None of these numbers is load-bearing on its own; they are defaults that
//! deployments may tune through the `[debate]` configuration section.

use super::tier::ComplexityTier;
use crate::config::validation::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebatePolicy {
    /// Devil's advocate fires when this many turns passed since its last turn
    pub devils_advocate_interval: usize,
    /// Topic drift is checked every N participant turns of CHALLENGE_DEFENSE
    pub drift_check_interval: usize,
    /// Participant turns scanned by one drift check
    pub drift_window: usize,
    /// Question key terms a window must mention to count as on topic
    pub drift_min_key_terms: usize,
    /// Sliding window of the meta-debate monitor
    pub meta_window: usize,
    /// Distinct methodology phrases for a turn to count as meta-debate
    pub meta_min_phrase_hits: usize,
    /// Qualifying turns within the window for one detection
    pub meta_qualifying_turns: usize,
    /// Detections that force a hard refocus
    pub meta_trigger_limit: usize,
    /// Budget fraction before which the meta-debate monitor is idle
    pub meta_activation_fraction: f64,
    /// Participant turns inspected by the repetition test
    pub repetition_window: usize,
    /// At most this many distinct texts in the window means stalled
    pub repetition_max_distinct: usize,
    /// Bytes of each turn compared by the repetition test
    pub repetition_fingerprint_len: usize,
    /// Budget fraction required before explicit agreement may end the phase
    pub agreement_fraction: f64,
    /// Same, for the short simple tier
    pub simple_agreement_fraction: f64,
    /// After CHALLENGE_DEFENSE, at or above this fraction skip to CONSENSUS
    pub circuit_breaker_fraction: f64,
    /// RISK_ANALYSIS is skipped at or above this fraction
    pub risk_skip_fraction: f64,
    /// Final positions below this confidence are reported as warnings
    pub low_confidence_threshold: f64,
    /// Mean confidence at or above this is labelled "high"
    pub high_confidence_threshold: f64,
    /// Challenge/response rounds per contradiction
    pub max_resolution_rounds: usize,
    /// Scenarios analysed during EDGE_CASE
    pub max_edge_case_scenarios: usize,
    /// Participants assessing each identified risk
    pub risk_assessors: usize,
    /// Replaces the tier's total turn budget
    pub total_budget_override: Option<usize>,
}

impl Default for DebatePolicy {
    fn default() -> Self {
        Self {
            devils_advocate_interval: 10,
            drift_check_interval: 10,
            drift_window: 10,
            drift_min_key_terms: 2,
            meta_window: 15,
            meta_min_phrase_hits: 2,
            meta_qualifying_turns: 10,
            meta_trigger_limit: 4,
            meta_activation_fraction: 0.5,
            repetition_window: 8,
            repetition_max_distinct: 2,
            repetition_fingerprint_len: 120,
            agreement_fraction: 0.95,
            simple_agreement_fraction: 0.90,
            circuit_breaker_fraction: 0.90,
            risk_skip_fraction: 0.85,
            low_confidence_threshold: 0.40,
            high_confidence_threshold: 0.65,
            max_resolution_rounds: 5,
            max_edge_case_scenarios: 3,
            risk_assessors: 2,
            total_budget_override: None,
        }
    }
}

impl DebatePolicy {
    pub fn with_total_budget(mut self, total: usize) -> Self {
        self.total_budget_override = Some(total);
        self
    }

    pub fn agreement_fraction_for(&self, tier: ComplexityTier) -> f64 {
        match tier {
            ComplexityTier::Simple => self.simple_agreement_fraction,
            _ => self.agreement_fraction,
        }
    }

    /// Validate every field, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let counts = [
            ("devils_advocate_interval", self.devils_advocate_interval),
            ("drift_check_interval", self.drift_check_interval),
            ("drift_window", self.drift_window),
            ("meta_window", self.meta_window),
            ("meta_qualifying_turns", self.meta_qualifying_turns),
            ("meta_trigger_limit", self.meta_trigger_limit),
            ("repetition_window", self.repetition_window),
            ("repetition_fingerprint_len", self.repetition_fingerprint_len),
            ("max_resolution_rounds", self.max_resolution_rounds),
        ];
        for (field, value) in counts {
            if value == 0 {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::ZeroValue {
                        field: format!("debate.{field}"),
                    },
                    format!("debate.{field} cannot be 0"),
                ));
            }
        }

        let fractions = [
            ("meta_activation_fraction", self.meta_activation_fraction),
            ("agreement_fraction", self.agreement_fraction),
            ("simple_agreement_fraction", self.simple_agreement_fraction),
            ("circuit_breaker_fraction", self.circuit_breaker_fraction),
            ("risk_skip_fraction", self.risk_skip_fraction),
            ("low_confidence_threshold", self.low_confidence_threshold),
            ("high_confidence_threshold", self.high_confidence_threshold),
        ];
        for (field, value) in fractions {
            if !(value > 0.0 && value <= 1.0) {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidFraction {
                        field: format!("debate.{field}"),
                    },
                    format!("debate.{field} must be in (0, 1], got {value}"),
                ));
            }
        }

        if self.meta_qualifying_turns > self.meta_window {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint {
                    field: "debate.meta_qualifying_turns".to_string(),
                },
                "debate.meta_qualifying_turns cannot exceed debate.meta_window",
            ));
        }

        if self.low_confidence_threshold > self.high_confidence_threshold {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::InvalidConstraint {
                    field: "debate.low_confidence_threshold".to_string(),
                },
                "debate.low_confidence_threshold cannot exceed debate.high_confidence_threshold",
            ));
        }

        if self.total_budget_override == Some(0) {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroValue {
                    field: "debate.total_budget".to_string(),
                },
                "debate.total_budget cannot be 0",
            ));
        }

        issues
    }
}
