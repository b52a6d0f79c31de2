//! Contradictions between participants and their resolutions.

use crate::core::string::collapse_whitespace;
use crate::parsing::robust_json::{RobustTextParser, get_f64, get_str};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Two participants' conflicting claims on one topic, found before the debate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contradiction {
    pub topic: String,
    pub participant_a: String,
    pub claim_a: String,
    pub participant_b: String,
    pub claim_b: String,
}

impl Contradiction {
    pub fn new(
        topic: impl Into<String>,
        participant_a: impl Into<String>,
        claim_a: impl Into<String>,
        participant_b: impl Into<String>,
        claim_b: impl Into<String>,
    ) -> Self {
        Self {
            topic: topic.into(),
            participant_a: participant_a.into(),
            claim_a: claim_a.into(),
            participant_b: participant_b.into(),
            claim_b: claim_b.into(),
        }
    }

    /// Claims equal after case folding and whitespace collapsing
    pub fn claims_identical(&self) -> bool {
        normalize_claim(&self.claim_a) == normalize_claim(&self.claim_b)
    }
}

fn normalize_claim(claim: &str) -> String {
    collapse_whitespace(claim).to_lowercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    #[serde(rename = "agent1_correct")]
    Agent1Correct,
    #[serde(rename = "agent2_correct")]
    Agent2Correct,
    #[serde(rename = "both_valid")]
    BothValid,
    #[serde(rename = "neither_valid")]
    NeitherValid,
}

impl ResolutionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionOutcome::Agent1Correct => "agent1_correct",
            ResolutionOutcome::Agent2Correct => "agent2_correct",
            ResolutionOutcome::BothValid => "both_valid",
            ResolutionOutcome::NeitherValid => "neither_valid",
        }
    }

    /// The action that follows from this outcome when none was given
    pub fn default_action(&self) -> ResolutionAction {
        match self {
            ResolutionOutcome::Agent1Correct => ResolutionAction::UseAgent1,
            ResolutionOutcome::Agent2Correct => ResolutionAction::UseAgent2,
            ResolutionOutcome::BothValid => ResolutionAction::UseBoth,
            ResolutionOutcome::NeitherValid => ResolutionAction::FlagForReview,
        }
    }
}

impl fmt::Display for ResolutionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResolutionOutcome {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "agent1_correct" | "agent_1_correct" | "agent_a_correct" | "a_correct" => {
                Ok(ResolutionOutcome::Agent1Correct)
            }
            "agent2_correct" | "agent_2_correct" | "agent_b_correct" | "b_correct" => {
                Ok(ResolutionOutcome::Agent2Correct)
            }
            "both_valid" | "both" => Ok(ResolutionOutcome::BothValid),
            "neither_valid" | "neither" => Ok(ResolutionOutcome::NeitherValid),
            _ => Err(format!("unknown resolution outcome: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionAction {
    #[serde(rename = "use_agent1")]
    UseAgent1,
    #[serde(rename = "use_agent2")]
    UseAgent2,
    UseBoth,
    FlagForReview,
}

impl ResolutionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionAction::UseAgent1 => "use_agent1",
            ResolutionAction::UseAgent2 => "use_agent2",
            ResolutionAction::UseBoth => "use_both",
            ResolutionAction::FlagForReview => "flag_for_review",
        }
    }
}

impl fmt::Display for ResolutionAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ResolutionAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "use_agent1" | "use_agent_1" | "use_a" => Ok(ResolutionAction::UseAgent1),
            "use_agent2" | "use_agent_2" | "use_b" => Ok(ResolutionAction::UseAgent2),
            "use_both" | "both" => Ok(ResolutionAction::UseBoth),
            "flag_for_review" | "flag" | "review" => Ok(ResolutionAction::FlagForReview),
            _ => Err(format!("unknown resolution action: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub contradiction: Contradiction,
    pub outcome: ResolutionOutcome,
    pub explanation: String,
    pub recommended_value: Option<String>,
    pub confidence: f64,
    pub action: ResolutionAction,
    /// Mini-debate turns spent; 0 when the debate was skipped
    pub turns_used: usize,
}

impl Resolution {
    /// Identical claims need no mini-debate
    pub fn identical_claims(contradiction: Contradiction) -> Self {
        let value = contradiction.claim_a.clone();
        Self {
            contradiction,
            outcome: ResolutionOutcome::BothValid,
            explanation: "Both participants made the same claim.".to_string(),
            recommended_value: Some(value),
            confidence: 0.9,
            action: ResolutionAction::UseBoth,
            turns_used: 0,
        }
    }

    /// Used when no summarizer verdict is available. Agreement in the last
    /// response yields `both_valid`, otherwise the contradiction is flagged.
    pub fn fallback(contradiction: Contradiction, agreement_seen: bool, turns_used: usize) -> Self {
        let (outcome, explanation, confidence) = if agreement_seen {
            (
                ResolutionOutcome::BothValid,
                format!("The participants converged after {turns_used} turns of exchange."),
                0.6,
            )
        } else {
            (
                ResolutionOutcome::NeitherValid,
                format!("{turns_used} turns of exchange did not settle the disagreement."),
                0.4,
            )
        };
        Self {
            contradiction,
            outcome,
            explanation,
            recommended_value: None,
            confidence,
            action: outcome.default_action(),
            turns_used,
        }
    }

    /// Parse a summarizer's resolution verdict. `None` when no JSON object
    /// or no recognizable outcome is present.
    pub fn parse(text: &str, contradiction: Contradiction, turns_used: usize) -> Option<Self> {
        let map = RobustTextParser::parse_object(text)?;
        let outcome: ResolutionOutcome = get_str(&map, &["outcome", "verdict", "resolution"])?
            .parse()
            .ok()?;
        let action = get_str(&map, &["action", "recommended_action", "recommendedAction"])
            .and_then(|a| a.parse().ok())
            .unwrap_or_else(|| outcome.default_action());
        let confidence = get_f64(&map, &["confidence"])
            .map(|c| if c > 1.0 { c / 100.0 } else { c })
            .unwrap_or(0.5)
            .clamp(0.0, 1.0);
        let recommended_value = map
            .get("recommended_value")
            .or_else(|| map.get("recommendedValue"))
            .and_then(|v| match v {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) if s.trim().is_empty() => None,
                serde_json::Value::String(s) => Some(s.trim().to_string()),
                other => Some(other.to_string()),
            });

        Some(Self {
            contradiction,
            outcome,
            explanation: get_str(&map, &["explanation", "reasoning"])
                .unwrap_or_default()
                .to_string(),
            recommended_value,
            confidence,
            action,
            turns_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contradiction(a: &str, b: &str) -> Contradiction {
        Contradiction::new("market size", "alice", a, "bob", b)
    }

    #[test]
    fn test_identical_claims_normalized() {
        assert!(contradiction("Market is $2B", "  market   is $2b ").claims_identical());
        assert!(!contradiction("Market is $2B", "Market is $3B").claims_identical());
    }

    #[test]
    fn test_identical_claims_resolution() {
        let r = Resolution::identical_claims(contradiction("X", "x"));
        assert_eq!(r.outcome, ResolutionOutcome::BothValid);
        assert_eq!(r.action, ResolutionAction::UseBoth);
        assert_eq!(r.turns_used, 0);
    }

    #[test]
    fn test_parse_verdict() {
        let text = r#"```json
{"outcome": "agent2_correct", "explanation": "B cites the 2024 filing",
 "recommended_value": 3000000000, "confidence": 80}
```"#;
        let r = Resolution::parse(text, contradiction("2B", "3B"), 4).unwrap();
        assert_eq!(r.outcome, ResolutionOutcome::Agent2Correct);
        assert_eq!(r.action, ResolutionAction::UseAgent2);
        assert_eq!(r.recommended_value.as_deref(), Some("3000000000"));
        assert_eq!(r.confidence, 0.8);
        assert_eq!(r.turns_used, 4);
    }

    #[test]
    fn test_parse_rejects_unknown_outcome() {
        assert!(Resolution::parse(r#"{"outcome": "maybe"}"#, contradiction("a", "b"), 2).is_none());
        assert!(Resolution::parse("no json", contradiction("a", "b"), 2).is_none());
    }

    #[test]
    fn test_fallback() {
        let agreed = Resolution::fallback(contradiction("a", "b"), true, 6);
        assert_eq!(agreed.outcome, ResolutionOutcome::BothValid);
        assert_eq!(agreed.action, ResolutionAction::UseBoth);
        assert_eq!(agreed.confidence, 0.6);
        let flagged = Resolution::fallback(contradiction("a", "b"), false, 10);
        assert_eq!(flagged.outcome, ResolutionOutcome::NeitherValid);
        assert_eq!(flagged.action, ResolutionAction::FlagForReview);
        assert_eq!(flagged.confidence, 0.4);
        assert!(flagged.explanation.contains("10 turns"));
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(
            serde_json::to_string(&ResolutionOutcome::Agent1Correct).unwrap(),
            r#""agent1_correct""#
        );
        assert_eq!(
            serde_json::to_string(&ResolutionAction::FlagForReview).unwrap(),
            r#""flag_for_review""#
        );
    }
}
