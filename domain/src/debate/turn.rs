//! Turns: the append-only unit of a debate transcript.

use super::phase::DebatePhase;
use serde::{Deserialize, Serialize};

/// Display name used for moderator turns
pub const MODERATOR: &str = "Moderator";

/// Who produced a turn
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum Speaker {
    Participant(String),
    /// Engine-generated turns (interventions, synthesis); excluded from fairness counts
    Moderator,
}

impl Speaker {
    pub fn participant(name: impl Into<String>) -> Self {
        Speaker::Participant(name.into())
    }

    pub fn name(&self) -> &str {
        match self {
            Speaker::Participant(name) => name,
            Speaker::Moderator => MODERATOR,
        }
    }

    pub fn is_moderator(&self) -> bool {
        matches!(self, Speaker::Moderator)
    }
}

impl std::fmt::Display for Speaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Kind of contribution a turn represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnType {
    Opening,
    Challenge,
    Response,
    WeighIn,
    EdgeCaseAnalysis,
    RiskIdentification,
    RiskAssessment,
    FinalPosition,
    ConsensusSynthesis,
    Refocus,
    Redirect,
    DevilsAdvocate,
}

impl TurnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnType::Opening => "opening",
            TurnType::Challenge => "challenge",
            TurnType::Response => "response",
            TurnType::WeighIn => "weigh_in",
            TurnType::EdgeCaseAnalysis => "edge_case_analysis",
            TurnType::RiskIdentification => "risk_identification",
            TurnType::RiskAssessment => "risk_assessment",
            TurnType::FinalPosition => "final_position",
            TurnType::ConsensusSynthesis => "consensus_synthesis",
            TurnType::Refocus => "refocus",
            TurnType::Redirect => "redirect",
            TurnType::DevilsAdvocate => "devils_advocate",
        }
    }

    /// Turn types only the moderator produces
    pub fn is_intervention(&self) -> bool {
        matches!(
            self,
            TurnType::Redirect | TurnType::DevilsAdvocate | TurnType::ConsensusSynthesis
        )
    }
}

impl std::fmt::Display for TurnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One immutable entry of the transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// 1-based position in the transcript; strictly increasing
    pub ordinal: usize,
    pub speaker: Speaker,
    pub phase: DebatePhase,
    pub turn_type: TurnType,
    pub content: String,
    /// Milliseconds since epoch
    pub timestamp: u64,
}

impl Turn {
    pub fn new(
        ordinal: usize,
        speaker: Speaker,
        phase: DebatePhase,
        turn_type: TurnType,
        content: impl Into<String>,
    ) -> Self {
        Self {
            ordinal,
            speaker,
            phase,
            turn_type,
            content: content.into(),
            timestamp: current_timestamp(),
        }
    }

    pub fn speaker_name(&self) -> &str {
        self.speaker.name()
    }

    pub fn is_moderator(&self) -> bool {
        self.speaker.is_moderator()
    }
}

/// Get current timestamp in milliseconds
fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moderator_speaker() {
        let turn = Turn::new(
            1,
            Speaker::Moderator,
            DebatePhase::ChallengeDefense,
            TurnType::Redirect,
            "Back to the question.",
        );
        assert!(turn.is_moderator());
        assert_eq!(turn.speaker_name(), MODERATOR);
        assert!(turn.turn_type.is_intervention());
    }

    #[test]
    fn test_turn_type_serde() {
        let json = serde_json::to_string(&TurnType::DevilsAdvocate).unwrap();
        assert_eq!(json, "\"devils_advocate\"");
        let parsed: TurnType = serde_json::from_str("\"weigh_in\"").unwrap();
        assert_eq!(parsed, TurnType::WeighIn);
    }

    #[test]
    fn test_speaker_serde_roundtrip() {
        let speaker = Speaker::participant("economist");
        let json = serde_json::to_value(&speaker).unwrap();
        assert_eq!(json["kind"], "participant");
        assert_eq!(json["name"], "economist");
    }
}
