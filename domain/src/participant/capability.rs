//! Participant capabilities.
//!
//! Participants are heterogeneous: some can only present a case, others
//! can challenge, assess risk, or produce a final position. The engine asks
//! the [`CapabilitySet`] before routing a turn, and still treats an
//! `Unsupported` error from the participant as a capability miss.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    PresentCase,
    Challenge,
    Respond,
    AnalyzeEdgeCase,
    IdentifyRisks,
    AssessRiskLikelihood,
    FinalPosition,
}

impl Capability {
    pub const ALL: [Capability; 7] = [
        Capability::PresentCase,
        Capability::Challenge,
        Capability::Respond,
        Capability::AnalyzeEdgeCase,
        Capability::IdentifyRisks,
        Capability::AssessRiskLikelihood,
        Capability::FinalPosition,
    ];

    fn bit(self) -> u8 {
        1 << (self as u8)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::PresentCase => "present_case",
            Capability::Challenge => "challenge",
            Capability::Respond => "respond",
            Capability::AnalyzeEdgeCase => "analyze_edge_case",
            Capability::IdentifyRisks => "identify_risks",
            Capability::AssessRiskLikelihood => "assess_risk_likelihood",
            Capability::FinalPosition => "final_position",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim().to_lowercase().replace('-', "_"))
            .ok_or_else(|| format!("unknown capability: {s}"))
    }
}

/// Bit set of [`Capability`] values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CapabilitySet(u8);

impl CapabilitySet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn all() -> Self {
        Capability::ALL.into_iter().collect()
    }

    pub fn with(mut self, capability: Capability) -> Self {
        self.0 |= capability.bit();
        self
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.0 & capability.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Capability> + '_ {
        Capability::ALL.into_iter().filter(|c| self.contains(*c))
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}

impl Serialize for CapabilitySet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let caps: Vec<Capability> = self.iter().collect();
        caps.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CapabilitySet {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let caps = Vec::<Capability>::deserialize(deserializer)?;
        Ok(caps.into_iter().collect())
    }
}

/// Preset capability profiles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantArchetype {
    /// Every capability
    #[default]
    Generalist,
    /// Argues a position; no risk work
    Advocate,
    /// Analysis and positions, no adversarial challenge
    Analyst,
    /// Risk and edge-case specialist
    RiskAssessor,
}

impl ParticipantArchetype {
    pub fn capabilities(&self) -> CapabilitySet {
        use Capability::*;
        match self {
            ParticipantArchetype::Generalist => CapabilitySet::all(),
            ParticipantArchetype::Advocate => {
                [PresentCase, Challenge, Respond, AnalyzeEdgeCase, FinalPosition]
                    .into_iter()
                    .collect()
            }
            ParticipantArchetype::Analyst => [
                PresentCase,
                Respond,
                AnalyzeEdgeCase,
                AssessRiskLikelihood,
                FinalPosition,
            ]
            .into_iter()
            .collect(),
            ParticipantArchetype::RiskAssessor => [
                PresentCase,
                AnalyzeEdgeCase,
                IdentifyRisks,
                AssessRiskLikelihood,
            ]
            .into_iter()
            .collect(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ParticipantArchetype::Generalist => "generalist",
            ParticipantArchetype::Advocate => "advocate",
            ParticipantArchetype::Analyst => "analyst",
            ParticipantArchetype::RiskAssessor => "risk_assessor",
        }
    }
}

impl FromStr for ParticipantArchetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "generalist" => Ok(ParticipantArchetype::Generalist),
            "advocate" => Ok(ParticipantArchetype::Advocate),
            "analyst" => Ok(ParticipantArchetype::Analyst),
            "risk_assessor" | "risk" => Ok(ParticipantArchetype::RiskAssessor),
            _ => Err(format!(
                "unknown archetype: {s} (valid: generalist, advocate, analyst, risk_assessor)"
            )),
        }
    }
}

/// Framing for risk identification.
///
/// `Neutral` is used to retry once after a participant rejected the
/// adversarial framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskMode {
    #[default]
    Standard,
    Neutral,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_operations() {
        let set = CapabilitySet::empty()
            .with(Capability::PresentCase)
            .with(Capability::IdentifyRisks);
        assert!(set.contains(Capability::PresentCase));
        assert!(set.contains(Capability::IdentifyRisks));
        assert!(!set.contains(Capability::Challenge));
        assert_eq!(set.iter().count(), 2);
        assert!(CapabilitySet::empty().is_empty());
        assert_eq!(CapabilitySet::all().iter().count(), Capability::ALL.len());
    }

    #[test]
    fn test_archetypes() {
        assert_eq!(
            ParticipantArchetype::Generalist.capabilities(),
            CapabilitySet::all()
        );
        let risk = ParticipantArchetype::RiskAssessor.capabilities();
        assert!(risk.contains(Capability::IdentifyRisks));
        assert!(!risk.contains(Capability::FinalPosition));
        assert!(!ParticipantArchetype::Analyst
            .capabilities()
            .contains(Capability::Challenge));
    }

    #[test]
    fn test_parse() {
        assert_eq!("identify-risks".parse::<Capability>(), Ok(Capability::IdentifyRisks));
        assert!("juggle".parse::<Capability>().is_err());
        assert_eq!(
            "Risk_Assessor".parse::<ParticipantArchetype>(),
            Ok(ParticipantArchetype::RiskAssessor)
        );
    }

    #[test]
    fn test_serde_as_list() {
        let set: CapabilitySet = [Capability::Challenge, Capability::Respond]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["challenge","respond"]"#);
        let back: CapabilitySet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
