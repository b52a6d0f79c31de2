//! Edge-case scenarios explored in the EDGE_CASE phase.

use crate::core::string::excerpt;
use crate::heuristics::keywords::extract_key_terms;
use crate::parsing::robust_json::{RobustTextParser, get_f64, get_str, get_string_list};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeCaseScenario {
    pub name: String,
    pub description: String,
    /// "low", "medium", "high" or "critical"
    pub severity: String,
    /// 0-100
    pub probability_pct: f64,
    /// Participants whose domain the scenario touches most
    #[serde(default)]
    pub impacted_participants: Vec<String>,
}

impl EdgeCaseScenario {
    /// Parse a list of scenarios from summarizer output: either a bare array
    /// or an object with a `scenarios` array. Entries without a description
    /// are dropped.
    pub fn parse_list(text: &str) -> Vec<Self> {
        let Ok(value) = RobustTextParser::parse(text) else {
            return Vec::new();
        };
        let items = match value {
            Value::Array(items) => items,
            Value::Object(mut map) => match map.remove("scenarios").or_else(|| map.remove("edge_cases")) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            },
            _ => Vec::new(),
        };

        items
            .iter()
            .filter_map(Value::as_object)
            .filter_map(|map| {
                let description = get_str(map, &["description", "scenario"])?;
                let name = get_str(map, &["name", "title"])
                    .map(str::to_string)
                    .unwrap_or_else(|| excerpt(description, 60));
                let probability = get_f64(map, &["probability", "probability_pct", "likelihood"])
                    .map(|p| if p <= 1.0 { p * 100.0 } else { p })
                    .unwrap_or(25.0)
                    .clamp(0.0, 100.0);
                Some(Self {
                    name,
                    description: description.to_string(),
                    severity: get_str(map, &["severity", "impact"])
                        .unwrap_or("medium")
                        .to_lowercase(),
                    probability_pct: probability,
                    impacted_participants: get_string_list(
                        map,
                        &["impacted_participants", "impactedParticipants", "affected"],
                    ),
                })
            })
            .collect()
    }

    /// Generic stress scenarios built from the question's key terms when no
    /// summarizer is available.
    pub fn fallback(question: &str, max: usize) -> Vec<Self> {
        let terms = extract_key_terms(question);
        let subject = match terms.as_slice() {
            [] => "the proposal".to_string(),
            [one] => one.clone(),
            [first, second, ..] => format!("{first} and {second}"),
        };
        let templates: [(&str, String, &str, f64); 3] = [
            (
                "Downside shock",
                format!("Key assumptions behind {subject} fail: costs double and adoption halves."),
                "high",
                15.0,
            ),
            (
                "Execution delay",
                format!("Work on {subject} slips by two quarters while competitors move first."),
                "medium",
                30.0,
            ),
            (
                "External constraint",
                format!("A regulatory or market change removes the main benefit of {subject}."),
                "high",
                10.0,
            ),
        ];
        templates
            .into_iter()
            .take(max)
            .map(|(name, description, severity, probability)| Self {
                name: name.to_string(),
                description,
                severity: severity.to_string(),
                probability_pct: probability,
                impacted_participants: Vec::new(),
            })
            .collect()
    }

    /// Text used for key-term relevance matching
    pub fn matching_text(&self) -> String {
        format!("{} {}", self.name, self.description)
    }
}
