//! The consensus report compiled at the end of a debate.

use crate::core::string::excerpt;
use crate::heuristics::confidence::{ConfidenceLabel, NEUTRAL_CONFIDENCE};
use crate::parsing::robust_json::{RobustTextParser, get_f64, get_str, get_string_list};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Write;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantifiedAssessment {
    /// e.g. "probability", "expected_roi", "cost_range"
    pub metric_type: String,
    pub value: String,
    pub reasoning: String,
}

impl QuantifiedAssessment {
    pub fn is_empty(&self) -> bool {
        self.metric_type.is_empty() && self.value.is_empty() && self.reasoning.is_empty()
    }

    fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self {
                metric_type: get_str(map, &["metric_type", "metricType", "metric"])
                    .unwrap_or_default()
                    .to_string(),
                value: map
                    .get("value")
                    .map(|v| match v {
                        Value::String(s) => s.trim().to_string(),
                        Value::Null => String::new(),
                        other => other.to_string(),
                    })
                    .unwrap_or_default(),
                reasoning: get_str(map, &["reasoning", "rationale"])
                    .unwrap_or_default()
                    .to_string(),
            },
            Value::String(s) => Self {
                value: s.trim().to_string(),
                ..Self::default()
            },
            Value::Number(n) => Self {
                value: n.to_string(),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusReport {
    pub direct_answer: String,
    #[serde(default)]
    pub quantified_assessment: QuantifiedAssessment,
    #[serde(default)]
    pub key_findings: Vec<String>,
    #[serde(default)]
    pub agreements: Vec<String>,
    #[serde(default)]
    pub disagreements: Vec<String>,
    pub confidence_level: f64,
    #[serde(default)]
    pub recommendation: String,
    #[serde(default)]
    pub risks_and_mitigations: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub low_confidence_warnings: Vec<String>,
    /// Summarizer output kept verbatim when it could not be parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_synthesis: Option<String>,
    /// Built by the emergency path rather than the summarizer
    #[serde(default)]
    pub emergency: bool,
}

impl ConsensusReport {
    /// Parse summarizer output. `None` when no object with a direct answer
    /// is found.
    pub fn parse(text: &str) -> Option<Self> {
        let map = RobustTextParser::parse_object(text)?;
        Self::from_map(&map)
    }

    fn from_map(map: &Map<String, Value>) -> Option<Self> {
        let direct_answer = get_str(map, &["direct_answer", "directAnswer", "answer"])?;
        let confidence_level = map
            .get("confidence_level")
            .or_else(|| map.get("confidenceLevel"))
            .or_else(|| map.get("confidence"))
            .map(confidence_from_value)
            .unwrap_or(NEUTRAL_CONFIDENCE);

        Some(Self {
            direct_answer: direct_answer.to_string(),
            quantified_assessment: map
                .get("quantified_assessment")
                .or_else(|| map.get("quantifiedAssessment"))
                .map(QuantifiedAssessment::from_value)
                .unwrap_or_default(),
            key_findings: get_string_list(map, &["key_findings", "keyFindings"]),
            agreements: get_string_list(map, &["agreements", "areas_of_agreement"]),
            disagreements: get_string_list(map, &["disagreements", "areas_of_disagreement"]),
            confidence_level,
            recommendation: get_str(map, &["recommendation"])
                .unwrap_or_default()
                .to_string(),
            risks_and_mitigations: get_string_list(
                map,
                &["risks_and_mitigations", "risksAndMitigations", "risks"],
            ),
            next_steps: get_string_list(map, &["next_steps", "nextSteps"]),
            low_confidence_warnings: Vec::new(),
            raw_synthesis: None,
            emergency: false,
        })
    }

    /// Conservative report around unparseable summarizer output
    pub fn conservative(raw: &str) -> Self {
        let first_line = raw
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(|l| excerpt(l, 280))
            .unwrap_or_else(|| "No structured synthesis was produced.".to_string());
        Self {
            direct_answer: first_line,
            quantified_assessment: QuantifiedAssessment::default(),
            key_findings: Vec::new(),
            agreements: Vec::new(),
            disagreements: Vec::new(),
            confidence_level: NEUTRAL_CONFIDENCE,
            recommendation: "Review the raw synthesis before acting.".to_string(),
            risks_and_mitigations: Vec::new(),
            next_steps: Vec::new(),
            low_confidence_warnings: Vec::new(),
            raw_synthesis: Some(raw.to_string()),
            emergency: false,
        }
    }

    pub fn confidence_label(&self, low_threshold: f64, high_threshold: f64) -> ConfidenceLabel {
        ConfidenceLabel::for_value(self.confidence_level, low_threshold, high_threshold)
    }

    /// Markdown rendering used as the debate's final report
    pub fn render_markdown(&self, question: &str, low_threshold: f64, high_threshold: f64) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Consensus Report\n");
        let _ = writeln!(out, "**Question:** {question}\n");
        if self.emergency {
            let _ = writeln!(
                out,
                "> Emergency synthesis: built from participants' final positions.\n"
            );
        }

        let _ = writeln!(out, "## Direct Answer\n\n{}\n", self.direct_answer);
        let _ = writeln!(
            out,
            "**Confidence:** {} ({:.0}%)\n",
            self.confidence_label(low_threshold, high_threshold),
            self.confidence_level * 100.0
        );

        if !self.quantified_assessment.is_empty() {
            let qa = &self.quantified_assessment;
            let _ = writeln!(out, "## Quantified Assessment\n");
            if !qa.metric_type.is_empty() {
                let _ = writeln!(out, "- Metric: {}", qa.metric_type);
            }
            if !qa.value.is_empty() {
                let _ = writeln!(out, "- Value: {}", qa.value);
            }
            if !qa.reasoning.is_empty() {
                let _ = writeln!(out, "- Reasoning: {}", qa.reasoning);
            }
            out.push('\n');
        }

        render_list(&mut out, "Key Findings", &self.key_findings);
        render_list(&mut out, "Agreements", &self.agreements);
        render_list(&mut out, "Disagreements", &self.disagreements);
        if !self.recommendation.is_empty() {
            let _ = writeln!(out, "## Recommendation\n\n{}\n", self.recommendation);
        }
        render_list(&mut out, "Risks and Mitigations", &self.risks_and_mitigations);
        render_list(&mut out, "Next Steps", &self.next_steps);
        render_list(&mut out, "Low-Confidence Warnings", &self.low_confidence_warnings);

        if let Some(raw) = &self.raw_synthesis {
            let _ = writeln!(out, "## Raw Synthesis\n\n```\n{}\n```\n", raw.trim());
        }
        out.trim_end().to_string() + "\n"
    }
}

fn render_list(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    let _ = writeln!(out, "## {title}\n");
    for item in items {
        let _ = writeln!(out, "- {item}");
    }
    out.push('\n');
}

/// Numbers, numeric strings, percentages and high/medium/low labels
fn confidence_from_value(value: &Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let s = s.trim().to_lowercase();
            match s.as_str() {
                "high" => Some(0.8),
                "medium" | "moderate" => Some(0.55),
                "low" => Some(0.3),
                _ => s.trim_end_matches('%').trim().parse().ok(),
            }
        }
        _ => None,
    };
    match raw {
        Some(v) if v > 1.0 => (v / 100.0).clamp(0.0, 1.0),
        Some(v) => v.clamp(0.0, 1.0),
        None => NEUTRAL_CONFIDENCE,
    }
}
