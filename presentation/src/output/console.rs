//! Console output formatter for debate outcomes

use crate::output::formatter::OutputFormatter;
use colored::Colorize;
use council_domain::{DebateOutcome, DebatePhase, PhaseStatus, Turn};

/// Formats debate outcomes for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Format the complete outcome
    pub fn format(outcome: &DebateOutcome) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Council Debate"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Question:".cyan().bold(),
            outcome.question
        ));
        output.push_str(&format!(
            "{} {} ({} turns budgeted)\n",
            "Tier:".cyan().bold(),
            outcome.tier,
            outcome.total_budget
        ));
        let participants: Vec<&str> = outcome
            .participant_turn_counts
            .keys()
            .map(String::as_str)
            .collect();
        output.push_str(&format!(
            "{} {}\n",
            "Participants:".cyan().bold(),
            participants.join(", ")
        ));

        // Transcript, one section per phase in the order phases were entered
        for record in &outcome.phase_log {
            let turns: Vec<&Turn> = outcome
                .transcript
                .iter()
                .filter(|t| t.phase == record.phase)
                .collect();
            if turns.is_empty() && record.status != PhaseStatus::Skipped {
                continue;
            }
            output.push_str(&Self::section_header(&format!(
                "{} ({}/{})",
                record.phase.display_name(),
                record.consumed,
                record.allocated
            )));
            if record.status == PhaseStatus::Skipped {
                output.push_str(&format!("\n{}\n", "skipped".dimmed()));
                continue;
            }
            for turn in turns {
                output.push_str(&Self::turn(turn));
            }
        }

        if !outcome.resolutions.is_empty() {
            output.push_str(&Self::section_header("Resolved Contradictions"));
            for resolution in &outcome.resolutions {
                let c = &resolution.contradiction;
                output.push_str(&format!(
                    "\n{}\n",
                    format!("── {} vs {}: {} ──", c.participant_a, c.participant_b, c.topic)
                        .yellow()
                        .bold()
                ));
                output.push_str(&format!(
                    "  {} {} ({:.0}% confidence, {})\n",
                    "Outcome:".bold(),
                    resolution.outcome.as_str(),
                    resolution.confidence * 100.0,
                    resolution.action.as_str()
                ));
                if let Some(value) = &resolution.recommended_value {
                    output.push_str(&format!("  {} {}\n", "Recommended:".bold(), value));
                }
                if !resolution.explanation.is_empty() {
                    output.push_str(&format!("{}\n", Self::indent(&resolution.explanation, "  ")));
                }
            }
        }

        if !outcome.edge_cases.is_empty() {
            output.push_str(&Self::section_header("Edge Cases"));
            for scenario in &outcome.edge_cases {
                output.push_str(&format!(
                    "\n  {} [{}, {:.0}%]\n{}\n",
                    scenario.name.bold(),
                    scenario.severity,
                    scenario.probability_pct,
                    Self::indent(&scenario.description, "    ")
                ));
            }
        }

        output.push_str(&Self::section_header("Report"));
        output.push('\n');
        output.push_str(&outcome.final_report);
        output.push('\n');

        output.push_str(&Self::summary(outcome));
        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(outcome: &DebateOutcome) -> String {
        serde_json::to_string_pretty(outcome).unwrap_or_else(|_| "{}".to_string())
    }

    /// Format the final report only (concise output)
    pub fn format_report_only(outcome: &DebateOutcome) -> String {
        let mut output = String::new();
        output.push_str(&outcome.final_report);
        output.push('\n');
        output.push_str(&Self::summary(outcome));
        output
    }

    fn turn(turn: &Turn) -> String {
        let label = format!("── #{} {} ({}) ──", turn.ordinal, turn.speaker_name(), turn.turn_type);
        let label = if turn.is_moderator() {
            label.magenta().bold()
        } else {
            label.yellow().bold()
        };
        format!("\n{}\n{}\n", label, turn.content)
    }

    fn summary(outcome: &DebateOutcome) -> String {
        let mut line = format!(
            "{} turns ({} participant, {} moderator) over {} phases in {:.1} min",
            outcome.total_turns,
            outcome.participant_turns(),
            outcome.moderator_turns(),
            outcome.phases_completed,
            outcome.execution_time_minutes
        );
        if outcome.truncated {
            line.push_str(", truncated");
        }
        if outcome.emergency {
            line.push_str(", emergency synthesis");
        }
        let mut output = format!("\n{}\n", line.dimmed());
        if let Some(reason) = &outcome.early_exit_reason {
            output.push_str(&format!(
                "{} {}\n",
                format!("{} ended early:", DebatePhase::ChallengeDefense.display_name()).dimmed(),
                reason.dimmed()
            ));
        }
        output
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, outcome: &DebateOutcome) -> String {
        Self::format(outcome)
    }

    fn format_json(&self, outcome: &DebateOutcome) -> String {
        Self::format_json(outcome)
    }

    fn format_report_only(&self, outcome: &DebateOutcome) -> String {
        Self::format_report_only(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{
        ComplexityTier, ConsensusReport, EdgeCaseScenario, PhaseRecord, Speaker, TurnType,
    };
    use std::collections::BTreeMap;

    fn outcome() -> DebateOutcome {
        let transcript = vec![
            Turn::new(
                1,
                Speaker::participant("economist"),
                DebatePhase::Opening,
                TurnType::Opening,
                "Demand is rising 8% a year",
            ),
            Turn::new(
                2,
                Speaker::Moderator,
                DebatePhase::FinalSynthesis,
                TurnType::ConsensusSynthesis,
                "Consensus synthesis: enter (confidence 70%)",
            ),
        ];
        let mut opening = PhaseRecord::active(DebatePhase::Opening, 4);
        opening.consumed = 1;
        opening.status = PhaseStatus::Completed;

        let mut counts = BTreeMap::new();
        counts.insert("economist".to_string(), 1);

        DebateOutcome {
            question: "Should we enter Brazil?".to_string(),
            tier: ComplexityTier::Simple,
            total_budget: 12,
            total_turns: 2,
            phases_completed: 1,
            phase_log: vec![
                opening,
                PhaseRecord::skipped(DebatePhase::RiskAnalysis, 3),
            ],
            transitions: Vec::new(),
            transcript,
            final_report: "# Consensus Report\n\nEnter cautiously.".to_string(),
            resolutions: Vec::new(),
            edge_cases: vec![EdgeCaseScenario {
                name: "Currency shock".to_string(),
                description: "The real drops 30%".to_string(),
                severity: "high".to_string(),
                probability_pct: 15.0,
                impacted_participants: vec!["economist".to_string()],
            }],
            consensus: ConsensusReport::conservative("Enter cautiously."),
            participant_turn_counts: counts,
            execution_time_minutes: 0.5,
            truncated: true,
            emergency: false,
            early_exit_reason: None,
        }
    }

    #[test]
    fn test_full_output_contains_transcript_and_report() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format(&outcome());
        assert!(text.contains("Question: Should we enter Brazil?"));
        assert!(text.contains("Opening Statements (1/4)"));
        assert!(text.contains("#1 economist (opening)"));
        assert!(text.contains("Demand is rising 8% a year"));
        assert!(text.contains("Risk Analysis (0/3)"));
        assert!(text.contains("skipped"));
        assert!(text.contains("Currency shock [high, 15%]"));
        assert!(text.contains("Enter cautiously."));
        assert!(text.contains("truncated"));
    }

    #[test]
    fn test_report_only_omits_transcript() {
        colored::control::set_override(false);
        let text = ConsoleFormatter::format_report_only(&outcome());
        assert!(text.starts_with("# Consensus Report"));
        assert!(!text.contains("Demand is rising"));
        assert!(text.contains("2 turns (1 participant, 1 moderator)"));
    }

    #[test]
    fn test_json_is_parseable() {
        let json = ConsoleFormatter::format_json(&outcome());
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_turns"], 2);
        assert_eq!(value["tier"], "simple");
    }

    #[test]
    fn test_indent() {
        assert_eq!(ConsoleFormatter::indent("a\nb", "  "), "  a\n  b");
    }
}
