//! Prompt templates for the debate flow

use crate::core::string::excerpt;
use crate::debate::{Turn, TurnContext};
use crate::participant::RiskMode;
use crate::synthesis::{ConsensusReport, Contradiction, EdgeCaseScenario, Resolution};
use std::fmt::Write;

const EXCERPT_LEN: usize = 240;

/// Everything the consensus prompt draws on
#[derive(Debug, Clone, Copy)]
pub struct ConsensusPromptInput<'a> {
    pub question: &'a str,
    pub final_positions: &'a [(String, String)],
    pub highlights: &'a [(String, String)],
    pub resolutions: &'a [Resolution],
    pub edge_cases: &'a [EdgeCaseScenario],
    pub risk_assessments: &'a [(String, String)],
    pub extracted_facts: &'a [String],
    pub numeric_results: Option<&'a serde_json::Value>,
    pub cross_scenario_context: Option<&'a str>,
}

/// Templates for moderator turns and model prompts
pub struct DebatePromptTemplate;

impl DebatePromptTemplate {
    // ==================== Moderator turns ====================

    /// Devil's-advocate challenge summarizing recent positions
    pub fn devils_advocate(question: &str, recent: &[&Turn], next_speakers: &[String]) -> String {
        let mut text = format!(
            "Devil's advocate: the discussion on \"{}\" may be settling too early.\n\nPositions so far:\n",
            question
        );
        for turn in recent {
            let _ = writeln!(text, "- {}: {}", turn.speaker_name(), excerpt(&turn.content, 120));
        }
        let addressed = if next_speakers.is_empty() {
            "Next speakers".to_string()
        } else {
            next_speakers.join(", ")
        };
        let _ = write!(
            text,
            "\n{}: argue against the emerging view and give a quantified, on-topic answer \
             (a number, range, or probability) in your next turn.",
            addressed
        );
        text
    }

    /// Redirect after topic drift
    pub fn redirect(question: &str) -> String {
        format!(
            r#"Redirect: the discussion has drifted away from the question.

Question: "{}"

Next speaker: answer it directly and give a quantified estimate (a number, range, or probability)."#,
            question
        )
    }

    /// Instruction for hard-refocus turns after sustained meta-debate
    pub fn refocus_directive() -> &'static str {
        "The debate is circling around methodology. In two or three sentences, state your final position on the question itself."
    }

    /// Directive used when a participant presents a case in place of a
    /// challenge it cannot make
    pub fn weigh_in_directive() -> &'static str {
        "Weigh in on the discussion so far. Add one new, quantified point."
    }

    /// Closing moderator turn announcing the consensus
    pub fn consensus_turn(report: &ConsensusReport) -> String {
        format!(
            "Consensus synthesis: {} (confidence {:.0}%)",
            report.direct_answer,
            report.confidence_level * 100.0
        )
    }

    // ==================== Participant prompts ====================

    /// System prompt identifying a participant's role
    pub fn participant_system(name: &str, focus_terms: &[String]) -> String {
        let mut prompt = format!(
            r#"You are {}, one expert in a structured, multi-party debate.
Argue from evidence, quantify wherever you can, and keep every turn short (under 150 words).
Address the question directly; do not discuss the debate format."#,
            name
        );
        if !focus_terms.is_empty() {
            let _ = write!(prompt, "\nYour area of focus: {}.", focus_terms.join(", "));
        }
        prompt
    }

    pub fn present_case(ctx: &TurnContext) -> String {
        let mut prompt = Self::context_block(ctx);
        match &ctx.assigned_option {
            Some(option) => {
                let _ = write!(
                    prompt,
                    "\nMake the strongest case for \"{}\". State your expected outcome with a number or range.",
                    option
                );
            }
            None => prompt.push_str(
                "\nPresent your opening position on the question. State your expected outcome with a number or range.",
            ),
        }
        prompt
    }

    pub fn challenge(ctx: &TurnContext, target: &str, claim: &str) -> String {
        let mut prompt = Self::context_block(ctx);
        let _ = write!(
            prompt,
            "\n{} claimed:\n\"{}\"\n\nChallenge the weakest part of this claim with a specific counter-argument or counter-number.",
            target,
            excerpt(claim, EXCERPT_LEN)
        );
        prompt
    }

    pub fn respond(ctx: &TurnContext, challenger: &str, challenge: &str) -> String {
        let mut prompt = Self::context_block(ctx);
        let _ = write!(
            prompt,
            "\n{} challenged you:\n\"{}\"\n\nDefend or revise your position. Concede explicitly where the challenge is right.",
            challenger,
            excerpt(challenge, EXCERPT_LEN)
        );
        prompt
    }

    pub fn analyze_edge_case(ctx: &TurnContext, scenario: &EdgeCaseScenario) -> String {
        let mut prompt = Self::context_block(ctx);
        let _ = write!(
            prompt,
            "\nEdge case \"{}\" (severity {}, probability {:.0}%):\n{}\n\nHow would this change your position? Quantify the impact.",
            scenario.name, scenario.severity, scenario.probability_pct, scenario.description
        );
        prompt
    }

    pub fn identify_risks(ctx: &TurnContext, mode: RiskMode) -> String {
        let mut prompt = Self::context_block(ctx);
        match mode {
            RiskMode::Standard => prompt.push_str(
                "\nIdentify the catastrophic risks in the emerging answer: what could fail badly, and how badly.",
            ),
            RiskMode::Neutral => prompt.push_str(
                "\nList the main uncertainties in the emerging answer, with a likelihood estimate and one mitigating step for each.",
            ),
        }
        prompt
    }

    pub fn assess_risk_likelihood(ctx: &TurnContext, risk: &str) -> String {
        let mut prompt = Self::context_block(ctx);
        let _ = write!(
            prompt,
            "\nRisk raised:\n\"{}\"\n\nEstimate its likelihood as a percentage and its impact, and name one mitigation.",
            excerpt(risk, EXCERPT_LEN)
        );
        prompt
    }

    pub fn final_position(ctx: &TurnContext, require_confidence: bool) -> String {
        let mut prompt = Self::context_block(ctx);
        prompt.push_str("\nState your final position on the question in two or three sentences.");
        if require_confidence {
            prompt.push_str(" End with your confidence as a percentage, e.g. \"Confidence: 70%\".");
        }
        prompt
    }

    fn context_block(ctx: &TurnContext) -> String {
        let mut block = format!("Question: {}\nPhase: {}\n", ctx.question, ctx.phase.display_name());
        if let Some(directive) = &ctx.directive {
            let _ = writeln!(block, "Moderator: {}", directive);
        }
        if let Some(report) = &ctx.prior_report {
            let _ = writeln!(block, "\nYour earlier analysis:\n{}", excerpt(report, 800));
        }
        if !ctx.extracted_facts.is_empty() {
            block.push_str("\nEstablished facts:\n");
            for fact in &ctx.extracted_facts {
                let _ = writeln!(block, "- {}", fact);
            }
        }
        if let Some(context) = &ctx.cross_scenario_context {
            let _ = writeln!(block, "\nRelated scenarios:\n{}", excerpt(context, 800));
        }
        if !ctx.recent.is_empty() {
            block.push_str("\nRecent turns:\n");
            for turn in &ctx.recent {
                let _ = writeln!(
                    block,
                    "[{}] {}: {}",
                    turn.turn_type,
                    turn.speaker_name(),
                    excerpt(&turn.content, EXCERPT_LEN)
                );
            }
        }
        block
    }

    // ==================== Summarizer prompts ====================

    pub fn resolution_system() -> &'static str {
        r#"You are a neutral arbiter resolving a factual disagreement between two experts.
Judge only on the evidence in the exchange. Respond with JSON only."#
    }

    pub fn resolution_prompt(
        question: &str,
        contradiction: &Contradiction,
        exchange: &[(String, String)],
    ) -> String {
        let mut prompt = format!(
            r#"Question under debate: {}

Topic: {}
Agent 1 ({}) claims: {}
Agent 2 ({}) claims: {}

Exchange:
"#,
            question,
            contradiction.topic,
            contradiction.participant_a,
            contradiction.claim_a,
            contradiction.participant_b,
            contradiction.claim_b
        );
        for (speaker, content) in exchange {
            let _ = writeln!(prompt, "--- {} ---\n{}", speaker, content);
        }
        prompt.push_str(
            r#"
Respond with a JSON object:
{"outcome": "agent1_correct" | "agent2_correct" | "both_valid" | "neither_valid",
 "explanation": "...",
 "recommended_value": "..." or null,
 "confidence": 0.0-1.0,
 "action": "use_agent1" | "use_agent2" | "use_both" | "flag_for_review"}"#,
        );
        prompt
    }

    pub fn edge_case_system() -> &'static str {
        r#"You are a stress-testing analyst. You propose concrete, plausible scenarios that would break the emerging answer.
Respond with JSON only."#
    }

    pub fn edge_case_prompt(
        question: &str,
        participants: &[String],
        digest: &[(String, String)],
        max_scenarios: usize,
    ) -> String {
        let mut prompt = format!(
            "Question: {}\nParticipants: {}\n\nDebate so far:\n",
            question,
            participants.join(", ")
        );
        for (speaker, content) in digest {
            let _ = writeln!(prompt, "- {}: {}", speaker, excerpt(content, EXCERPT_LEN));
        }
        let _ = write!(
            prompt,
            r#"
Propose up to {} edge-case scenarios as JSON:
{{"scenarios": [{{"name": "...", "description": "...", "severity": "low|medium|high|critical",
  "probability": 0-100, "impacted_participants": ["participant names"]}}]}}"#,
            max_scenarios
        );
        prompt
    }

    pub fn consensus_system() -> &'static str {
        r#"You are a moderator compiling the final consensus of a structured expert debate.
Be balanced, quantify the answer, and keep disagreements visible. Respond with JSON only."#
    }

    pub fn consensus_prompt(input: &ConsensusPromptInput<'_>) -> String {
        let mut prompt = format!("Question: {}\n", input.question);

        if !input.final_positions.is_empty() {
            prompt.push_str("\nFinal positions:\n");
            for (name, position) in input.final_positions {
                let _ = writeln!(prompt, "--- {} ---\n{}", name, position);
            }
        }
        if !input.highlights.is_empty() {
            prompt.push_str("\nDebate highlights:\n");
            for (name, content) in input.highlights {
                let _ = writeln!(prompt, "- {}: {}", name, excerpt(content, EXCERPT_LEN));
            }
        }
        if !input.resolutions.is_empty() {
            prompt.push_str("\nResolved contradictions:\n");
            for r in input.resolutions {
                let _ = writeln!(
                    prompt,
                    "- {}: {} ({})",
                    r.contradiction.topic, r.outcome, r.explanation
                );
            }
        }
        if !input.edge_cases.is_empty() {
            prompt.push_str("\nEdge cases considered:\n");
            for s in input.edge_cases {
                let _ = writeln!(prompt, "- {} ({}, {:.0}%)", s.name, s.severity, s.probability_pct);
            }
        }
        if !input.risk_assessments.is_empty() {
            prompt.push_str("\nRisk assessments:\n");
            for (name, content) in input.risk_assessments {
                let _ = writeln!(prompt, "- {}: {}", name, excerpt(content, EXCERPT_LEN));
            }
        }
        if !input.extracted_facts.is_empty() {
            prompt.push_str("\nEstablished facts:\n");
            for fact in input.extracted_facts {
                let _ = writeln!(prompt, "- {}", fact);
            }
        }
        if let Some(numbers) = input.numeric_results {
            let _ = writeln!(prompt, "\nPrecomputed numeric results:\n{}", numbers);
        }
        if let Some(context) = input.cross_scenario_context {
            let _ = writeln!(prompt, "\nRelated scenarios:\n{}", excerpt(context, 800));
        }

        prompt.push_str(
            r#"
Respond with a JSON object:
{"direct_answer": "...",
 "quantified_assessment": {"metric_type": "...", "value": "...", "reasoning": "..."},
 "key_findings": ["..."], "agreements": ["..."], "disagreements": ["..."],
 "confidence_level": 0.0-1.0,
 "recommendation": "...",
 "risks_and_mitigations": ["..."], "next_steps": ["..."]}"#,
        );
        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::{DebatePhase, Speaker, TurnType};

    fn turn(who: &str, text: &str) -> Turn {
        Turn::new(1, Speaker::participant(who), DebatePhase::ChallengeDefense, TurnType::Challenge, text)
    }

    #[test]
    fn test_devils_advocate_lists_positions() {
        let t = [turn("alice", "Ship it"), turn("bob", "Wait a quarter")];
        let refs: Vec<&Turn> = t.iter().collect();
        let text = DebatePromptTemplate::devils_advocate(
            "Ship now?",
            &refs,
            &["carol".to_string(), "alice".to_string()],
        );
        assert!(text.contains("- alice: Ship it"));
        assert!(text.contains("carol, alice:"));
        assert!(text.contains("quantified"));
    }

    #[test]
    fn test_redirect_quotes_question() {
        let text = DebatePromptTemplate::redirect("Should we raise prices?");
        assert!(text.contains("\"Should we raise prices?\""));
        assert!(text.contains("quantified"));
    }

    #[test]
    fn test_participant_prompts_include_context() {
        let ctx = TurnContext::new("Raise prices?", DebatePhase::Advocacy)
            .with_assigned_option("raise")
            .with_extracted_facts(vec!["churn is 3%".to_string()])
            .with_recent(vec![turn("bob", "Prices are fine")]);
        let prompt = DebatePromptTemplate::present_case(&ctx);
        assert!(prompt.contains("strongest case for \"raise\""));
        assert!(prompt.contains("- churn is 3%"));
        assert!(prompt.contains("bob: Prices are fine"));

        let final_prompt = DebatePromptTemplate::final_position(&ctx, true);
        assert!(final_prompt.contains("Confidence: 70%"));
        assert!(!DebatePromptTemplate::final_position(&ctx, false).contains("percentage"));
    }

    #[test]
    fn test_risk_modes_differ() {
        let ctx = TurnContext::new("Q", DebatePhase::RiskAnalysis);
        let standard = DebatePromptTemplate::identify_risks(&ctx, RiskMode::Standard);
        let neutral = DebatePromptTemplate::identify_risks(&ctx, RiskMode::Neutral);
        assert_ne!(standard, neutral);
        assert!(neutral.contains("uncertainties"));
        let likelihood = DebatePromptTemplate::assess_risk_likelihood(&ctx, "vendor lock-in");
        assert!(likelihood.contains("\"vendor lock-in\""));
    }

    #[test]
    fn test_consensus_prompt_sections() {
        let positions = vec![("alice".to_string(), "Yes, 70%".to_string())];
        let facts = vec!["revenue $2M".to_string()];
        let numbers = serde_json::json!({"npv": 1.2});
        let input = ConsensusPromptInput {
            question: "Expand?",
            final_positions: &positions,
            highlights: &[],
            resolutions: &[],
            edge_cases: &[],
            risk_assessments: &[],
            extracted_facts: &facts,
            numeric_results: Some(&numbers),
            cross_scenario_context: None,
        };
        let prompt = DebatePromptTemplate::consensus_prompt(&input);
        assert!(prompt.contains("--- alice ---"));
        assert!(prompt.contains("- revenue $2M"));
        assert!(prompt.contains("\"npv\":1.2"));
        assert!(prompt.contains("direct_answer"));
        assert!(!prompt.contains("Edge cases considered"));
    }
}
