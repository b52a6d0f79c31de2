//! Debate configuration from TOML (`[debate]` section)

use council_application::ExecutionParams;
use council_domain::{ConfigIssue, ConfigIssueCode, DebatePolicy, DepthOverride};
use serde::{Deserialize, Serialize};

/// Raw debate configuration
///
/// Every [`DebatePolicy`] field may be set directly in the section.
///
/// # Example
///
/// ```toml
/// [debate]
/// depth = "deep"
/// devils_advocate_interval = 8
/// low_confidence_threshold = 0.35
/// total_budget_override = 60
/// context_turns = 8
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileDebateConfig {
    /// "standard", "deep" or "legendary"; unset lets the classifier decide
    pub depth: Option<String>,
    /// Recent turns sent with every participant request
    pub context_turns: usize,
    /// Turns summarized for scenario generation and the consensus prompt
    pub digest_turns: usize,
    /// Scripted challenge/response at the end of the opening
    pub opening_exchange: bool,
    #[serde(flatten)]
    pub policy: DebatePolicy,
}

impl Default for FileDebateConfig {
    fn default() -> Self {
        let params = ExecutionParams::default();
        Self {
            depth: None,
            context_turns: params.context_turns,
            digest_turns: params.digest_turns,
            opening_exchange: params.opening_exchange,
            policy: DebatePolicy::default(),
        }
    }
}

impl FileDebateConfig {
    /// The configured policy, or the defaults when any field is invalid.
    pub fn to_policy(&self) -> (DebatePolicy, Vec<ConfigIssue>) {
        let issues = self.policy.validate();
        if issues.is_empty() {
            (self.policy.clone(), issues)
        } else {
            (DebatePolicy::default(), issues)
        }
    }

    pub fn parse_depth(&self) -> (Option<DepthOverride>, Vec<ConfigIssue>) {
        let Some(raw) = self.depth.as_deref() else {
            return (None, Vec::new());
        };
        match raw.parse::<DepthOverride>() {
            Ok(depth) => (Some(depth), Vec::new()),
            Err(_) => (
                None,
                vec![ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: "debate.depth".to_string(),
                        value: raw.to_string(),
                        valid_values: vec![
                            "standard".to_string(),
                            "deep".to_string(),
                            "legendary".to_string(),
                        ],
                    },
                    format!("debate.depth: unknown value '{}', classifying the question instead", raw),
                )],
            ),
        }
    }

    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_context_turns(self.context_turns)
            .with_digest_turns(self.digest_turns)
            .with_opening_exchange(self.opening_exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::super::FileConfig;
    use super::*;

    #[test]
    fn test_policy_fields_at_section_root() {
        let toml_str = r#"
[debate]
depth = "legendary"
devils_advocate_interval = 7
low_confidence_threshold = 0.3
total_budget_override = 60
context_turns = 4
opening_exchange = false
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let (policy, issues) = config.debate.to_policy();
        assert!(issues.is_empty());
        assert_eq!(policy.devils_advocate_interval, 7);
        assert_eq!(policy.low_confidence_threshold, 0.3);
        assert_eq!(policy.total_budget_override, Some(60));
        // untouched fields keep their defaults
        assert_eq!(policy.repetition_window, DebatePolicy::default().repetition_window);

        assert_eq!(config.debate.parse_depth().0, Some(DepthOverride::Legendary));
        let params = config.debate.to_execution_params();
        assert_eq!(params.context_turns, 4);
        assert!(!params.opening_exchange);
    }

    #[test]
    fn test_invalid_policy_falls_back_to_defaults() {
        let toml_str = r#"
[debate]
devils_advocate_interval = 0
circuit_breaker_fraction = 1.5
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        let (policy, issues) = config.debate.to_policy();
        assert_eq!(issues.len(), 2);
        assert_eq!(policy, DebatePolicy::default());
    }

    #[test]
    fn test_unknown_depth_is_a_warning() {
        let config = FileDebateConfig {
            depth: Some("epic".to_string()),
            ..Default::default()
        };
        let (depth, issues) = config.parse_depth();
        assert!(depth.is_none());
        assert!(matches!(
            &issues[0].code,
            ConfigIssueCode::InvalidEnumValue { value, .. } if value == "epic"
        ));
    }
}
