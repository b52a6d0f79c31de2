//! Participant and summarizer configuration from TOML
//! (`[[participants]]` array and `[summarizer]` section)
//!
//! Example configuration:
//!
//! ```toml
//! [[participants]]
//! name = "economist"
//! command = "ollama"
//! args = ["run", "llama3"]
//! archetype = "analyst"
//! focus = ["pricing", "demand", "currency"]
//!
//! [[participants]]
//! name = "skeptic"
//! command = "./bin/skeptic.sh"
//! capabilities = ["present_case", "challenge", "respond", "final_position"]
//!
//! [summarizer]
//! command = "ollama"
//! args = ["run", "llama3"]
//! ```

use crate::command::{CommandParticipant, CommandSpec, CommandSummarizer};
use council_domain::{
    Capability, CapabilitySet, ConfigIssue, ConfigIssueCode, ParticipantArchetype,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Exit status a command uses to report a content rejection
const DEFAULT_REJECTION_EXIT_CODE: i32 = 3;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// One `[[participants]]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileParticipantConfig {
    pub name: String,
    /// Program receiving the prompt on stdin and answering on stdout
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Preset capability profile, "generalist" when unset
    #[serde(default)]
    pub archetype: Option<String>,
    /// Explicit capabilities; override the archetype
    #[serde(default)]
    pub capabilities: Option<Vec<String>>,
    /// Domain keywords used to match scenarios and risks
    #[serde(default)]
    pub focus: Vec<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub rejection_exit_code: Option<i32>,
}

impl FileParticipantConfig {
    fn field(&self, name: &str) -> String {
        format!("participants.{}.{}", self.name, name)
    }

    /// Resolve the capability set, collecting issues for unknown names.
    pub fn parse_capabilities(&self) -> (CapabilitySet, Vec<ConfigIssue>) {
        let mut issues = Vec::new();

        if let Some(names) = &self.capabilities {
            let mut set = CapabilitySet::empty();
            for raw in names {
                match raw.parse::<Capability>() {
                    Ok(capability) => set = set.with(capability),
                    Err(_) => issues.push(ConfigIssue::warning(
                        ConfigIssueCode::InvalidEnumValue {
                            field: self.field("capabilities"),
                            value: raw.clone(),
                            valid_values: Capability::ALL
                                .iter()
                                .map(|c| c.as_str().to_string())
                                .collect(),
                        },
                        format!("{}: unknown capability '{}', ignored", self.field("capabilities"), raw),
                    )),
                }
            }
            return (set, issues);
        }

        let archetype = match self.archetype.as_deref() {
            None => ParticipantArchetype::default(),
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                issues.push(ConfigIssue::warning(
                    ConfigIssueCode::InvalidEnumValue {
                        field: self.field("archetype"),
                        value: raw.to_string(),
                        valid_values: vec![
                            "generalist".to_string(),
                            "advocate".to_string(),
                            "analyst".to_string(),
                            "risk_assessor".to_string(),
                        ],
                    },
                    format!("{}: unknown value '{}', falling back to 'generalist'", self.field("archetype"), raw),
                ));
                ParticipantArchetype::default()
            }),
        };
        (archetype.capabilities(), issues)
    }

    /// Build the command-backed participant.
    ///
    /// Returns `None` with an error issue when the entry cannot be used.
    pub fn to_participant(&self) -> (Option<CommandParticipant>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        if self.name.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidParticipant {
                    name: self.name.clone(),
                },
                "participants: name cannot be empty",
            ));
            return (None, issues);
        }
        if self.command.trim().is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidParticipant {
                    name: self.name.clone(),
                },
                format!("{}: command cannot be empty", self.field("command")),
            ));
            return (None, issues);
        }
        if self.timeout_secs == 0 {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroValue {
                    field: self.field("timeout_secs"),
                },
                format!(
                    "{} cannot be 0, using {}",
                    self.field("timeout_secs"),
                    DEFAULT_TIMEOUT_SECS
                ),
            ));
        }

        let (capabilities, capability_issues) = self.parse_capabilities();
        issues.extend(capability_issues);
        if capabilities.is_empty() {
            issues.push(ConfigIssue::error(
                ConfigIssueCode::InvalidParticipant {
                    name: self.name.clone(),
                },
                format!("{}: no usable capabilities", self.field("capabilities")),
            ));
            return (None, issues);
        }

        let timeout = match self.timeout_secs {
            0 => DEFAULT_TIMEOUT_SECS,
            secs => secs,
        };
        let spec = CommandSpec::new(&self.command)
            .with_args(self.args.clone())
            .with_timeout(Duration::from_secs(timeout))
            .with_rejection_exit_code(
                self.rejection_exit_code
                    .unwrap_or(DEFAULT_REJECTION_EXIT_CODE),
            );
        let participant = CommandParticipant::new(self.name.trim(), capabilities, spec)
            .with_focus_terms(self.focus.clone());
        (Some(participant), issues)
    }
}

/// `[summarizer]` section; no command means no summarizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSummarizerConfig {
    pub command: Option<String>,
    pub args: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for FileSummarizerConfig {
    fn default() -> Self {
        Self {
            command: None,
            args: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl FileSummarizerConfig {
    pub fn to_summarizer(&self) -> (Option<CommandSummarizer>, Vec<ConfigIssue>) {
        let mut issues = Vec::new();
        let Some(command) = self.command.as_deref() else {
            return (None, issues);
        };
        if command.trim().is_empty() {
            issues.push(ConfigIssue::warning(
                ConfigIssueCode::ZeroValue {
                    field: "summarizer.command".to_string(),
                },
                "summarizer.command is empty, running without a summarizer",
            ));
            return (None, issues);
        }
        let timeout = match self.timeout_secs {
            0 => DEFAULT_TIMEOUT_SECS,
            secs => secs,
        };
        let spec = CommandSpec::new(command)
            .with_args(self.args.clone())
            .with_timeout(Duration::from_secs(timeout));
        (Some(CommandSummarizer::new(spec)), issues)
    }
}

#[cfg(test)]
mod tests {
    use super::super::FileConfig;
    use super::*;
    use council_application::Participant;
    use council_domain::Severity;

    #[test]
    fn test_participants_deserialize() {
        let toml_str = r#"
[[participants]]
name = "economist"
command = "ollama"
args = ["run", "llama3"]
archetype = "analyst"
focus = ["pricing"]

[[participants]]
name = "skeptic"
command = "./skeptic.sh"
capabilities = ["present_case", "challenge", "respond"]
timeout_secs = 30
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.participants.len(), 2);
        assert_eq!(config.participants[0].timeout_secs, DEFAULT_TIMEOUT_SECS);

        let (economist, issues) = config.participants[0].to_participant();
        assert!(issues.is_empty());
        let economist = economist.unwrap();
        assert_eq!(economist.capabilities(), ParticipantArchetype::Analyst.capabilities());
        assert_eq!(economist.focus_terms(), vec!["pricing".to_string()]);

        let (skeptic, _) = config.participants[1].to_participant();
        let caps = skeptic.unwrap().capabilities();
        assert!(caps.contains(Capability::Challenge));
        assert!(!caps.contains(Capability::FinalPosition));
    }

    #[test]
    fn test_unknown_archetype_falls_back_to_generalist() {
        let entry = FileParticipantConfig {
            name: "x".to_string(),
            command: "cat".to_string(),
            args: vec![],
            archetype: Some("oracle".to_string()),
            capabilities: None,
            focus: vec![],
            timeout_secs: 10,
            rejection_exit_code: None,
        };
        let (caps, issues) = entry.parse_capabilities();
        assert_eq!(caps, CapabilitySet::all());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_empty_command_is_an_error() {
        let entry = FileParticipantConfig {
            name: "x".to_string(),
            command: " ".to_string(),
            args: vec![],
            archetype: None,
            capabilities: None,
            focus: vec![],
            timeout_secs: 10,
            rejection_exit_code: None,
        };
        let (participant, issues) = entry.to_participant();
        assert!(participant.is_none());
        assert!(ConfigIssue::has_errors(&issues));
    }

    #[test]
    fn test_summarizer_is_optional() {
        let (summarizer, issues) = FileSummarizerConfig::default().to_summarizer();
        assert!(summarizer.is_none());
        assert!(issues.is_empty());

        let config = FileSummarizerConfig {
            command: Some("cat".to_string()),
            ..Default::default()
        };
        assert!(config.to_summarizer().0.is_some());
    }
}
