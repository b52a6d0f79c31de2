//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod debate;
mod output;
mod participants;

pub use debate::FileDebateConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use participants::{FileParticipantConfig, FileSummarizerConfig};

use council_domain::{ConfigIssue, ConfigIssueCode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Debate heuristics and context sizes
    pub debate: FileDebateConfig,
    /// Registered participants, in speaking order
    pub participants: Vec<FileParticipantConfig>,
    /// Optional summarizer for verdicts, scenarios and the report
    pub summarizer: FileSummarizerConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks the debate policy, the depth label, every participant entry
    /// (including duplicate names) and the summarizer.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.debate.to_policy().1);
        issues.extend(self.debate.parse_depth().1);

        let mut seen = HashSet::new();
        for entry in &self.participants {
            issues.extend(entry.to_participant().1);
            if !seen.insert(entry.name.trim()) {
                issues.push(ConfigIssue::error(
                    ConfigIssueCode::InvalidParticipant {
                        name: entry.name.clone(),
                    },
                    format!("participants: duplicate name '{}'", entry.name),
                ));
            }
        }

        issues.extend(self.summarizer.to_summarizer().1);
        issues
    }
}
