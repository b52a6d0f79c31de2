//! Output configuration from TOML (`[output]` section)

use council_domain::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// Re-export OutputFormat from domain for convenience
pub use council_domain::OutputFormat as FileOutputFormat;

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Show the live phase/turn progress display
    pub progress: bool,
    /// Append debate events to this JSONL file
    pub event_log: Option<PathBuf>,
    /// Append every turn to this JSONL transcript
    pub live_log: Option<PathBuf>,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            progress: true,
            event_log: None,
            live_log: None,
        }
    }
}
