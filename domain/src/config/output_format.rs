//! Output format value object

use serde::{Deserialize, Serialize};

/// How a finished debate is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Transcript, resolutions and the report
    Full,
    /// Only the final report (default)
    #[default]
    Report,
    /// The whole outcome as JSON
    Json,
}
