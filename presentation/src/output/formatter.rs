//! Output formatter trait

use council_domain::DebateOutcome;

/// Trait for formatting debate outcomes
pub trait OutputFormatter {
    /// Format the complete outcome: transcript, resolutions and report
    fn format(&self, outcome: &DebateOutcome) -> String;

    /// Format as JSON
    fn format_json(&self, outcome: &DebateOutcome) -> String;

    /// Format the final report only (concise output)
    fn format_report_only(&self, outcome: &DebateOutcome) -> String;
}
