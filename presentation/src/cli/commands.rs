//! CLI command definitions

use clap::{Parser, ValueEnum};
use council_domain::DepthOverride;
use std::path::PathBuf;

/// Output format for debate results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Transcript, resolutions, scenarios and the report
    Full,
    /// Only the final report
    Report,
    /// The complete outcome as JSON
    Json,
}

impl From<council_domain::OutputFormat> for OutputFormat {
    fn from(format: council_domain::OutputFormat) -> Self {
        match format {
            council_domain::OutputFormat::Full => OutputFormat::Full,
            council_domain::OutputFormat::Report => OutputFormat::Report,
            council_domain::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Debate depth label
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DepthArg {
    /// Short debate (40 turns)
    Standard,
    /// Standard debate (80 turns)
    Deep,
    /// Long debate (150 turns)
    Legendary,
}

impl From<DepthArg> for DepthOverride {
    fn from(depth: DepthArg) -> Self {
        match depth {
            DepthArg::Standard => DepthOverride::Standard,
            DepthArg::Deep => DepthOverride::Deep,
            DepthArg::Legendary => DepthOverride::Legendary,
        }
    }
}

/// CLI arguments for council
#[derive(Parser, Debug)]
#[command(name = "council")]
#[command(author, version, about = "Council - participants debate a question under a turn budget")]
#[command(long_about = r#"
Council runs a structured debate between configured participants and
compiles a consensus report.

The debate moves through phases: opening statements, challenge & defense,
edge cases, risk analysis, consensus and a final synthesis. The question's
complexity (or --depth) picks the turn budget.

Participants and the optional summarizer are local commands declared in
the configuration file. They receive their prompt on stdin and answer on
stdout.

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables (e.g. COUNCIL_DEBATE__DEPTH=deep)
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/council/config.toml   Global config

Example:
  council "Should we expand our logistics network into Brazil?"
  council --depth legendary --output full "Kafka or RabbitMQ for our event bus?"
"#)]
pub struct Cli {
    /// The question to debate
    pub question: Option<String>,

    /// Override the classified depth
    #[arg(short, long, value_enum)]
    pub depth: Option<DepthArg>,

    /// Output format (defaults to the configured format, else report)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Replace the tier's total turn budget
    #[arg(long, value_name = "TURNS")]
    pub budget: Option<usize>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Append debate events to a JSONL file
    #[arg(long, value_name = "PATH")]
    pub event_log: Option<PathBuf>,

    /// Append every turn to a JSONL transcript as it happens
    #[arg(long, value_name = "PATH")]
    pub live_log: Option<PathBuf>,

    /// Write diagnostic logs to a daily rolling file in this directory
    #[arg(long, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,
}
