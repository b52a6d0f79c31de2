//! CLI entrypoint for council
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use council_application::{
    CompositeEventSink, ConductDebateUseCase, DebateEventSink, DebateRequest, LiveLog, Participant,
};
use council_domain::{ConfigIssue, DepthOverride, Severity};
use council_infrastructure::{ConfigLoader, FileConfig, JsonlEventSink, JsonlLiveLog};
use council_presentation::{Cli, ConsoleFormatter, OutputFormat, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let _log_guard = init_tracing(&cli);

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    info!("Starting council");

    // === Configuration ===
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };
    report_issues(&config.validate())?;

    if cli.no_color || !config.output.color {
        colored::control::set_override(false);
    }

    let question = match cli.question.clone() {
        Some(q) if !q.trim().is_empty() => q,
        _ => bail!("Question is required. Usage: council \"<question>\""),
    };

    // === Dependency Injection ===
    let participants = build_participants(&config);
    if participants.is_empty() {
        bail!(
            "No participants configured. Declare at least one [[participants]] entry in council.toml \
             (see --show-config for the files consulted)."
        );
    }

    let (mut policy, _) = config.debate.to_policy();
    if let Some(total) = cli.budget {
        policy = policy.with_total_budget(total);
    }
    let depth: Option<DepthOverride> = match cli.depth {
        Some(depth) => Some(depth.into()),
        None => config.debate.parse_depth().0,
    };

    let cancel = CancellationToken::new();
    spawn_ctrl_c_handler(cancel.clone());

    let mut use_case = ConductDebateUseCase::new()
        .with_policy(policy)
        .with_params(config.debate.to_execution_params())
        .with_event_sink(build_event_sink(&cli, &config))
        .with_cancellation(cancel);

    if let (Some(summarizer), _) = config.summarizer.to_summarizer() {
        use_case = use_case.with_summarizer(Arc::new(summarizer));
    }

    let live_log_path = cli.live_log.as_ref().or(config.output.live_log.as_ref());
    if let Some(path) = live_log_path
        && let Some(live_log) = JsonlLiveLog::new(path)
    {
        let live_log: Arc<dyn LiveLog> = Arc::new(live_log);
        use_case = use_case.with_live_log(live_log);
    }

    let request = DebateRequest::new(question, participants).with_depth_override(depth);
    let outcome = use_case.execute(request).await?;

    // === Output ===
    let format = cli
        .output
        .or_else(|| config.output.format.map(OutputFormat::from))
        .unwrap_or(OutputFormat::Report);
    let output = match format {
        OutputFormat::Full => ConsoleFormatter::format(&outcome),
        OutputFormat::Report => ConsoleFormatter::format_report_only(&outcome),
        OutputFormat::Json => ConsoleFormatter::format_json(&outcome),
    };

    println!("{}", output);

    Ok(())
}

/// Console logging to stderr, plus a daily rolling file when `--log-dir` is set.
///
/// The returned guard must live until exit so buffered file lines are flushed.
fn init_tracing(cli: &Cli) -> Option<WorkerGuard> {
    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let (file_layer, guard) = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "council.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(file_layer)
        .init();

    guard
}

/// Print warnings; fail on any error-level issue.
fn report_issues(issues: &[ConfigIssue]) -> Result<()> {
    for issue in issues {
        match issue.severity {
            Severity::Warning => warn!("{}", issue.message),
            Severity::Error => eprintln!("config error: {}", issue.message),
        }
    }
    if ConfigIssue::has_errors(issues) {
        bail!("Invalid configuration");
    }
    Ok(())
}

fn build_participants(config: &FileConfig) -> Vec<Arc<dyn Participant>> {
    config
        .participants
        .iter()
        .filter_map(|entry| entry.to_participant().0)
        .map(|p| Arc::new(p) as Arc<dyn Participant>)
        .collect()
}

fn build_event_sink(cli: &Cli, config: &FileConfig) -> Arc<dyn DebateEventSink> {
    let mut sinks: Vec<Arc<dyn DebateEventSink>> = Vec::new();

    if !cli.quiet && config.output.progress {
        if std::io::stderr().is_terminal() {
            sinks.push(Arc::new(ProgressReporter::new()));
        } else {
            sinks.push(Arc::new(SimpleProgress));
        }
    }

    let event_log_path = cli.event_log.as_ref().or(config.output.event_log.as_ref());
    if let Some(path) = event_log_path
        && let Some(sink) = JsonlEventSink::new(path)
    {
        info!("Recording debate events to {}", sink.path().display());
        sinks.push(Arc::new(sink));
    }

    Arc::new(CompositeEventSink::new(sinks))
}

/// First Ctrl+C cancels the debate, which still ends in a final synthesis.
fn spawn_ctrl_c_handler(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted: wrapping up with a final synthesis...");
            cancel.cancel();
        }
    });
}
