//! Progress reporting for debate execution

use colored::Colorize;
use council_application::ports::event_sink::{DebateEvent, DebateEventSink, EventStatus};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::sync::Mutex;

/// Reports progress during a debate with a single bar over the turn budget
pub struct ProgressReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-")
    }

    fn ensure_bar(&self, total: u64) {
        if let Ok(mut slot) = self.bar.lock()
            && slot.is_none()
        {
            let pb = ProgressBar::new(total);
            pb.set_style(Self::bar_style());
            *slot = Some(pb);
        }
    }

    fn with_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(slot) = self.bar.lock()
            && let Some(pb) = slot.as_ref()
        {
            f(pb);
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// "challenge_defense" -> "challenge defense"
fn stage_label(stage: &str) -> String {
    stage.replace('_', " ")
}

fn payload_u64(payload: &Value, key: &str) -> Option<u64> {
    payload.get(key).and_then(Value::as_u64)
}

impl DebateEventSink for ProgressReporter {
    fn emit(&self, event: DebateEvent) {
        match (event.stage.as_str(), event.status) {
            ("classification", EventStatus::Completed) => {
                let total = payload_u64(&event.payload, "total_budget").unwrap_or(0);
                self.ensure_bar(total);
                let tier = event
                    .payload
                    .get("tier")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();
                self.with_bar(|pb| pb.set_message(format!("{} tier", tier)));
            }
            ("consensus_report", EventStatus::Completed) => {
                self.with_bar(|pb| pb.set_message("compiling report".to_string()));
            }
            ("final_synthesis", EventStatus::Completed) => {
                if let Ok(mut slot) = self.bar.lock()
                    && let Some(pb) = slot.take()
                {
                    pb.finish_with_message(format!("{}", "debate complete".green()));
                }
            }
            (stage, EventStatus::Started) => {
                let label = stage_label(stage);
                self.with_bar(|pb| pb.set_prefix(label));
            }
            (_, EventStatus::Turn) => {
                if let Some(total) = payload_u64(&event.payload, "total_budget") {
                    self.ensure_bar(total);
                }
                let consumed = payload_u64(&event.payload, "total_consumed");
                let speaker = event
                    .payload
                    .get("speaker")
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string();
                self.with_bar(|pb| {
                    if let Some(consumed) = consumed {
                        pb.set_position(consumed);
                    }
                    pb.set_message(speaker);
                });
            }
            (stage, EventStatus::Skipped) => {
                let message = format!("{} skipped", stage_label(stage));
                self.with_bar(|pb| pb.set_message(message));
            }
            _ => {}
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl SimpleProgress {
    fn line(event: &DebateEvent) -> Option<String> {
        match (event.stage.as_str(), event.status) {
            ("classification", EventStatus::Completed) => Some(format!(
                "{} {} tier, {} turns",
                "->".cyan(),
                event.payload.get("tier").and_then(Value::as_str).unwrap_or("?"),
                payload_u64(&event.payload, "total_budget").unwrap_or(0)
            )),
            (stage, EventStatus::Started) => Some(format!(
                "{} {}",
                "->".cyan(),
                stage_label(stage).bold()
            )),
            (_, EventStatus::Turn) => Some(format!(
                "  {} {} ({})",
                "v".green(),
                event.payload.get("speaker").and_then(Value::as_str).unwrap_or("?"),
                event.payload.get("turn_type").and_then(Value::as_str).unwrap_or("?")
            )),
            (stage, EventStatus::Skipped) => Some(format!(
                "{} {} skipped",
                "x".yellow(),
                stage_label(stage)
            )),
            ("resolution", EventStatus::Completed) => Some(format!(
                "  {} resolved {}",
                "*".cyan(),
                event.payload.get("topic").and_then(Value::as_str).unwrap_or("?")
            )),
            ("early_exit", EventStatus::Completed) => Some(format!(
                "  {} {}",
                "!".yellow(),
                event.payload.get("reason").and_then(Value::as_str).unwrap_or("early exit")
            )),
            _ => None,
        }
    }
}

impl DebateEventSink for SimpleProgress {
    fn emit(&self, event: DebateEvent) {
        if let Some(line) = Self::line(&event) {
            eprintln!("{}", line);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bar_follows_turn_events() {
        let reporter = ProgressReporter::new();
        reporter.emit(DebateEvent::completed(
            "classification",
            json!({ "tier": "complex", "total_budget": 40 }),
        ));
        reporter.emit(DebateEvent::started("opening", json!({})));
        reporter.emit(DebateEvent::turn(
            "opening",
            json!({ "speaker": "economist", "total_consumed": 3, "total_budget": 40 }),
        ));

        let slot = reporter.bar.lock().unwrap();
        let pb = slot.as_ref().unwrap();
        assert_eq!(pb.length(), Some(40));
        assert_eq!(pb.position(), 3);
        assert_eq!(pb.prefix(), "opening");
        assert_eq!(pb.message(), "economist");
    }

    #[test]
    fn test_final_synthesis_finishes_the_bar() {
        let reporter = ProgressReporter::new();
        reporter.emit(DebateEvent::completed(
            "classification",
            json!({ "tier": "simple", "total_budget": 10 }),
        ));
        reporter.emit(DebateEvent::completed("final_synthesis", json!({})));
        assert!(reporter.bar.lock().unwrap().is_none());
    }

    #[test]
    fn test_simple_progress_lines() {
        colored::control::set_override(false);
        let started = SimpleProgress::line(&DebateEvent::started("challenge_defense", json!({})));
        assert_eq!(started.as_deref(), Some("-> challenge defense"));

        let turn = SimpleProgress::line(&DebateEvent::turn(
            "opening",
            json!({ "speaker": "engineer", "turn_type": "opening" }),
        ));
        assert_eq!(turn.as_deref(), Some("  v engineer (opening)"));

        assert!(SimpleProgress::line(&DebateEvent::completed("intervention", json!({}))).is_none());
    }
}
