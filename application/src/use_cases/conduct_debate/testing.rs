//! Scripted collaborators shared by the debate tests.

use crate::ports::event_sink::{DebateEvent, DebateEventSink};
use crate::ports::participant::{Participant, ParticipantError};
use crate::ports::summarizer::{Summarizer, SummarizerError, SummaryRequest, SummaryTask};
use async_trait::async_trait;
use council_domain::{
    CapabilitySet, EdgeCaseScenario, ParticipantArchetype, RiskMode, TurnContext,
};
use std::sync::Mutex;

/// Participant producing distinct, deterministic text for every call
pub(crate) struct FakeParticipant {
    name: String,
    capabilities: CapabilitySet,
    on_topic: bool,
    final_position: Option<String>,
    rejected_risk_modes: Vec<RiskMode>,
    calls: Mutex<Vec<String>>,
}

impl FakeParticipant {
    /// Mentions the logistics expansion question in every turn
    pub fn on_topic(name: &str) -> Self {
        Self::new(name, true)
    }

    /// Never mentions the question
    pub fn off_topic(name: &str) -> Self {
        Self::new(name, false)
    }

    fn new(name: &str, on_topic: bool) -> Self {
        Self {
            name: name.to_string(),
            capabilities: ParticipantArchetype::Generalist.capabilities(),
            on_topic,
            final_position: None,
            rejected_risk_modes: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_archetype(mut self, archetype: ParticipantArchetype) -> Self {
        self.capabilities = archetype.capabilities();
        self
    }

    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = capabilities;
        self
    }

    pub fn with_final_position(mut self, text: &str) -> Self {
        self.final_position = Some(text.to_string());
        self
    }

    /// Standard-mode risk prompts are rejected by a content filter
    pub fn rejecting_standard_risks(mut self) -> Self {
        self.rejected_risk_modes = vec![RiskMode::Standard];
        self
    }

    /// Every risk prompt is rejected, neutral wording included
    pub fn rejecting_all_risks(mut self) -> Self {
        self.rejected_risk_modes = vec![RiskMode::Standard, RiskMode::Neutral];
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn say(&self, kind: &str) -> String {
        let mut calls = self.calls.lock().unwrap();
        calls.push(kind.to_string());
        let n = calls.len();
        if self.on_topic {
            format!(
                "{} {} #{}: expanding the logistics network into Brazil adds {}% capacity; evidence suggests demand holds.",
                self.name,
                kind,
                n,
                10 + n
            )
        } else {
            format!(
                "{} {} #{}: tomatoes need sunshine, and bread needs {} minutes of patience.",
                self.name,
                kind,
                n,
                20 + n
            )
        }
    }
}

#[async_trait]
impl Participant for FakeParticipant {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> CapabilitySet {
        self.capabilities
    }

    fn focus_terms(&self) -> Vec<String> {
        vec!["logistics".to_string(), "currency".to_string()]
    }

    async fn present_case(&self, _ctx: &TurnContext) -> Result<String, ParticipantError> {
        Ok(self.say("case"))
    }

    async fn challenge(
        &self,
        _ctx: &TurnContext,
        target: &str,
        _claim: &str,
    ) -> Result<String, ParticipantError> {
        Ok(self.say(&format!("challenge to {}", target)))
    }

    async fn respond(
        &self,
        _ctx: &TurnContext,
        challenger: &str,
        _challenge: &str,
    ) -> Result<String, ParticipantError> {
        Ok(self.say(&format!("reply to {}", challenger)))
    }

    async fn analyze_edge_case(
        &self,
        _ctx: &TurnContext,
        scenario: &EdgeCaseScenario,
    ) -> Result<String, ParticipantError> {
        Ok(self.say(&format!("scenario {}", scenario.name)))
    }

    async fn identify_risks(
        &self,
        _ctx: &TurnContext,
        mode: RiskMode,
    ) -> Result<String, ParticipantError> {
        if self.rejected_risk_modes.contains(&mode) {
            self.calls.lock().unwrap().push("rejected risks".to_string());
            return Err(ParticipantError::ContentRejected("catastrophe wording".into()));
        }
        Ok(self.say("risks"))
    }

    async fn assess_risk_likelihood(
        &self,
        _ctx: &TurnContext,
        _risk: &str,
    ) -> Result<String, ParticipantError> {
        Ok(self.say("likelihood"))
    }

    async fn state_final_position(
        &self,
        _ctx: &TurnContext,
        _require_confidence: bool,
    ) -> Result<String, ParticipantError> {
        self.calls.lock().unwrap().push("final".to_string());
        Ok(self.final_position.clone().unwrap_or_else(|| {
            format!(
                "{} supports expanding the logistics network into Brazil. 80% confident.",
                self.name
            )
        }))
    }
}

/// Summarizer answering each task with valid JSON, or failing every call
pub(crate) struct FakeSummarizer {
    fail: bool,
    calls: Mutex<Vec<SummaryTask>>,
}

impl FakeSummarizer {
    pub fn valid() -> Self {
        Self {
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls_for(&self, task: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.as_str() == task)
            .count()
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn generate(&self, request: &SummaryRequest) -> Result<String, SummarizerError> {
        self.calls.lock().unwrap().push(request.task);
        if self.fail {
            return Err(SummarizerError::RequestFailed("upstream unavailable".into()));
        }
        let reply = match request.task {
            SummaryTask::ContradictionResolution => {
                r#"{"outcome": "agent1_correct", "explanation": "Shipping data favours the first claim", "confidence": 0.7, "action": "use_agent1"}"#
            }
            SummaryTask::EdgeCaseGeneration => {
                r#"```json
{"scenarios": [
  {"name": "Currency shock", "description": "The real loses 30% against the dollar", "severity": "high", "probability": 20},
  {"name": "Port strike", "description": "A logistics strike closes Santos for a month", "severity": "medium", "probability": 0.1}
]}
```"#
            }
            SummaryTask::ConsensusSynthesis => {
                r#"{"direct_answer": "Expand in two stages", "confidence_level": 0.7, "key_findings": ["Demand is growing"], "recommendation": "Start with Sao Paulo"}"#
            }
        };
        Ok(reply.to_string())
    }
}

/// Event sink keeping every event
#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<DebateEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<DebateEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl DebateEventSink for RecordingSink {
    fn emit(&self, event: DebateEvent) {
        self.events.lock().unwrap().push(event);
    }
}
