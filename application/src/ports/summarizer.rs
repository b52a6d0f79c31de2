//! Summarizer port
//!
//! The summarizer is an optional text generator used for contradiction
//! verdicts, edge-case generation and the consensus report. Every caller
//! has a non-summarizer fallback.

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SummarizerError {
    #[error("Summarizer unavailable: {0}")]
    Unavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryTask {
    ContradictionResolution,
    EdgeCaseGeneration,
    ConsensusSynthesis,
}

impl SummaryTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryTask::ContradictionResolution => "contradiction_resolution",
            SummaryTask::EdgeCaseGeneration => "edge_case_generation",
            SummaryTask::ConsensusSynthesis => "consensus_synthesis",
        }
    }

    fn default_temperature(&self) -> f32 {
        match self {
            SummaryTask::ContradictionResolution => 0.2,
            SummaryTask::EdgeCaseGeneration => 0.7,
            SummaryTask::ConsensusSynthesis => 0.3,
        }
    }

    fn default_max_tokens(&self) -> u32 {
        match self {
            SummaryTask::ContradictionResolution => 800,
            SummaryTask::EdgeCaseGeneration => 1200,
            SummaryTask::ConsensusSynthesis => 2000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SummaryRequest {
    pub task: SummaryTask,
    pub system_prompt: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl SummaryRequest {
    pub fn new(task: SummaryTask, system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            task,
            system_prompt: system_prompt.into(),
            prompt: prompt.into(),
            temperature: task.default_temperature(),
            max_tokens: task.default_max_tokens(),
        }
    }
}

#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn generate(&self, request: &SummaryRequest) -> Result<String, SummarizerError>;
}
