//! Summarizer adapter backed by an external program.

use super::runner::{CommandError, CommandSpec};
use async_trait::async_trait;
use council_application::ports::summarizer::{Summarizer, SummarizerError, SummaryRequest};
use tracing::debug;

/// Sends the system prompt and prompt on stdin; the task, temperature and
/// token limit go to `COUNCIL_TASK`, `COUNCIL_TEMPERATURE` and
/// `COUNCIL_MAX_TOKENS`.
pub struct CommandSummarizer {
    spec: CommandSpec,
}

impl CommandSummarizer {
    pub fn new(spec: CommandSpec) -> Self {
        Self { spec }
    }
}

#[async_trait]
impl Summarizer for CommandSummarizer {
    async fn generate(&self, request: &SummaryRequest) -> Result<String, SummarizerError> {
        let input = format!("{}\n\n{}", request.system_prompt, request.prompt);
        let env = [
            ("COUNCIL_TASK", request.task.as_str().to_string()),
            ("COUNCIL_TEMPERATURE", request.temperature.to_string()),
            ("COUNCIL_MAX_TOKENS", request.max_tokens.to_string()),
        ];
        debug!("Summarizer task {} ({} bytes)", request.task.as_str(), input.len());

        let text = self.spec.run(&input, &env).await.map_err(|e| match e {
            CommandError::Spawn { .. } => SummarizerError::Unavailable(e.to_string()),
            CommandError::Timeout { .. } => SummarizerError::Timeout,
            other => SummarizerError::RequestFailed(other.to_string()),
        })?;
        if text.is_empty() {
            return Err(SummarizerError::RequestFailed(format!(
                "{} produced no output",
                self.spec.program
            )));
        }
        Ok(text)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use council_application::ports::summarizer::SummaryTask;

    fn summarizer(script: &str) -> CommandSummarizer {
        CommandSummarizer::new(
            CommandSpec::new("sh").with_args(vec!["-c".to_string(), script.to_string()]),
        )
    }

    #[tokio::test]
    async fn test_task_in_environment() {
        let request = SummaryRequest::new(SummaryTask::EdgeCaseGeneration, "system", "prompt");
        let text = summarizer("printf '%s' \"$COUNCIL_TASK\"")
            .generate(&request)
            .await
            .unwrap();
        assert_eq!(text, "edge_case_generation");
    }

    #[tokio::test]
    async fn test_prompts_are_concatenated() {
        let request = SummaryRequest::new(SummaryTask::ConsensusSynthesis, "be brief", "compile");
        let text = summarizer("cat").generate(&request).await.unwrap();
        assert_eq!(text, "be brief\n\ncompile");
    }

    #[tokio::test]
    async fn test_missing_program_is_unavailable() {
        let request = SummaryRequest::new(SummaryTask::ConsensusSynthesis, "s", "p");
        let err = CommandSummarizer::new(CommandSpec::new("council-no-such-summarizer"))
            .generate(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizerError::Unavailable(_)));
    }
}
