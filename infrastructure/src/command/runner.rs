//! External program invocation: prompt on stdin, answer on stdout.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// Default timeout for one invocation (120 seconds)
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Maximum answer size kept (256 KB)
const MAX_OUTPUT_SIZE: usize = 256 * 1024;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("I/O error talking to {program}: {source}")]
    Io {
        program: String,
        source: std::io::Error,
    },

    #[error("{program} timed out after {secs} seconds")]
    Timeout { program: String, secs: u64 },

    #[error("{program} rejected the prompt: {stderr}")]
    Rejected { program: String, stderr: String },

    #[error("{program} exited with code {code}: {stderr}")]
    Failed {
        program: String,
        code: i32,
        stderr: String,
    },
}

/// How to run one external program
#[derive(Debug, Clone, PartialEq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
    pub working_dir: Option<PathBuf>,
    /// Exit code signalling a content rejection rather than a failure
    pub rejection_exit_code: Option<i32>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            working_dir: None,
            rejection_exit_code: None,
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn with_rejection_exit_code(mut self, code: i32) -> Self {
        self.rejection_exit_code = Some(code);
        self
    }

    /// Run the program with `input` on stdin and `env` added to its
    /// environment; returns trimmed stdout.
    pub async fn run(&self, input: &str, env: &[(&str, String)]) -> Result<String, CommandError> {
        let start = Instant::now();
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in env {
            cmd.env(key, value);
        }
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }

        let mut child = cmd.spawn().map_err(|source| CommandError::Spawn {
            program: self.program.clone(),
            source,
        })?;

        let stdin = child.stdin.take();
        let exchange = async {
            if let Some(mut stdin) = stdin {
                // A program that ignores its input may close stdin early
                if let Err(e) = stdin.write_all(input.as_bytes()).await {
                    debug!("{} closed stdin early: {}", self.program, e);
                }
            }
            child.wait_with_output().await
        };

        let output = tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| CommandError::Timeout {
                program: self.program.clone(),
                secs: self.timeout.as_secs(),
            })?
            .map_err(|source| CommandError::Io {
                program: self.program.clone(),
                source,
            })?;

        debug!(
            "{} finished in {}ms with {}",
            self.program,
            start.elapsed().as_millis(),
            output.status
        );

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            if self.rejection_exit_code == Some(code) {
                return Err(CommandError::Rejected {
                    program: self.program.clone(),
                    stderr,
                });
            }
            return Err(CommandError::Failed {
                program: self.program.clone(),
                code,
                stderr,
            });
        }

        let mut stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if stdout.len() > MAX_OUTPUT_SIZE {
            let mut cut = MAX_OUTPUT_SIZE;
            while !stdout.is_char_boundary(cut) {
                cut -= 1;
            }
            stdout.truncate(cut);
        }
        Ok(stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> CommandSpec {
        CommandSpec::new("sh").with_args(vec!["-c".to_string(), script.to_string()])
    }

    #[tokio::test]
    async fn test_stdin_is_echoed() {
        let out = sh("cat").run("  hello council \n", &[]).await.unwrap();
        assert_eq!(out, "hello council");
    }

    #[tokio::test]
    async fn test_env_is_passed() {
        let out = sh("printf '%s' \"$COUNCIL_OPERATION\"")
            .run("", &[("COUNCIL_OPERATION", "challenge".to_string())])
            .await
            .unwrap();
        assert_eq!(out, "challenge");
    }

    #[tokio::test]
    async fn test_nonzero_exit_is_failure() {
        let err = sh("echo broken >&2; exit 2").run("", &[]).await.unwrap_err();
        match err {
            CommandError::Failed { code, stderr, .. } => {
                assert_eq!(code, 2);
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_rejection_exit_code() {
        let err = sh("exit 3")
            .with_rejection_exit_code(3)
            .run("", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_timeout() {
        let err = sh("sleep 5")
            .with_timeout(Duration::from_millis(100))
            .run("", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let err = CommandSpec::new("council-no-such-program")
            .run("", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, CommandError::Spawn { .. }));
    }
}
