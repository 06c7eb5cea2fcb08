//! Command runner backed by `tokio::process`.

use async_trait::async_trait;
use deckhand_core::command::{CommandFailure, CommandOutput, CommandRunner, CommandSpec};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, error};

/// Runs commands as child processes, one at a time.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    /// Kill the child after this long. `None` waits forever.
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandFailure> {
        debug!(command = %spec, "Running command");

        let mut command = Command::new(spec.program());
        command
            .args(spec.argv())
            .envs(spec.envs().iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let child = command
            .spawn()
            .map_err(|e| CommandFailure::spawn(spec, &e))?;

        let output = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(output) => output,
                Err(_) => {
                    error!(command = %spec, timeout = ?limit, "Command timed out");
                    return Err(CommandFailure {
                        command: spec.to_string(),
                        status: None,
                        stdout: String::new(),
                        stderr: format!("timed out after {}s", limit.as_secs()),
                    });
                }
            },
            None => child.wait_with_output().await,
        }
        .map_err(|e| CommandFailure::spawn(spec, &e))?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            error!(command = %spec, status = ?output.status.code(), stderr = %stderr, "Command failed");
            return Err(CommandFailure {
                command: spec.to_string(),
                status: output.status.code(),
                stdout,
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_captures_stdout() {
        let runner = ProcessRunner::new();
        let output = runner
            .run(&CommandSpec::new("sh").args(["-c", "echo hello"]))
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "hello");
    }

    #[tokio::test]
    async fn test_env_is_passed_to_child() {
        let runner = ProcessRunner::new();
        let output = runner
            .run(
                &CommandSpec::new("sh")
                    .args(["-c", "echo $KUBECONFIG"])
                    .env("KUBECONFIG", "/work/kubeconfig.yaml"),
            )
            .await
            .unwrap();
        assert_eq!(output.stdout.trim(), "/work/kubeconfig.yaml");
    }

    #[tokio::test]
    async fn test_failure_keeps_output_and_status() {
        let runner = ProcessRunner::new();
        let failure = runner
            .run(&CommandSpec::new("sh").args(["-c", "echo out; echo err >&2; exit 3"]))
            .await
            .unwrap_err();
        assert_eq!(failure.status, Some(3));
        assert_eq!(failure.stdout.trim(), "out");
        assert_eq!(failure.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_missing_binary() {
        let runner = ProcessRunner::new();
        let failure = runner
            .run(&CommandSpec::new("deckhand-definitely-not-installed"))
            .await
            .unwrap_err();
        assert_eq!(failure.status, None);
        assert!(!failure.stderr.is_empty());
    }

    #[tokio::test]
    async fn test_timeout() {
        let runner = ProcessRunner::with_timeout(Some(Duration::from_millis(100)));
        let failure = runner
            .run(&CommandSpec::new("sleep").arg("5"))
            .await
            .unwrap_err();
        assert_eq!(failure.status, None);
        assert!(failure.stderr.starts_with("timed out"));
    }
}
