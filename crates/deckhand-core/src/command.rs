//! Command builder and runner trait.
//!
//! External tools (helm, kubectl, sentry-cli) are invoked from a program name
//! plus an ordered argument list, never from a shell string. Arguments marked
//! secret are shown as `***` whenever a command line is displayed.

use async_trait::async_trait;
use std::fmt;

const REDACTED: &str = "***";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Plain(String),
    Secret(String),
}

impl Arg {
    fn value(&self) -> &str {
        match self {
            Arg::Plain(value) | Arg::Secret(value) => value,
        }
    }
}

/// An external command to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    program: String,
    args: Vec<Arg>,
    env: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Append a single argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(arg.into()));
        self
    }

    /// Append several arguments, preserving order.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|a| Arg::Plain(a.into())));
        self
    }

    /// Append a flag followed by its value.
    pub fn option(self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.arg(flag).arg(value)
    }

    /// Append a flag followed by a value that must never be logged.
    pub fn secret_option(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push(Arg::Plain(flag.into()));
        self.args.push(Arg::Secret(value.into()));
        self
    }

    /// Set an environment variable for this command only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// The real argument list, secrets included.
    pub fn argv(&self) -> Vec<&str> {
        self.args.iter().map(Arg::value).collect()
    }

    pub fn envs(&self) -> &[(String, String)] {
        &self.env
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            match arg {
                Arg::Plain(value) => write!(f, " {}", value)?,
                Arg::Secret(_) => write!(f, " {}", REDACTED)?,
            }
        }
        Ok(())
    }
}

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// A command that could not be run or exited unsuccessfully.
#[derive(Debug, Clone)]
pub struct CommandFailure {
    /// Redacted command line.
    pub command: String,
    /// Exit status, when the process ran to completion.
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl fmt::Display for CommandFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(code) => write!(f, "`{}` exited with status {}", self.command, code),
            None => write!(f, "`{}` did not exit normally", self.command),
        }
    }
}

impl std::error::Error for CommandFailure {}

impl CommandFailure {
    /// Failure to start the process at all.
    pub fn spawn(command: &CommandSpec, error: &std::io::Error) -> Self {
        Self {
            command: command.to_string(),
            status: None,
            stdout: String::new(),
            stderr: error.to_string(),
        }
    }
}

/// Runs external commands to completion.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &CommandSpec) -> Result<CommandOutput, CommandFailure>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_argv_preserves_order_and_secrets() {
        let cmd = CommandSpec::new("helm")
            .args(["repo", "add"])
            .option("--username", "me")
            .secret_option("--password", "hunter2")
            .arg("charts");

        assert_eq!(cmd.program(), "helm");
        assert_eq!(
            cmd.argv(),
            vec!["repo", "add", "--username", "me", "--password", "hunter2", "charts"]
        );
    }

    #[test]
    fn test_display_redacts_secrets() {
        let cmd = CommandSpec::new("sentry-cli")
            .secret_option("--auth-token", "s3cr3t")
            .arg("releases");

        let shown = cmd.to_string();
        assert_eq!(shown, "sentry-cli --auth-token *** releases");
        assert!(!shown.contains("s3cr3t"));
    }

    #[test]
    fn test_env_is_per_command() {
        let cmd = CommandSpec::new("helm")
            .arg("ls")
            .env("KUBECONFIG", "/tmp/kubeconfig.yaml");

        assert_eq!(
            cmd.envs(),
            &[("KUBECONFIG".to_string(), "/tmp/kubeconfig.yaml".to_string())]
        );
        assert_eq!(cmd.to_string(), "helm ls");
    }

    #[test]
    fn test_failure_message() {
        let failure = CommandFailure {
            command: "helm repo update".to_string(),
            status: Some(1),
            stdout: String::new(),
            stderr: "boom".to_string(),
        };
        assert_eq!(failure.to_string(), "`helm repo update` exited with status 1");

        let spawn = CommandFailure::spawn(
            &CommandSpec::new("helm"),
            &std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        );
        assert_eq!(spawn.status, None);
        assert_eq!(spawn.stderr, "not found");
    }
}
