//! Test doubles shared by the deployer tests.

use async_trait::async_trait;
use deckhand_core::command::{CommandFailure, CommandOutput, CommandRunner, CommandSpec};
use std::sync::Mutex;

type FailWhen = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// Records every command instead of running it.
pub(crate) struct RecordingRunner {
    calls: Mutex<Vec<CommandSpec>>,
    fail_when: Option<FailWhen>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_when: None,
        }
    }

    /// Fail every command whose full, unredacted command line matches.
    pub fn failing_when(predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_when: Some(Box::new(predicate)),
        }
    }

    /// Full command lines, secrets included.
    pub fn commands(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(command_line).collect()
    }

    pub fn specs(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }
}

fn command_line(spec: &CommandSpec) -> String {
    std::iter::once(spec.program())
        .chain(spec.argv())
        .collect::<Vec<_>>()
        .join(" ")
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, CommandFailure> {
        self.calls.lock().unwrap().push(spec.clone());

        let line = command_line(spec);
        if self.fail_when.as_ref().is_some_and(|fail| fail(&line)) {
            return Err(CommandFailure {
                command: spec.to_string(),
                status: Some(1),
                stdout: "stdout".to_string(),
                stderr: "command failed".to_string(),
            });
        }

        Ok(CommandOutput {
            stdout: "stdout".to_string(),
            stderr: String::new(),
        })
    }
}
