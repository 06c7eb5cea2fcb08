//! Wires the real capabilities into the orchestrator and runs it.

use anyhow::{Context, Result};
use deckhand_core::GitContext;
use deckhand_core::command::CommandRunner;
use deckhand_deployer::{HelmDeployer, ProcessRunner, SentryRegistrar, Toolchain};
use deckhand_notify::{GitHubClient, SlackClient, SlackNotifier};
use deckhand_runner::{ActionInputs, Orchestrator, RunPlan, RunReport};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::actions;

/// Where and how external tools run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub work_dir: PathBuf,
    pub command_timeout: Option<Duration>,
    pub toolchain: Toolchain,
    pub slack_api_url: String,
}

/// Validate the inputs and run every configured stage.
pub async fn run(inputs: ActionInputs, settings: Settings, git: GitContext) -> Result<RunReport> {
    let plan = inputs.into_plan(&git)?;
    for secret in plan.secrets() {
        actions::add_mask(secret);
    }

    std::fs::create_dir_all(&settings.work_dir).with_context(|| {
        format!(
            "Failed to create work directory: {}",
            settings.work_dir.display()
        )
    })?;

    let orchestrator = orchestrator(&plan, &settings, git);
    Ok(orchestrator.run(&plan).await?)
}

fn orchestrator(plan: &RunPlan, settings: &Settings, git: GitContext) -> Orchestrator {
    let runner: Arc<dyn CommandRunner> =
        Arc::new(ProcessRunner::with_timeout(settings.command_timeout));

    let deployer = HelmDeployer::new(runner.clone(), &settings.work_dir)
        .with_toolchain(settings.toolchain.clone());
    let mut orchestrator = Orchestrator::new().with_deployer(Arc::new(deployer));

    if let Some(sentry) = &plan.sentry {
        debug!(org = %sentry.org, "Sentry release tracking enabled");
        let registrar = SentryRegistrar::new(runner, sentry.clone())
            .with_binary(&settings.toolchain.sentry_cli);
        orchestrator = orchestrator.with_release_tracker(Arc::new(registrar));
    }

    if let Some(slack) = &plan.slack {
        debug!(channel = %slack.channel, "Slack notifications enabled");
        let github = GitHubClient::new(plan.token.clone(), &git.api_url);
        let publisher = SlackClient::new(slack.token.clone(), &settings.slack_api_url);
        let channel = slack.channel.clone();
        orchestrator = orchestrator.with_notifier(Arc::new(SlackNotifier::new(
            Arc::new(github),
            Arc::new(publisher),
            channel,
            git,
        )));
    }

    orchestrator
}
