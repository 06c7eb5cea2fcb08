//! Sentry release registration through `sentry-cli`.

use async_trait::async_trait;
use deckhand_core::command::{CommandRunner, CommandSpec};
use deckhand_core::release::{ReleaseStage, ReleaseTracker, SentryConfig};
use deckhand_core::{Error, Result};
use std::sync::Arc;
use tracing::info;

/// Registers releases and deploys with Sentry.
pub struct SentryRegistrar {
    runner: Arc<dyn CommandRunner>,
    config: SentryConfig,
    sentry_cli: String,
}

impl SentryRegistrar {
    pub fn new(runner: Arc<dyn CommandRunner>, config: SentryConfig) -> Self {
        Self {
            runner,
            config,
            sentry_cli: "sentry-cli".to_string(),
        }
    }

    pub fn with_binary(mut self, sentry_cli: impl Into<String>) -> Self {
        self.sentry_cli = sentry_cli.into();
        self
    }

    /// `sentry-cli --auth-token <token> releases --org <org>`
    fn releases(&self) -> CommandSpec {
        CommandSpec::new(&self.sentry_cli)
            .secret_option("--auth-token", &self.config.auth_token)
            .arg("releases")
            .option("--org", &self.config.org)
    }

    async fn run_stage(
        &self,
        stage: ReleaseStage,
        cmd: CommandSpec,
        message: String,
    ) -> Result<()> {
        info!(stage = %stage, command = %cmd, "Sentry release step");
        self.runner
            .run(&cmd)
            .await
            .map(|_| ())
            .map_err(|failure| Error::Release {
                stage,
                message,
                failure,
            })
    }
}

#[async_trait]
impl ReleaseTracker for SentryRegistrar {
    async fn register_release(&self, app: &str, version: &str, environment: &str) -> Result<()> {
        info!(app = %app, version = %version, environment = %environment, "Set up sentry release");

        self.run_stage(
            ReleaseStage::Create,
            self.releases().arg("new").option("-p", app).arg(version),
            format!("Unable to prepare {} sentry release", app),
        )
        .await?;

        self.run_stage(
            ReleaseStage::SetCommits,
            self.releases().args(["set-commits", "--auto", version]),
            format!("Unable set commits for {} sentry release", app),
        )
        .await?;

        self.run_stage(
            ReleaseStage::Deploy,
            self.releases()
                .args(["deploys", version, "new"])
                .option("-e", environment),
            format!("Unable to deploy {} to sentry", app),
        )
        .await
    }
}
