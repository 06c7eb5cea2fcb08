//! Slack deployment notifier.

use async_trait::async_trait;
use deckhand_core::notifier::{FailureDetail, Notifier};
use deckhand_core::{Error, GitContext, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::github::SourceControl;
use crate::message::{self, Block, DeploymentMetadata};
use crate::slack::MessagePublisher;

/// Announces deployments in a Slack channel, enriched with GitHub metadata.
pub struct SlackNotifier {
    source: Arc<dyn SourceControl>,
    publisher: Arc<dyn MessagePublisher>,
    channel: String,
    git: GitContext,
}

impl SlackNotifier {
    pub fn new(
        source: Arc<dyn SourceControl>,
        publisher: Arc<dyn MessagePublisher>,
        channel: impl Into<String>,
        git: GitContext,
    ) -> Self {
        Self {
            source,
            publisher,
            channel: channel.into(),
            git,
        }
    }

    /// Look up the commit and, when the ref is a released tag, its release.
    async fn metadata(&self) -> Result<DeploymentMetadata> {
        let git = &self.git;
        let commit = self
            .source
            .commit(&git.owner, &git.repo, &git.ref_name)
            .await
            .map_err(|e| Error::SourceControl(e.to_string()))?;
        debug!(commit = ?commit, "commit response");

        let (ref_url, description) = match self
            .source
            .release_by_tag(&git.owner, &git.repo, &git.ref_name)
            .await
        {
            Ok(release) => {
                debug!(release = ?release, "release response");
                (release.html_url, release.body.unwrap_or_default())
            }
            Err(e) => {
                warn!(tag = %git.ref_name, error = %e, "Unable to retrieve release for tag");
                (
                    format!("{}/commits/{}", git.repo_url, git.ref_name),
                    format!("```\n{}\n```", commit.commit.message),
                )
            }
        };

        let author_name = commit
            .commit
            .author
            .map(|a| a.name)
            .or_else(|| commit.author.as_ref().map(|a| a.login.clone()))
            .unwrap_or_default();

        Ok(DeploymentMetadata {
            repo: git.repo.clone(),
            repo_url: git.repo_url.clone(),
            sha: git.sha.clone(),
            short_sha: git.short_sha().to_string(),
            ref_url,
            humanized_ref: git.humanized_ref(),
            description,
            deployment_id: git.deployment_id.clone(),
            commit_url: commit.html_url,
            author_name,
            author_login: commit.author.as_ref().map(|a| a.login.clone()),
            author_url: commit.author.as_ref().map(|a| a.html_url.clone()),
            avatar_url: commit.author.map(|a| a.avatar_url),
        })
    }

    async fn publish(&self, blocks: Vec<Block>, text: String) -> Result<()> {
        self.publisher
            .publish(&self.channel, &blocks, &text)
            .await
            .map_err(|e| Error::Notification(e.to_string()))
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn notify_success(&self, app: &str, app_url: &str, environment: &str) -> Result<()> {
        info!(channel = %self.channel, "Send slack deployment success notification");
        let meta = self.metadata().await?;
        self.publish(
            message::success_blocks(app, app_url, environment, &meta),
            message::success_text(app, environment),
        )
        .await
    }

    async fn notify_failure(
        &self,
        failure: &FailureDetail,
        app: &str,
        environment: &str,
    ) -> Result<()> {
        info!(channel = %self.channel, "Send slack deployment error notification");
        let meta = self.metadata().await?;
        self.publish(
            message::failure_blocks(failure, app, environment, &meta),
            message::failure_text(app, environment),
        )
        .await
    }
}
