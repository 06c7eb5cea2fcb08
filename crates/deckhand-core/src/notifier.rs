//! Notifier trait and deployment outcome types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Slack bot credentials and target channel.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlackConfig {
    pub token: String,
    pub channel: String,
}

impl std::fmt::Debug for SlackConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackConfig")
            .field("token", &"***")
            .field("channel", &self.channel)
            .finish()
    }
}

/// What went wrong during a failed deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureDetail {
    pub message: String,
    pub stderr: Option<String>,
    pub stdout: Option<String>,
    pub status: Option<i32>,
}

impl From<&Error> for FailureDetail {
    fn from(err: &Error) -> Self {
        let failure = err.command_failure();
        Self {
            message: err.to_string(),
            stderr: failure.map(|f| f.stderr.clone()),
            stdout: failure.map(|f| f.stdout.clone()),
            status: failure.and_then(|f| f.status),
        }
    }
}

/// Result of the deployment stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentOutcome {
    Success,
    Failure(FailureDetail),
}

/// Trait for deployment notifiers.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce a successful deployment.
    async fn notify_success(&self, app: &str, app_url: &str, environment: &str) -> Result<()>;

    /// Announce a failed deployment.
    async fn notify_failure(
        &self,
        failure: &FailureDetail,
        app: &str,
        environment: &str,
    ) -> Result<()>;

    /// Dispatch on a deployment outcome.
    async fn notify(
        &self,
        outcome: &DeploymentOutcome,
        app: &str,
        app_url: &str,
        environment: &str,
    ) -> Result<()> {
        match outcome {
            DeploymentOutcome::Success => self.notify_success(app, app_url, environment).await,
            DeploymentOutcome::Failure(failure) => {
                self.notify_failure(failure, app, environment).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandFailure;
    use crate::deployer::DeployStage;

    #[test]
    fn test_failure_detail_from_command_error() {
        let err = Error::Deploy {
            stage: DeployStage::Install,
            message: "Unable to deploy charts/app chart with release app".to_string(),
            failure: CommandFailure {
                command: "helm upgrade".to_string(),
                status: Some(1),
                stdout: "partial".to_string(),
                stderr: "Error: timed out".to_string(),
            },
        };

        let detail = FailureDetail::from(&err);
        assert_eq!(
            detail.message,
            "Unable to deploy charts/app chart with release app"
        );
        assert_eq!(detail.stderr.as_deref(), Some("Error: timed out"));
        assert_eq!(detail.stdout.as_deref(), Some("partial"));
        assert_eq!(detail.status, Some(1));
    }

    #[test]
    fn test_failure_detail_without_command() {
        let err = Error::Notification("channel_not_found".to_string());
        let detail = FailureDetail::from(&err);
        assert_eq!(detail.message, "notification failed: channel_not_found");
        assert!(detail.stderr.is_none());
        assert!(detail.status.is_none());
    }
}
