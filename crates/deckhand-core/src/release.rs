//! Release tracking abstraction (error-tracking releases).

use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Credentials for the Sentry release API.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentryConfig {
    pub auth_token: String,
    pub org: String,
}

impl std::fmt::Debug for SentryConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentryConfig")
            .field("auth_token", &"***")
            .field("org", &self.org)
            .finish()
    }
}

/// Stage of a release registration that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ReleaseStage {
    #[display("create")]
    Create,
    #[display("set-commits")]
    SetCommits,
    #[display("deploy")]
    Deploy,
}

/// Trait for release trackers.
#[async_trait]
pub trait ReleaseTracker: Send + Sync {
    /// Create a release, attach its commits and record a deploy for `environment`.
    async fn register_release(&self, app: &str, version: &str, environment: &str) -> Result<()>;
}
