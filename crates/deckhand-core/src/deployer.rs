//! Deployer trait and release types.
//!
//! Deployers install or upgrade a chart release in a cluster.

use async_trait::async_trait;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::Result;

/// Everything needed to install or upgrade one chart release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseSpec {
    /// Application name.
    pub app: String,
    /// Public URL of the deployed application.
    pub app_url: String,
    /// Chart reference (e.g., "myrepo/myapp").
    pub chart: String,
    /// Pinned chart version.
    pub chart_version: Option<String>,
    /// Target namespace.
    pub namespace: String,
    /// Release name.
    pub release: String,
    /// Value files passed to the chart, in order.
    pub value_files: Vec<String>,
    /// Inline values rendered to an extra value file.
    pub values: Map<String, Value>,
}

impl ReleaseSpec {
    /// The `image.tag` entry of the inline values, if any.
    pub fn image_tag(&self) -> Option<String> {
        match self.values.get("image")?.get("tag")? {
            Value::String(tag) if !tag.is_empty() => Some(tag.clone()),
            Value::Number(tag) => Some(tag.to_string()),
            _ => None,
        }
    }
}

/// Chart repository to register before deploying.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartRepository {
    pub name: Option<String>,
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ChartRepository {
    /// Name and URL, when both are configured.
    pub fn location(&self) -> Option<(&str, &str)> {
        match (self.name.as_deref(), self.url.as_deref()) {
            (Some(name), Some(url)) if !name.is_empty() && !url.is_empty() => Some((name, url)),
            _ => None,
        }
    }

    /// Username and password, when both are configured.
    pub fn login(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

/// Stage of a deployment that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DeployStage {
    #[display("repository-add")]
    RepositoryAdd,
    #[display("repository-update")]
    RepositoryUpdate,
    #[display("install")]
    Install,
}

/// Trait for deployers.
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Name of this deployer.
    fn name(&self) -> &'static str;

    /// Install or upgrade a release using the given cluster credentials.
    async fn deploy(
        &self,
        credentials: &str,
        spec: &ReleaseSpec,
        repository: &ChartRepository,
    ) -> Result<()>;
}
