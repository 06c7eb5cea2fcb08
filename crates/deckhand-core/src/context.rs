//! Source-control context of the triggering workflow run.
//!
//! Populated from the GitHub Actions environment:
//! - `GITHUB_REPOSITORY` - `owner/repo`
//! - `GITHUB_SHA`, `GITHUB_REF_NAME`, `GITHUB_REF` - triggering commit and ref
//! - `GITHUB_SERVER_URL`, `GITHUB_API_URL` - web and API base URLs
//! - `GITHUB_EVENT_PATH` - event payload; its `deployment` and `repository`
//!   objects override the values above when present

use serde_json::Value;
use tracing::{debug, warn};

const DEFAULT_SERVER_URL: &str = "https://github.com";
const DEFAULT_API_URL: &str = "https://api.github.com";

/// Git context of the run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitContext {
    pub owner: String,
    pub repo: String,
    /// Web URL of the repository.
    pub repo_url: String,
    pub sha: String,
    /// Ref being deployed (tag, branch or commit sha).
    pub ref_name: String,
    /// Id of the GitHub deployment that triggered the run.
    pub deployment_id: Option<String>,
    /// Base URL of the REST API.
    pub api_url: String,
}

impl GitContext {
    /// Read the context from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the context through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let (owner, repo) = var("GITHUB_REPOSITORY")
            .and_then(|full| {
                full.split_once('/')
                    .map(|(owner, repo)| (owner.to_string(), repo.to_string()))
            })
            .unwrap_or_default();

        let server_url = var("GITHUB_SERVER_URL").unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());
        let sha = var("GITHUB_SHA").unwrap_or_default();
        let ref_name = var("GITHUB_REF_NAME")
            .or_else(|| var("GITHUB_REF"))
            .unwrap_or_else(|| sha.clone());

        let mut ctx = Self {
            repo_url: format!("{}/{}/{}", server_url.trim_end_matches('/'), owner, repo),
            owner,
            repo,
            sha,
            ref_name,
            deployment_id: None,
            api_url: var("GITHUB_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
        };

        if let Some(path) = var("GITHUB_EVENT_PATH") {
            match std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|raw| serde_json::from_str::<Value>(&raw).map_err(|e| e.to_string()))
            {
                Ok(payload) => ctx.apply_event(&payload),
                Err(e) => warn!(path = %path, error = %e, "Unable to read event payload"),
            }
        }

        ctx
    }

    /// Override fields from a workflow event payload.
    pub fn apply_event(&mut self, payload: &Value) {
        if let Some(deployment) = payload.get("deployment") {
            debug!(deployment = %deployment, "deployment payload");
            if let Some(sha) = deployment.get("sha").and_then(Value::as_str) {
                self.sha = sha.to_string();
            }
            if let Some(ref_name) = deployment.get("ref").and_then(Value::as_str) {
                self.ref_name = ref_name.to_string();
            }
            self.deployment_id = match deployment.get("id") {
                Some(Value::Number(id)) => Some(id.to_string()),
                Some(Value::String(id)) => Some(id.clone()),
                _ => self.deployment_id.take(),
            };
        }

        if let Some(url) = payload
            .get("repository")
            .and_then(|r| r.get("html_url"))
            .and_then(Value::as_str)
        {
            self.repo_url = url.to_string();
        }
    }

    /// Short (7 char) commit sha.
    pub fn short_sha(&self) -> &str {
        match self.sha.char_indices().nth(7) {
            Some((idx, _)) => &self.sha[..idx],
            None => &self.sha,
        }
    }

    /// Ref as shown to humans: a bare commit sha is shortened.
    pub fn humanized_ref(&self) -> String {
        if !self.sha.is_empty() && self.ref_name == self.sha {
            format!("{}...", self.short_sha())
        } else {
            self.ref_name.clone()
        }
    }
}
