//! GitHub API client for commit and release metadata.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Read access to the source-control metadata a notification needs.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Get a commit by sha, branch or tag.
    async fn commit(&self, owner: &str, repo: &str, reference: &str)
    -> Result<Commit, GitHubError>;

    /// Get the release published for a tag.
    async fn release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Release, GitHubError>;
}

/// GitHub API client.
pub struct GitHubClient {
    client: reqwest::Client,
    access_token: String,
    api_url: String,
}

impl GitHubClient {
    /// Client for the REST API at `api_url` (`GITHUB_API_URL` on Actions runners).
    pub fn new(access_token: String, api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            access_token,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        what: &str,
    ) -> Result<T, GitHubError> {
        let response = self
            .client
            .get(url)
            .header("Authorization", format!("Bearer {}", self.access_token))
            .header("User-Agent", "deckhand")
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(|e| GitHubError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api(format!(
                "Failed to get {} ({}): {}",
                what, status, text
            )));
        }

        response
            .json()
            .await
            .map_err(|e| GitHubError::Parse(e.to_string()))
    }
}

#[async_trait]
impl SourceControl for GitHubClient {
    async fn commit(
        &self,
        owner: &str,
        repo: &str,
        reference: &str,
    ) -> Result<Commit, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/commits/{}",
            self.api_url,
            owner,
            repo,
            urlencoding::encode(reference)
        );
        self.get(&url, "commit").await
    }

    async fn release_by_tag(
        &self,
        owner: &str,
        repo: &str,
        tag: &str,
    ) -> Result<Release, GitHubError> {
        let url = format!(
            "{}/repos/{}/{}/releases/tags/{}",
            self.api_url,
            owner,
            repo,
            urlencoding::encode(tag)
        );
        self.get(&url, "release").await
    }
}

/// A commit as returned by the commits API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    pub sha: String,
    pub html_url: String,
    /// GitHub account of the author; absent when the email is not linked.
    pub author: Option<GitHubUser>,
    pub commit: CommitDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitDetail {
    pub message: String,
    pub author: Option<GitAuthor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitAuthor {
    pub name: String,
}

/// GitHub user information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
}

/// A published release.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
    pub html_url: String,
    pub body: Option<String>,
}

/// GitHub API errors.
#[derive(Debug, thiserror::Error)]
pub enum GitHubError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_without_linked_author() {
        let raw = r#"{
            "sha": "abcdef1234567",
            "html_url": "https://github.com/acme/shop/commit/abcdef1234567",
            "author": null,
            "commit": { "message": "Fix checkout", "author": { "name": "Jane" } }
        }"#;

        let commit: Commit = serde_json::from_str(raw).unwrap();
        assert!(commit.author.is_none());
        assert_eq!(commit.commit.message, "Fix checkout");
        assert_eq!(commit.commit.author.unwrap().name, "Jane");
    }

    #[test]
    fn test_api_url_is_normalized() {
        let client = GitHubClient::new("t".to_string(), "https://ghe.local/api/v3/");
        assert_eq!(client.api_url, "https://ghe.local/api/v3");
    }
}
