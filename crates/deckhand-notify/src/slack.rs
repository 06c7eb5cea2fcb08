//! Slack Web API client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::message::Block;

pub const DEFAULT_API_URL: &str = "https://slack.com/api";

/// Posts a message to a chat channel.
#[async_trait]
pub trait MessagePublisher: Send + Sync {
    async fn publish(&self, channel: &str, blocks: &[Block], text: &str)
    -> Result<(), SlackError>;
}

/// Slack Web API client authenticated with a bot token.
pub struct SlackClient {
    client: reqwest::Client,
    token: String,
    api_url: String,
}

impl SlackClient {
    /// Client for the Web API at `api_url`, usually [`DEFAULT_API_URL`].
    pub fn new(token: String, api_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            token,
            api_url: api_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    blocks: &'a [Block],
    text: &'a str,
}

/// Response envelope shared by every Web API method.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    error: Option<String>,
    response_metadata: Option<Value>,
}

#[async_trait]
impl MessagePublisher for SlackClient {
    async fn publish(
        &self,
        channel: &str,
        blocks: &[Block],
        text: &str,
    ) -> Result<(), SlackError> {
        let response = self
            .client
            .post(format!("{}/chat.postMessage", self.api_url))
            .bearer_auth(&self.token)
            .json(&PostMessage {
                channel,
                blocks,
                text,
            })
            .send()
            .await
            .map_err(|e| SlackError::Request(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(SlackError::Api(format!("{}: {}", status, text)));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| SlackError::Parse(e.to_string()))?;

        debug!(response_metadata = ?body.response_metadata, "Slack response");

        if !body.ok {
            return Err(SlackError::Api(
                body.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }

        Ok(())
    }
}

/// Slack API errors.
#[derive(Debug, thiserror::Error)]
pub enum SlackError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
