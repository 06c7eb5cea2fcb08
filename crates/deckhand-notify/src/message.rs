//! Slack Block Kit message layout for deployment notifications.

use deckhand_core::notifier::FailureDetail;
use serde::Serialize;

/// A Block Kit layout block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        #[serde(skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        fields: Vec<Text>,
        #[serde(skip_serializing_if = "Option::is_none")]
        accessory: Option<Accessory>,
    },
    Divider,
    Context {
        elements: Vec<Text>,
    },
}

impl Block {
    pub fn section(text: impl Into<String>) -> Self {
        Block::Section {
            text: Some(Text::mrkdwn(text)),
            fields: Vec::new(),
            accessory: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    Mrkdwn { text: String },
}

impl Text {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Text::Mrkdwn { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Accessory {
    Image { image_url: String, alt_text: String },
}

/// Everything the message needs to know about the deployed revision.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentMetadata {
    pub repo: String,
    pub repo_url: String,
    pub sha: String,
    pub short_sha: String,
    /// Release page when the ref is a released tag, else the commit list.
    pub ref_url: String,
    pub humanized_ref: String,
    /// Release notes, or the commit message in a code block.
    pub description: String,
    pub deployment_id: Option<String>,
    pub commit_url: String,
    pub author_name: String,
    pub author_login: Option<String>,
    pub author_url: Option<String>,
    pub avatar_url: Option<String>,
}

fn environment_emoji(environment: &str) -> &'static str {
    if environment == "production" {
        ":rocket:"
    } else {
        ":shipit:"
    }
}

/// Blocks shared by the success and failure messages.
pub fn deployment_blocks(
    action: &str,
    app: &str,
    environment: &str,
    meta: &DeploymentMetadata,
) -> Vec<Block> {
    let headline = format!(
        "{} *<{}/commit/{}/checks|{}>* (<{}|{}>) to *<{}/deployments?environment={}#activity-log|{}>* {}",
        action,
        meta.repo_url,
        meta.sha,
        app,
        meta.ref_url,
        meta.humanized_ref,
        meta.repo_url,
        environment,
        environment,
        environment_emoji(environment),
    );

    let author = match (&meta.author_login, &meta.author_url) {
        (Some(login), Some(url)) => format!("{} <{}|@{}>", meta.author_name, url, login),
        _ => meta.author_name.clone(),
    };

    let fields = vec![
        Text::mrkdwn(format!(
            ":books: *Repository:* <{}|{}>",
            meta.repo_url, meta.repo
        )),
        Text::mrkdwn(format!(":person_in_steamy_room: *Author:* {}", author)),
        Text::mrkdwn(format!(
            ":beer: *Commit:* <{}|{}>",
            meta.commit_url, meta.short_sha
        )),
        Text::mrkdwn(format!(
            ":point_left: *Deployment ID:* {}",
            meta.deployment_id.as_deref().unwrap_or("n/a")
        )),
    ];

    vec![
        Block::section(headline),
        Block::Divider,
        Block::section(meta.description.clone()),
        Block::Divider,
        Block::Section {
            text: None,
            fields,
            accessory: meta.avatar_url.as_ref().map(|url| Accessory::Image {
                image_url: url.clone(),
                alt_text: "avatar_url".to_string(),
            }),
        },
    ]
}

/// Success message: the deployment blocks plus the application url.
pub fn success_blocks(
    app: &str,
    app_url: &str,
    environment: &str,
    meta: &DeploymentMetadata,
) -> Vec<Block> {
    let label = app_url.split_once("//").map_or(app_url, |(_, rest)| rest);

    let mut blocks = deployment_blocks("I have deployed", app, environment, meta);
    blocks.push(Block::Context {
        elements: vec![Text::mrkdwn(format!(
            "*Application url:* <{}|{}>",
            app_url, label
        ))],
    });
    blocks.push(Block::Divider);
    blocks
}

/// Failure message: the deployment blocks plus the error and command output.
pub fn failure_blocks(
    failure: &FailureDetail,
    app: &str,
    environment: &str,
    meta: &DeploymentMetadata,
) -> Vec<Block> {
    let status = failure
        .status
        .map_or_else(|| "unknown".to_string(), |s| s.to_string());
    let error = format!(
        "{} (error code {}) `stderr`: ```{}``` `stdout`: ```{}```",
        failure.message,
        status,
        failure.stderr.as_deref().unwrap_or_default(),
        failure.stdout.as_deref().unwrap_or_default(),
    );

    let mut blocks = deployment_blocks("I have FAILED to deploy", app, environment, meta);
    blocks.push(Block::Divider);
    blocks.push(Block::section(error));
    blocks.push(Block::Divider);
    blocks
}

pub fn success_text(app: &str, environment: &str) -> String {
    format!("Deployed {} to {}", app, environment)
}

pub fn failure_text(app: &str, environment: &str) -> String {
    format!("Error deploying {} to {}", app, environment)
}
