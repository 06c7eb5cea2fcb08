//! Action inputs and the validated run plan built from them.

use deckhand_config::{
    parse_document, validate_deployment, validate_repository, validate_sentry, validate_slack,
};
use deckhand_core::GitContext;
use deckhand_core::deployer::{ChartRepository, ReleaseSpec};
use deckhand_core::notifier::SlackConfig;
use deckhand_core::release::SentryConfig;
use tracing::debug;

use crate::{RunError, RunResult};

/// Raw inputs of the deploy step, as passed by the workflow.
#[derive(Debug, Clone, Default)]
pub struct ActionInputs {
    /// Deployment configuration (JSON or YAML).
    pub config: String,
    pub environment: String,
    /// Kubeconfig contents.
    pub kubernetes: Option<String>,
    /// Chart repository configuration.
    pub helm: Option<String>,
    pub sentry: Option<String>,
    pub slack: Option<String>,
    /// GitHub token used for metadata lookups.
    pub token: String,
    /// Release version reported to Sentry.
    pub version: Option<String>,
}

/// Everything a run needs, validated.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub spec: ReleaseSpec,
    pub environment: String,
    pub credentials: Option<String>,
    pub repository: ChartRepository,
    pub sentry: Option<SentryConfig>,
    pub slack: Option<SlackConfig>,
    pub token: String,
    /// Version the release is registered under.
    pub version: String,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: String, name: &'static str) -> RunResult<String> {
    if value.trim().is_empty() {
        Err(RunError::MissingInput(name))
    } else {
        Ok(value)
    }
}

/// Explicit version, else the `image.tag` value, else the commit sha.
pub fn resolve_version(explicit: Option<String>, spec: &ReleaseSpec, sha: &str) -> String {
    explicit
        .or_else(|| spec.image_tag())
        .unwrap_or_else(|| sha.to_string())
}

impl ActionInputs {
    /// Parse and validate every supplied input.
    ///
    /// Fails on the first invalid input, before anything is deployed.
    pub fn into_plan(self, git: &GitContext) -> RunResult<RunPlan> {
        let config = required(self.config, "config")?;
        debug!(config = %config, "Parsing raw config");
        let spec = validate_deployment(&parse_document(&config)?)?;
        let environment = required(self.environment, "environment")?;

        let credentials = non_blank(self.kubernetes);

        let repository = match non_blank(self.helm) {
            Some(raw) => validate_repository(&parse_document(&raw)?)?,
            None => ChartRepository::default(),
        };

        let sentry = match non_blank(self.sentry) {
            Some(raw) => Some(validate_sentry(&parse_document(&raw)?)?),
            None => None,
        };

        let slack = match non_blank(self.slack) {
            Some(raw) => Some(validate_slack(&parse_document(&raw)?)?),
            None => None,
        };

        let token = required(self.token, "token")?;
        let version = resolve_version(non_blank(self.version), &spec, &git.sha);

        debug!(
            app = %spec.app,
            app_url = %spec.app_url,
            environment = %environment,
            namespace = %spec.namespace,
            release = %spec.release,
            value_files = ?spec.value_files,
            values = %serde_json::Value::Object(spec.values.clone()),
            "Loaded variables"
        );
        debug!(
            kubernetes = credentials.is_some(),
            repository = ?repository.location(),
            sentry = sentry.is_some(),
            slack = ?slack,
            "Loaded integrations"
        );

        Ok(RunPlan {
            spec,
            environment,
            credentials,
            repository,
            sentry,
            slack,
            token,
            version,
        })
    }
}

impl RunPlan {
    /// Secret values that must never appear in logs.
    pub fn secrets(&self) -> Vec<&str> {
        let mut secrets = vec![self.token.as_str()];
        secrets.extend(self.credentials.as_deref());
        secrets.extend(self.repository.password.as_deref());
        secrets.extend(self.sentry.as_ref().map(|s| s.auth_token.as_str()));
        secrets.extend(self.slack.as_ref().map(|s| s.token.as_str()));
        secrets.retain(|s| !s.is_empty());
        secrets
    }
}
