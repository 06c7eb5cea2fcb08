//! Validation of decoded configuration groups.

use crate::document::describe;
use crate::{ConfigError, ConfigResult, Document};
use deckhand_core::deployer::{ChartRepository, ReleaseSpec};
use deckhand_core::notifier::SlackConfig;
use deckhand_core::release::SentryConfig;
use serde_json::Value;

const DEFAULT_NAMESPACE: &str = "default";

/// Validate the primary deployment configuration and apply defaults.
pub fn validate_deployment(doc: &Document) -> ConfigResult<ReleaseSpec> {
    let app = require_string(doc, "app")?;
    let app_url = require_string(doc, "appUrl")?;
    let chart = require_string(doc, "chart")?;

    let namespace = optional_string(doc, "namespace")?;
    let release = optional_string(doc, "release")?;
    let chart_version = optional_version(doc, "chartVersion")?;

    let value_files = match doc.present("valueFiles") {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(file) => Ok(file.clone()),
                other => Err(invalid_optional("valueFiles", "array of strings", other)),
            })
            .collect::<ConfigResult<Vec<_>>>()?,
        Some(other) => return Err(invalid_optional("valueFiles", "array", other)),
    };

    let values = match doc.present("values") {
        None => Default::default(),
        Some(Value::Object(values)) => values.clone(),
        Some(other) => return Err(invalid_optional("values", "object", other)),
    };

    Ok(ReleaseSpec {
        namespace: namespace.unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
        release: release.unwrap_or_else(|| app.clone()),
        app,
        app_url,
        chart,
        chart_version,
        value_files,
        values,
    })
}

/// Validate a chart repository configuration. Every key is optional.
pub fn validate_repository(doc: &Document) -> ConfigResult<ChartRepository> {
    Ok(ChartRepository {
        name: optional_string(doc, "name")?,
        url: optional_string(doc, "url")?,
        username: optional_string(doc, "username")?,
        password: optional_string(doc, "password")?,
    })
}

pub fn validate_sentry(doc: &Document) -> ConfigResult<SentryConfig> {
    Ok(SentryConfig {
        auth_token: require_string(doc, "authToken")?,
        org: require_string(doc, "org")?,
    })
}

pub fn validate_slack(doc: &Document) -> ConfigResult<SlackConfig> {
    Ok(SlackConfig {
        token: require_string(doc, "token")?,
        channel: require_string(doc, "channel")?,
    })
}

fn require_string(doc: &Document, key: &str) -> ConfigResult<String> {
    match doc.get(key) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value.clone()),
        other => Err(ConfigError::MissingField {
            key: key.to_string(),
            found: describe(other),
        }),
    }
}

fn optional_string(doc: &Document, key: &str) -> ConfigResult<Option<String>> {
    match doc.present(key) {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(invalid_optional(key, "string", other)),
    }
}

// YAML reads `chartVersion: 1.0` as a number.
fn optional_version(doc: &Document, key: &str) -> ConfigResult<Option<String>> {
    match doc.present(key) {
        Some(Value::Number(version)) => Ok(Some(version.to_string())),
        _ => optional_string(doc, key),
    }
}

fn invalid_optional(key: &str, expected: &'static str, found: &Value) -> ConfigError {
    ConfigError::InvalidOptional {
        key: key.to_string(),
        expected,
        found: describe(Some(found)),
    }
}
