//! Configuration parsing for the deckhand deploy step.
//!
//! This crate handles:
//! - Decoding raw action inputs (JSON, falling back to YAML)
//! - Validating the deployment, repository, Sentry and Slack groups

pub mod document;
pub mod error;
pub mod validate;

pub use document::{Document, Format, parse_document};
pub use error::{ConfigError, ConfigResult};
pub use validate::{validate_deployment, validate_repository, validate_sentry, validate_slack};
