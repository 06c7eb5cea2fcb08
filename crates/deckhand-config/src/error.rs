//! Configuration parsing errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unable to parse config. Found content: {content}")]
    Unparseable { content: String },

    #[error("Unable to load config \"{found}\" into an object.")]
    NotAnObject { found: String },

    #[error(
        "Invalid config value for mandatory key \"{key}\". Found \"{found}\" while expecting a \"string\"."
    )]
    MissingField { key: String, found: String },

    #[error("Expecting {expected} in \"{key}\" optional key. Found \"{found}\".")]
    InvalidOptional {
        key: String,
        expected: &'static str,
        found: String,
    },
}

impl ConfigError {
    /// The configuration key this error is about, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { key, .. } | ConfigError::InvalidOptional { key, .. } => {
                Some(key)
            }
            _ => None,
        }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
