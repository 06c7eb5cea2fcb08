//! Run error types.

use deckhand_config::ConfigError;
use thiserror::Error;

/// Result type for a deploy run.
pub type RunResult<T> = std::result::Result<T, RunError>;

/// Anything that fails a deploy run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(&'static str),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Core(#[from] deckhand_core::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_passed_through() {
        assert_eq!(
            RunError::MissingInput("environment").to_string(),
            "Input required and not supplied: environment"
        );

        let err = RunError::from(ConfigError::Unparseable {
            content: "{".to_string(),
        });
        assert_eq!(err.to_string(), "Unable to parse config. Found content: {");
    }
}
