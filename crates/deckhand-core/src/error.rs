//! Error types for deckhand.

use thiserror::Error;

use crate::command::CommandFailure;
use crate::deployer::DeployStage;
use crate::release::ReleaseStage;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{message}")]
    Deploy {
        stage: DeployStage,
        message: String,
        #[source]
        failure: CommandFailure,
    },

    #[error("{message}")]
    Release {
        stage: ReleaseStage,
        message: String,
        #[source]
        failure: CommandFailure,
    },

    #[error("notification failed: {0}")]
    Notification(String),

    #[error("source control request failed: {0}")]
    SourceControl(String),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// The failed command behind this error, if a command caused it.
    pub fn command_failure(&self) -> Option<&CommandFailure> {
        match self {
            Error::Deploy { failure, .. } | Error::Release { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
