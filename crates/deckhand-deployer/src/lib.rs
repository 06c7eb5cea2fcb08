//! Deployment backends for the deckhand deploy step.
//!
//! Provides:
//! - A `tokio::process` command runner
//! - Helm deployer (credentials, values file, repository, upgrade)
//! - Sentry release registrar

pub mod helm;
pub mod process;
pub mod sentry;

#[cfg(test)]
pub(crate) mod testing;

pub use deckhand_core::deployer::{ChartRepository, DeployStage, Deployer, ReleaseSpec};
pub use deckhand_core::release::{ReleaseStage, ReleaseTracker, SentryConfig};
pub use helm::HelmDeployer;
pub use process::ProcessRunner;
pub use sentry::SentryRegistrar;

/// Names of the external binaries to invoke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub helm: String,
    pub kubectl: String,
    pub sentry_cli: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Self {
            helm: "helm".to_string(),
            kubectl: "kubectl".to_string(),
            sentry_cli: "sentry-cli".to_string(),
        }
    }
}
