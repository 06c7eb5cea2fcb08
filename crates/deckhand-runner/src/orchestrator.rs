//! Deploy orchestrator - runs the deployment, notification and release stages in order.

use deckhand_core::deployer::Deployer;
use deckhand_core::notifier::{DeploymentOutcome, FailureDetail, Notifier};
use deckhand_core::release::ReleaseTracker;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{RunPlan, RunResult};

/// Terminal state of a stage in a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageState {
    Succeeded,
    Skipped { reason: String },
}

impl StageState {
    pub fn is_success(&self) -> bool {
        matches!(self, StageState::Succeeded)
    }

    fn skipped(reason: &str) -> Self {
        StageState::Skipped {
            reason: reason.to_string(),
        }
    }
}

impl fmt::Display for StageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageState::Succeeded => write!(f, "succeeded"),
            StageState::Skipped { reason } => write!(f, "skipped: {}", reason),
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub deployment: StageState,
    pub notification: StageState,
    pub release: StageState,
}

const NO_KUBERNETES: &str =
    "No kubernetes config was provided. Skipping kubernetes helm deployment";
const NO_SENTRY: &str = "No sentry config was provided. Skipping sentry release";

/// Orchestrates one deploy run.
///
/// Every capability is optional; a missing one skips its stage.
#[derive(Default)]
pub struct Orchestrator {
    deployer: Option<Arc<dyn Deployer>>,
    notifier: Option<Arc<dyn Notifier>>,
    tracker: Option<Arc<dyn ReleaseTracker>>,
}

impl Orchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deployer(mut self, deployer: Arc<dyn Deployer>) -> Self {
        self.deployer = Some(deployer);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn with_release_tracker(mut self, tracker: Arc<dyn ReleaseTracker>) -> Self {
        self.tracker = Some(tracker);
        self
    }

    /// Execute a validated plan.
    ///
    /// A failed deployment is announced and its error returned; no release
    /// is registered for it.
    pub async fn run(&self, plan: &RunPlan) -> RunResult<RunReport> {
        let app = plan.spec.app.as_str();
        let environment = plan.environment.as_str();

        let (deployment, notification) = match (&self.deployer, plan.credentials.as_deref()) {
            (Some(deployer), Some(credentials)) => {
                info!(deployer = deployer.name(), app = %app, environment = %environment, "Deploying");
                if let Err(e) = deployer
                    .deploy(credentials, &plan.spec, &plan.repository)
                    .await
                {
                    error!(app = %app, error = %e, "Deployment failed");
                    let outcome = DeploymentOutcome::Failure(FailureDetail::from(&e));
                    self.notify(&outcome, plan).await?;
                    return Err(e.into());
                }
                let notification = self.notify(&DeploymentOutcome::Success, plan).await?;
                (StageState::Succeeded, notification)
            }
            _ => {
                warn!("{}", NO_KUBERNETES);
                (
                    StageState::skipped(NO_KUBERNETES),
                    StageState::skipped("nothing was deployed"),
                )
            }
        };

        let release = match &self.tracker {
            Some(tracker) => {
                info!(app = %app, version = %plan.version, "Registering release");
                tracker
                    .register_release(app, &plan.version, environment)
                    .await?;
                StageState::Succeeded
            }
            None => {
                warn!("{}", NO_SENTRY);
                StageState::skipped(NO_SENTRY)
            }
        };

        let report = RunReport {
            deployment,
            notification,
            release,
        };
        info!(
            deployment = %report.deployment,
            notification = %report.notification,
            release = %report.release,
            "Run completed"
        );
        Ok(report)
    }

    /// Send the one notification for this outcome, when a notifier is configured.
    async fn notify(
        &self,
        outcome: &DeploymentOutcome,
        plan: &RunPlan,
    ) -> deckhand_core::Result<StageState> {
        match &self.notifier {
            Some(notifier) => {
                notifier
                    .notify(
                        outcome,
                        &plan.spec.app,
                        &plan.spec.app_url,
                        &plan.environment,
                    )
                    .await?;
                Ok(StageState::Succeeded)
            }
            None => Ok(StageState::skipped("no slack config was provided")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActionInputs, RunError};
    use async_trait::async_trait;
    use deckhand_core::command::CommandFailure;
    use deckhand_core::deployer::{ChartRepository, DeployStage, ReleaseSpec};
    use deckhand_core::{Error, GitContext};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<String>>>;

    struct MockDeployer {
        log: Log,
        fail: bool,
    }

    #[async_trait]
    impl Deployer for MockDeployer {
        fn name(&self) -> &'static str {
            "mock"
        }

        async fn deploy(
            &self,
            credentials: &str,
            spec: &ReleaseSpec,
            _repository: &ChartRepository,
        ) -> deckhand_core::Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("deploy {} with {}", spec.release, credentials));
            if self.fail {
                return Err(Error::Deploy {
                    stage: DeployStage::Install,
                    message: format!(
                        "Unable to deploy {} chart with release {}",
                        spec.chart, spec.release
                    ),
                    failure: CommandFailure {
                        command: "helm upgrade".to_string(),
                        status: Some(1),
                        stdout: "out".to_string(),
                        stderr: "Error: timed out".to_string(),
                    },
                });
            }
            Ok(())
        }
    }

    struct MockNotifier {
        log: Log,
        failures: Mutex<Vec<FailureDetail>>,
        fail: bool,
    }

    #[async_trait]
    impl Notifier for MockNotifier {
        async fn notify_success(
            &self,
            app: &str,
            app_url: &str,
            environment: &str,
        ) -> deckhand_core::Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("success {} {} {}", app, app_url, environment));
            if self.fail {
                return Err(Error::Notification("channel_not_found".to_string()));
            }
            Ok(())
        }

        async fn notify_failure(
            &self,
            failure: &FailureDetail,
            app: &str,
            environment: &str,
        ) -> deckhand_core::Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("failure {} {}", app, environment));
            self.failures.lock().unwrap().push(failure.clone());
            if self.fail {
                return Err(Error::Notification("channel_not_found".to_string()));
            }
            Ok(())
        }
    }

    struct MockTracker {
        log: Log,
    }

    #[async_trait]
    impl ReleaseTracker for MockTracker {
        async fn register_release(
            &self,
            app: &str,
            version: &str,
            environment: &str,
        ) -> deckhand_core::Result<()> {
            self.log
                .lock()
                .unwrap()
                .push(format!("release {} {} {}", app, version, environment));
            Ok(())
        }
    }

    struct Harness {
        log: Log,
        notifier: Arc<MockNotifier>,
        orchestrator: Orchestrator,
    }

    fn harness(deploy_fails: bool, notify_fails: bool) -> Harness {
        let log: Log = Arc::default();
        let notifier = Arc::new(MockNotifier {
            log: log.clone(),
            failures: Mutex::new(Vec::new()),
            fail: notify_fails,
        });
        let orchestrator = Orchestrator::new()
            .with_deployer(Arc::new(MockDeployer {
                log: log.clone(),
                fail: deploy_fails,
            }))
            .with_notifier(notifier.clone())
            .with_release_tracker(Arc::new(MockTracker { log: log.clone() }));

        Harness {
            log,
            notifier,
            orchestrator,
        }
    }

    fn plan(kubernetes: Option<&str>, version: Option<&str>) -> RunPlan {
        let git = GitContext {
            sha: "0123456789abcdef".to_string(),
            ..Default::default()
        };
        ActionInputs {
            config: r#"{"app": "shop", "appUrl": "https://shop.example.com", "chart": "charts/shop",
                        "values": {"image": {"tag": "1.4.2"}}}"#
                .to_string(),
            environment: "staging".to_string(),
            kubernetes: kubernetes.map(String::from),
            token: "ghs_token".to_string(),
            version: version.map(String::from),
            ..Default::default()
        }
        .into_plan(&git)
        .unwrap()
    }

    fn entries(log: &Log) -> Vec<String> {
        log.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_success_path() {
        let h = harness(false, false);

        let report = h
            .orchestrator
            .run(&plan(Some("kubeconfig"), None))
            .await
            .unwrap();

        assert!(report.deployment.is_success());
        assert!(report.notification.is_success());
        assert!(report.release.is_success());
        assert_eq!(
            entries(&h.log),
            vec![
                "deploy shop with kubeconfig",
                "success shop https://shop.example.com staging",
                "release shop 1.4.2 staging",
            ]
        );
    }

    #[tokio::test]
    async fn test_failure_path_notifies_once_and_fails() {
        let h = harness(true, false);

        let err = h
            .orchestrator
            .run(&plan(Some("kubeconfig"), None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            RunError::Core(Error::Deploy {
                stage: DeployStage::Install,
                ..
            })
        ));
        assert_eq!(
            err.to_string(),
            "Unable to deploy charts/shop chart with release shop"
        );

        let log = entries(&h.log);
        assert_eq!(log.iter().filter(|l| l.starts_with("failure")).count(), 1);
        assert!(!log.iter().any(|l| l.starts_with("success")));

        let failures = h.notifier.failures.lock().unwrap();
        assert_eq!(
            failures[0],
            FailureDetail {
                message: "Unable to deploy charts/shop chart with release shop".to_string(),
                stderr: Some("Error: timed out".to_string()),
                stdout: Some("out".to_string()),
                status: Some(1),
            }
        );
    }

    #[tokio::test]
    async fn test_failed_deployment_registers_no_release() {
        let h = harness(true, false);

        h.orchestrator
            .run(&plan(Some("kubeconfig"), None))
            .await
            .unwrap_err();

        assert!(!entries(&h.log).iter().any(|l| l.starts_with("release")));
    }

    #[tokio::test]
    async fn test_failure_notification_error_propagates() {
        let h = harness(true, true);

        let err = h
            .orchestrator
            .run(&plan(Some("kubeconfig"), None))
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Core(Error::Notification(_))));
        assert_eq!(err.to_string(), "notification failed: channel_not_found");

        let log = entries(&h.log);
        assert_eq!(log.iter().filter(|l| l.starts_with("failure")).count(), 1);
        assert!(!log.iter().any(|l| l.starts_with("release")));
    }

    #[tokio::test]
    async fn test_success_notification_error_propagates() {
        let h = harness(false, true);

        let err = h
            .orchestrator
            .run(&plan(Some("kubeconfig"), None))
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Core(Error::Notification(_))));
        assert!(!entries(&h.log).iter().any(|l| l.starts_with("release")));
    }

    #[tokio::test]
    async fn test_no_credentials_skips_deployment() {
        let h = harness(false, false);

        let report = h.orchestrator.run(&plan(None, Some("2.0.0"))).await.unwrap();

        assert_eq!(
            report.deployment,
            StageState::Skipped {
                reason: NO_KUBERNETES.to_string()
            }
        );
        assert!(!report.notification.is_success());
        assert_eq!(entries(&h.log), vec!["release shop 2.0.0 staging"]);
    }

    #[tokio::test]
    async fn test_required_inputs_only_is_a_no_op() {
        let report = Orchestrator::new().run(&plan(None, None)).await.unwrap();

        assert!(matches!(report.deployment, StageState::Skipped { .. }));
        assert!(matches!(report.notification, StageState::Skipped { .. }));
        assert_eq!(
            report.release,
            StageState::Skipped {
                reason: NO_SENTRY.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_deployer_without_notifier() {
        let log: Log = Arc::default();
        let orchestrator = Orchestrator::new().with_deployer(Arc::new(MockDeployer {
            log: log.clone(),
            fail: false,
        }));

        let report = orchestrator
            .run(&plan(Some("kubeconfig"), None))
            .await
            .unwrap();

        assert!(report.deployment.is_success());
        assert!(matches!(report.notification, StageState::Skipped { .. }));
        assert_eq!(entries(&log), vec!["deploy shop with kubeconfig"]);
    }
}
