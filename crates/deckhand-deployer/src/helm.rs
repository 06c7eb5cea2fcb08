//! Helm deployer implementation.

use async_trait::async_trait;
use deckhand_core::command::{CommandFailure, CommandRunner, CommandSpec};
use deckhand_core::deployer::*;
use deckhand_core::{Error, Result};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::Toolchain;

/// File the cluster credentials are written to, inside the work dir.
pub const KUBECONFIG_FILE: &str = "kubeconfig.yaml";

/// File the inline values are rendered to, inside the work dir.
pub const VALUES_FILE: &str = "loaded-values.yaml";

/// Helm-based deployer.
pub struct HelmDeployer {
    runner: Arc<dyn CommandRunner>,
    toolchain: Toolchain,
    /// Directory for the credential and values files
    work_dir: PathBuf,
}

impl HelmDeployer {
    pub fn new(runner: Arc<dyn CommandRunner>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            toolchain: Toolchain::default(),
            work_dir: work_dir.into(),
        }
    }

    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    pub fn kubeconfig_path(&self) -> PathBuf {
        self.work_dir.join(KUBECONFIG_FILE)
    }

    pub fn values_path(&self) -> PathBuf {
        self.work_dir.join(VALUES_FILE)
    }

    /// Build the `helm upgrade --install` command.
    pub fn upgrade_command(
        &self,
        spec: &ReleaseSpec,
        value_files: &[String],
        kubeconfig: &Path,
    ) -> CommandSpec {
        let mut cmd = self
            .helm(kubeconfig)
            .args(["upgrade", "--install", "--wait"])
            .option("--namespace", &spec.namespace);

        for file in value_files {
            cmd = cmd.option("-f", file);
        }

        if let Some(version) = &spec.chart_version {
            cmd = cmd.option("--version", version);
        }

        cmd.arg(&spec.release).arg(&spec.chart)
    }

    /// Build the `helm repo add` command.
    pub fn repo_add_command(
        &self,
        repository: &ChartRepository,
        kubeconfig: &Path,
    ) -> Option<CommandSpec> {
        let (name, url) = repository.location()?;
        let mut cmd = self.helm(kubeconfig).args(["repo", "add"]);
        if let Some((username, password)) = repository.login() {
            cmd = cmd
                .option("--username", username)
                .secret_option("--password", password);
        }
        Some(cmd.arg(name).arg(url))
    }

    fn helm(&self, kubeconfig: &Path) -> CommandSpec {
        CommandSpec::new(&self.toolchain.helm).env("KUBECONFIG", kubeconfig.display().to_string())
    }

    async fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| write_error(path, source))?;
        }
        tokio::fs::write(path, contents)
            .await
            .map_err(|source| write_error(path, source))
    }

    async fn write_kubeconfig(&self, credentials: &str) -> Result<PathBuf> {
        let path = self.kubeconfig_path();
        self.write_file(&path, credentials).await?;
        info!(path = %path.display(), "Created kubernetes config");
        Ok(path)
    }

    async fn write_values(&self, values: &Map<String, Value>) -> Result<PathBuf> {
        let path = self.values_path();
        let rendered = serde_json::to_string(values)
            .map_err(|e| write_error(&path, std::io::Error::other(e)))?;
        self.write_file(&path, &rendered).await?;
        info!(path = %path.display(), "Created values file from provided values");
        Ok(path)
    }

    /// Log releases and resources in the namespace. Failures only warn.
    async fn log_namespace(&self, namespace: &str, kubeconfig: &Path) {
        let commands = [
            self.helm(kubeconfig).args(["ls", "-n", namespace]),
            CommandSpec::new(&self.toolchain.kubectl)
                .env("KUBECONFIG", kubeconfig.display().to_string())
                .args(["get", "all", "-n", namespace]),
        ];

        for cmd in &commands {
            info!(command = %cmd, "Configured namespace information");
            match self.runner.run(cmd).await {
                Ok(output) => info!("{}", output.stdout),
                Err(e) => warn!(error = %e, stderr = %e.stderr, "Unable to read namespace state"),
            }
        }
    }

    async fn add_repository(&self, repository: &ChartRepository, kubeconfig: &Path) -> Result<()> {
        let (Some(add), Some((name, url))) = (
            self.repo_add_command(repository, kubeconfig),
            repository.location(),
        ) else {
            info!("No repo was provided. Skipping repo addition");
            return Ok(());
        };

        info!(command = %add, "Add helm repository");
        let output = self.runner.run(&add).await.map_err(|failure| {
            deploy_error(
                DeployStage::RepositoryAdd,
                format!("Unable to add repository {} with url {}", name, url),
                failure,
            )
        })?;
        info!("{}", output.stdout);

        let update = self.helm(kubeconfig).args(["repo", "update"]);
        info!(command = %update, "Update helm repositories");
        let output = self.runner.run(&update).await.map_err(|failure| {
            deploy_error(
                DeployStage::RepositoryUpdate,
                "Unable to update repositories".to_string(),
                failure,
            )
        })?;
        info!("{}", output.stdout);

        Ok(())
    }
}

fn write_error(path: &Path, source: std::io::Error) -> Error {
    Error::Write {
        path: path.display().to_string(),
        source,
    }
}

fn deploy_error(stage: DeployStage, message: String, failure: CommandFailure) -> Error {
    Error::Deploy {
        stage,
        message,
        failure,
    }
}

#[async_trait]
impl Deployer for HelmDeployer {
    fn name(&self) -> &'static str {
        "helm"
    }

    async fn deploy(
        &self,
        credentials: &str,
        spec: &ReleaseSpec,
        repository: &ChartRepository,
    ) -> Result<()> {
        let kubeconfig = self.write_kubeconfig(credentials).await?;

        self.log_namespace(&spec.namespace, &kubeconfig).await;

        let values_path = self.write_values(&spec.values).await?;
        let mut value_files = spec.value_files.clone();
        value_files.push(values_path.display().to_string());

        self.add_repository(repository, &kubeconfig).await?;

        let upgrade = self.upgrade_command(spec, &value_files, &kubeconfig);
        info!(
            chart = %spec.chart,
            release = %spec.release,
            command = %upgrade,
            "Deploying chart"
        );
        let output = self.runner.run(&upgrade).await.map_err(|failure| {
            deploy_error(
                DeployStage::Install,
                format!(
                    "Unable to deploy {} chart with release {}",
                    spec.chart, spec.release
                ),
                failure,
            )
        })?;
        info!("{}", output.stdout);

        Ok(())
    }
}
