//! deckhand: GitHub Actions deploy step.
//!
//! Deploys a Helm chart, registers the release with Sentry and announces the
//! result on Slack. Every input can be given as a flag or through the
//! `INPUT_<NAME>` variable the Actions runner sets.

use clap::Parser;
use deckhand_core::GitContext;
use deckhand_deployer::Toolchain;
use deckhand_runner::ActionInputs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod actions;
mod deploy;

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(about = "Deploy a Helm chart and announce it", long_about = None)]
struct Cli {
    /// Deployment configuration (JSON or YAML)
    #[arg(long, env = "INPUT_CONFIG", default_value = "", hide_env_values = true)]
    config: String,

    /// Target environment (e.g. staging, production)
    #[arg(long, env = "INPUT_ENVIRONMENT", default_value = "")]
    environment: String,

    /// Kubeconfig contents
    #[arg(long, env = "INPUT_KUBERNETES", hide_env_values = true)]
    kubernetes: Option<String>,

    /// Chart repository configuration (JSON or YAML)
    #[arg(long, env = "INPUT_HELM", hide_env_values = true)]
    helm: Option<String>,

    /// Sentry configuration (JSON or YAML)
    #[arg(long, env = "INPUT_SENTRY", hide_env_values = true)]
    sentry: Option<String>,

    /// Slack configuration (JSON or YAML)
    #[arg(long, env = "INPUT_SLACK", hide_env_values = true)]
    slack: Option<String>,

    /// GitHub token
    #[arg(long, env = "INPUT_TOKEN", default_value = "", hide_env_values = true)]
    token: String,

    /// Release version reported to Sentry
    #[arg(long, env = "INPUT_VERSION")]
    version: Option<String>,

    /// Directory for the kubeconfig and rendered values files
    #[arg(long, env = "DECKHAND_WORK_DIR", default_value = ".")]
    work_dir: PathBuf,

    /// Kill external commands after this many seconds
    #[arg(long, env = "DECKHAND_COMMAND_TIMEOUT")]
    command_timeout: Option<u64>,

    /// Slack Web API base URL
    #[arg(long, env = "SLACK_API_URL", default_value = deckhand_notify::slack::DEFAULT_API_URL)]
    slack_api_url: String,

    /// helm binary
    #[arg(long, env = "HELM_BIN", default_value = "helm")]
    helm_bin: String,

    /// kubectl binary
    #[arg(long, env = "KUBECTL_BIN", default_value = "kubectl")]
    kubectl_bin: String,

    /// sentry-cli binary
    #[arg(long, env = "SENTRY_CLI_BIN", default_value = "sentry-cli")]
    sentry_cli_bin: String,
}

impl Cli {
    fn into_parts(self) -> (ActionInputs, deploy::Settings) {
        let inputs = ActionInputs {
            config: self.config,
            environment: self.environment,
            kubernetes: self.kubernetes,
            helm: self.helm,
            sentry: self.sentry,
            slack: self.slack,
            token: self.token,
            version: self.version,
        };
        let settings = deploy::Settings {
            work_dir: self.work_dir,
            command_timeout: self.command_timeout.map(Duration::from_secs),
            toolchain: Toolchain {
                helm: self.helm_bin,
                kubectl: self.kubectl_bin,
                sentry_cli: self.sentry_cli_bin,
            },
            slack_api_url: self.slack_api_url,
        };
        (inputs, settings)
    }
}

/// `RUST_LOG` wins; otherwise `debug` when the runner has step debugging on.
fn init_tracing() {
    let default_level = match std::env::var("RUNNER_DEBUG").as_deref() {
        Ok("1") => "debug",
        _ => "info",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let (inputs, settings) = cli.into_parts();
    match deploy::run(inputs, settings, GitContext::from_env()).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            actions::error(&e.to_string());
            ExitCode::FAILURE
        }
    }
}
