use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use branchbot::{Config, GitHubClient, HostClient, Overrides, Reconciler, Scheduler, Settings};

#[derive(Parser)]
#[command(name = "branchbot", version)]
#[command(about = "Automatically delete branches on your GitHub repos when PRs are merged")]
struct Cli {
    /// GitHub API token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Check interval in seconds, at most one day [default: 30]
    #[arg(long)]
    interval: Option<u64>,

    /// GitHub repos (e.g. dantoml/branchbot,cocoapods/cocoapods)
    #[arg(long, env = "GITHUB_REPOS", value_delimiter = ',')]
    repos: Vec<String>,

    /// Keep branches owned by the authenticated user [default: true]
    #[arg(long, action = ArgAction::Set)]
    self_only: Option<bool>,

    /// Closed pull requests inspected per repository on each check [default: 30]
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=100))]
    per_page: Option<u8>,

    /// Log what would be deleted without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Run a single check and exit
    #[arg(long)]
    once: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Path to YAML config file
    #[arg(long, default_value = "branchbot.yml")]
    config: PathBuf,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            token: self.token.clone(),
            interval: self.interval,
            repos: self.repos.clone(),
            self_only: self.self_only,
            per_page: self.per_page,
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(format!("branchbot={}", level).parse()?),
        )
        .init();

    info!("Starting branchbot");

    let config = Config::load(&cli.config)?;
    let settings = Settings::resolve(config, cli.overrides())?;

    let client = GitHubClient::new(&settings.token)?;
    let identity = match client.resolve_identity().await {
        Ok(identity) => identity,
        Err(err) => {
            error!(error = %err, "Failed to authenticate with GitHub");
            return Err(err).context("Failed to validate GitHub token");
        }
    };

    let reconciler = Reconciler::new(client, identity, settings.options);
    let scheduler = Scheduler::new(reconciler, settings.repos, settings.interval);
    let shutdown = CancellationToken::new();

    if cli.once {
        scheduler.run_pass(&shutdown).await;
        return Ok(());
    }

    let signals = shutdown.clone();
    tokio::spawn(async move {
        match wait_for_signal().await {
            Ok(name) => info!(signal = name, "Received signal, exiting"),
            Err(err) => {
                error!(error = %err, "Failed to listen for shutdown signals");
                return;
            }
        }
        signals.cancel();
    });

    scheduler.run(shutdown).await;

    Ok(())
}

#[cfg(unix)]
async fn wait_for_signal() -> Result<&'static str> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    let name = tokio::select! {
        _ = sigint.recv() => "SIGINT",
        _ = sigterm.recv() => "SIGTERM",
    };

    Ok(name)
}

#[cfg(not(unix))]
async fn wait_for_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("Ctrl-C")
}
