use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::github::HostClient;
use crate::models::{Identity, PassSummary, RepoId};
use crate::reconciler::Reconciler;

/// Default delay between two passes
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Longest delay between two passes
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Running,
    Stopped,
}

/// Reconciles every configured repository on a fixed interval until cancelled
pub struct Scheduler<H: HostClient> {
    reconciler: Reconciler<H>,
    repos: Vec<RepoId>,
    interval: Duration,
    stopped: AtomicBool,
}

impl<H: HostClient> Scheduler<H> {
    /// The reconciler carries the identity resolved at startup; build the
    /// scheduler only after that resolution succeeded.
    ///
    /// `interval` is capped at `MAX_INTERVAL`.
    pub fn new(reconciler: Reconciler<H>, repos: Vec<RepoId>, interval: Duration) -> Self {
        Self {
            reconciler,
            repos,
            interval: interval.min(MAX_INTERVAL),
            stopped: AtomicBool::new(false),
        }
    }

    /// Login the scheduler reconciles on behalf of
    pub fn identity(&self) -> &Identity {
        self.reconciler.identity()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Running from construction until `run` returns
    pub fn state(&self) -> LifecycleState {
        if self.stopped.load(Ordering::SeqCst) {
            LifecycleState::Stopped
        } else {
            LifecycleState::Running
        }
    }

    pub fn repos(&self) -> &[RepoId] {
        &self.repos
    }

    /// Tick until `shutdown` is cancelled.
    ///
    /// The first pass runs one interval after start. Cancellation is observed
    /// between ticks and between repositories; a repository already being
    /// reconciled is allowed to finish.
    pub async fn run(&self, shutdown: CancellationToken) -> LifecycleState {
        debug!(interval = ?self.interval, "Starting ticker");

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    self.run_pass(&shutdown).await;
                }
            }
        }

        drop(ticker);
        self.stopped.store(true, Ordering::SeqCst);
        info!("Scheduler stopped");

        LifecycleState::Stopped
    }

    /// Reconcile every repository once, sequentially.
    ///
    /// A failing repository is logged and does not affect the others.
    pub async fn run_pass(&self, shutdown: &CancellationToken) -> PassSummary {
        let mut summary = PassSummary::default();

        for repo in &self.repos {
            if shutdown.is_cancelled() {
                debug!("Shutdown requested, ending pass early");
                break;
            }

            info!(repo = %repo, "Starting");

            match self.reconciler.reconcile(repo).await {
                Ok(report) => {
                    summary.reconciled += 1;
                    summary.deleted += report.deleted;
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(repo = %repo, error = %err, "Reconciliation failed");
                }
            }
        }

        info!(
            reconciled = summary.reconciled,
            failed = summary.failed,
            deleted = summary.deleted,
            "Pass complete"
        );

        summary
    }
}
