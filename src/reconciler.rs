use std::collections::HashSet;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::deletion::{delete_branch, DeletionOutcome};
use crate::eligibility::evaluate;
use crate::github::{HostClient, HostError};
use crate::models::{DeletionTarget, EligibilityDecision, Identity, ReconcileReport, RepoId};

/// Page of closed pull requests inspected on every pass
pub const FIRST_PAGE: u32 = 1;

/// Default number of closed pull requests inspected per pass
pub const DEFAULT_PER_PAGE: u8 = 30;

/// Why reconciling a repository stopped early
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("failed to list closed pull requests for {repo}: {source}")]
    ListPullRequests {
        repo: RepoId,
        #[source]
        source: HostError,
    },

    #[error("failed to delete branch {branch} in {owner}/{repo}: {source}")]
    DeleteBranch {
        owner: String,
        repo: String,
        branch: String,
        #[source]
        source: HostError,
    },
}

impl ReconcileError {
    pub fn host_error(&self) -> &HostError {
        match self {
            ReconcileError::ListPullRequests { source, .. } => source,
            ReconcileError::DeleteBranch { source, .. } => source,
        }
    }
}

/// Knobs for a reconciliation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Keep branches whose head repository belongs to the authenticated user
    pub self_only: bool,
    pub per_page: u8,
    /// Evaluate and log, but never delete
    pub dry_run: bool,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            self_only: true,
            per_page: DEFAULT_PER_PAGE,
            dry_run: false,
        }
    }
}

/// Deletes head branches of recently closed pull requests in one repository
pub struct Reconciler<H: HostClient> {
    host: H,
    identity: Identity,
    options: ReconcileOptions,
}

impl<H: HostClient> Reconciler<H> {
    pub fn new(host: H, identity: Identity, options: ReconcileOptions) -> Self {
        Self {
            host,
            identity,
            options,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Run one pass over the most recently updated closed pull requests of `repo`.
    ///
    /// Returns on the first listing error or hard deletion failure; the
    /// remaining pull requests are left for the next pass.
    #[instrument(skip(self, repo), fields(repo = %repo))]
    pub async fn reconcile(&self, repo: &RepoId) -> Result<ReconcileReport, ReconcileError> {
        let pulls = self
            .host
            .list_closed_pull_requests(&repo.owner, &repo.name, FIRST_PAGE, self.options.per_page)
            .await
            .map_err(|source| ReconcileError::ListPullRequests {
                repo: repo.clone(),
                source,
            })?;

        let mut report = ReconcileReport::default();
        let mut attempted: HashSet<DeletionTarget> = HashSet::new();

        for pr in &pulls {
            report.inspected += 1;

            let target = match evaluate(pr, &self.identity.login, self.options.self_only) {
                EligibilityDecision::Eligible(target) => target,
                EligibilityDecision::Ineligible(reason) => {
                    debug!(pr = pr.number, branch = %pr.head_branch, %reason, "Skipping branch");
                    report.skipped += 1;
                    continue;
                }
            };

            let DeletionTarget {
                owner,
                repo: head_repo,
                branch,
            } = &target;

            if attempted.contains(&target) {
                debug!(pr = pr.number, %branch, %owner, "Branch already handled in this pass");
                report.skipped += 1;
                continue;
            }

            if self.options.dry_run {
                info!(pr = pr.number, %branch, %owner, repo = %head_repo, "Would delete branch");
                report.would_delete += 1;
                attempted.insert(target);
                continue;
            }

            match delete_branch(&self.host, owner, head_repo, branch).await {
                DeletionOutcome::Deleted => {
                    info!(pr = pr.number, %branch, %owner, repo = %head_repo, "Branch has been deleted");
                    report.deleted += 1;
                }
                DeletionOutcome::AlreadyAbsent => {
                    info!(pr = pr.number, %branch, %owner, repo = %head_repo, "Branch already deleted");
                    report.already_absent += 1;
                }
                DeletionOutcome::Failed(source) => {
                    return Err(ReconcileError::DeleteBranch {
                        owner: target.owner,
                        repo: target.repo,
                        branch: target.branch,
                        source,
                    });
                }
            }
            attempted.insert(target);
        }

        debug!(
            inspected = report.inspected,
            deleted = report.deleted,
            already_absent = report.already_absent,
            skipped = report.skipped,
            "Repository reconciled"
        );

        Ok(report)
    }
}
