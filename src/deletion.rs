use tracing::debug;

use crate::github::{HostClient, HostError};

/// Result of one branch deletion attempt
#[derive(Debug)]
pub enum DeletionOutcome {
    Deleted,
    /// The host no longer has the reference; the branch is gone either way
    AlreadyAbsent,
    Failed(HostError),
}

impl DeletionOutcome {
    pub fn from_result(result: Result<(), HostError>) -> Self {
        match result {
            Ok(()) => DeletionOutcome::Deleted,
            Err(err) if err.is_unprocessable() => DeletionOutcome::AlreadyAbsent,
            Err(err) => DeletionOutcome::Failed(err),
        }
    }
}

/// Reference path for a branch, with `#` escaped so it is not read as a URL fragment
pub fn ref_path(branch: &str) -> String {
    format!("heads/{}", branch).replace('#', "%23")
}

/// Delete `branch` in `owner/repo` and classify what happened
pub async fn delete_branch<H>(host: &H, owner: &str, repo: &str, branch: &str) -> DeletionOutcome
where
    H: HostClient + ?Sized,
{
    let ref_path = ref_path(branch);
    debug!(owner, repo, branch, ref_path = %ref_path, "Deleting branch");

    DeletionOutcome::from_result(host.delete_ref(owner, repo, &ref_path).await)
}
