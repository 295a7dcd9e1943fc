pub mod client;

pub use client::GitHubClient;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Identity, PullRequestRecord};

/// Status GitHub answers with when deleting a reference that does not exist
pub const UNPROCESSABLE_ENTITY: u16 = 422;

/// Errors surfaced by a repository host
#[derive(Debug, Error)]
pub enum HostError {
    /// The host answered with an error status
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The request never produced an API response
    #[error(transparent)]
    Transport(#[from] octocrab::Error),
}

impl HostError {
    pub fn status(&self) -> Option<u16> {
        match self {
            HostError::Api { status, .. } => Some(*status),
            HostError::Transport(_) => None,
        }
    }

    /// True when the host reported the reference as unprocessable, i.e. already gone
    pub fn is_unprocessable(&self) -> bool {
        self.status() == Some(UNPROCESSABLE_ENTITY)
    }
}

/// Calls the reconciler needs from a repository host
#[async_trait]
pub trait HostClient: Send + Sync {
    /// Validate the credential and return who it authenticates as
    async fn resolve_identity(&self) -> Result<Identity, HostError>;

    /// One page of closed pull requests, most recently updated first
    async fn list_closed_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<PullRequestRecord>, HostError>;

    /// Delete a reference given as an already encoded `heads/<name>` path
    async fn delete_ref(&self, owner: &str, repo: &str, ref_path: &str) -> Result<(), HostError>;
}
