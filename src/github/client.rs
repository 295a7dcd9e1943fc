use anyhow::{Context, Result};
use async_trait::async_trait;
use octocrab::models::pulls::PullRequest;
use octocrab::models::IssueState;
use octocrab::{params, Octocrab};
use tracing::{debug, info};

use super::{HostClient, HostError};
use crate::models::{HeadRepository, Identity, PullRequestRecord, PullRequestState};

/// GitHub API client backed by octocrab
pub struct GitHubClient {
    client: Octocrab,
}

impl GitHubClient {
    /// Create a new GitHub client with the given token
    pub fn new(token: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Self { client })
    }

    /// Create a client talking to a different API root (GitHub Enterprise, tests)
    pub fn with_base_uri(token: &str, base_uri: &str) -> Result<Self> {
        let client = Octocrab::builder()
            .base_uri(base_uri)
            .with_context(|| format!("Invalid GitHub API base URI: {}", base_uri))?
            .personal_token(token.to_string())
            .build()
            .context("Failed to create GitHub client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HostClient for GitHubClient {
    async fn resolve_identity(&self) -> Result<Identity, HostError> {
        let user = self.client.current().user().await.map_err(map_error)?;

        info!(username = %user.login, "Authenticated");

        Ok(Identity::new(user.login))
    }

    async fn list_closed_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u8,
    ) -> Result<Vec<PullRequestRecord>, HostError> {
        let pulls = self
            .client
            .pulls(owner, repo)
            .list()
            .state(params::State::Closed)
            .sort(params::pulls::Sort::Updated)
            .direction(params::Direction::Descending)
            .page(page)
            .per_page(per_page)
            .send()
            .await
            .map_err(map_error)?;

        debug!(owner, repo, count = pulls.items.len(), "Fetched recent pull requests");

        Ok(pulls.items.into_iter().map(to_record).collect())
    }

    async fn delete_ref(&self, owner: &str, repo: &str, ref_path: &str) -> Result<(), HostError> {
        let route = format!("/repos/{}/{}/git/refs/{}", owner, repo, ref_path);

        debug!(route = %route, "Deleting reference");

        let response = self
            .client
            ._delete(route, None::<&()>)
            .await
            .map_err(map_error)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Classify by status even when the body is not GitHub's JSON error shape
        let message = match octocrab::map_github_error(response).await {
            Err(octocrab::Error::GitHub { source, .. }) => source.message.clone(),
            _ => status.canonical_reason().unwrap_or("unknown error").to_string(),
        };

        Err(HostError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

fn map_error(err: octocrab::Error) -> HostError {
    match err {
        octocrab::Error::GitHub { source, .. } => HostError::Api {
            status: source.status_code.as_u16(),
            message: source.message.clone(),
        },
        other => HostError::Transport(other),
    }
}

fn to_record(pr: PullRequest) -> PullRequestRecord {
    let state = match pr.state {
        Some(IssueState::Closed) => Some(PullRequestState::Closed),
        Some(_) => Some(PullRequestState::Open),
        None => None,
    };

    let head = *pr.head;
    let head_repository = head.repo.map(|repo| HeadRepository {
        name: repo.name,
        owner: repo.owner.map(|owner| owner.login),
        default_branch: repo.default_branch,
    });

    PullRequestRecord {
        number: pr.number,
        state,
        head_branch: head.ref_field,
        head_repository,
    }
}
