use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// A watched repository, written as `owner/name`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl FromStr for RepoId {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split('/').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            anyhow::bail!("Invalid repo format. Expected 'owner/repo', got: {}", s);
        }
        Ok(Self::new(parts[0], parts[1]))
    }
}

impl TryFrom<String> for RepoId {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<RepoId> for String {
    fn from(repo: RepoId) -> Self {
        repo.to_string()
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Login the API credential authenticates as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub login: String,
}

impl Identity {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}

/// State of a pull request as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullRequestState {
    Open,
    Closed,
}

/// Repository a pull request's head branch lives in (possibly a fork)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadRepository {
    pub name: String,
    pub owner: Option<String>,
    pub default_branch: Option<String>,
}

/// A pull request from a closed-pull-requests listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRecord {
    pub number: u64,
    pub state: Option<PullRequestState>,
    pub head_branch: String,
    /// `None` when the source fork has been deleted
    pub head_repository: Option<HeadRepository>,
}

/// Why a pull request's head branch is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotClosed,
    HeadRepositoryMissing,
    HeadOwnerMissing,
    OwnedBySelf,
    DefaultBranch,
    DefaultBranchUnknown,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::NotClosed => "pull request is not closed",
            SkipReason::HeadRepositoryMissing => "head repository no longer exists",
            SkipReason::HeadOwnerMissing => "head repository has no owner",
            SkipReason::OwnedBySelf => "branch is owned by the authenticated user",
            SkipReason::DefaultBranch => "branch is the default branch",
            SkipReason::DefaultBranchUnknown => "default branch of head repository is unknown",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Branch to delete, in the repository that owns it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeletionTarget {
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

/// Whether a pull request's head branch should be deleted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityDecision {
    Eligible(DeletionTarget),
    Ineligible(SkipReason),
}

impl EligibilityDecision {
    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityDecision::Eligible(_))
    }

    pub fn reason(&self) -> Option<SkipReason> {
        match self {
            EligibilityDecision::Eligible(_) => None,
            EligibilityDecision::Ineligible(reason) => Some(*reason),
        }
    }
}

/// Counters for one reconciliation of one repository
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub inspected: usize,
    pub deleted: usize,
    pub already_absent: usize,
    pub skipped: usize,
    pub would_delete: usize,
}

/// Counters for one scheduler tick across all repositories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub reconciled: usize,
    pub failed: usize,
    pub deleted: usize,
}
