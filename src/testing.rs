//! In-memory `HostClient` used by unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::github::{HostClient, HostError, UNPROCESSABLE_ENTITY};
use crate::models::{HeadRepository, Identity, PullRequestRecord, PullRequestState};

#[derive(Default)]
struct State {
    pulls: HashMap<String, Vec<PullRequestRecord>>,
    list_failures: HashMap<String, u16>,
    delete_failures: HashMap<String, u16>,
    /// `owner/repo:ref_path` keys whose reference no longer exists
    absent: HashSet<String>,
    list_calls: Vec<String>,
    delete_calls: Vec<String>,
}

/// Fake host. Every reference exists until it is deleted once.
#[derive(Clone)]
pub struct MockHost {
    login: String,
    state: Arc<Mutex<State>>,
}

impl MockHost {
    pub fn new(login: &str) -> Self {
        Self {
            login: login.to_string(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    pub fn with_pulls(self, repo: &str, pulls: Vec<PullRequestRecord>) -> Self {
        self.state.lock().unwrap().pulls.insert(repo.to_string(), pulls);
        self
    }

    pub fn fail_list(&self, repo: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .list_failures
            .insert(repo.to_string(), status);
    }

    pub fn fail_delete(&self, key: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .delete_failures
            .insert(key.to_string(), status);
    }

    pub fn mark_absent(&self, key: &str) {
        self.state.lock().unwrap().absent.insert(key.to_string());
    }

    pub fn list_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().list_calls.clone()
    }

    /// Delete attempts as `owner/repo:ref_path`, in call order
    pub fn delete_calls(&self) -> Vec<String> {
        self.state.lock().unwrap().delete_calls.clone()
    }
}

#[async_trait]
impl HostClient for MockHost {
    async fn resolve_identity(&self) -> Result<Identity, HostError> {
        Ok(Identity::new(self.login.clone()))
    }

    async fn list_closed_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        _page: u32,
        per_page: u8,
    ) -> Result<Vec<PullRequestRecord>, HostError> {
        let key = format!("{}/{}", owner, repo);
        let mut state = self.state.lock().unwrap();
        state.list_calls.push(key.clone());

        if let Some(status) = state.list_failures.get(&key) {
            return Err(HostError::Api {
                status: *status,
                message: "list failed".to_string(),
            });
        }

        Ok(state
            .pulls
            .get(&key)
            .map(|pulls| pulls.iter().take(per_page as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_ref(&self, owner: &str, repo: &str, ref_path: &str) -> Result<(), HostError> {
        let key = format!("{}/{}:{}", owner, repo, ref_path);
        let mut state = self.state.lock().unwrap();
        state.delete_calls.push(key.clone());

        if let Some(status) = state.delete_failures.get(&key) {
            return Err(HostError::Api {
                status: *status,
                message: "delete failed".to_string(),
            });
        }

        if !state.absent.insert(key) {
            return Err(HostError::Api {
                status: UNPROCESSABLE_ENTITY,
                message: "Reference does not exist".to_string(),
            });
        }

        Ok(())
    }
}

/// A closed pull request whose head lives in `owner/name` with default branch `default_branch`
pub fn closed_pull(
    number: u64,
    branch: &str,
    owner: &str,
    name: &str,
    default_branch: &str,
) -> PullRequestRecord {
    PullRequestRecord {
        number,
        state: Some(PullRequestState::Closed),
        head_branch: branch.to_string(),
        head_repository: Some(HeadRepository {
            name: name.to_string(),
            owner: Some(owner.to_string()),
            default_branch: Some(default_branch.to_string()),
        }),
    }
}
