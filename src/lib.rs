pub mod config;
pub mod deletion;
pub mod eligibility;
pub mod github;
pub mod models;
pub mod reconciler;
pub mod scheduler;

#[cfg(test)]
mod testing;

pub use config::{Config, Overrides, Settings};
pub use deletion::{delete_branch, ref_path, DeletionOutcome};
pub use eligibility::evaluate;
pub use github::{GitHubClient, HostClient, HostError};
pub use models::*;
pub use reconciler::{ReconcileError, ReconcileOptions, Reconciler};
pub use scheduler::{LifecycleState, Scheduler};
