use crate::models::{
    DeletionTarget, EligibilityDecision, PullRequestRecord, PullRequestState, SkipReason,
};

/// Decide whether the head branch of a closed pull request should be deleted.
///
/// Rules are checked in order and the first match wins. When `restrict_to_self`
/// is set, branches whose head repository is owned by `self_login` are kept.
/// The default branch of the head repository is never eligible.
pub fn evaluate(
    pr: &PullRequestRecord,
    self_login: &str,
    restrict_to_self: bool,
) -> EligibilityDecision {
    use EligibilityDecision::Ineligible;

    if pr.state != Some(PullRequestState::Closed) {
        return Ineligible(SkipReason::NotClosed);
    }

    let Some(head_repo) = &pr.head_repository else {
        return Ineligible(SkipReason::HeadRepositoryMissing);
    };

    let Some(owner) = &head_repo.owner else {
        return Ineligible(SkipReason::HeadOwnerMissing);
    };

    if restrict_to_self && owner == self_login {
        return Ineligible(SkipReason::OwnedBySelf);
    }

    match &head_repo.default_branch {
        Some(default_branch) if *default_branch == pr.head_branch => {
            Ineligible(SkipReason::DefaultBranch)
        }
        Some(_) => EligibilityDecision::Eligible(DeletionTarget {
            owner: owner.clone(),
            repo: head_repo.name.clone(),
            branch: pr.head_branch.clone(),
        }),
        None => Ineligible(SkipReason::DefaultBranchUnknown),
    }
}
