//! Eligibility evaluation - may this pull request be merged right now?
//!
//! Gates run in a fixed order and stop at the first failure. Every rejection
//! is terminal for the current attempt; only the merge call itself is retried.

use crate::config::MergePolicy;
use crate::error::Result;
use crate::merge::reviews::{ReviewSummary, is_author_allowed, relevant_reviews_for_commit};
use crate::platform::PlatformService;
use crate::types::{
    AuthorAssociation, CheckRun, MergeableState, PrState, PullRequestSnapshot, RepoContext,
};
use tracing::{info, warn};

/// Why a pull request may not be merged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// PR was merged already
    AlreadyMerged,
    /// PR was closed without merging
    Closed,
    /// PR author's association is not in the allowlist
    AuthorNotAllowed {
        /// The author's association, if reported
        association: Option<AuthorAssociation>,
        /// Associations the policy allows
        allowed: Vec<AuthorAssociation>,
    },
    /// Required status checks have no successful run on the head commit
    RequiredChecksNotPassed {
        /// Required check names without a successful run
        missing: Vec<String>,
    },
    /// Labels matching the do-not-merge policy are applied
    DoNotMergeLabels(Vec<String>),
    /// Reviewers' latest verdict on the head commit requests changes
    ChangesRequested(Vec<String>),
    /// Fewer approvals than the policy requires
    NotEnoughApprovals {
        /// Approvals on the head commit
        approvals: usize,
        /// Approvals required
        required: u32,
    },
    /// PR is a draft
    Draft,
    /// PR has merge conflicts
    Dirty,
    /// Merging is blocked by branch protection
    Blocked,
    /// Mergeable state missing or not recognized
    UnknownMergeableState(Option<String>),
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyMerged => write!(f, "is already merged"),
            Self::Closed => write!(f, "is closed"),
            Self::AuthorNotAllowed {
                association,
                allowed,
            } => {
                let association = association
                    .as_ref()
                    .map_or("unknown", AuthorAssociation::as_str);
                let allowed: Vec<&str> = allowed.iter().map(AuthorAssociation::as_str).collect();
                write!(
                    f,
                    "has an author who is {association} but must be one of the following: {}",
                    allowed.join(", ")
                )
            }
            Self::RequiredChecksNotPassed { missing } => write!(
                f,
                "has required status checks that are not successful: {}",
                missing.join(", ")
            ),
            Self::DoNotMergeLabels(labels) => write!(
                f,
                "is not mergeable because the following labels are applied: {}",
                labels.join(", ")
            ),
            Self::ChangesRequested(reviewers) => write!(
                f,
                "has changes requested by: {}",
                reviewers.join(", ")
            ),
            Self::NotEnoughApprovals {
                approvals,
                required,
            } => write!(f, "has {approvals} of {required} required approvals"),
            Self::Draft => write!(f, "is not mergeable because it is a draft"),
            Self::Dirty => write!(f, "is not mergeable because it is dirty"),
            Self::Blocked => write!(f, "is blocked from merging"),
            Self::UnknownMergeableState(state) => write!(
                f,
                "has unknown mergeable state '{}'",
                state.as_deref().unwrap_or("none")
            ),
        }
    }
}

/// Outcome of an eligibility evaluation
#[derive(Debug, Clone)]
pub enum Eligibility {
    /// All gates passed; carries the snapshot the decision was made on
    Mergeable(PullRequestSnapshot),
    /// A gate failed
    Rejected(Rejection),
}

/// Gates 1-3: merged, closed, author association (PURE)
pub fn check_snapshot(snapshot: &PullRequestSnapshot, policy: &MergePolicy) -> Option<Rejection> {
    if snapshot.merged {
        return Some(Rejection::AlreadyMerged);
    }

    if snapshot.state == PrState::Closed {
        return Some(Rejection::Closed);
    }

    let allowed = &policy.pull_request_author_associations;
    if !allowed.is_empty()
        && !is_author_allowed(
            snapshot.author.as_deref(),
            snapshot.author_association.as_ref(),
            allowed,
        )
    {
        return Some(Rejection::AuthorNotAllowed {
            association: snapshot.author_association.clone(),
            allowed: allowed.clone(),
        });
    }

    None
}

/// Required checks without a successful run, in the order they were required (PURE)
pub fn missing_required_checks(required: &[String], runs: &[CheckRun]) -> Vec<String> {
    required
        .iter()
        .filter(|name| !runs.iter().any(|run| &run.name == *name && run.is_success()))
        .cloned()
        .collect()
}

/// Applied labels that block merging under `policy` (PURE)
pub fn blocking_labels(snapshot: &PullRequestSnapshot, policy: &MergePolicy) -> Vec<String> {
    snapshot
        .labels
        .iter()
        .filter(|label| policy.is_do_not_merge_label(label))
        .cloned()
        .collect()
}

/// Gate 6: map the platform's mergeable state to a decision (PURE)
pub fn check_mergeable_state(state: Option<&MergeableState>) -> Option<Rejection> {
    match state {
        Some(MergeableState::Draft) => Some(Rejection::Draft),
        Some(MergeableState::Dirty) => Some(Rejection::Dirty),
        Some(MergeableState::Blocked) => Some(Rejection::Blocked),
        Some(
            MergeableState::Clean
            | MergeableState::HasHooks
            | MergeableState::Unknown
            | MergeableState::Unstable,
        ) => None,
        Some(MergeableState::Other(other)) => {
            Some(Rejection::UnknownMergeableState(Some(other.clone())))
        }
        None => Some(Rejection::UnknownMergeableState(None)),
    }
}

/// Evaluate whether a pull request may be merged (EFFECTFUL)
///
/// Fetches a fresh snapshot on every call, runs the gates in order and logs
/// the decision with its reason. Platform errors are returned to the caller.
pub async fn evaluate(
    platform: &dyn PlatformService,
    ctx: &RepoContext,
    policy: &MergePolicy,
    number: u64,
) -> Result<Eligibility> {
    info!(pr_number = number, "Evaluating mergeability for pull request #{number}");

    let snapshot = platform.get_pull_request(ctx, number).await?;

    let rejection = match run_gates(platform, ctx, policy, &snapshot).await? {
        Some(rejection) => rejection,
        None => {
            info!(
                pr_number = number,
                "Pull request #{number} is mergeable with state '{}'",
                snapshot
                    .mergeable_state
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default()
            );
            return Ok(Eligibility::Mergeable(snapshot));
        }
    };

    if matches!(rejection, Rejection::UnknownMergeableState(_)) {
        warn!(pr_number = number, "Pull request #{number} {rejection}");
    } else {
        info!(pr_number = number, "Pull request #{number} {rejection}");
    }
    Ok(Eligibility::Rejected(rejection))
}

async fn run_gates(
    platform: &dyn PlatformService,
    ctx: &RepoContext,
    policy: &MergePolicy,
    snapshot: &PullRequestSnapshot,
) -> Result<Option<Rejection>> {
    if let Some(rejection) = check_snapshot(snapshot, policy) {
        return Ok(Some(rejection));
    }

    let required = platform
        .get_required_checks(ctx, &snapshot.base_branch)
        .await?;
    let runs = platform.list_check_runs(ctx, &snapshot.head_sha).await?;
    let missing = missing_required_checks(&required, &runs);
    if !missing.is_empty() {
        return Ok(Some(Rejection::RequiredChecksNotPassed { missing }));
    }

    let labels = blocking_labels(snapshot, policy);
    if !labels.is_empty() {
        return Ok(Some(Rejection::DoNotMergeLabels(labels)));
    }

    if policy.required_approvals > 0 {
        let reviews = platform.list_reviews(ctx, snapshot.number).await?;
        let latest = relevant_reviews_for_commit(
            &reviews,
            &policy.effective_review_author_associations(),
            &snapshot.head_sha,
        );
        let summary = ReviewSummary::from_reviews(&latest);
        if !summary.changes_requested.is_empty() {
            return Ok(Some(Rejection::ChangesRequested(summary.changes_requested)));
        }
        if summary.approvals < policy.required_approvals as usize {
            return Ok(Some(Rejection::NotEnoughApprovals {
                approvals: summary.approvals,
                required: policy.required_approvals,
            }));
        }
    }

    Ok(check_mergeable_state(snapshot.mergeable_state.as_ref()))
}
