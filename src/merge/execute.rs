//! Merge execution - effectful operations
//!
//! The merge call and the post-merge branch deletion are separate steps with
//! separate result types: a failed deletion is reported but can never turn a
//! successful merge into a failure or a retry.

use crate::config::MergePolicy;
use crate::platform::PlatformService;
use crate::types::{MergeMethod, MergeRequest, PullRequestSnapshot, RepoContext};
use tracing::{error, info};

/// Result of a merge attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// PR was merged
    Merged {
        /// The SHA of the merge commit, if reported
        sha: Option<String>,
    },
    /// Dry run: nothing was merged
    DryRun,
    /// Merge call failed and tries remain
    Retry {
        /// Error message from the failed call
        error: String,
    },
    /// Merge call failed on the last allowed try
    Failed {
        /// Error message from the failed call
        error: String,
    },
}

impl MergeOutcome {
    /// Whether the scheduler should try this PR again
    #[must_use]
    pub const fn should_retry(&self) -> bool {
        matches!(self, Self::Retry { .. })
    }
}

/// Result of the best-effort branch deletion after a merge
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchCleanup {
    /// Branch deleted
    Deleted,
    /// Deletion not requested by policy
    Skipped,
    /// Deletion failed; the merge still counts as successful
    Failed(String),
}

/// Build the merge call for a snapshot (PURE)
///
/// With `squash_title` set and a squash merge, the commit title becomes
/// `"<title> (#<number>)"` with an explicitly empty body. Otherwise the API
/// defaults apply.
pub fn build_merge_request(
    snapshot: &PullRequestSnapshot,
    method: Option<MergeMethod>,
    policy: &MergePolicy,
) -> MergeRequest {
    let use_title = policy.squash_title && method == Some(MergeMethod::Squash);

    MergeRequest {
        number: snapshot.number,
        sha: snapshot.head_sha.clone(),
        method,
        commit_title: use_title.then(|| format!("{} (#{})", snapshot.title, snapshot.number)),
        commit_message: use_title.then(|| "\n".to_string()),
    }
}

fn describe(request: &MergeRequest) -> String {
    let mut description = format!("pull request #{}", request.number);
    if let Some(method) = request.method {
        description.push_str(&format!(" using {method}"));
    }
    if let Some(ref title) = request.commit_title {
        description.push_str(&format!(" with title '{title}'"));
    }
    description
}

/// Attempt the merge (EFFECTFUL)
///
/// `tries_left` is the number of attempts remaining after this one. A failure
/// with tries left asks for a retry; a failure on the last try is fatal.
pub async fn execute_merge(
    platform: &dyn PlatformService,
    ctx: &RepoContext,
    policy: &MergePolicy,
    request: &MergeRequest,
    tries_left: u32,
) -> MergeOutcome {
    let number = request.number;

    if policy.dry_run {
        info!(pr_number = number, "Would try merging {}", describe(request));
        return MergeOutcome::DryRun;
    }

    info!(pr_number = number, "Merging {}", describe(request));

    let error = match platform.merge_pull_request(ctx, request).await {
        Ok(result) if result.merged => {
            info!(
                pr_number = number,
                sha = result.sha.as_deref().unwrap_or("(no sha)"),
                "Successfully merged pull request #{number}"
            );
            return MergeOutcome::Merged { sha: result.sha };
        }
        Ok(result) => result
            .message
            .unwrap_or_else(|| "merge was not performed".to_string()),
        Err(e) => e.to_string(),
    };

    error!(
        pr_number = number,
        tries_left,
        "Failed to merge pull request #{number} ({tries_left} tries left): {error}"
    );

    if tries_left == 0 {
        MergeOutcome::Failed { error }
    } else {
        MergeOutcome::Retry { error }
    }
}

/// Delete the head branch after a merge, if the policy asks for it (EFFECTFUL)
pub async fn delete_head_branch(
    platform: &dyn PlatformService,
    ctx: &RepoContext,
    policy: &MergePolicy,
    branch: &str,
) -> BranchCleanup {
    if !policy.delete_on_merge || policy.dry_run {
        return BranchCleanup::Skipped;
    }

    info!(branch, "Deleting branch {branch} after successful merge");

    match platform.delete_branch(ctx, branch).await {
        Ok(()) => {
            info!(branch, "Successfully deleted branch {branch}");
            BranchCleanup::Deleted
        }
        Err(e) => {
            error!(branch, "Could not delete branch {branch}: {e}");
            BranchCleanup::Failed(e.to_string())
        }
    }
}
