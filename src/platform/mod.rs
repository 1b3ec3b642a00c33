//! Platform services for GitHub
//!
//! The merge engine only talks to the source-control platform through
//! [`PlatformService`], so tests can substitute a mock.

mod github;

pub use github::GitHubService;

use crate::error::Result;
use crate::types::{
    CheckRun, MergeRequest, MergeResult, PullRequestSnapshot, RepoContext, RepoMergeSettings,
    Review,
};
use async_trait::async_trait;

/// Platform service trait for the calls the merge engine makes
///
/// Every method receives the repository explicitly; implementations hold no
/// notion of a "current" repository.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Fetch a fresh snapshot of a pull request
    ///
    /// Fails with [`Error::PullRequestNotFound`] when the PR does not exist.
    ///
    /// [`Error::PullRequestNotFound`]: crate::error::Error::PullRequestNotFound
    async fn get_pull_request(&self, ctx: &RepoContext, number: u64)
    -> Result<PullRequestSnapshot>;

    /// Names of the status checks branch protection requires on `branch`
    ///
    /// Returns an empty list when the branch is unprotected or protection is disabled.
    async fn get_required_checks(&self, ctx: &RepoContext, branch: &str) -> Result<Vec<String>>;

    /// List check runs reported for a commit
    async fn list_check_runs(&self, ctx: &RepoContext, sha: &str) -> Result<Vec<CheckRun>>;

    /// List every review submitted on a pull request
    async fn list_reviews(&self, ctx: &RepoContext, number: u64) -> Result<Vec<Review>>;

    /// Merge strategies enabled on the repository
    async fn get_merge_settings(&self, ctx: &RepoContext) -> Result<RepoMergeSettings>;

    /// Merge a pull request
    async fn merge_pull_request(
        &self,
        ctx: &RepoContext,
        request: &MergeRequest,
    ) -> Result<MergeResult>;

    /// Delete a branch
    async fn delete_branch(&self, ctx: &RepoContext, branch: &str) -> Result<()>;
}
