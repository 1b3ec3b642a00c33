//! The per-attempt chain: evaluate, pick a method, merge, clean up

use crate::config::MergePolicy;
use crate::error::Result;
use crate::merge::eligibility::{Eligibility, evaluate};
use crate::merge::execute::{
    MergeOutcome, build_merge_request, delete_head_branch, execute_merge,
};
use crate::merge::method::determine_merge_method;
use crate::merge::scheduler::{MergeTask, TaskOutcome};
use crate::platform::PlatformService;
use crate::types::RepoContext;
use async_trait::async_trait;
use tracing::{error, instrument};

/// Merges pull requests of one repository under one policy
pub struct Automerger<'a> {
    platform: &'a dyn PlatformService,
    ctx: RepoContext,
    policy: MergePolicy,
}

impl<'a> Automerger<'a> {
    /// Create an automerger for `ctx`
    pub const fn new(
        platform: &'a dyn PlatformService,
        ctx: RepoContext,
        policy: MergePolicy,
    ) -> Self {
        Self {
            platform,
            ctx,
            policy,
        }
    }

    /// Run the full chain once for a PR
    ///
    /// Platform errors before the merge call (fetching the PR, checks,
    /// settings) are returned as `Err`; merge call failures are folded into
    /// the returned outcome.
    pub async fn automerge_pull_request(
        &self,
        number: u64,
        tries_left: u32,
    ) -> Result<TaskOutcome> {
        let snapshot = match evaluate(self.platform, &self.ctx, &self.policy, number).await? {
            Eligibility::Mergeable(snapshot) => snapshot,
            Eligibility::Rejected(rejection) => return Ok(TaskOutcome::Rejected(rejection)),
        };

        let method = determine_merge_method(self.platform, &self.ctx, &self.policy).await?;
        let request = build_merge_request(&snapshot, method, &self.policy);

        let outcome = execute_merge(
            self.platform,
            &self.ctx,
            &self.policy,
            &request,
            tries_left,
        )
        .await;

        Ok(match outcome {
            MergeOutcome::Merged { sha } => {
                let cleanup = delete_head_branch(
                    self.platform,
                    &self.ctx,
                    &self.policy,
                    &snapshot.head_branch,
                )
                .await;
                TaskOutcome::Merged { sha, cleanup }
            }
            MergeOutcome::DryRun => TaskOutcome::DryRun,
            MergeOutcome::Retry { error } => TaskOutcome::Retry(error),
            MergeOutcome::Failed { error } => TaskOutcome::Failed(error),
        })
    }
}

#[async_trait]
impl MergeTask for Automerger<'_> {
    #[instrument(skip(self), fields(repo = %self.ctx))]
    async fn attempt(&self, number: u64, tries_left: u32) -> TaskOutcome {
        match self.automerge_pull_request(number, tries_left).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(pr_number = number, "Failed to evaluate pull request #{number}: {e}");
                TaskOutcome::Failed(e.to_string())
            }
        }
    }
}
