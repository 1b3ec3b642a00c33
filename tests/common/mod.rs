//! Shared test fixtures

#![allow(dead_code)]

mod mock_platform;

pub use mock_platform::{MockPlatformService, ALL_METHODS_ALLOWED};

use chrono::{DateTime, TimeZone, Utc};
use pr_automerge::types::{
    AuthorAssociation, CheckRun, MergeableState, PrState, PullRequestSnapshot, RepoContext, Review,
    ReviewState,
};
use std::collections::BTreeSet;

/// Head commit used by default fixtures
pub const HEAD_SHA: &str = "head-sha";

/// The repository every test runs against
pub fn repo_ctx() -> RepoContext {
    RepoContext::new("octo", "repo")
}

/// An open, clean PR from a member with no labels
pub fn make_snapshot(number: u64) -> PullRequestSnapshot {
    PullRequestSnapshot {
        number,
        title: format!("Change {number}"),
        state: PrState::Open,
        merged: false,
        author: Some("alice".to_string()),
        author_association: Some(AuthorAssociation::Member),
        labels: BTreeSet::new(),
        mergeable_state: Some(MergeableState::Clean),
        base_branch: "main".to_string(),
        head_branch: format!("feature-{number}"),
        head_sha: HEAD_SHA.to_string(),
    }
}

/// Same as [`make_snapshot`] with labels applied
pub fn with_labels(mut snapshot: PullRequestSnapshot, labels: &[&str]) -> PullRequestSnapshot {
    snapshot.labels = labels.iter().map(ToString::to_string).collect();
    snapshot
}

/// A check run with a conclusion
pub fn check_run(name: &str, conclusion: &str) -> CheckRun {
    CheckRun {
        name: name.to_string(),
        conclusion: Some(conclusion.to_string()),
    }
}

/// Fixed timestamp `minutes` after a base time
pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap() + chrono::Duration::minutes(minutes)
}

/// A review by a collaborator on the default head commit
pub fn make_review(id: u64, author: &str, state: &str, minutes: Option<i64>) -> Review {
    Review {
        id,
        author: Some(author.to_string()),
        author_association: Some(AuthorAssociation::Collaborator),
        state: ReviewState::from(state),
        commit_id: Some(HEAD_SHA.to_string()),
        submitted_at: minutes.map(at),
    }
}
