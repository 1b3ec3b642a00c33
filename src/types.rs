//! Core types for pr-automerge

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

use crate::error::Error;

/// Repository the automerge run operates on
///
/// Passed explicitly to every platform call instead of living in a global.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoContext {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl RepoContext {
    /// Create a context for `owner/repo`
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

impl FromStr for RepoContext {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, repo)) if !owner.is_empty() && !repo.is_empty() && !repo.contains('/') => {
                Ok(Self::new(owner, repo))
            }
            _ => Err(Error::Config(format!(
                "repository must be in format 'owner/repo', got: '{s}'"
            ))),
        }
    }
}

impl std::fmt::Display for RepoContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Relationship of an account to the repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AuthorAssociation {
    /// Owner of the repository
    Owner,
    /// Member of the owning organization
    Member,
    /// Invited collaborator
    Collaborator,
    /// Has previously committed to the repository
    Contributor,
    /// First contribution to any repository on GitHub
    FirstTimer,
    /// First contribution to this repository
    FirstTimeContributor,
    /// Placeholder account for imported data
    Mannequin,
    /// No association
    None,
    /// Association value this crate does not know about
    Other(String),
}

impl AuthorAssociation {
    /// The API spelling of this association (e.g. `COLLABORATOR`)
    pub fn as_str(&self) -> &str {
        match self {
            Self::Owner => "OWNER",
            Self::Member => "MEMBER",
            Self::Collaborator => "COLLABORATOR",
            Self::Contributor => "CONTRIBUTOR",
            Self::FirstTimer => "FIRST_TIMER",
            Self::FirstTimeContributor => "FIRST_TIME_CONTRIBUTOR",
            Self::Mannequin => "MANNEQUIN",
            Self::None => "NONE",
            Self::Other(value) => value,
        }
    }
}

impl From<&str> for AuthorAssociation {
    fn from(value: &str) -> Self {
        match value.trim().to_ascii_uppercase().as_str() {
            "OWNER" => Self::Owner,
            "MEMBER" => Self::Member,
            "COLLABORATOR" => Self::Collaborator,
            "CONTRIBUTOR" => Self::Contributor,
            "FIRST_TIMER" => Self::FirstTimer,
            "FIRST_TIME_CONTRIBUTOR" => Self::FirstTimeContributor,
            "MANNEQUIN" => Self::Mannequin,
            "NONE" => Self::None,
            _ => Self::Other(value.trim().to_string()),
        }
    }
}

impl From<String> for AuthorAssociation {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl From<AuthorAssociation> for String {
    fn from(value: AuthorAssociation) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for AuthorAssociation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// PR state as reported by the API (merged PRs are `Closed` with `merged == true`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrState {
    /// PR is open
    Open,
    /// PR was closed (possibly by merging)
    Closed,
}

impl std::fmt::Display for PrState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Platform-computed mergeability of a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum MergeableState {
    /// PR is a draft
    Draft,
    /// Merge conflicts with the base branch
    Dirty,
    /// Blocked by branch protection
    Blocked,
    /// Mergeable, all checks green
    Clean,
    /// Mergeable, pre-receive hooks exist
    HasHooks,
    /// GitHub is still computing mergeability
    Unknown,
    /// Mergeable with non-passing checks
    Unstable,
    /// Any other value (e.g. `behind`)
    Other(String),
}

impl From<&str> for MergeableState {
    fn from(value: &str) -> Self {
        match value {
            "draft" => Self::Draft,
            "dirty" => Self::Dirty,
            "blocked" => Self::Blocked,
            "clean" => Self::Clean,
            "has_hooks" => Self::HasHooks,
            "unknown" => Self::Unknown,
            "unstable" => Self::Unstable,
            other => Self::Other(other.to_string()),
        }
    }
}

impl From<String> for MergeableState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

impl std::fmt::Display for MergeableState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Draft => "draft",
            Self::Dirty => "dirty",
            Self::Blocked => "blocked",
            Self::Clean => "clean",
            Self::HasHooks => "has_hooks",
            Self::Unknown => "unknown",
            Self::Unstable => "unstable",
            Self::Other(value) => value,
        };
        f.write_str(s)
    }
}

/// Fresh view of a pull request, fetched once per evaluation attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestSnapshot {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// Open or closed
    pub state: PrState,
    /// Whether the PR has already been merged
    pub merged: bool,
    /// Login of the PR author (None for deleted accounts)
    pub author: Option<String>,
    /// Author's relationship to the repository
    pub author_association: Option<AuthorAssociation>,
    /// Names of applied labels
    pub labels: BTreeSet<String>,
    /// Mergeability computed by the platform (None when not reported)
    pub mergeable_state: Option<MergeableState>,
    /// Base branch name
    pub base_branch: String,
    /// Head branch name
    pub head_branch: String,
    /// Head commit SHA
    pub head_sha: String,
}

/// Review state, compared case-insensitively
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum ReviewState {
    /// Reviewer approved
    Approved,
    /// Reviewer requested changes
    ChangesRequested,
    /// Comment, dismissed, pending, ...
    Other(String),
}

impl From<&str> for ReviewState {
    fn from(value: &str) -> Self {
        match value.to_ascii_uppercase().as_str() {
            "APPROVED" => Self::Approved,
            "CHANGES_REQUESTED" => Self::ChangesRequested,
            _ => Self::Other(value.to_string()),
        }
    }
}

impl From<String> for ReviewState {
    fn from(value: String) -> Self {
        Self::from(value.as_str())
    }
}

/// A review submitted on a pull request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review ID
    pub id: u64,
    /// Reviewer login (None for deleted accounts)
    pub author: Option<String>,
    /// Reviewer's relationship to the repository
    pub author_association: Option<AuthorAssociation>,
    /// Review verdict
    pub state: ReviewState,
    /// Commit the review was submitted against
    pub commit_id: Option<String>,
    /// Submission time (None for pending reviews)
    pub submitted_at: Option<DateTime<Utc>>,
}

/// A single CI check run on a commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    /// Check name (matches branch protection contexts)
    pub name: String,
    /// Conclusion (`success`, `failure`, ...); None while running
    pub conclusion: Option<String>,
}

impl CheckRun {
    /// Whether this run concluded successfully
    pub fn is_success(&self) -> bool {
        self.conclusion.as_deref() == Some("success")
    }
}

/// Merge strategies the repository allows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepoMergeSettings {
    /// Merge commits allowed
    pub allow_merge_commit: bool,
    /// Squash merges allowed
    pub allow_squash: bool,
    /// Rebase merges allowed
    pub allow_rebase: bool,
}

/// Merge strategy/method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    /// Create a merge commit
    Merge,
    /// Squash all commits into one
    Squash,
    /// Rebase commits onto base branch
    Rebase,
}

impl FromStr for MergeMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "merge" => Ok(Self::Merge),
            "squash" => Ok(Self::Squash),
            "rebase" => Ok(Self::Rebase),
            other => Err(Error::Config(format!("unknown merge method: '{other}'"))),
        }
    }
}

impl std::fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Squash => write!(f, "squash"),
            Self::Merge => write!(f, "merge"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// Parameters of a single merge call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequest {
    /// PR number
    pub number: u64,
    /// Expected head SHA; the merge fails if the head moved
    pub sha: String,
    /// Merge method (None lets the API pick its default)
    pub method: Option<MergeMethod>,
    /// Commit title override
    pub commit_title: Option<String>,
    /// Commit message override
    pub commit_message: Option<String>,
}

/// Result of a merge call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeResult {
    /// Whether the merge was successful
    pub merged: bool,
    /// The SHA of the merge commit (if successful)
    pub sha: Option<String>,
    /// Message from the merge operation (especially on failure)
    pub message: Option<String>,
}
