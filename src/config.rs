//! Merge policy and retry configuration
//!
//! Settings come from an optional TOML file and are then overridden by CLI
//! flags (see `src/cli/context.rs`). Keys are kebab-case:
//!
//! ```toml
//! pull-request = 42
//!
//! [policy]
//! merge-method = "squash"
//! squash-title = true
//! do-not-merge-labels = ["hold"]
//! pull-request-author-associations = ["MEMBER", "OWNER"]
//!
//! [retry]
//! max-tries = 5
//! ```

use crate::error::{Error, Result};
use crate::types::{AuthorAssociation, MergeMethod};
use regex::Regex;
use serde::Deserialize;
use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

/// Login of the automation account whose PRs and reviews bypass association checks
pub const TRUSTED_AUTOMATION_LOGIN: &str = "github-actions[bot]";

/// Reviewer associations used when none are configured
pub const DEFAULT_REVIEW_AUTHOR_ASSOCIATIONS: [AuthorAssociation; 3] = [
    AuthorAssociation::Collaborator,
    AuthorAssociation::Member,
    AuthorAssociation::Owner,
];

static NON_ALPHANUMERIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[^a-z0-9]").expect("valid regex"));
static DO_NOT_MERGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^dono?tmerge$").expect("valid regex"));

/// Loosely match a "do not merge" label name.
///
/// The label is lower-cased and stripped of everything but `[a-z0-9]`, so
/// `Do-Not_Merge`, `DONOTMERGE` and `don't merge` all match while
/// `do not merge please` does not.
pub fn is_do_not_merge_label(label: &str) -> bool {
    let lower = label.to_lowercase();
    let normalized = NON_ALPHANUMERIC.replace_all(&lower, "");
    DO_NOT_MERGE.is_match(&normalized)
}

/// Rules deciding whether and how a pull request gets merged
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct MergePolicy {
    /// Explicit merge method; None falls back to repository settings
    pub merge_method: Option<MergeMethod>,
    /// Use "<title> (#<number>)" as commit title for squash merges
    pub squash_title: bool,
    /// Labels that block merging, in addition to "do not merge" variants
    pub do_not_merge_labels: Vec<String>,
    /// Allowed PR author associations (empty allows everyone)
    pub pull_request_author_associations: Vec<AuthorAssociation>,
    /// Allowed reviewer associations (empty means collaborators, members and owners)
    pub review_author_associations: Vec<AuthorAssociation>,
    /// Approvals required on the head commit (0 disables the review gate)
    pub required_approvals: u32,
    /// Log what would be merged without merging
    pub dry_run: bool,
    /// Delete the head branch after a successful merge
    pub delete_on_merge: bool,
}

impl MergePolicy {
    /// Whether `label` blocks merging under this policy
    pub fn is_do_not_merge_label(&self, label: &str) -> bool {
        self.do_not_merge_labels.iter().any(|l| l == label) || is_do_not_merge_label(label)
    }

    /// Reviewer associations in effect, applying the default when unset
    pub fn effective_review_author_associations(&self) -> Vec<AuthorAssociation> {
        if self.review_author_associations.is_empty() {
            DEFAULT_REVIEW_AUTHOR_ASSOCIATIONS.to_vec()
        } else {
            self.review_author_associations.clone()
        }
    }
}

/// Retry behaviour for failed merge calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RetrySettings {
    /// Total merge attempts per pull request, including the first
    pub max_tries: u32,
    /// Base of the exponential backoff, in seconds
    pub base_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_tries: 5,
            base_delay_secs: 1,
        }
    }
}

impl RetrySettings {
    /// Backoff base as a `Duration`
    pub const fn base_delay(&self) -> Duration {
        Duration::from_secs(self.base_delay_secs)
    }

    /// Reject settings the scheduler cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.max_tries == 0 {
            return Err(Error::Config("max-tries must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Complete configuration for an automerge run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// Pull request to evaluate; None derives it from the triggering event
    pub pull_request: Option<u64>,
    /// Merge policy
    pub policy: MergePolicy,
    /// Retry settings
    pub retry: RetrySettings,
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.retry.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
    }
}
