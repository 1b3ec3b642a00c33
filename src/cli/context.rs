//! Shared run context built from CLI arguments
//!
//! Layers the configuration (file, then CLI/env overrides), resolves the
//! repository and creates the platform service.

use super::Args;
use pr_automerge::config::Config;
use pr_automerge::error::{Error, Result};
use pr_automerge::platform::{GitHubService, PlatformService};
use pr_automerge::types::{AuthorAssociation, MergeMethod, RepoContext};

/// Build the effective configuration
///
/// Values from `--config` are loaded first; every option given on the command
/// line or through the environment replaces the file's value.
pub fn build_config(args: &Args) -> Result<Config> {
    let mut config = match args.config {
        Some(ref path) => Config::load(path)?,
        None => Config::default(),
    };

    if args.pull_request.is_some() {
        config.pull_request = args.pull_request;
    }

    let policy = &mut config.policy;
    if let Some(ref method) = args.merge_method {
        policy.merge_method = Some(method.parse::<MergeMethod>()?);
    }
    if let Some(squash_title) = args.squash_title {
        policy.squash_title = squash_title;
    }
    if let Some(dry_run) = args.dry_run {
        policy.dry_run = dry_run;
    }
    if let Some(delete_on_merge) = args.delete_on_merge {
        policy.delete_on_merge = delete_on_merge;
    }
    if !args.do_not_merge_labels.is_empty() {
        policy.do_not_merge_labels = non_empty(&args.do_not_merge_labels);
    }
    if !args.pull_request_author_associations.is_empty() {
        policy.pull_request_author_associations =
            associations(&args.pull_request_author_associations);
    }
    if !args.review_author_associations.is_empty() {
        policy.review_author_associations = associations(&args.review_author_associations);
    }
    if let Some(required) = args.required_approvals {
        policy.required_approvals = required;
    }

    if let Some(max_tries) = args.max_tries {
        config.retry.max_tries = max_tries;
    }
    config.retry.validate()?;

    Ok(config)
}

fn non_empty(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(String::from)
        .collect()
}

fn associations(values: &[String]) -> Vec<AuthorAssociation> {
    non_empty(values)
        .iter()
        .map(|v| AuthorAssociation::from(v.as_str()))
        .collect()
}

/// Repository named by `--repo` / `GITHUB_REPOSITORY`
pub fn repo_context(args: &Args) -> Result<RepoContext> {
    args.repo
        .as_deref()
        .ok_or_else(|| {
            Error::Config("repository is required (--repo or GITHUB_REPOSITORY)".to_string())
        })?
        .parse()
}

/// Create the GitHub service from token and API URL options
pub fn create_platform(args: &Args) -> Result<Box<dyn PlatformService>> {
    let token = args
        .token
        .as_deref()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::Config("token is required (--token or GITHUB_TOKEN)".to_string()))?;

    if let Some(ref api_url) = args.api_url {
        url::Url::parse(api_url)
            .map_err(|e| Error::Config(format!("invalid API URL '{api_url}': {e}")))?;
    }

    Ok(Box::new(GitHubService::new(token, args.api_url.as_deref())?))
}
