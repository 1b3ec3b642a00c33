//! Command-line interface

mod context;
mod run;

pub use run::run_automerge;

use clap::Parser;
use std::path::PathBuf;

// Every option can also be supplied through its environment variable, so the
// binary runs unchanged inside a GitHub Actions workflow.
#[derive(Debug, Parser)]
#[command(name = "automerge", version)]
#[command(about = "Merge pull requests once they satisfy a merge policy")]
pub struct Args {
    /// TOML configuration file (CLI options override its values)
    #[arg(long, env = "AUTOMERGE_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Repository in format 'owner/repo'
    #[arg(short = 'r', long, env = "GITHUB_REPOSITORY")]
    pub repo: Option<String>,

    /// GitHub token
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// GitHub REST API base URL (GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", value_name = "URL")]
    pub api_url: Option<String>,

    /// Pull request to evaluate (otherwise derived from the triggering event)
    #[arg(long, env = "AUTOMERGE_PULL_REQUEST", value_name = "NUMBER")]
    pub pull_request: Option<u64>,

    /// Merge method: merge, squash or rebase (default: first allowed by the repository)
    #[arg(long, env = "AUTOMERGE_MERGE_METHOD", value_name = "METHOD")]
    pub merge_method: Option<String>,

    /// Use "<title> (#<number>)" as commit title for squash merges
    #[arg(
        long,
        env = "AUTOMERGE_SQUASH_TITLE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub squash_title: Option<bool>,

    /// Additional labels that block merging
    #[arg(long, env = "AUTOMERGE_DO_NOT_MERGE_LABELS", value_delimiter = ',')]
    pub do_not_merge_labels: Vec<String>,

    /// Allowed author associations of the pull request author
    #[arg(
        long,
        env = "AUTOMERGE_PULL_REQUEST_AUTHOR_ASSOCIATIONS",
        value_delimiter = ','
    )]
    pub pull_request_author_associations: Vec<String>,

    /// Allowed author associations of reviewers
    #[arg(long, env = "AUTOMERGE_REVIEW_AUTHOR_ASSOCIATIONS", value_delimiter = ',')]
    pub review_author_associations: Vec<String>,

    /// Approvals required on the head commit (0 disables the check)
    #[arg(long, env = "AUTOMERGE_REQUIRED_APPROVALS", value_name = "COUNT")]
    pub required_approvals: Option<u32>,

    /// Log what would be merged without merging
    #[arg(
        long,
        env = "AUTOMERGE_DRY_RUN",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub dry_run: Option<bool>,

    /// Delete the head branch after a successful merge (off by default; never in dry run)
    #[arg(
        long,
        env = "AUTOMERGE_DELETE_ON_MERGE",
        num_args = 0..=1,
        default_missing_value = "true",
        value_name = "BOOL"
    )]
    pub delete_on_merge: Option<bool>,

    /// Total merge attempts per pull request
    #[arg(long, env = "AUTOMERGE_MAX_TRIES", value_name = "COUNT")]
    pub max_tries: Option<u32>,

    /// Name of the triggering event
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    pub event_name: Option<String>,

    /// Path to the triggering event's JSON payload
    #[arg(long, env = "GITHUB_EVENT_PATH", value_name = "PATH")]
    pub event_path: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Install the global tracing subscriber (stderr, `RUST_LOG` aware)
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
