//! Error types for pr-automerge

use thiserror::Error;

/// Errors raised by the automerge library
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid configuration (bad merge method, unreadable config file, ...)
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Inbound event payload could not be interpreted
    #[error("invalid event payload: {0}")]
    Event(String),

    /// GitHub API error with context
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// The requested pull request does not exist
    #[error("pull request #{0} not found")]
    PullRequestNotFound(u64),

    /// Generic platform failure (used by alternative `PlatformService` implementations)
    #[error("platform error: {0}")]
    Platform(String),
}

impl From<octocrab::Error> for Error {
    fn from(err: octocrab::Error) -> Self {
        match err {
            octocrab::Error::GitHub { source, .. } => Self::GitHubApi(format!(
                "{} ({})",
                source.message,
                source.status_code.as_u16()
            )),
            other => Self::GitHubApi(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Event(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
