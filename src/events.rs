//! Inbound trigger events
//!
//! Turns a webhook/workflow event (name + JSON payload) into the pull request
//! numbers to evaluate. Unsupported events yield nothing.

use crate::error::Result;
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
struct PullRequestRef {
    number: u64,
}

#[derive(Debug, Deserialize)]
struct CheckRunPayload {
    id: Option<u64>,
    conclusion: Option<String>,
    #[serde(default)]
    pull_requests: Vec<PullRequestRef>,
}

#[derive(Debug, Deserialize)]
struct CheckRunEvent {
    action: Option<String>,
    check_run: Option<CheckRunPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestReviewEvent {
    action: Option<String>,
    pull_request: Option<PullRequestRef>,
}

/// A parsed trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// A check run completed
    CheckRun {
        /// Check run ID
        id: Option<u64>,
        /// Conclusion of the run
        conclusion: Option<String>,
        /// PRs associated with the run
        pull_requests: Vec<u64>,
    },
    /// A review was submitted on a PR
    ReviewSubmitted {
        /// Reviewed PR
        pull_request: u64,
    },
    /// Event carried nothing to act on
    Ignored(String),
    /// Event type this tool does not handle
    Unsupported(String),
}

impl Trigger {
    /// Parse an event payload
    pub fn parse(event_name: &str, payload: &str) -> Result<Self> {
        match event_name {
            "check_run" => {
                let event: CheckRunEvent = serde_json::from_str(payload)?;
                let (Some(_), Some(check_run)) = (event.action, event.check_run) else {
                    return Ok(Self::Ignored("check_run event without action or check run".into()));
                };
                Ok(Self::CheckRun {
                    id: check_run.id,
                    conclusion: check_run.conclusion,
                    pull_requests: check_run.pull_requests.iter().map(|pr| pr.number).collect(),
                })
            }
            "pull_request_review" => {
                let event: PullRequestReviewEvent = serde_json::from_str(payload)?;
                match (event.action.as_deref(), event.pull_request) {
                    (Some("submitted"), Some(pr)) => Ok(Self::ReviewSubmitted {
                        pull_request: pr.number,
                    }),
                    (action, _) => Ok(Self::Ignored(format!(
                        "pull_request_review action '{}' is not handled",
                        action.unwrap_or("none")
                    ))),
                }
            }
            other => Ok(Self::Unsupported(other.to_string())),
        }
    }

    /// Pull requests to queue for this trigger, logging why when there are none
    pub fn pull_requests(&self) -> Vec<u64> {
        match self {
            Self::CheckRun {
                id,
                conclusion,
                pull_requests,
            } => {
                let id = id.map_or_else(|| "?".to_string(), |id| id.to_string());
                if conclusion.as_deref() != Some("success") {
                    info!(
                        "Conclusion for check run {id} is {}, not attempting to merge",
                        conclusion.as_deref().unwrap_or("none")
                    );
                    return Vec::new();
                }
                let mut numbers: Vec<u64> = Vec::new();
                for number in pull_requests {
                    if !numbers.contains(number) {
                        numbers.push(*number);
                    }
                }
                if numbers.is_empty() {
                    info!("Check run {id} has no associated pull requests");
                }
                numbers
            }
            Self::ReviewSubmitted { pull_request } => vec![*pull_request],
            Self::Ignored(reason) => {
                debug!("{reason}");
                Vec::new()
            }
            Self::Unsupported(name) => {
                warn!("This tool does not support the '{name}' event");
                Vec::new()
            }
        }
    }
}
