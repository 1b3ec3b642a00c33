//! Automerge run: resolve targets, then drive the retry scheduler

use super::Args;
use super::context::{build_config, create_platform, repo_context};
use anyhow::{Context, Result};
use pr_automerge::config::Config;
use pr_automerge::events::Trigger;
use pr_automerge::merge::{Automerger, RetryScheduler, SchedulerReport, TaskOutcome};
use tracing::{info, warn};

/// Run automerge for the pull requests selected by `args`
pub async fn run_automerge(args: &Args) -> Result<SchedulerReport> {
    let config = build_config(args)?;
    let numbers = pull_requests_to_process(args, &config)?;

    if numbers.is_empty() {
        info!("No pull requests to evaluate");
        return Ok(SchedulerReport::default());
    }

    let repo = repo_context(args)?;
    let platform = create_platform(args)?;

    if config.policy.dry_run {
        info!("Dry run enabled, no pull request will be merged");
    }

    let automerger = Automerger::new(platform.as_ref(), repo, config.policy);
    let report = RetryScheduler::new(numbers, config.retry)
        .run(&automerger)
        .await;

    log_summary(&report);
    Ok(report)
}

/// Explicit `--pull-request` wins; otherwise the triggering event decides
fn pull_requests_to_process(args: &Args, config: &Config) -> Result<Vec<u64>> {
    if let Some(number) = config.pull_request {
        return Ok(vec![number]);
    }

    let Some(ref event_name) = args.event_name else {
        warn!("No pull request given and no triggering event to derive one from");
        return Ok(Vec::new());
    };

    let payload = match args.event_path {
        Some(ref path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event payload {}", path.display()))?,
        None => "{}".to_string(),
    };

    let trigger = Trigger::parse(event_name, &payload)
        .with_context(|| format!("Failed to parse '{event_name}' event payload"))?;
    Ok(trigger.pull_requests())
}

fn log_summary(report: &SchedulerReport) {
    for (number, outcome) in &report.outcomes {
        let attempts = report.attempts_for(*number);
        match outcome {
            TaskOutcome::Merged { .. } => {
                info!(pr_number = number, attempts, "#{number}: merged");
            }
            TaskOutcome::Rejected(rejection) => {
                info!(pr_number = number, attempts, "#{number}: not merged, {rejection}");
            }
            TaskOutcome::DryRun => {
                info!(pr_number = number, attempts, "#{number}: dry run");
            }
            TaskOutcome::Retry(error) | TaskOutcome::Failed(error) => {
                warn!(pr_number = number, attempts, "#{number}: failed, {error}");
            }
        }
    }
}
