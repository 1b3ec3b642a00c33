//! Retry scheduler - drives merge attempts with exponential backoff
//!
//! Tasks are processed strictly one at a time in FIFO order. A task that asks
//! for a retry goes to the back of the queue, so a PR's backoff delay also
//! delays everything queued behind it.

use crate::config::RetrySettings;
use crate::merge::eligibility::Rejection;
use crate::merge::execute::BranchCleanup;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::info;

/// Final result of one attempt at a pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    /// PR was merged
    Merged {
        /// The SHA of the merge commit, if reported
        sha: Option<String>,
        /// What happened to the head branch afterwards
        cleanup: BranchCleanup,
    },
    /// PR is not eligible for merging
    Rejected(Rejection),
    /// Dry run, nothing merged
    DryRun,
    /// Merge call failed; try again later
    Retry(String),
    /// Unrecoverable failure for this PR
    Failed(String),
}

impl TaskOutcome {
    /// Whether this outcome should fail the run
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Unit of work the scheduler drives: one attempt at one pull request
#[async_trait]
pub trait MergeTask: Send + Sync {
    /// Attempt the PR once; `tries_left` counts the attempts remaining after this one
    async fn attempt(&self, number: u64, tries_left: u32) -> TaskOutcome;
}

/// A queued merge attempt
///
/// Immutable: a retry produces a new record via [`RetryTask::next_try`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryTask {
    /// PR number
    pub number: u64,
    /// Attempts already made
    pub tries_so_far: u32,
}

impl RetryTask {
    /// First attempt at a PR
    pub const fn new(number: u64) -> Self {
        Self {
            number,
            tries_so_far: 0,
        }
    }

    /// The record for the following attempt
    #[must_use]
    pub const fn next_try(self) -> Self {
        Self {
            number: self.number,
            tries_so_far: self.tries_so_far + 1,
        }
    }
}

/// One attempt as it was performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptRecord {
    /// PR number
    pub number: u64,
    /// 1-based attempt number for this PR
    pub try_number: u32,
    /// Backoff waited before the attempt
    pub delay: Duration,
}

/// Everything the scheduler did, in order
#[derive(Debug, Clone, Default)]
pub struct SchedulerReport {
    /// Every attempt in execution order
    pub attempts: Vec<AttemptRecord>,
    /// Final outcome per task, in completion order
    pub outcomes: Vec<(u64, TaskOutcome)>,
}

impl SchedulerReport {
    /// Whether any task ended in failure
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|(_, outcome)| outcome.is_failure())
    }

    /// PR numbers whose task failed
    #[must_use]
    pub fn failed(&self) -> Vec<u64> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_failure())
            .map(|(number, _)| *number)
            .collect()
    }

    /// Final outcome for a PR, if it was processed
    #[must_use]
    pub fn outcome_for(&self, number: u64) -> Option<&TaskOutcome> {
        self.outcomes
            .iter()
            .find(|(n, _)| *n == number)
            .map(|(_, outcome)| outcome)
    }

    /// Number of attempts made for a PR
    #[must_use]
    pub fn attempts_for(&self, number: u64) -> usize {
        self.attempts.iter().filter(|a| a.number == number).count()
    }
}

/// FIFO retry queue owned by a single run
#[derive(Debug)]
pub struct RetryScheduler {
    queue: VecDeque<RetryTask>,
    settings: RetrySettings,
}

impl RetryScheduler {
    /// Queue a first attempt for each PR number
    pub fn new(numbers: impl IntoIterator<Item = u64>, settings: RetrySettings) -> Self {
        Self {
            queue: numbers.into_iter().map(RetryTask::new).collect(),
            settings,
        }
    }

    /// Tasks waiting to run
    pub fn pending(&self) -> impl Iterator<Item = &RetryTask> {
        self.queue.iter()
    }

    /// Delay before an attempt: none for the first, then `base * 2^tries_so_far`
    pub fn backoff_delay(&self, tries_so_far: u32) -> Duration {
        if tries_so_far == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(tries_so_far).unwrap_or(u32::MAX);
        self.settings.base_delay().saturating_mul(factor)
    }

    /// Attempts remaining after the one about to be made
    pub const fn tries_left(&self, task: &RetryTask) -> u32 {
        self.settings
            .max_tries
            .saturating_sub(1)
            .saturating_sub(task.tries_so_far)
    }

    /// Process the queue until it is empty
    pub async fn run(mut self, runner: &dyn MergeTask) -> SchedulerReport {
        let mut report = SchedulerReport::default();

        while let Some(task) = self.queue.pop_front() {
            let delay = self.backoff_delay(task.tries_so_far);
            if !delay.is_zero() {
                info!(
                    pr_number = task.number,
                    delay_secs = delay.as_secs(),
                    "Retrying pull request #{} in {}s",
                    task.number,
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
            }

            let outcome = runner.attempt(task.number, self.tries_left(&task)).await;
            report.attempts.push(AttemptRecord {
                number: task.number,
                try_number: task.tries_so_far + 1,
                delay,
            });

            match outcome {
                TaskOutcome::Retry(error) => {
                    let next = task.next_try();
                    if next.tries_so_far < self.settings.max_tries {
                        self.queue.push_back(next);
                    } else {
                        report.outcomes.push((task.number, TaskOutcome::Failed(error)));
                    }
                }
                other => report.outcomes.push((task.number, other)),
            }
        }

        report
    }
}
