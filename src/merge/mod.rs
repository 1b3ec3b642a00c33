//! Merge engine
//!
//! Pure decision functions and effectful steps are kept apart:
//! 1. Resolve - review consensus and eligibility gates (pure helpers)
//! 2. Evaluate - fetch a fresh snapshot and run the gates (effectful)
//! 3. Execute - merge, then best-effort branch cleanup (effectful)
//! 4. Schedule - FIFO retries with exponential backoff

mod automerge;
mod eligibility;
mod execute;
mod method;
mod reviews;
mod scheduler;

pub use automerge::Automerger;
pub use eligibility::{
    Eligibility, Rejection, blocking_labels, check_mergeable_state, check_snapshot, evaluate,
    missing_required_checks,
};
pub use execute::{
    BranchCleanup, MergeOutcome, build_merge_request, delete_head_branch, execute_merge,
};
pub use method::{determine_merge_method, method_from_settings};
pub use reviews::{ReviewSummary, is_author_allowed, relevant_reviews_for_commit};
pub use scheduler::{
    AttemptRecord, MergeTask, RetryScheduler, RetryTask, SchedulerReport, TaskOutcome,
};
