//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use pr_automerge::error::{Error, Result};
use pr_automerge::platform::PlatformService;
use pr_automerge::types::{
    CheckRun, MergeRequest, MergeResult, PullRequestSnapshot, RepoContext, RepoMergeSettings,
    Review,
};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

/// Repository settings allowing every merge method
pub const ALL_METHODS_ALLOWED: RepoMergeSettings = RepoMergeSettings {
    allow_merge_commit: true,
    allow_squash: true,
    allow_rebase: true,
};

/// Simple mock platform service for testing
///
/// Features:
/// - Per-PR snapshot sequences (each fetch takes the next state, the last one sticks)
/// - Call tracking for verification
/// - Error injection for failure path testing
pub struct MockPlatformService {
    pull_requests: Mutex<HashMap<u64, VecDeque<PullRequestSnapshot>>>,
    required_checks: Mutex<HashMap<String, Vec<String>>>,
    check_runs: Mutex<HashMap<String, Vec<CheckRun>>>,
    reviews: Mutex<HashMap<u64, Vec<Review>>>,
    merge_settings: Mutex<RepoMergeSettings>,
    // Call tracking
    get_pr_calls: Mutex<Vec<u64>>,
    required_checks_calls: Mutex<Vec<String>>,
    check_runs_calls: Mutex<Vec<String>>,
    list_reviews_calls: Mutex<Vec<u64>>,
    merge_settings_calls: Mutex<usize>,
    merge_calls: Mutex<Vec<MergeRequest>>,
    delete_calls: Mutex<Vec<String>>,
    contexts: Mutex<Vec<RepoContext>>,
    // Error injection
    error_on_get_pr: Mutex<Option<String>>,
    error_on_merge: Mutex<Option<String>>,
    merge_failures: Mutex<VecDeque<String>>,
    error_on_delete: Mutex<Option<String>>,
}

impl Default for MockPlatformService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPlatformService {
    /// Create an empty mock; the repository allows every merge method
    pub fn new() -> Self {
        Self {
            pull_requests: Mutex::new(HashMap::new()),
            required_checks: Mutex::new(HashMap::new()),
            check_runs: Mutex::new(HashMap::new()),
            reviews: Mutex::new(HashMap::new()),
            merge_settings: Mutex::new(ALL_METHODS_ALLOWED),
            get_pr_calls: Mutex::new(Vec::new()),
            required_checks_calls: Mutex::new(Vec::new()),
            check_runs_calls: Mutex::new(Vec::new()),
            list_reviews_calls: Mutex::new(Vec::new()),
            merge_settings_calls: Mutex::new(0),
            merge_calls: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
            error_on_get_pr: Mutex::new(None),
            error_on_merge: Mutex::new(None),
            merge_failures: Mutex::new(VecDeque::new()),
            error_on_delete: Mutex::new(None),
        }
    }

    // === Response setup ===

    /// Set the snapshot returned for a PR
    pub fn set_pull_request(&self, snapshot: PullRequestSnapshot) {
        self.set_pull_request_states(vec![snapshot]);
    }

    /// Return these snapshots on successive fetches; the last one repeats
    pub fn set_pull_request_states(&self, states: Vec<PullRequestSnapshot>) {
        let number = states.first().expect("at least one state").number;
        self.pull_requests
            .lock()
            .unwrap()
            .insert(number, states.into_iter().collect());
    }

    /// Set the required checks for a base branch
    pub fn set_required_checks(&self, branch: &str, checks: &[&str]) {
        self.required_checks.lock().unwrap().insert(
            branch.to_string(),
            checks.iter().map(ToString::to_string).collect(),
        );
    }

    /// Set the check runs for a commit
    pub fn set_check_runs(&self, sha: &str, runs: Vec<CheckRun>) {
        self.check_runs.lock().unwrap().insert(sha.to_string(), runs);
    }

    /// Set the reviews for a PR
    pub fn set_reviews(&self, number: u64, reviews: Vec<Review>) {
        self.reviews.lock().unwrap().insert(number, reviews);
    }

    /// Set the repository merge settings
    pub fn set_merge_settings(&self, settings: RepoMergeSettings) {
        *self.merge_settings.lock().unwrap() = settings;
    }

    // === Error injection methods ===

    /// Make `get_pull_request` return an error
    pub fn fail_get_pr(&self, msg: &str) {
        *self.error_on_get_pr.lock().unwrap() = Some(msg.to_string());
    }

    /// Make every `merge_pull_request` call return an error
    pub fn fail_merge(&self, msg: &str) {
        *self.error_on_merge.lock().unwrap() = Some(msg.to_string());
    }

    /// Make the next `times` merge calls fail, then succeed
    pub fn fail_merge_times(&self, times: usize, msg: &str) {
        let mut failures = self.merge_failures.lock().unwrap();
        for _ in 0..times {
            failures.push_back(msg.to_string());
        }
    }

    /// Make `delete_branch` return an error
    pub fn fail_delete(&self, msg: &str) {
        *self.error_on_delete.lock().unwrap() = Some(msg.to_string());
    }

    // === Call verification methods ===

    /// PR numbers `get_pull_request` was called with
    pub fn get_pr_calls(&self) -> Vec<u64> {
        self.get_pr_calls.lock().unwrap().clone()
    }

    /// Branches `get_required_checks` was called with
    pub fn required_checks_calls(&self) -> Vec<String> {
        self.required_checks_calls.lock().unwrap().clone()
    }

    /// Commits `list_check_runs` was called with
    pub fn check_runs_calls(&self) -> Vec<String> {
        self.check_runs_calls.lock().unwrap().clone()
    }

    /// PR numbers `list_reviews` was called with
    pub fn list_reviews_calls(&self) -> Vec<u64> {
        self.list_reviews_calls.lock().unwrap().clone()
    }

    /// Number of `get_merge_settings` calls
    pub fn merge_settings_calls(&self) -> usize {
        *self.merge_settings_calls.lock().unwrap()
    }

    /// All `merge_pull_request` calls
    pub fn merge_calls(&self) -> Vec<MergeRequest> {
        self.merge_calls.lock().unwrap().clone()
    }

    /// Count of `merge_pull_request` calls
    pub fn merge_call_count(&self) -> usize {
        self.merge_calls.lock().unwrap().len()
    }

    /// Branches `delete_branch` was called with
    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    /// Repository contexts received by any call
    pub fn contexts(&self) -> Vec<RepoContext> {
        self.contexts.lock().unwrap().clone()
    }

    /// Assert that `merge_pull_request` was NOT called for a specific PR
    pub fn assert_merge_not_called(&self, number: u64) {
        let calls = self.merge_calls();
        assert!(
            !calls.iter().any(|c| c.number == number),
            "Expected merge_pull_request({number}) NOT to be called but it was: {calls:?}"
        );
    }

    fn record_context(&self, ctx: &RepoContext) {
        self.contexts.lock().unwrap().push(ctx.clone());
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn get_pull_request(
        &self,
        ctx: &RepoContext,
        number: u64,
    ) -> Result<PullRequestSnapshot> {
        self.record_context(ctx);
        self.get_pr_calls.lock().unwrap().push(number);

        if let Some(msg) = self.error_on_get_pr.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }

        let mut pull_requests = self.pull_requests.lock().unwrap();
        let states = pull_requests
            .get_mut(&number)
            .ok_or(Error::PullRequestNotFound(number))?;
        if states.len() > 1 {
            Ok(states.pop_front().expect("non-empty"))
        } else {
            states
                .front()
                .cloned()
                .ok_or(Error::PullRequestNotFound(number))
        }
    }

    async fn get_required_checks(&self, ctx: &RepoContext, branch: &str) -> Result<Vec<String>> {
        self.record_context(ctx);
        self.required_checks_calls
            .lock()
            .unwrap()
            .push(branch.to_string());
        let checks = self.required_checks.lock().unwrap();
        Ok(checks.get(branch).cloned().unwrap_or_default())
    }

    async fn list_check_runs(&self, ctx: &RepoContext, sha: &str) -> Result<Vec<CheckRun>> {
        self.record_context(ctx);
        self.check_runs_calls.lock().unwrap().push(sha.to_string());
        let runs = self.check_runs.lock().unwrap();
        Ok(runs.get(sha).cloned().unwrap_or_default())
    }

    async fn list_reviews(&self, ctx: &RepoContext, number: u64) -> Result<Vec<Review>> {
        self.record_context(ctx);
        self.list_reviews_calls.lock().unwrap().push(number);
        let reviews = self.reviews.lock().unwrap();
        Ok(reviews.get(&number).cloned().unwrap_or_default())
    }

    async fn get_merge_settings(&self, ctx: &RepoContext) -> Result<RepoMergeSettings> {
        self.record_context(ctx);
        *self.merge_settings_calls.lock().unwrap() += 1;
        Ok(*self.merge_settings.lock().unwrap())
    }

    async fn merge_pull_request(
        &self,
        ctx: &RepoContext,
        request: &MergeRequest,
    ) -> Result<MergeResult> {
        self.record_context(ctx);
        self.merge_calls.lock().unwrap().push(request.clone());

        if let Some(msg) = self.error_on_merge.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        if let Some(msg) = self.merge_failures.lock().unwrap().pop_front() {
            return Err(Error::Platform(msg));
        }

        Ok(MergeResult {
            merged: true,
            sha: Some(format!("merged_sha_{}", request.number)),
            message: None,
        })
    }

    async fn delete_branch(&self, ctx: &RepoContext, branch: &str) -> Result<()> {
        self.record_context(ctx);
        self.delete_calls.lock().unwrap().push(branch.to_string());

        if let Some(msg) = self.error_on_delete.lock().unwrap().as_ref() {
            return Err(Error::Platform(msg.clone()));
        }
        Ok(())
    }
}
