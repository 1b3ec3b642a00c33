//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::PlatformService;
use crate::types::{
    AuthorAssociation, CheckRun, MergeMethod, MergeRequest, MergeResult, MergeableState, PrState,
    PullRequestSnapshot, RepoContext, RepoMergeSettings, Review, ReviewState,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Page size used for list endpoints
const PER_PAGE: u8 = 100;

// REST response types. Only the fields the merge engine reads are declared.

#[derive(Deserialize)]
struct ApiUser {
    login: String,
}

#[derive(Deserialize)]
struct ApiLabel {
    name: Option<String>,
}

#[derive(Deserialize)]
struct ApiRef {
    #[serde(rename = "ref")]
    ref_field: String,
    sha: String,
}

#[derive(Deserialize)]
struct ApiPullRequest {
    number: u64,
    #[serde(default)]
    title: Option<String>,
    state: PrState,
    #[serde(default)]
    merged: Option<bool>,
    #[serde(default)]
    merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    user: Option<ApiUser>,
    #[serde(default)]
    author_association: Option<AuthorAssociation>,
    #[serde(default)]
    labels: Vec<ApiLabel>,
    #[serde(default)]
    mergeable_state: Option<MergeableState>,
    base: ApiRef,
    head: ApiRef,
}

impl From<ApiPullRequest> for PullRequestSnapshot {
    fn from(pr: ApiPullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title.unwrap_or_default(),
            state: pr.state,
            merged: pr.merged.unwrap_or(false) || pr.merged_at.is_some(),
            author: pr.user.map(|u| u.login),
            author_association: pr.author_association,
            labels: pr.labels.into_iter().filter_map(|l| l.name).collect(),
            mergeable_state: pr.mergeable_state,
            base_branch: pr.base.ref_field,
            head_branch: pr.head.ref_field,
            head_sha: pr.head.sha,
        }
    }
}

#[derive(Deserialize)]
struct ApiReview {
    id: u64,
    #[serde(default)]
    user: Option<ApiUser>,
    #[serde(default)]
    author_association: Option<AuthorAssociation>,
    state: ReviewState,
    #[serde(default)]
    commit_id: Option<String>,
    #[serde(default)]
    submitted_at: Option<DateTime<Utc>>,
}

impl From<ApiReview> for Review {
    fn from(review: ApiReview) -> Self {
        Self {
            id: review.id,
            author: review.user.map(|u| u.login),
            author_association: review.author_association,
            state: review.state,
            commit_id: review.commit_id,
            submitted_at: review.submitted_at,
        }
    }
}

#[derive(Deserialize, Default)]
struct ApiRequiredStatusChecks {
    #[serde(default)]
    contexts: Vec<String>,
}

#[derive(Deserialize, Default)]
struct ApiProtection {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    required_status_checks: Option<ApiRequiredStatusChecks>,
}

#[derive(Deserialize)]
struct ApiBranch {
    #[serde(default)]
    protected: bool,
    #[serde(default)]
    protection: Option<ApiProtection>,
}

#[derive(Deserialize)]
struct ApiCheckRuns {
    total_count: usize,
    check_runs: Vec<CheckRun>,
}

#[derive(Deserialize)]
struct ApiRepository {
    #[serde(default)]
    allow_merge_commit: Option<bool>,
    #[serde(default)]
    allow_squash_merge: Option<bool>,
    #[serde(default)]
    allow_rebase_merge: Option<bool>,
}

#[derive(Serialize)]
struct PageParams {
    per_page: u8,
    page: u32,
}

/// GitHub service using octocrab
pub struct GitHubService {
    client: Octocrab,
}

impl GitHubService {
    /// Create a new GitHub service
    ///
    /// `api_url` overrides the REST base URL (GitHub Enterprise, tests).
    pub fn new(token: &str, api_url: Option<&str>) -> Result<Self> {
        let mut builder = Octocrab::builder().personal_token(token.to_string());

        if let Some(url) = api_url {
            builder = builder
                .base_uri(url)
                .map_err(|e| Error::GitHubApi(e.to_string()))?;
        }

        let client = builder
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn get_pull_request(
        &self,
        ctx: &RepoContext,
        number: u64,
    ) -> Result<PullRequestSnapshot> {
        debug!(pr_number = number, "getting pull request");
        let route = format!("/repos/{}/{}/pulls/{number}", ctx.owner, ctx.repo);

        let pr: ApiPullRequest = match self.client.get(route, None::<&()>).await {
            Ok(pr) => pr,
            Err(octocrab::Error::GitHub { source, .. }) if source.status_code.as_u16() == 404 => {
                return Err(Error::PullRequestNotFound(number));
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot = PullRequestSnapshot::from(pr);
        debug!(
            pr_number = number,
            state = %snapshot.state,
            merged = snapshot.merged,
            "got pull request"
        );
        Ok(snapshot)
    }

    async fn get_required_checks(&self, ctx: &RepoContext, branch: &str) -> Result<Vec<String>> {
        debug!(branch, "getting branch protection");
        let route = format!(
            "/repos/{}/{}/branches/{}",
            ctx.owner,
            ctx.repo,
            urlencoding::encode(branch)
        );

        let branch_info: ApiBranch = self.client.get(route, None::<&()>).await?;

        let protection = branch_info.protection.unwrap_or_default();
        if !(branch_info.protected && protection.enabled) {
            debug!(branch, "branch protection disabled");
            return Ok(Vec::new());
        }

        let contexts = protection
            .required_status_checks
            .unwrap_or_default()
            .contexts;
        debug!(branch, count = contexts.len(), "got required checks");
        Ok(contexts)
    }

    async fn list_check_runs(&self, ctx: &RepoContext, sha: &str) -> Result<Vec<CheckRun>> {
        debug!(sha, "listing check runs");
        let route = format!("/repos/{}/{}/commits/{sha}/check-runs", ctx.owner, ctx.repo);

        let mut runs = Vec::new();
        for page in 1.. {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let response: ApiCheckRuns = self.client.get(&route, Some(&params)).await?;
            let received = response.check_runs.len();
            runs.extend(response.check_runs);

            if received == 0 || runs.len() >= response.total_count {
                break;
            }
        }

        debug!(sha, count = runs.len(), "listed check runs");
        Ok(runs)
    }

    async fn list_reviews(&self, ctx: &RepoContext, number: u64) -> Result<Vec<Review>> {
        debug!(pr_number = number, "listing reviews");
        let route = format!("/repos/{}/{}/pulls/{number}/reviews", ctx.owner, ctx.repo);

        let mut reviews = Vec::new();
        for page in 1.. {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<ApiReview> = self.client.get(&route, Some(&params)).await?;
            let received = batch.len();
            reviews.extend(batch.into_iter().map(Review::from));

            if received < usize::from(PER_PAGE) {
                break;
            }
        }

        debug!(pr_number = number, count = reviews.len(), "listed reviews");
        Ok(reviews)
    }

    async fn get_merge_settings(&self, ctx: &RepoContext) -> Result<RepoMergeSettings> {
        debug!(repo = %ctx, "getting repository merge settings");
        let route = format!("/repos/{}/{}", ctx.owner, ctx.repo);

        let repo: ApiRepository = self.client.get(route, None::<&()>).await?;

        Ok(RepoMergeSettings {
            allow_merge_commit: repo.allow_merge_commit == Some(true),
            allow_squash: repo.allow_squash_merge == Some(true),
            allow_rebase: repo.allow_rebase_merge == Some(true),
        })
    }

    async fn merge_pull_request(
        &self,
        ctx: &RepoContext,
        request: &MergeRequest,
    ) -> Result<MergeResult> {
        debug!(pr_number = request.number, method = ?request.method, "merging PR");

        let pulls = self.client.pulls(&ctx.owner, &ctx.repo);
        let mut builder = pulls.merge(request.number).sha(request.sha.clone());

        if let Some(method) = request.method {
            builder = builder.method(match method {
                MergeMethod::Merge => octocrab::params::pulls::MergeMethod::Merge,
                MergeMethod::Squash => octocrab::params::pulls::MergeMethod::Squash,
                MergeMethod::Rebase => octocrab::params::pulls::MergeMethod::Rebase,
            });
        }
        if let Some(ref title) = request.commit_title {
            builder = builder.title(title.clone());
        }
        if let Some(ref message) = request.commit_message {
            builder = builder.message(message.clone());
        }

        let result = builder
            .send()
            .await
            .map_err(|e| Error::GitHubApi(format!("Merge failed: {}", Error::from(e))))?;

        let merge_result = MergeResult {
            merged: result.merged,
            sha: result.sha,
            message: result.message,
        };

        debug!(
            pr_number = request.number,
            merged = merge_result.merged,
            sha = ?merge_result.sha,
            "merge complete"
        );
        Ok(merge_result)
    }

    async fn delete_branch(&self, ctx: &RepoContext, branch: &str) -> Result<()> {
        debug!(branch, "deleting branch");
        self.client
            .repos(&ctx.owner, &ctx.repo)
            .delete_ref(&octocrab::params::repos::Reference::Branch(
                branch.to_string(),
            ))
            .await?;
        debug!(branch, "deleted branch");
        Ok(())
    }
}
