//! Review consensus - pure reduction of raw reviews to one verdict per reviewer
//!
//! No I/O happens here; the caller fetches reviews and passes them in.

use crate::config::TRUSTED_AUTOMATION_LOGIN;
use crate::types::{AuthorAssociation, Review, ReviewState};
use tracing::debug;

/// Whether an author passes an association allowlist
///
/// The trusted automation account is always allowed; an author without a
/// known association never is.
pub fn is_author_allowed(
    login: Option<&str>,
    association: Option<&AuthorAssociation>,
    allowed: &[AuthorAssociation],
) -> bool {
    if login == Some(TRUSTED_AUTOMATION_LOGIN) {
        return true;
    }
    association.is_some_and(|a| allowed.contains(a))
}

const fn is_relevant(review: &Review) -> bool {
    matches!(
        review.state,
        ReviewState::Approved | ReviewState::ChangesRequested
    )
}

/// Reduce reviews to the latest relevant review per reviewer (PURE)
///
/// Keeps approvals and change requests submitted against `commit` by allowed
/// reviewers, then keeps only each reviewer's most recent one. The result is
/// in ascending submission order with at most one review per author.
pub fn relevant_reviews_for_commit(
    reviews: &[Review],
    allowed: &[AuthorAssociation],
    commit: &str,
) -> Vec<Review> {
    let mut relevant: Vec<&Review> = reviews
        .iter()
        .filter(|review| review.commit_id.as_deref() == Some(commit))
        .filter(|review| {
            if !is_relevant(review) {
                debug!(review_id = review.id, commit, "review is not relevant");
                return false;
            }
            if !is_author_allowed(
                review.author.as_deref(),
                review.author_association.as_ref(),
                allowed,
            ) {
                debug!(
                    review_id = review.id,
                    author = review.author.as_deref().unwrap_or("<unknown>"),
                    association = ?review.author_association,
                    commit,
                    "review author is not allowed"
                );
                return false;
            }
            true
        })
        .collect();

    // Newest first. Undated reviews rank as oldest and keep their relative order.
    relevant.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    let mut latest: Vec<Review> = Vec::new();
    for review in relevant {
        let seen = review.author.as_deref().is_some_and(|login| {
            latest
                .iter()
                .any(|kept| kept.author.as_deref() == Some(login))
        });
        if !seen {
            latest.push(review.clone());
        }
    }

    latest.reverse();
    latest
}

/// Tally of the latest verdicts on a commit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    /// Reviewers whose latest verdict is an approval
    pub approvals: usize,
    /// Reviewers whose latest verdict requests changes
    pub changes_requested: Vec<String>,
}

impl ReviewSummary {
    /// Summarize the output of [`relevant_reviews_for_commit`]
    pub fn from_reviews(reviews: &[Review]) -> Self {
        let mut summary = Self::default();
        for review in reviews {
            match review.state {
                ReviewState::Approved => summary.approvals += 1,
                ReviewState::ChangesRequested => summary.changes_requested.push(
                    review
                        .author
                        .clone()
                        .unwrap_or_else(|| format!("review {}", review.id)),
                ),
                ReviewState::Other(_) => {}
            }
        }
        summary
    }
}
