//! Merge method selection

use crate::config::MergePolicy;
use crate::error::Result;
use crate::platform::PlatformService;
use crate::types::{MergeMethod, RepoContext, RepoMergeSettings};

/// Pick a method from repository settings: merge > squash > rebase (PURE)
pub const fn method_from_settings(settings: &RepoMergeSettings) -> Option<MergeMethod> {
    if settings.allow_merge_commit {
        Some(MergeMethod::Merge)
    } else if settings.allow_squash {
        Some(MergeMethod::Squash)
    } else if settings.allow_rebase {
        Some(MergeMethod::Rebase)
    } else {
        None
    }
}

/// Resolve the merge method for the next merge call
///
/// An explicit policy method is used as-is, without checking it against the
/// repository settings. `None` means the repository allows no method; the
/// merge call is still made and is expected to fail.
pub async fn determine_merge_method(
    platform: &dyn PlatformService,
    ctx: &RepoContext,
    policy: &MergePolicy,
) -> Result<Option<MergeMethod>> {
    if let Some(method) = policy.merge_method {
        return Ok(Some(method));
    }

    let settings = platform.get_merge_settings(ctx).await?;
    Ok(method_from_settings(&settings))
}
