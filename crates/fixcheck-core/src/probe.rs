use crate::ids::{BaseVersion, BranchName, PatchRef, Sha};
use crate::model::Reference;

/// Queries against upstream history. Implementations may cache; calls are
/// idempotent.
pub trait UpstreamQuery: Send + Sync {
    /// Expand and verify a commit id upstream. None if it does not exist.
    fn resolve_commit(&self, sha: &Sha) -> anyhow::Result<Option<Sha>>;

    /// Is `sha` already reachable from the `base` tag in upstream history.
    fn merged_before(&self, sha: &Sha, base: &BaseVersion) -> anyhow::Result<bool>;

    /// The commits the fix itself declares it corrects (Fixes: tags).
    fn fixes_tags(&self, sha: &Sha) -> anyhow::Result<Vec<Sha>>;
}

/// Queries against one maintained branch's patch stack.
pub trait BranchQuery: Send + Sync {
    /// Locate a backport of `sha` in `branch`, if one exists.
    fn find_backport(&self, branch: &BranchName, sha: &Sha) -> anyhow::Result<Option<PatchRef>>;

    /// Does the given patch in `branch` carry `reference`.
    fn patch_has_reference(
        &self,
        branch: &BranchName,
        patch: &PatchRef,
        reference: &Reference,
    ) -> anyhow::Result<bool>;
}
