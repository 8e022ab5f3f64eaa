use std::collections::{HashMap, HashSet};

use crate::ids::{BaseVersion, BranchName, PatchRef, Sha};
use crate::model::Reference;
use crate::probe::{BranchQuery, UpstreamQuery};

/// In-memory upstream history for tests. Not a real repo, but enough to
/// drive the evaluator and runner deterministically.
#[derive(Debug, Default)]
pub struct InMemoryUpstream {
    commits: HashSet<String>,
    merged: HashSet<(String, String)>,
    fixes: HashMap<String, Vec<Sha>>,
}

impl InMemoryUpstream {
    pub fn commit(&mut self, sha: &str) {
        self.commits.insert(sha.to_string());
    }

    /// Declare `sha` reachable from the `base` tag.
    pub fn merged(&mut self, sha: &str, base: &str) {
        self.commits.insert(sha.to_string());
        self.merged.insert((sha.to_string(), base.to_string()));
    }

    /// Declare that `sha` carries a `Fixes: intro` tag.
    pub fn fixes_tag(&mut self, sha: &str, intro: &str) {
        self.commits.insert(sha.to_string());
        self.fixes
            .entry(sha.to_string())
            .or_default()
            .push(Sha::from_str(intro));
    }
}

impl UpstreamQuery for InMemoryUpstream {
    fn resolve_commit(&self, sha: &Sha) -> anyhow::Result<Option<Sha>> {
        Ok(self.commits.contains(sha.as_str()).then(|| sha.clone()))
    }

    fn merged_before(&self, sha: &Sha, base: &BaseVersion) -> anyhow::Result<bool> {
        Ok(self
            .merged
            .contains(&(sha.as_str().to_string(), base.as_str().to_string())))
    }

    fn fixes_tags(&self, sha: &Sha) -> anyhow::Result<Vec<Sha>> {
        Ok(self.fixes.get(sha.as_str()).cloned().unwrap_or_default())
    }
}

/// In-memory patch stacks for tests.
#[derive(Debug, Default)]
pub struct InMemoryProbe {
    backports: HashMap<(String, String), PatchRef>,
    references: HashMap<(String, String), HashSet<String>>,
}

impl InMemoryProbe {
    /// Declare that `branch` carries a backport of `sha` at `patch`.
    pub fn backport(&mut self, branch: &str, sha: &str, patch: &str) {
        self.backports.insert(
            (branch.to_string(), sha.to_string()),
            PatchRef::from_str(patch),
        );
    }

    /// Declare that `patch` in `branch` carries the given reference id.
    pub fn with_reference(&mut self, branch: &str, patch: &str, reference: &str) {
        self.references
            .entry((branch.to_string(), patch.to_string()))
            .or_default()
            .insert(reference.to_string());
    }
}

impl BranchQuery for InMemoryProbe {
    fn find_backport(&self, branch: &BranchName, sha: &Sha) -> anyhow::Result<Option<PatchRef>> {
        Ok(self
            .backports
            .get(&(branch.as_str().to_string(), sha.as_str().to_string()))
            .cloned())
    }

    fn patch_has_reference(
        &self,
        branch: &BranchName,
        patch: &PatchRef,
        reference: &Reference,
    ) -> anyhow::Result<bool> {
        Ok(self
            .references
            .get(&(branch.as_str().to_string(), patch.as_str().to_string()))
            .map(|set| set.contains(reference.id()))
            .unwrap_or(false))
    }
}
