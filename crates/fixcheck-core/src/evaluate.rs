use anyhow::Result;

use crate::error::CoreError;
use crate::ids::{PatchRef, Sha};
use crate::model::{BranchState, Reference};
use crate::probe::{BranchQuery, UpstreamQuery};
use crate::topology::Branch;
use crate::types::BranchStateRecord;

/// Result of evaluating one (branch, fix) pair. The patch is carried
/// separately so the ledger can hand it to reference-fixups later.
#[derive(Clone, Debug)]
pub struct Evaluation {
    pub record: BranchStateRecord,
    pub patch: Option<PatchRef>,
}

/// Compute one branch's state for one fix.
///
/// Query order matters: a fix already reachable from the branch base ends
/// evaluation immediately, before any patch-stack queries are issued.
pub fn evaluate(
    upstream: &dyn UpstreamQuery,
    probe: &dyn BranchQuery,
    branch: &Branch,
    sha: &Sha,
    references: &[Reference],
) -> Result<Evaluation> {
    if branch.name.as_str().is_empty() {
        return Err(CoreError::Contract("branch").into());
    }
    if sha.as_str().is_empty() {
        return Err(CoreError::Contract("sha").into());
    }

    if upstream.merged_before(sha, &branch.base)? {
        return Ok(done(branch, sha, BranchState::Nope, None));
    }

    if let Some(patch) = probe.find_backport(&branch.name, sha)? {
        let mut missing = Vec::new();
        for reference in references {
            if !probe.patch_has_reference(&branch.name, &patch, reference)? {
                missing.push(reference.clone());
            }
        }
        let state = if missing.is_empty() {
            BranchState::Ok
        } else {
            BranchState::MissingReferences(missing)
        };
        return Ok(done(branch, sha, state, Some(patch)));
    }

    let introducers = upstream.fixes_tags(sha)?;
    if introducers.is_empty() {
        // Cannot prove applicability either way; flag for manual review.
        return Ok(done(branch, sha, BranchState::MaybeMissingPatch, None));
    }

    let mut affecting = Vec::new();
    for intro in introducers {
        // An introducer reaches the branch via its base version or as a
        // backport of its own.
        let present = upstream.merged_before(&intro, &branch.base)?
            || probe.find_backport(&branch.name, &intro)?.is_some();
        if present {
            affecting.push(intro);
        }
    }
    let state = if affecting.is_empty() {
        BranchState::Nope
    } else {
        BranchState::MissingPatch(affecting)
    };
    Ok(done(branch, sha, state, None))
}

fn done(branch: &Branch, sha: &Sha, state: BranchState, patch: Option<PatchRef>) -> Evaluation {
    Evaluation {
        record: BranchStateRecord {
            branch: branch.name.clone(),
            sha: sha.clone(),
            state,
        },
        patch,
    }
}
