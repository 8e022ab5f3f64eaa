use std::collections::HashMap;

use crate::error::CoreError;
use crate::ids::{BranchName, PatchRef};
use crate::types::BranchStateRecord;

/// Append-only store of per-branch records for one run: one record per
/// branch, written once during the evaluation pass and read-only during
/// reduction. Also keeps the per-branch patch location when a backport was
/// found, so reference-fixups can name it.
#[derive(Debug, Default)]
pub struct Ledger {
    records: Vec<BranchStateRecord>,
    index: HashMap<BranchName, usize>,
    patches: HashMap<BranchName, PatchRef>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(
        &mut self,
        record: BranchStateRecord,
        patch: Option<PatchRef>,
    ) -> Result<(), CoreError> {
        if self.index.contains_key(&record.branch) {
            return Err(CoreError::DuplicateRecord(record.branch.clone()));
        }
        self.index.insert(record.branch.clone(), self.records.len());
        if let Some(p) = patch {
            self.patches.insert(record.branch.clone(), p);
        }
        self.records.push(record);
        Ok(())
    }

    pub fn get(&self, branch: &BranchName) -> Option<&BranchStateRecord> {
        self.index.get(branch).map(|&i| &self.records[i])
    }

    pub fn patch(&self, branch: &BranchName) -> Option<&PatchRef> {
        self.patches.get(branch)
    }

    /// Records in append (branch-iteration) order.
    pub fn records(&self) -> &[BranchStateRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
