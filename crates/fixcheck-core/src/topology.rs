use std::collections::HashMap;

use crate::error::CoreError;
use crate::ids::{BaseVersion, BranchName};

/// A maintained branch as configured: its upstream base version and the
/// branches it integrates by merge.
#[derive(Clone, Debug)]
pub struct Branch {
    pub name: BranchName,
    pub base: BaseVersion,
    pub merge_sources: Vec<BranchName>,
}

/// The branch forest, built once from configuration and read-only during
/// evaluation and reduction. Iteration order is configuration order.
#[derive(Clone, Debug, Default)]
pub struct BranchForest {
    branches: Vec<Branch>,
    index: HashMap<BranchName, usize>,
}

impl BranchForest {
    pub fn new(branches: Vec<Branch>) -> Result<Self, CoreError> {
        let mut index = HashMap::new();
        for (i, b) in branches.iter().enumerate() {
            if index.insert(b.name.clone(), i).is_some() {
                return Err(CoreError::DuplicateBranch(b.name.clone()));
            }
        }
        Ok(Self { branches, index })
    }

    pub fn branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter()
    }

    pub fn get(&self, name: &BranchName) -> Option<&Branch> {
        self.index.get(name).map(|&i| &self.branches[i])
    }

    /// Direct merge-sources only; suppression does not chase transitive
    /// sources (see DESIGN.md).
    pub fn merge_sources(&self, name: &BranchName) -> &[BranchName] {
        self.get(name).map(|b| b.merge_sources.as_slice()).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.branches.is_empty()
    }
}
