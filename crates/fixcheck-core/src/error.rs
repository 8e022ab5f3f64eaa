use thiserror::Error;

use crate::ids::BranchName;

/// Closed-invariant violations. These signal caller bugs, not data
/// problems, and abort the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("evaluate called without a {0}")]
    Contract(&'static str),

    #[error("duplicate state record for branch {0}")]
    DuplicateRecord(BranchName),

    #[error("no state record for branch {0}")]
    UnknownBranch(BranchName),

    #[error("duplicate branch {0} in topology")]
    DuplicateBranch(BranchName),
}
