use crate::ids::{BranchName, BugRef, CveId, Sha};
use crate::model::{BranchState, CvssScore, Disposition, Reference};

/// An upstream fix, resolved once per run and immutable afterwards.
#[derive(Clone, Debug)]
pub struct Fix {
    pub sha: Sha,
    pub cve: Option<CveId>,
    pub bug: Option<BugRef>,
    pub cvss: Option<CvssScore>,
}

impl Fix {
    /// The references every backport of this fix is expected to carry.
    /// Unset ones are simply not requested.
    pub fn references(&self) -> Vec<Reference> {
        let mut refs = Vec::new();
        if let Some(cve) = &self.cve {
            refs.push(Reference::Cve(cve.clone()));
        }
        if let Some(bug) = &self.bug {
            refs.push(Reference::Bug(bug.clone()));
        }
        refs
    }
}

/// One branch's relationship to one fix. Exactly one per branch per run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchStateRecord {
    pub branch: BranchName,
    pub sha: Sha,
    pub state: BranchState,
}

/// A rendered decision for one branch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Action {
    pub branch: BranchName,
    pub sha: Sha,
    pub disposition: Disposition,
}

impl Action {
    /// Whether the operator must do something (anything but `Nothing`).
    pub fn mandatory(&self) -> bool {
        !matches!(self.disposition, Disposition::Nothing)
    }
}
