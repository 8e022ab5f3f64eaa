use serde::{Deserialize, Serialize};

use crate::ids::{BugRef, CveId, PatchRef, Sha};

/// A metadata reference expected to accompany a backported patch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    Cve(CveId),
    Bug(BugRef),
}

impl Reference {
    pub fn id(&self) -> &str {
        match self {
            Reference::Cve(c) => c.as_str(),
            Reference::Bug(b) => b.as_str(),
        }
    }
}

impl std::fmt::Display for Reference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Integer CVSS severity. Absence means "unknown", never zero.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CvssScore(pub u8);

impl CvssScore {
    pub fn value(self) -> u8 {
        self.0
    }
}

/// Maintenance tier of a branch, inferred from its name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tier {
    Extended,
    GeneralAvailability,
    LongTerm,
    Default,
}

/// Relationship of one branch to one fix. Detail rides on the variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BranchState {
    /// Fix already reached the branch (via its base or not applicable).
    Nope,
    /// Backport present with every requested reference.
    Ok,
    /// Backport present but some references missing (never empty).
    MissingReferences(Vec<Reference>),
    /// Branch carries an introducing commit and no backport.
    MissingPatch(Vec<Sha>),
    /// No backport and no Fixes: tag to prove applicability.
    MaybeMissingPatch,
}

impl BranchState {
    pub fn kind(&self) -> StateKind {
        match self {
            BranchState::Nope => StateKind::Nope,
            BranchState::Ok => StateKind::Ok,
            BranchState::MissingReferences(_) => StateKind::MissingReferences,
            BranchState::MissingPatch(_) => StateKind::MissingPatch,
            BranchState::MaybeMissingPatch => StateKind::MaybeMissingPatch,
        }
    }
}

/// Detail-free discriminant of `BranchState`, used for record comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StateKind {
    Nope,
    Ok,
    MissingReferences,
    MissingPatch,
    MaybeMissingPatch,
}

/// What the operator is asked to do for one surviving record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// Mandatory manual backport; carries the affecting introducers.
    ManualBackport(Vec<Sha>),
    /// Advisory: applicability could not be proven either way.
    ManualReview,
    /// Automatable: run the reference-adder against a known patch.
    RunReferenceAdder {
        patch: PatchRef,
        refs: Vec<Reference>,
    },
    /// References missing but no patch on file to point the adder at.
    ManualReferences(Vec<Reference>),
    /// Informational no-op, shown only in verbose mode.
    Nothing,
}
