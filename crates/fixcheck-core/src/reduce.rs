use crate::error::CoreError;
use crate::ledger::Ledger;
use crate::model::{CvssScore, Disposition, StateKind, Tier};
use crate::scope;
use crate::topology::BranchForest;
use crate::types::{Action, BranchStateRecord};

#[derive(Clone, Copy, Debug, Default)]
pub struct ReduceOptions {
    /// Known severity, if any. Unknown disables scoping entirely.
    pub cvss: Option<CvssScore>,
    /// Render every record as-is: no scoping, no merge suppression.
    pub flat: bool,
}

/// Second pass: walk the forest in configuration order and decide, per
/// branch, whether its record survives as an action. Requires the ledger
/// to be complete (one record per configured branch).
pub fn reduce(
    ledger: &Ledger,
    forest: &BranchForest,
    opts: ReduceOptions,
) -> Result<Vec<Action>, CoreError> {
    let mut actions = Vec::new();

    for branch in forest.branches() {
        let record = ledger
            .get(&branch.name)
            .ok_or_else(|| CoreError::UnknownBranch(branch.name.clone()))?;

        if opts.flat {
            actions.push(render(record, ledger));
            continue;
        }

        let tier = scope::classify(&branch.name);
        let kind = record.state.kind();

        // Severity scoping. Reference completeness is checked regardless
        // of score; everything else respects the tier threshold.
        if kind != StateKind::MissingReferences && !scope::in_scope(tier, opts.cvss) {
            continue;
        }

        // Extended maintenance does not track reference completeness.
        if tier == Tier::Extended && kind == StateKind::MissingReferences {
            continue;
        }

        let mut merge_found = false;
        for source in forest.merge_sources(&branch.name) {
            let Some(source_record) = ledger.get(source) else {
                continue;
            };
            let source_kind = source_record.state.kind();
            if source_kind != StateKind::MissingReferences
                && !scope::in_scope(scope::classify(source), opts.cvss)
            {
                continue;
            }
            if source_record.sha != record.sha {
                continue;
            }
            // Fix already present on the merge path, or the same problem
            // will be resolved there and arrive here by merge.
            if source_kind == StateKind::Ok || source_kind == kind {
                merge_found = true;
                break;
            }
        }
        if merge_found {
            continue;
        }

        actions.push(render(record, ledger));
    }

    Ok(actions)
}

/// Map one record to its disposition. The state space is closed; a new
/// variant fails to compile here rather than slipping through rendering.
fn render(record: &BranchStateRecord, ledger: &Ledger) -> Action {
    use crate::model::BranchState;

    let disposition = match &record.state {
        BranchState::Nope | BranchState::Ok => Disposition::Nothing,
        BranchState::MaybeMissingPatch => Disposition::ManualReview,
        BranchState::MissingPatch(introducers) => {
            Disposition::ManualBackport(introducers.clone())
        }
        BranchState::MissingReferences(refs) => match ledger.patch(&record.branch) {
            Some(patch) => Disposition::RunReferenceAdder {
                patch: patch.clone(),
                refs: refs.clone(),
            },
            None => Disposition::ManualReferences(refs.clone()),
        },
    };

    Action {
        branch: record.branch.clone(),
        sha: record.sha.clone(),
        disposition,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{BaseVersion, BranchName, BugRef, PatchRef, Sha};
    use crate::model::{BranchState, Reference};
    use crate::topology::Branch;

    fn forest(layout: &[(&str, &[&str])]) -> BranchForest {
        let branches = layout
            .iter()
            .map(|(name, merge)| Branch {
                name: BranchName::from_str(*name),
                base: BaseVersion::from_str("v6.0"),
                merge_sources: merge.iter().map(|m| BranchName::from_str(*m)).collect(),
            })
            .collect();
        BranchForest::new(branches).unwrap()
    }

    fn record(branch: &str, state: BranchState) -> BranchStateRecord {
        BranchStateRecord {
            branch: BranchName::from_str(branch),
            sha: Sha::from_str("fix1"),
            state,
        }
    }

    fn missing_patch() -> BranchState {
        BranchState::MissingPatch(vec![Sha::from_str("bug1")])
    }

    #[test]
    fn merge_source_ok_subsumes_missing_patch() {
        let forest = forest(&[("base", &[]), ("derived", &["base"])]);
        let mut ledger = Ledger::new();
        ledger.append(record("base", BranchState::Ok), None).unwrap();
        ledger.append(record("derived", missing_patch()), None).unwrap();

        let actions = reduce(&ledger, &forest, ReduceOptions::default()).unwrap();
        let mandatory: Vec<_> = actions.iter().filter(|a| a.mandatory()).collect();
        assert_eq!(mandatory.len(), 0);
    }

    #[test]
    fn identical_unresolved_state_in_merge_source_suppresses() {
        let forest = forest(&[("base", &[]), ("derived", &["base"])]);
        let mut ledger = Ledger::new();
        ledger.append(record("base", missing_patch()), None).unwrap();
        ledger.append(record("derived", missing_patch()), None).unwrap();

        let actions = reduce(&ledger, &forest, ReduceOptions::default()).unwrap();
        let branches: Vec<_> = actions.iter().map(|a| a.branch.as_str()).collect();
        assert_eq!(branches, vec!["base"]);
    }

    #[test]
    fn different_sha_in_merge_source_does_not_suppress() {
        let forest = forest(&[("base", &[]), ("derived", &["base"])]);
        let mut ledger = Ledger::new();
        ledger
            .append(
                BranchStateRecord {
                    branch: BranchName::from_str("base"),
                    sha: Sha::from_str("other"),
                    state: BranchState::Ok,
                },
                None,
            )
            .unwrap();
        ledger.append(record("derived", missing_patch()), None).unwrap();

        let actions = reduce(&ledger, &forest, ReduceOptions::default()).unwrap();
        assert!(actions.iter().any(|a| a.branch.as_str() == "derived" && a.mandatory()));
    }

    #[test]
    fn flat_mode_ignores_merge_sources_and_cvss() {
        let forest = forest(&[("base", &[]), ("derived-ltss", &["base"])]);
        let mut ledger = Ledger::new();
        ledger.append(record("base", BranchState::Ok), None).unwrap();
        ledger.append(record("derived-ltss", missing_patch()), None).unwrap();

        let opts = ReduceOptions { cvss: Some(CvssScore(3)), flat: true };
        let actions = reduce(&ledger, &forest, opts).unwrap();
        assert_eq!(actions.len(), 2);
        assert!(actions.iter().any(|a| a.branch.as_str() == "derived-ltss" && a.mandatory()));
    }

    #[test]
    fn low_cvss_suppresses_ltss_but_not_default_tier() {
        let forest = forest(&[("plain", &[]), ("old-ltss", &[])]);
        let mut ledger = Ledger::new();
        ledger.append(record("plain", missing_patch()), None).unwrap();
        ledger.append(record("old-ltss", missing_patch()), None).unwrap();

        let low = ReduceOptions { cvss: Some(CvssScore(6)), flat: false };
        let actions = reduce(&ledger, &forest, low).unwrap();
        let branches: Vec<_> = actions.iter().map(|a| a.branch.as_str()).collect();
        assert_eq!(branches, vec!["plain"]);

        let high = ReduceOptions { cvss: Some(CvssScore(8)), flat: false };
        let actions = reduce(&ledger, &forest, high).unwrap();
        assert_eq!(actions.len(), 2);
    }

    #[test]
    fn missing_references_bypass_cvss_scoping() {
        let forest = forest(&[("old-ltss", &[])]);
        let mut ledger = Ledger::new();
        let refs = vec![Reference::Bug(BugRef::from_str("bsc#222"))];
        ledger
            .append(
                record("old-ltss", BranchState::MissingReferences(refs.clone())),
                Some(PatchRef::from_str("patches/fix1.patch")),
            )
            .unwrap();

        let opts = ReduceOptions { cvss: Some(CvssScore(2)), flat: false };
        let actions = reduce(&ledger, &forest, opts).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(
            actions[0].disposition,
            Disposition::RunReferenceAdder {
                patch: PatchRef::from_str("patches/fix1.patch"),
                refs,
            }
        );
    }

    #[test]
    fn extended_tier_does_not_track_references() {
        let forest = forest(&[("legacy-eb", &[])]);
        let mut ledger = Ledger::new();
        let refs = vec![Reference::Bug(BugRef::from_str("bsc#222"))];
        ledger
            .append(record("legacy-eb", BranchState::MissingReferences(refs)), None)
            .unwrap();

        let actions = reduce(&ledger, &forest, ReduceOptions::default()).unwrap();
        assert!(actions.is_empty());
    }

    #[test]
    fn missing_references_without_patch_renders_manual_instruction() {
        let forest = forest(&[("b", &[])]);
        let mut ledger = Ledger::new();
        let refs = vec![Reference::Bug(BugRef::from_str("bsc#222"))];
        ledger
            .append(record("b", BranchState::MissingReferences(refs.clone())), None)
            .unwrap();

        let actions = reduce(&ledger, &forest, ReduceOptions::default()).unwrap();
        assert_eq!(actions[0].disposition, Disposition::ManualReferences(refs));
    }

    #[test]
    fn missing_ledger_record_is_an_invariant_violation() {
        let forest = forest(&[("b", &[])]);
        let ledger = Ledger::new();
        let err = reduce(&ledger, &forest, ReduceOptions::default()).unwrap_err();
        assert_eq!(err, CoreError::UnknownBranch(BranchName::from_str("b")));
    }

    #[test]
    fn suppressed_merge_source_does_not_subsume() {
        // The merge-source is itself out of severity scope, so its record
        // must not count as the fix arriving by merge.
        let forest = forest(&[("old-ltss", &[]), ("derived", &["old-ltss"])]);
        let mut ledger = Ledger::new();
        ledger.append(record("old-ltss", missing_patch()), None).unwrap();
        ledger.append(record("derived", missing_patch()), None).unwrap();

        let opts = ReduceOptions { cvss: Some(CvssScore(6)), flat: false };
        let actions = reduce(&ledger, &forest, opts).unwrap();
        let branches: Vec<_> = actions.iter().map(|a| a.branch.as_str()).collect();
        assert_eq!(branches, vec!["derived"]);
    }
}
