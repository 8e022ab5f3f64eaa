use fixcheck_core::{
    evaluate, reduce, BaseVersion, Branch, BranchForest, BranchName, BranchState, BugRef,
    CveId, CvssScore, Disposition, Ledger, PatchRef, Reference, ReduceOptions, Sha,
};
use fixcheck_core::memory::{InMemoryProbe, InMemoryUpstream};

fn branch(name: &str, base: &str, merge: &[&str]) -> Branch {
    Branch {
        name: BranchName::from_str(name),
        base: BaseVersion::from_str(base),
        merge_sources: merge.iter().map(|m| BranchName::from_str(*m)).collect(),
    }
}

fn run_both_passes(
    forest: &BranchForest,
    upstream: &InMemoryUpstream,
    probe: &InMemoryProbe,
    sha: &str,
    references: &[Reference],
    opts: ReduceOptions,
) -> (Ledger, Vec<fixcheck_core::Action>) {
    let mut ledger = Ledger::new();
    for b in forest.branches() {
        let eval = evaluate(upstream, probe, b, &Sha::from_str(sha), references).unwrap();
        ledger.append(eval.record, eval.patch).unwrap();
    }
    let actions = reduce(&ledger, forest, opts).unwrap();
    (ledger, actions)
}

#[test]
fn every_branch_yields_exactly_one_record() {
    let forest = BranchForest::new(vec![
        branch("a", "v6.1", &[]),
        branch("b", "v6.0", &["a"]),
        branch("c-ltss", "v5.14", &["b"]),
    ])
    .unwrap();
    let mut upstream = InMemoryUpstream::default();
    upstream.merged("fix1", "v6.1");
    let probe = InMemoryProbe::default();

    let (ledger, _) = run_both_passes(
        &forest,
        &upstream,
        &probe,
        "fix1",
        &[],
        ReduceOptions::default(),
    );
    assert_eq!(ledger.len(), forest.len());
    for b in forest.branches() {
        assert!(ledger.get(&b.name).is_some());
    }
}

// Branch forked before the fix, no backport, fix declares an introducer
// that the branch carries: state is missing_patch naming that introducer.
#[test]
fn worked_example_missing_patch() {
    let forest = BranchForest::new(vec![branch("x", "v5.10", &[])]).unwrap();
    let mut upstream = InMemoryUpstream::default();
    upstream.fixes_tag("fix-f", "intro-1");
    upstream.merged("intro-1", "v5.10");
    let probe = InMemoryProbe::default();

    let (ledger, actions) = run_both_passes(
        &forest,
        &upstream,
        &probe,
        "fix-f",
        &[],
        ReduceOptions::default(),
    );
    assert_eq!(
        ledger.get(&BranchName::from_str("x")).unwrap().state,
        BranchState::MissingPatch(vec![Sha::from_str("intro-1")])
    );
    assert_eq!(
        actions[0].disposition,
        Disposition::ManualBackport(vec![Sha::from_str("intro-1")])
    );
}

// Backport carries the CVE reference but not the bug reference: state is
// missing_references with exactly the bug, and reduction points the
// reference-adder at the branch's patch.
#[test]
fn worked_example_missing_bug_reference() {
    let forest = BranchForest::new(vec![branch("y", "v6.1", &[])]).unwrap();
    let upstream = InMemoryUpstream::default();
    let mut probe = InMemoryProbe::default();
    probe.backport("y", "fix-f", "patches/fix-f.patch");
    probe.with_reference("y", "patches/fix-f.patch", "CVE-2024-9999");

    let references = vec![
        Reference::Cve(CveId::from_str("CVE-2024-9999")),
        Reference::Bug(BugRef::from_str("bsc#1234")),
    ];
    let (ledger, actions) = run_both_passes(
        &forest,
        &upstream,
        &probe,
        "fix-f",
        &references,
        ReduceOptions::default(),
    );

    assert_eq!(
        ledger.get(&BranchName::from_str("y")).unwrap().state,
        BranchState::MissingReferences(vec![Reference::Bug(BugRef::from_str("bsc#1234"))])
    );
    assert_eq!(
        actions[0].disposition,
        Disposition::RunReferenceAdder {
            patch: PatchRef::from_str("patches/fix-f.patch"),
            refs: vec![Reference::Bug(BugRef::from_str("bsc#1234"))],
        }
    );
}

// CVSS 6 suppresses an LTSS branch needing a backport; CVSS 8 does not.
#[test]
fn worked_example_ltss_cvss_threshold() {
    let forest = BranchForest::new(vec![branch("old-ltss", "v5.10", &[])]).unwrap();
    let mut upstream = InMemoryUpstream::default();
    upstream.fixes_tag("fix-f", "intro-1");
    upstream.merged("intro-1", "v5.10");
    let probe = InMemoryProbe::default();

    let (_, actions) = run_both_passes(
        &forest,
        &upstream,
        &probe,
        "fix-f",
        &[],
        ReduceOptions { cvss: Some(CvssScore(6)), flat: false },
    );
    assert!(actions.is_empty());

    let (_, actions) = run_both_passes(
        &forest,
        &upstream,
        &probe,
        "fix-f",
        &[],
        ReduceOptions { cvss: Some(CvssScore(8)), flat: false },
    );
    assert_eq!(actions.len(), 1);
    assert!(actions[0].mandatory());
}

// Merge-source already ok: the derived branch produces no action even
// though its own record is missing_patch.
#[test]
fn merge_source_ok_wins_over_missing_patch() {
    let forest = BranchForest::new(vec![
        branch("base", "v6.1", &[]),
        branch("derived", "v5.10", &["base"]),
    ])
    .unwrap();
    let mut upstream = InMemoryUpstream::default();
    upstream.fixes_tag("fix-f", "intro-1");
    upstream.merged("intro-1", "v5.10");
    upstream.merged("intro-1", "v6.1");
    let mut probe = InMemoryProbe::default();
    probe.backport("base", "fix-f", "patches/fix-f.patch");

    let (ledger, actions) = run_both_passes(
        &forest,
        &upstream,
        &probe,
        "fix-f",
        &[],
        ReduceOptions::default(),
    );

    assert_eq!(
        ledger.get(&BranchName::from_str("derived")).unwrap().state,
        BranchState::MissingPatch(vec![Sha::from_str("intro-1")])
    );
    assert!(!actions.iter().any(|a| a.branch.as_str() == "derived" && a.mandatory()));

    // Flat mode looks only at the branch's own record.
    let (_, flat_actions) = run_both_passes(
        &forest,
        &upstream,
        &probe,
        "fix-f",
        &[],
        ReduceOptions { cvss: None, flat: true },
    );
    assert!(flat_actions.iter().any(|a| a.branch.as_str() == "derived" && a.mandatory()));
}
