use fixcheck_core::{BugRef, CveId, CvssScore, Sha};

/// Security-metadata lookups. All answers are `Option`: absence means the
/// source has no entry, which the caller treats as a refuse-to-guess
/// failure unless the operator overrides it.
pub trait MetadataResolver: Send + Sync {
    fn sha_for_cve(&self, cve: &CveId) -> anyhow::Result<Option<Sha>>;
    fn cve_for_sha(&self, sha: &Sha) -> anyhow::Result<Option<CveId>>;
    fn cvss_for_cve(&self, cve: &CveId) -> anyhow::Result<Option<CvssScore>>;
    fn bug_for_cve(&self, cve: &CveId) -> anyhow::Result<Option<BugRef>>;
}
