use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fixcheck_core::{BugRef, CveId, CvssScore, Sha};

use crate::traits::MetadataResolver;

const CVE_TO_SHA: &str = "cve2sha";
const CVE_TO_BUG: &str = "cve2bug";
const CVE_TO_CVSS: &str = "cve2cvss";

/// Resolver backed by a local checkout of the security-metadata tree:
/// one line-oriented index file per concern, `<CVE-ID> <value>` per line,
/// `#` comment lines skipped.
#[derive(Clone, Debug)]
pub struct DirMetadata {
    root: PathBuf,
}

impl DirMetadata {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn lookup(&self, file: &str, key: &str) -> Result<Option<String>> {
        Ok(scan(&self.root.join(file), |k, v| (k == key).then(|| v.to_string()))?)
    }

    /// Reverse lookup in the cve2sha index: value column to key column.
    fn cve_by_sha(&self, sha: &str) -> Result<Option<String>> {
        scan(&self.root.join(CVE_TO_SHA), |k, v| {
            // Allow the index to carry abbreviated or full ids.
            (v == sha || v.starts_with(sha) || sha.starts_with(v)).then(|| k.to_string())
        })
    }
}

fn scan<T>(path: &Path, mut pick: impl FnMut(&str, &str) -> Option<T>) -> Result<Option<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("read metadata index {}", path.display()))?;
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(key), Some(value)) = (fields.next(), fields.next()) else {
            continue;
        };
        if let Some(hit) = pick(key, value) {
            return Ok(Some(hit));
        }
    }
    Ok(None)
}

impl MetadataResolver for DirMetadata {
    fn sha_for_cve(&self, cve: &CveId) -> Result<Option<Sha>> {
        Ok(self.lookup(CVE_TO_SHA, cve.as_str())?.map(Sha::from_str))
    }

    fn cve_for_sha(&self, sha: &Sha) -> Result<Option<CveId>> {
        Ok(self.cve_by_sha(sha.as_str())?.map(CveId::from_str))
    }

    fn cvss_for_cve(&self, cve: &CveId) -> Result<Option<CvssScore>> {
        let Some(raw) = self.lookup(CVE_TO_CVSS, cve.as_str())? else {
            return Ok(None);
        };
        // Scores may be recorded with a decimal part; scoping uses the
        // integer severity.
        let whole = raw.split('.').next().unwrap_or(&raw);
        let score: u8 = whole
            .parse()
            .with_context(|| format!("bad CVSS value {raw:?} for {cve}"))?;
        Ok(Some(CvssScore(score)))
    }

    fn bug_for_cve(&self, cve: &CveId) -> Result<Option<BugRef>> {
        Ok(self.lookup(CVE_TO_BUG, cve.as_str())?.map(BugRef::from_str))
    }
}
