use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};

use fixcheck_core::{BugRef, CveId, CvssScore, Sha};

use crate::traits::MetadataResolver;

/// Disk cache around any resolver. Positive answers are cached as JSON
/// under the cache root, keyed by a digest of the query; negative answers
/// are re-checked every run. `refresh` bypasses reads but still records
/// the fresh answer.
pub struct CachedResolver<R> {
    inner: R,
    root: PathBuf,
    refresh: bool,
}

impl<R: MetadataResolver> CachedResolver<R> {
    pub fn new(inner: R, root: impl Into<PathBuf>, refresh: bool) -> Self {
        Self { inner, root: root.into(), refresh }
    }

    fn entry_path(&self, kind: &str, key: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(kind.as_bytes());
        hasher.update(b":");
        hasher.update(key.as_bytes());
        self.root.join(hex::encode(hasher.finalize()))
    }

    fn cached<T>(
        &self,
        kind: &str,
        key: &str,
        resolve: impl FnOnce() -> Result<Option<T>>,
    ) -> Result<Option<T>>
    where
        T: Serialize + DeserializeOwned,
    {
        let path = self.entry_path(kind, key);
        if !self.refresh {
            if let Ok(bytes) = std::fs::read(&path) {
                tracing::debug!(kind, key, "metadata cache hit");
                let value = serde_json::from_slice(&bytes)
                    .with_context(|| format!("corrupt cache entry {}", path.display()))?;
                return Ok(Some(value));
            }
        }
        let answer = resolve()?;
        if let Some(value) = &answer {
            std::fs::create_dir_all(&self.root)
                .with_context(|| format!("create cache dir {}", self.root.display()))?;
            let bytes = serde_json::to_vec(value)?;
            std::fs::write(&path, bytes)
                .with_context(|| format!("write cache entry {}", path.display()))?;
        }
        Ok(answer)
    }
}

impl<R: MetadataResolver> MetadataResolver for CachedResolver<R> {
    fn sha_for_cve(&self, cve: &CveId) -> Result<Option<Sha>> {
        self.cached("sha_for_cve", cve.as_str(), || self.inner.sha_for_cve(cve))
    }

    fn cve_for_sha(&self, sha: &Sha) -> Result<Option<CveId>> {
        self.cached("cve_for_sha", sha.as_str(), || self.inner.cve_for_sha(sha))
    }

    fn cvss_for_cve(&self, cve: &CveId) -> Result<Option<CvssScore>> {
        self.cached("cvss_for_cve", cve.as_str(), || self.inner.cvss_for_cve(cve))
    }

    fn bug_for_cve(&self, cve: &CveId) -> Result<Option<BugRef>> {
        self.cached("bug_for_cve", cve.as_str(), || self.inner.bug_for_cve(cve))
    }
}
