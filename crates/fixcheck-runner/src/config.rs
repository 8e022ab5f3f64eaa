use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use fixcheck_core::{BaseVersion, Branch, BranchForest, BranchName};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    pub project: ProjectConfig,
    #[serde(default, rename = "branch")]
    pub branches: Vec<BranchEntry>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Local clone of upstream history.
    pub upstream_repo: String,
    /// kernel-source style repo holding the maintained branches.
    pub branches_repo: String,
    /// Directory the patch stacks live under within each branch.
    #[serde(default = "default_patches_dir")]
    pub patches_dir: String,
    /// Local checkout of the security-metadata indexes.
    pub metadata_dir: String,
    /// Resolver cache location; empty means a per-run scratch directory.
    #[serde(default)]
    pub cache_root: String,
}

fn default_patches_dir() -> String {
    "patches".to_string()
}

/// One maintained branch. File order is evaluation order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BranchEntry {
    pub name: String,
    pub base: String,
    #[serde(default)]
    pub merge: Vec<String>,
}

impl Config {
    pub fn load_from(path: &Path) -> Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        let cfg: Config = toml::from_str(&s)
            .with_context(|| format!("parse {}", path.display()))?;
        Ok(cfg)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let s = toml::to_string_pretty(self).with_context(|| "serialize config")?;
        std::fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    pub fn forest(&self) -> Result<BranchForest> {
        let branches = self
            .branches
            .iter()
            .map(|b| Branch {
                name: BranchName::from_str(&b.name),
                base: BaseVersion::from_str(&b.base),
                merge_sources: b.merge.iter().map(BranchName::from_str).collect(),
            })
            .collect();
        Ok(BranchForest::new(branches)?)
    }

    pub fn upstream_repo(&self) -> PathBuf {
        expand(&self.project.upstream_repo)
    }

    pub fn branches_repo(&self) -> PathBuf {
        expand(&self.project.branches_repo)
    }

    pub fn metadata_dir(&self) -> PathBuf {
        expand(&self.project.metadata_dir)
    }

    pub fn cache_root(&self) -> Option<PathBuf> {
        if self.project.cache_root.is_empty() {
            None
        } else {
            Some(expand(&self.project.cache_root))
        }
    }
}

fn expand(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).to_string())
}
