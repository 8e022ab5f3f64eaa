use std::path::Path;
use std::process::Command;

use anyhow::{anyhow, Context, Result};

use crate::config::Config;

/// Validate that every external source the run depends on is configured
/// and reachable, before any branch is evaluated. Failures here are
/// operator problems, reported with guidance.
pub fn doctor(cfg: &Config) -> Result<()> {
    ensure_git_repo(&cfg.upstream_repo(), "project.upstream_repo")?;
    ensure_git_repo(&cfg.branches_repo(), "project.branches_repo")?;

    let metadata = cfg.metadata_dir();
    if !metadata.is_dir() {
        return Err(anyhow!(
            "metadata_dir {} not found; clone the security-metadata tree or fix fixcheck.toml",
            metadata.display()
        ));
    }

    if cfg.branches.is_empty() {
        return Err(anyhow!("no [[branch]] entries configured in fixcheck.toml"));
    }
    Ok(())
}

fn ensure_git_repo(path: &Path, key: &str) -> Result<()> {
    if !path.is_dir() {
        return Err(anyhow!("{key} {} does not exist", path.display()));
    }
    let out = Command::new("git")
        .args(["rev-parse", "--git-dir"])
        .current_dir(path)
        .output()
        .with_context(|| format!("run git in {}", path.display()))?;
    if !out.status.success() {
        return Err(anyhow!("{key} {} is not a git repository", path.display()));
    }
    Ok(())
}
