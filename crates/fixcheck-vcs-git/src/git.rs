use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context, Result};
use fixcheck_core::{BaseVersion, BranchName, BranchQuery, PatchRef, Reference, Sha, UpstreamQuery};

const GIT_COMMIT_TAG: &str = "Git-commit:";
const FIXES_TAG: &str = "Fixes:";
const REFERENCES_TAG: &str = "References:";

fn run(repo: &Path, args: &[&str]) -> Result<String> {
    let out = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .with_context(|| format!("run git {:?}", args))?;
    if !out.status.success() {
        return Err(anyhow!(
            "git {:?} failed\nstdout:{}\nstderr:{}",
            args,
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr)
        ));
    }
    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}

/// Like `run`, but exit status 1 is a negative answer, not a failure.
/// git uses 1 for "no" on merge-base --is-ancestor, grep and rev-parse
/// --verify --quiet.
fn run_check(repo: &Path, args: &[&str]) -> Result<Option<String>> {
    let out = Command::new("git")
        .args(args)
        .current_dir(repo)
        .output()
        .with_context(|| format!("run git {:?}", args))?;
    if out.status.success() {
        return Ok(Some(String::from_utf8_lossy(&out.stdout).trim().to_string()));
    }
    if out.status.code() == Some(1) {
        return Ok(None);
    }
    Err(anyhow!(
        "git {:?} failed\nstdout:{}\nstderr:{}",
        args,
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr)
    ))
}

/// Upstream history queries against a local clone of the upstream repo.
#[derive(Clone, Debug)]
pub struct GitUpstream {
    repo: PathBuf,
}

impl GitUpstream {
    pub fn new(repo: impl Into<PathBuf>) -> Self {
        Self { repo: repo.into() }
    }
}

impl UpstreamQuery for GitUpstream {
    fn resolve_commit(&self, sha: &Sha) -> Result<Option<Sha>> {
        let spec = format!("{}^{{commit}}", sha.as_str());
        let full = run_check(&self.repo, &["rev-parse", "--verify", "--quiet", &spec])?;
        Ok(full.map(Sha::from_str))
    }

    fn merged_before(&self, sha: &Sha, base: &BaseVersion) -> Result<bool> {
        tracing::debug!(sha = sha.as_str(), base = base.as_str(), "ancestry check");
        let answer = run_check(
            &self.repo,
            &["merge-base", "--is-ancestor", sha.as_str(), base.as_str()],
        )?;
        Ok(answer.is_some())
    }

    fn fixes_tags(&self, sha: &Sha) -> Result<Vec<Sha>> {
        let body = run(&self.repo, &["show", "-s", "--format=%B", sha.as_str()])?;
        Ok(parse_fixes_tags(&body))
    }
}

/// Extract the commit ids named by `Fixes:` trailer lines. The
/// parenthesized subject after the id is ignored.
fn parse_fixes_tags(body: &str) -> Vec<Sha> {
    let mut tags = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        let Some(head) = line.get(..FIXES_TAG.len()) else {
            continue;
        };
        if !head.eq_ignore_ascii_case(FIXES_TAG) {
            continue;
        }
        if let Some(id) = line[FIXES_TAG.len()..].split_whitespace().next() {
            tags.push(Sha::from_str(id));
        }
    }
    tags
}

/// Patch-stack queries against a kernel-source style repo: each maintained
/// branch keeps backports as patch files under `patches_dir`, tagged with
/// `Git-commit:` and `References:` headers.
#[derive(Clone, Debug)]
pub struct GitBranchProbe {
    repo: PathBuf,
    patches_dir: String,
}

impl GitBranchProbe {
    pub fn new(repo: impl Into<PathBuf>, patches_dir: impl Into<String>) -> Self {
        Self { repo: repo.into(), patches_dir: patches_dir.into() }
    }
}

impl BranchQuery for GitBranchProbe {
    fn find_backport(&self, branch: &BranchName, sha: &Sha) -> Result<Option<PatchRef>> {
        let pattern = format!("{GIT_COMMIT_TAG} {}", sha.as_str());
        let hits = run_check(
            &self.repo,
            &[
                "grep", "-l", "-F", &pattern, branch.as_str(), "--", &self.patches_dir,
            ],
        )?;
        let Some(hits) = hits else {
            return Ok(None);
        };
        // Output lines are "<branch>:<path>"; the first hit locates the patch.
        let prefix = format!("{}:", branch.as_str());
        let patch = hits
            .lines()
            .filter_map(|l| l.strip_prefix(&prefix))
            .next()
            .ok_or_else(|| anyhow!("unexpected git grep output: {hits}"))?;
        tracing::debug!(branch = branch.as_str(), patch, "backport found");
        Ok(Some(PatchRef::from_str(patch)))
    }

    fn patch_has_reference(
        &self,
        branch: &BranchName,
        patch: &PatchRef,
        reference: &Reference,
    ) -> Result<bool> {
        let spec = format!("{}:{}", branch.as_str(), patch.as_str());
        let content = run(&self.repo, &["show", &spec])
            .with_context(|| format!("read patch {spec}"))?;
        Ok(patch_carries(&content, reference.id()))
    }
}

/// A `References:` header carries the id when it appears as a
/// whitespace- or comma-separated token.
fn patch_carries(content: &str, id: &str) -> bool {
    for line in content.lines() {
        let Some(rest) = line.trim().strip_prefix(REFERENCES_TAG) else {
            continue;
        };
        if rest
            .split_whitespace()
            .map(|tok| tok.trim_matches(','))
            .any(|tok| tok == id)
        {
            return true;
        }
    }
    false
}
