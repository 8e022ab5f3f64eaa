use std::io::Write;

use anyhow::{anyhow, Context, Result};
use tempfile::TempDir;

use fixcheck_core::{
    evaluate, reduce, Action, BranchForest, BranchQuery, BugRef, CveId, CvssScore, Fix,
    Ledger, ReduceOptions, Sha, UpstreamQuery,
};
use fixcheck_metadata::{CachedResolver, DirMetadata, MetadataResolver};
use fixcheck_vcs_git::{GitBranchProbe, GitUpstream};

use crate::config::Config;
use crate::doctor::doctor;
use crate::render::{describe_record, ActionPrinter};

#[derive(Clone, Debug, Default)]
pub struct RunOptions {
    /// Suppress progress output.
    pub quiet: bool,
    /// Echo every branch's state, including no-ops.
    pub verbose: bool,
    /// Render each record as-is: no CVSS scoping, no merge suppression.
    pub flat: bool,
    /// Operator-supplied CVSS score, overriding the metadata source.
    pub cvss: Option<u8>,
    /// Operator-supplied bug reference, overriding the metadata source.
    pub bug: Option<String>,
}

/// Everything one run produced, for callers that want more than stdout.
#[derive(Debug)]
pub struct RunReport {
    pub fix: Fix,
    pub ledger: Ledger,
    pub actions: Vec<Action>,
}

pub struct Runner {
    forest: BranchForest,
    upstream: Box<dyn UpstreamQuery>,
    probe: Box<dyn BranchQuery>,
    metadata: Box<dyn MetadataResolver>,
    /// Scratch space for runs without a configured cache root; removed on
    /// drop, success or failure.
    _scratch: TempDir,
}

impl Runner {
    pub fn open(cfg: &Config, refresh: bool) -> Result<Self> {
        doctor(cfg)?;
        let scratch = TempDir::new().context("create scratch dir")?;
        let cache_root = cfg
            .cache_root()
            .unwrap_or_else(|| scratch.path().join("cache"));
        let metadata =
            CachedResolver::new(DirMetadata::new(cfg.metadata_dir()), cache_root, refresh);

        Ok(Self {
            forest: cfg.forest()?,
            upstream: Box::new(GitUpstream::new(cfg.upstream_repo())),
            probe: Box::new(GitBranchProbe::new(
                cfg.branches_repo(),
                cfg.project.patches_dir.clone(),
            )),
            metadata: Box::new(metadata),
            _scratch: scratch,
        })
    }

    /// Assemble a runner from explicit parts. Used by tests to substitute
    /// in-memory adapters.
    pub fn from_parts(
        forest: BranchForest,
        upstream: Box<dyn UpstreamQuery>,
        probe: Box<dyn BranchQuery>,
        metadata: Box<dyn MetadataResolver>,
    ) -> Result<Self> {
        Ok(Self {
            forest,
            upstream,
            probe,
            metadata,
            _scratch: TempDir::new().context("create scratch dir")?,
        })
    }

    /// The whole run: resolve the fix, evaluate every branch into the
    /// ledger, then reduce and print surviving actions. The first pass
    /// completes fully before the second begins; merge suppression needs
    /// every sibling's record on file.
    pub fn run(&self, input: &str, opts: &RunOptions) -> Result<RunReport> {
        let fix = self.resolve_fix(input, opts)?;
        tracing::debug!(sha = fix.sha.as_str(), "fix resolved");
        println!("{}", summary_line(&fix));

        let references = fix.references();
        let mut ledger = Ledger::new();
        for branch in self.forest.branches() {
            let eval = evaluate(
                self.upstream.as_ref(),
                self.probe.as_ref(),
                branch,
                &fix.sha,
                &references,
            )?;
            if opts.verbose {
                println!("{}", describe_record(&eval.record));
            } else if !opts.quiet {
                print!(".");
                let _ = std::io::stdout().flush();
            }
            ledger.append(eval.record, eval.patch)?;
        }
        if !opts.quiet && !opts.verbose {
            println!();
        }

        let actions = reduce(
            &ledger,
            &self.forest,
            ReduceOptions { cvss: fix.cvss, flat: opts.flat },
        )?;
        let mut printer = ActionPrinter::new(opts.verbose);
        for action in &actions {
            printer.print(action);
        }

        Ok(RunReport { fix, ledger, actions })
    }

    /// Turn the positional argument into a fully-resolved Fix, or fail
    /// with guidance. Incomplete metadata is fatal unless the operator
    /// overrides the missing piece.
    fn resolve_fix(&self, input: &str, opts: &RunOptions) -> Result<Fix> {
        let (sha, cve) = if is_cve_form(input) {
            let cve = CveId::from_str(input.to_ascii_uppercase());
            let sha = self.metadata.sha_for_cve(&cve)?.ok_or_else(|| {
                anyhow!(
                    "{cve} has no upstream fix on file; check metadata_dir, try --refresh, \
                     or pass the commit id directly"
                )
            })?;
            (sha, Some(cve))
        } else {
            let sha = Sha::from_str(input);
            (sha.clone(), self.metadata.cve_for_sha(&sha)?)
        };

        let sha = self.upstream.resolve_commit(&sha)?.ok_or_else(|| {
            anyhow!(
                "commit {} not found upstream; fetch the upstream repo or check \
                 project.upstream_repo",
                sha
            )
        })?;

        let (bug, cvss) = match &cve {
            Some(cve) => {
                let bug = match &opts.bug {
                    Some(b) => BugRef::from_str(b),
                    None => self.metadata.bug_for_cve(cve)?.ok_or_else(|| {
                        anyhow!("no bug reference on file for {cve}; pass --bug or try --refresh")
                    })?,
                };
                let cvss = match opts.cvss {
                    Some(s) => CvssScore(s),
                    None => self.metadata.cvss_for_cve(cve)?.ok_or_else(|| {
                        anyhow!("no CVSS score on file for {cve}; pass --cvss or try --refresh")
                    })?,
                };
                (Some(bug), Some(cvss))
            }
            // No CVE: severity stays unknown (never assumed 0), and only
            // operator-supplied references are requested.
            None => (
                opts.bug.as_deref().map(BugRef::from_str),
                opts.cvss.map(CvssScore),
            ),
        };

        Ok(Fix { sha, cve, bug, cvss })
    }
}

fn summary_line(fix: &Fix) -> String {
    let mut line = format!("fix {}", fix.sha);
    if let Some(cve) = &fix.cve {
        line.push_str(&format!(" {cve}"));
    }
    if let Some(bug) = &fix.bug {
        line.push_str(&format!(" {bug}"));
    }
    match fix.cvss {
        Some(score) => line.push_str(&format!(" CVSS {}", score.value())),
        None => line.push_str(" CVSS unknown"),
    }
    line
}

/// Shape check for `CVE-YYYY-NNNNN` identifiers.
fn is_cve_form(input: &str) -> bool {
    let mut parts = input.splitn(3, '-');
    let (Some(tag), Some(year), Some(number)) = (parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    tag.eq_ignore_ascii_case("CVE")
        && year.len() == 4
        && year.chars().all(|c| c.is_ascii_digit())
        && number.len() >= 4
        && number.chars().all(|c| c.is_ascii_digit())
}
