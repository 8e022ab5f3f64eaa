use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fixcheck_runner::{Config, RunOptions, Runner};

/// Check which maintained kernel branches still need an upstream fix.
#[derive(Parser)]
#[command(name = "fixcheck", version)]
struct Cli {
    /// Upstream commit id or CVE identifier (CVE-YYYY-NNNNN)
    fix: String,

    /// Suppress progress output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Show every branch's state, including no-ops
    #[arg(short, long)]
    verbose: bool,

    /// Bypass cached resolver data
    #[arg(long)]
    refresh: bool,

    /// Disable CVSS scoping and merge suppression
    #[arg(long)]
    flat: bool,

    /// Override the CVSS score
    #[arg(long)]
    cvss: Option<u8>,

    /// Override the bug reference
    #[arg(long)]
    bug: Option<String>,

    /// Configuration file
    #[arg(long, default_value = "fixcheck.toml")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config)?;
    let runner = Runner::open(&cfg, cli.refresh)?;

    let opts = RunOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        flat: cli.flat,
        cvss: cli.cvss,
        bug: cli.bug,
    };
    runner.run(&cli.fix, &opts)?;
    Ok(())
}
