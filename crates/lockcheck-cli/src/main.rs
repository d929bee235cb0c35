//! lockcheck - audits npm package-lock.json files.

use anyhow::Result;
use clap::Parser;
use lockcheck_cli::run::{run, OutputFormat, RunArgs};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lockcheck", version)]
#[command(
    about = "Analyzes package-lock.json files for potential problems, and diffs them against git when available",
    long_about = None
)]
struct Cli {
    /// Path to the directory containing the lock file
    #[arg(short, long, value_name = "PATH", default_value = ".")]
    dir: PathBuf,

    /// Diff against a git commit instead of running the checks
    ///
    /// Without a value, diffs against the git index.
    #[arg(long, value_name = "COMMIT", num_args = 0..=1, default_missing_value = "")]
    git_compare: Option<String>,

    /// Diff against a lock file read from disk instead of git
    #[arg(long, value_name = "FILE")]
    diff_file: Option<PathBuf>,

    /// Verbose output (-v lists registries and diff summaries, -vv adds debug logs)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value = "human")]
    format: OutputFormat,

    /// Output JSON format (alias for --output json)
    #[arg(long)]
    json: bool,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // Logs go to stderr so reports on stdout stay parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let passed = run(RunArgs {
        dir: cli.dir,
        git_compare: cli.git_compare,
        diff_file: cli.diff_file,
        verbose: cli.verbose > 0,
        config: cli.config,
        format: if cli.json { OutputFormat::Json } else { cli.format },
    })?;

    if !passed {
        std::process::exit(1);
    }
    Ok(())
}
