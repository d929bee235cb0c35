//! Turns command-line arguments into a lockcheck run.

use crate::formatters::{Formatter, HumanFormatter, JsonFormatter};
use anyhow::{Context, Result};
use lockcheck_config::{validate_project_path, ConfigManager, LockcheckConfig, RunOptions};
use lockcheck_core::Lockcheck;
use lockcheck_fs::{FileSystem, NativeFileSystem};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Parsed command-line arguments.
#[derive(Debug, Clone)]
pub struct RunArgs {
    pub dir: PathBuf,
    /// `Some("")` diffs against the git index
    pub git_compare: Option<String>,
    pub diff_file: Option<PathBuf>,
    pub verbose: bool,
    pub config: Option<PathBuf>,
    pub format: OutputFormat,
}

/// Run lockcheck and print the outcome. Returns whether the run passed.
pub fn run(args: RunArgs) -> Result<bool> {
    let runtime = Runtime::new().context("Failed to create tokio runtime")?;
    runtime.block_on(run_async(args))
}

async fn run_async(args: RunArgs) -> Result<bool> {
    let root = validate_project_path(&args.dir)
        .with_context(|| format!("Invalid directory {}", args.dir.display()))?;
    let fs = Arc::new(
        NativeFileSystem::new(&root)
            .with_context(|| format!("Failed to open {}", root.display()))?,
    );

    let config = load_config(fs.as_ref(), args.config.as_deref()).await?;
    let options = build_options(&args, root).await?;

    let outcome = Lockcheck::new(fs, options, config)?.run().await?;

    let formatter: Box<dyn Formatter> = match args.format {
        OutputFormat::Human => Box::new(HumanFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    };
    formatter.format(&outcome, args.verbose)?;

    Ok(outcome.passed())
}

/// `--config` if given, otherwise `.lockcheck.toml` in the project.
async fn load_config(project: &NativeFileSystem, explicit: Option<&Path>) -> Result<LockcheckConfig> {
    let manager = match explicit {
        Some(path) => {
            let (fs, name) = scoped_to_parent(path)?;
            ConfigManager::load_from(&fs, Path::new(&name)).await?
        }
        None => ConfigManager::load_for_project(project).await?,
    };

    if let Some(source) = manager.source() {
        tracing::debug!(path = %source.display(), "loaded configuration");
    }
    Ok(manager.into_config())
}

async fn build_options(args: &RunArgs, root: PathBuf) -> Result<RunOptions> {
    let mut options = match &args.git_compare {
        Some(commit) => RunOptions::diff(root, Some(commit.clone())),
        None => RunOptions::check(root),
    };
    options.verbose = args.verbose;

    if let Some(path) = &args.diff_file {
        let (fs, name) = scoped_to_parent(path)?;
        let contents = fs
            .read_to_string(Path::new(&name))
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;

        options.diff_mode = true;
        options.diff_source = Some(contents);
    }

    Ok(options)
}

/// A filesystem rooted at `path`'s directory, plus the file name within it.
fn scoped_to_parent(path: &Path) -> Result<(NativeFileSystem, String)> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .with_context(|| format!("{} is not a file path", path.display()))?
        .to_string();

    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let fs = NativeFileSystem::new(parent)
        .with_context(|| format!("Failed to open {}", parent.display()))?;
    Ok((fs, name))
}
