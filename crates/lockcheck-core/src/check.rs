//! Run orchestration: load inputs, pick analyses or diff, aggregate

use crate::analyses::{
    DuplicateUrlsVisitor, InsecureUriVisitor, ManifestConsistencyVisitor,
    RegistryConsistencyVisitor,
};
use crate::baseline::{load_baseline, BaselineSource, GitBaseline, InlineBaseline};
use crate::diff::{diff, DiffReport};
use crate::error::{Error, Result};
use crate::finding::{Finding, FindingSet};
use crate::manifest::PackageManifest;
use crate::model::Lockfile;
use crate::visitor::{AnalysisContext, Visitor};
use lockcheck_config::{
    validate_commit_ref, validate_file_name, CheckKind, LockcheckConfig, RunOptions,
};
use lockcheck_fs::FileSystem;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Findings of one analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// Which analysis produced them
    pub check: CheckKind,
    /// Findings in insertion order
    pub findings: Vec<Finding>,
    /// Whether they fail the run
    pub failed: bool,
}

/// Outcome of check mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// One entry per analysis that ran, in run order
    pub results: Vec<AnalysisResult>,
}

impl CheckReport {
    /// Whether no analysis failed.
    pub fn passed(&self) -> bool {
        !self.results.iter().any(|result| result.failed)
    }

    /// Every finding, grouped by analysis.
    pub fn findings(&self) -> impl Iterator<Item = &Finding> {
        self.results.iter().flat_map(|result| result.findings.iter())
    }
}

/// Outcome of diff mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffOutcome {
    /// Where the baseline came from
    pub baseline: String,
    /// `None` when the baseline could not be obtained
    pub report: Option<DiffReport>,
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Analyses ran
    Check(CheckReport),
    /// A diff was computed
    Diff(DiffOutcome),
}

impl RunOutcome {
    /// Whether the run should exit successfully. Diffs always pass.
    pub fn passed(&self) -> bool {
        match self {
            RunOutcome::Check(report) => report.passed(),
            RunOutcome::Diff(_) => true,
        }
    }
}

/// Audits the lock file in one project directory.
pub struct Lockcheck<F: FileSystem> {
    fs: Arc<F>,
    options: RunOptions,
    config: LockcheckConfig,
}

impl<F: FileSystem> Lockcheck<F> {
    /// Create a run over the project `fs` is rooted at.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOptions`] if the diff commit is not a plain
    /// ref token or a configured file name is not a bare file name.
    pub fn new(fs: Arc<F>, options: RunOptions, config: LockcheckConfig) -> Result<Self> {
        if let Some(commit) = &options.diff_commit {
            validate_commit_ref(commit)?;
        }
        validate_file_name(&config.lockfile_name)?;
        validate_file_name(&config.manifest_name)?;

        Ok(Self {
            fs,
            options,
            config,
        })
    }

    fn project_file(&self, name: &str) -> PathBuf {
        self.fs.project_root().join(name)
    }

    /// Read and parse the lock file. Any failure is fatal.
    pub async fn load_lockfile(&self) -> Result<Lockfile> {
        let path = self.project_file(&self.config.lockfile_name);

        let contents = self
            .fs
            .read_to_string(&path)
            .await
            .map_err(|source| Error::LockfileUnreadable {
                path: path.clone(),
                source,
            })?;

        let lock = Lockfile::from_json(&contents).map_err(|e| Error::LockfileInvalid {
            path: path.clone(),
            source: Box::new(e),
        })?;

        tracing::debug!(
            path = %path.display(),
            nodes = lock.node_count(),
            "loaded lock file"
        );
        Ok(lock)
    }

    /// Read the companion manifest. Missing or unparseable gives `None`.
    pub async fn load_manifest(&self) -> Option<PackageManifest> {
        let path = self.project_file(&self.config.manifest_name);

        if !self.fs.exists(&path).await.unwrap_or(false) {
            tracing::debug!(path = %path.display(), "no companion manifest");
            return None;
        }

        let parsed = match self.fs.read_to_string(&path).await {
            Ok(contents) => PackageManifest::from_json(&contents),
            Err(e) => Err(e.into()),
        };

        match parsed {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "ignoring companion manifest");
                None
            }
        }
    }

    /// The enabled analyses, in run order.
    pub fn visitors(&self, manifest: Option<PackageManifest>) -> Vec<Box<dyn Visitor>> {
        let findings = || FindingSet::from_fail_on_warnings(self.config.fail_on_warnings);
        let mut manifest = manifest;

        CheckKind::all()
            .iter()
            .copied()
            .filter(|kind| self.config.is_enabled(*kind))
            .map(|kind| -> Box<dyn Visitor> {
                match kind {
                    CheckKind::InsecureUri => Box::new(InsecureUriVisitor::with_findings(findings())),
                    CheckKind::ManifestConsistency => Box::new(
                        ManifestConsistencyVisitor::with_findings(findings(), manifest.take()),
                    ),
                    CheckKind::DuplicateUrls => {
                        Box::new(DuplicateUrlsVisitor::with_findings(findings()))
                    }
                    CheckKind::RegistryConsistency => Box::new(
                        RegistryConsistencyVisitor::with_findings(findings(), self.options.verbose),
                    ),
                }
            })
            .collect()
    }

    /// The baseline source for diff mode.
    pub fn baseline_source(&self) -> Result<Box<dyn BaselineSource>> {
        if let Some(contents) = &self.options.diff_source {
            return Ok(Box::new(InlineBaseline::new(contents.clone())));
        }

        let source = GitBaseline::new(
            self.fs.project_root(),
            self.options.diff_commit.as_deref(),
            self.config.lockfile_name.clone(),
        )?;
        Ok(Box::new(source))
    }

    /// Run the analyses or the diff, depending on the options.
    pub async fn run(&self) -> Result<RunOutcome> {
        let lock = self.load_lockfile().await?;

        if self.options.diff_mode {
            self.run_diff(&lock).await.map(RunOutcome::Diff)
        } else {
            self.run_checks(&lock).await.map(RunOutcome::Check)
        }
    }

    async fn run_checks(&self, lock: &Lockfile) -> Result<CheckReport> {
        let manifest = if self.config.is_enabled(CheckKind::ManifestConsistency) {
            self.load_manifest().await
        } else {
            None
        };

        let ctx = AnalysisContext::new();
        let mut results = Vec::new();

        // Sequential at this level; each visitor fans out internally
        for visitor in self.visitors(manifest) {
            visitor.visit(lock, &ctx).await?;

            let result = AnalysisResult {
                check: visitor.kind(),
                findings: visitor.findings(),
                failed: visitor.has_errors(),
            };
            tracing::debug!(
                check = visitor.name(),
                findings = result.findings.len(),
                failed = result.failed,
                "analysis complete"
            );
            results.push(result);
        }

        Ok(CheckReport { results })
    }

    async fn run_diff(&self, lock: &Lockfile) -> Result<DiffOutcome> {
        let source = self.baseline_source()?;
        let baseline = load_baseline(source.as_ref()).await;

        let report = baseline.map(|baseline| {
            let ctx = AnalysisContext::new();
            diff(&ctx.version_index(lock), &ctx.version_index(&baseline))
        });

        Ok(DiffOutcome {
            baseline: source.describe(),
            report,
        })
    }
}
