//! # lockcheck-core
//!
//! Audits npm-style lock files (`package-lock.json`) and diffs them.
//!
//! This crate provides:
//! - Normalization of the nested-tree and flat-package lock schemas into one
//!   dependency tree ([`Lockfile`], [`DependencyNode`])
//! - Aggregation of a tree into a `name -> version -> {url}` [`VersionIndex`]
//! - Concurrent tree visitors producing [`Finding`]s ([`Visitor`])
//! - The built-in analyses: insecure URLs, duplicate URLs per version,
//!   registry consistency and manifest consistency
//! - A deterministic diff between two indexes ([`diff`])
//! - The [`Lockcheck`] orchestrator tying file loading, baseline fetching
//!   and the analyses together
//!
//! ## Example
//!
//! ```rust,no_run
//! use lockcheck_config::{LockcheckConfig, RunOptions};
//! use lockcheck_core::{Lockcheck, RunOutcome};
//! use lockcheck_fs::NativeFileSystem;
//! use std::sync::Arc;
//!
//! # async fn example() -> lockcheck_core::Result<()> {
//! let fs = Arc::new(NativeFileSystem::new(".")?);
//! let check = Lockcheck::new(fs, RunOptions::check("."), LockcheckConfig::default())?;
//!
//! if let RunOutcome::Check(report) = check.run().await? {
//!     for finding in report.findings() {
//!         println!("{}", finding.message);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod analyses;
pub mod baseline;
pub mod check;
pub mod diff;
pub mod error;
pub mod finding;
pub mod index;
pub mod lockfile;
pub mod manifest;
pub mod model;
pub mod version;
pub mod visitor;

// Re-export main types and traits
pub use error::{Error, Result};
pub use finding::{Finding, FindingSet, Severity};
pub use index::{IndexCache, VersionIndex, VersionSet};
pub use lockfile::LockSchema;
pub use manifest::PackageManifest;
pub use model::{Dependencies, DependencyNode, Lockfile};
pub use visitor::{visit_dependencies, AnalysisContext, Visitor};

// Re-export analyses
pub use analyses::{
    DuplicateUrlsVisitor, InsecureUriVisitor, ManifestConsistencyVisitor,
    RegistryConsistencyVisitor,
};

// Re-export diff and orchestration
pub use baseline::{load_baseline, BaselineSource, GitBaseline, InlineBaseline};
pub use check::{AnalysisResult, CheckReport, DiffOutcome, Lockcheck, RunOutcome};
pub use diff::{diff, DiffEntry, DiffLine, DiffReport, DiffSummary, VersionUrlChange};
pub use version::satisfies;
