//! Sources for the lock file a diff is computed against

use crate::error::{Error, Result};
use crate::model::Lockfile;
use async_trait::async_trait;
use lockcheck_config::validate_commit_ref;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

/// Provides the raw baseline lock document.
#[async_trait]
pub trait BaselineSource: Send + Sync {
    /// Human-readable description, used in logs.
    fn describe(&self) -> String;

    /// Fetch the raw document.
    async fn fetch(&self) -> Result<String>;
}

/// A baseline document supplied up front.
#[derive(Debug, Clone)]
pub struct InlineBaseline {
    contents: String,
}

impl InlineBaseline {
    /// Wrap a document.
    pub fn new(contents: impl Into<String>) -> Self {
        Self {
            contents: contents.into(),
        }
    }
}

#[async_trait]
impl BaselineSource for InlineBaseline {
    fn describe(&self) -> String {
        "inline document".to_string()
    }

    async fn fetch(&self) -> Result<String> {
        Ok(self.contents.clone())
    }
}

/// The lock file as recorded by git at a commit, or in the index.
#[derive(Debug, Clone)]
pub struct GitBaseline {
    repo_dir: PathBuf,
    commit: String,
    lockfile_name: String,
}

impl GitBaseline {
    /// Create a source for `git show <commit>:./<lockfile_name>` run in
    /// `repo_dir`, which may be a subdirectory of the work tree. An empty or missing commit reads the git index.
    ///
    /// Fails if `commit` is not a plain ref token.
    pub fn new(
        repo_dir: impl Into<PathBuf>,
        commit: Option<&str>,
        lockfile_name: impl Into<String>,
    ) -> Result<Self> {
        let commit = commit.unwrap_or_default();
        validate_commit_ref(commit)?;

        Ok(Self {
            repo_dir: repo_dir.into(),
            commit: commit.to_string(),
            lockfile_name: lockfile_name.into(),
        })
    }

    fn object(&self) -> String {
        format!("{}:./{}", self.commit, self.lockfile_name)
    }
}

#[async_trait]
impl BaselineSource for GitBaseline {
    fn describe(&self) -> String {
        format!("git show {}", self.object())
    }

    async fn fetch(&self) -> Result<String> {
        let object = self.object();
        tracing::debug!(object = %object, dir = %self.repo_dir.display(), "fetching baseline from git");

        let output = Command::new("git")
            .arg("show")
            .arg(&object)
            .current_dir(&self.repo_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::Baseline {
                source_name: self.describe(),
                reason: format!("failed to run git: {}", e),
            })?;

        if !output.status.success() {
            return Err(Error::Baseline {
                source_name: self.describe(),
                reason: format!(
                    "git exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| Error::Baseline {
            source_name: self.describe(),
            reason: format!("output is not UTF-8: {}", e),
        })
    }
}

/// Fetch and parse a baseline, degrading to `None` on any failure.
///
/// A missing baseline is common (no prior commit, not a repository) and is
/// not worth failing a diff over.
pub async fn load_baseline(source: &dyn BaselineSource) -> Option<Lockfile> {
    let contents = match source.fetch().await {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(source = %source.describe(), error = %e, "baseline unavailable");
            return None;
        }
    };

    match Lockfile::from_json(&contents) {
        Ok(lock) => Some(lock),
        Err(e) => {
            tracing::warn!(source = %source.describe(), error = %e, "baseline is not a valid lock file");
            None
        }
    }
}
