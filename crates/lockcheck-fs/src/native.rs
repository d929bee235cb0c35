//! Native filesystem implementation using std::fs + tokio.

use crate::paths::{ensure_within, normalize};
use crate::FileSystem;
use std::io;
use std::path::{Path, PathBuf};
use tokio::task;

/// Native filesystem scoped to a canonicalized project root.
///
/// Blocking `std::fs` calls are wrapped in `tokio::task::spawn_blocking`.
#[derive(Debug, Clone)]
pub struct NativeFileSystem {
    canonical_root: PathBuf,
}

impl NativeFileSystem {
    /// Create a new native filesystem scoped to a project root.
    ///
    /// # Errors
    ///
    /// Returns an error if the root doesn't exist or can't be canonicalized.
    pub fn new(project_root: impl AsRef<Path>) -> io::Result<Self> {
        let root = project_root.as_ref();
        let canonical_root = root.canonicalize().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Project root does not exist: {} ({})", root.display(), e),
            )
        })?;

        Ok(Self { canonical_root })
    }

    /// Resolve a path and check it stays within the project root.
    ///
    /// Existing paths are canonicalized so symlinks cannot point outside the
    /// root; missing paths are checked syntactically.
    fn validate_path(&self, path: &Path) -> io::Result<PathBuf> {
        let normalized = normalize(&self.canonical_root, path)?;
        let resolved = normalized.canonicalize().unwrap_or(normalized);
        ensure_within(&self.canonical_root, resolved)
    }
}

fn join_error(e: task::JoinError) -> io::Error {
    io::Error::new(io::ErrorKind::Other, e)
}

#[async_trait::async_trait]
impl FileSystem for NativeFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || Ok(validated.exists()))
            .await
            .map_err(join_error)?
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || std::fs::read_to_string(&validated))
            .await
            .map_err(join_error)?
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let validated = self.validate_path(path)?;
        task::spawn_blocking(move || std::fs::read(&validated))
            .await
            .map_err(join_error)?
    }

    fn project_root(&self) -> &Path {
        &self.canonical_root
    }
}
