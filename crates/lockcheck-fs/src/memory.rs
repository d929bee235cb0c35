//! In-memory filesystem backed by pre-loaded file contents.

use crate::paths::{ensure_within, normalize};
use crate::FileSystem;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// In-memory filesystem.
///
/// Useful for tests and for auditing documents that never touched the disk
/// (for example a lock file piped in from another tool). Cloning shares the
/// underlying storage.
#[derive(Debug, Clone)]
pub struct MemoryFileSystem {
    project_root: PathBuf,
    files: Arc<RwLock<HashMap<PathBuf, Vec<u8>>>>,
}

impl MemoryFileSystem {
    /// Create an in-memory filesystem from pre-loaded files.
    ///
    /// Relative keys in `files` are resolved against `project_root`.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if any file lies outside the root.
    pub fn new(
        project_root: impl AsRef<Path>,
        files: HashMap<PathBuf, Vec<u8>>,
    ) -> io::Result<Self> {
        let project_root = normalize(Path::new("/"), project_root.as_ref())?;

        let mut stored = HashMap::with_capacity(files.len());
        for (path, contents) in files {
            let normalized = ensure_within(&project_root, normalize(&project_root, &path)?)?;
            stored.insert(normalized, contents);
        }

        Ok(Self {
            project_root,
            files: Arc::new(RwLock::new(stored)),
        })
    }

    /// Create an empty in-memory filesystem.
    pub fn empty(project_root: impl AsRef<Path>) -> io::Result<Self> {
        Self::new(project_root, HashMap::new())
    }

    /// Add or replace a file.
    pub fn add_file(
        &self,
        path: impl AsRef<Path>,
        contents: impl Into<Vec<u8>>,
    ) -> io::Result<()> {
        let normalized = self.validate_path(path.as_ref())?;
        self.files.write().insert(normalized, contents.into());
        Ok(())
    }

    fn validate_path(&self, path: &Path) -> io::Result<PathBuf> {
        ensure_within(&self.project_root, normalize(&self.project_root, path)?)
    }
}

#[async_trait::async_trait]
impl FileSystem for MemoryFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let normalized = self.validate_path(path)?;
        Ok(self.files.read().contains_key(&normalized))
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let bytes = self.read(path).await?;
        String::from_utf8(bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    async fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        let normalized = self.validate_path(path)?;
        self.files.read().get(&normalized).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("File not found: {}", normalized.display()),
            )
        })
    }

    fn project_root(&self) -> &Path {
        &self.project_root
    }
}
