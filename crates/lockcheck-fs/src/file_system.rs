//! FileSystem trait for root-scoped, read-only file access.

use std::io;
use std::path::Path;

/// Read-only filesystem scoped to a project root.
///
/// Relative paths are resolved against [`FileSystem::project_root`]. Any path
/// that resolves outside the root fails with
/// `io::ErrorKind::PermissionDenied`.
///
/// All methods are async so the native backend can offload blocking reads
/// to `tokio::task::spawn_blocking`.
#[async_trait::async_trait]
pub trait FileSystem: Send + Sync {
    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Read file contents as a string.
    ///
    /// # Errors
    ///
    /// Returns `io::ErrorKind::NotFound` if file doesn't exist.
    /// Returns `io::ErrorKind::InvalidData` if file is not valid UTF-8.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Read file contents as bytes.
    async fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// The project root this filesystem is scoped to.
    fn project_root(&self) -> &Path;
}
