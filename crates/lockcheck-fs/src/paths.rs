//! Syntactic path normalization shared by both backends.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Normalize `path` against `root` without touching the disk.
///
/// Relative paths are joined onto `root`. `.` components are dropped and
/// `..` pops a component; popping past the filesystem root is an error.
pub(crate) fn normalize(root: &Path, path: &Path) -> io::Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    };

    let mut result = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                result.push(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                if !result.pop() || result.as_os_str().is_empty() {
                    return Err(escape_error(&joined, root));
                }
            }
            Component::Normal(name) => result.push(name),
        }
    }

    Ok(result)
}

/// Reject `path` unless it lies within `root`.
pub(crate) fn ensure_within(root: &Path, path: PathBuf) -> io::Result<PathBuf> {
    if path.starts_with(root) {
        Ok(path)
    } else {
        Err(escape_error(&path, root))
    }
}

fn escape_error(path: &Path, root: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::PermissionDenied,
        format!(
            "Path traversal detected: {} is outside project root {}",
            path.display(),
            root.display()
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_relative() {
        let root = Path::new("/project");
        let normalized = normalize(root, Path::new("./a/../package-lock.json")).unwrap();
        assert_eq!(normalized, PathBuf::from("/project/package-lock.json"));
    }

    #[test]
    fn test_escape_is_rejected() {
        let root = Path::new("/project");
        let normalized = normalize(root, Path::new("../etc/passwd")).unwrap();
        let err = ensure_within(root, normalized).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
