use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Validation errors for user-supplied options
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Path does not exist: {0}")]
    PathDoesNotExist(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Specified commit was of an invalid format: {0:?}")]
    InvalidCommitRef(String),

    #[error("Invalid file name {0:?}: must be a plain file name without separators")]
    InvalidFileName(String),
}

fn commit_ref_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_^]*$").expect("commit ref pattern is valid"))
}

/// Validate a git ref passed to `git show <ref>:./<lockfile>`
///
/// Only letters, digits, underscores and carets are accepted (`HEAD`,
/// `HEAD^^`, an abbreviated hash). The empty string is valid and selects
/// the git index.
pub fn validate_commit_ref(commit: &str) -> Result<(), SecurityError> {
    if commit_ref_pattern().is_match(commit) {
        Ok(())
    } else {
        Err(SecurityError::InvalidCommitRef(commit.to_string()))
    }
}

/// Validate a lock file or manifest name from configuration
///
/// The name is joined onto the project root and passed to `git show`
/// as `<ref>:./<name>`, so it must be a single normal path component.
pub fn validate_file_name(name: &str) -> Result<(), SecurityError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(std::path::Component::Normal(part)), None)
            if part.to_str() == Some(name) && !name.contains(':') =>
        {
            Ok(())
        }
        _ => Err(SecurityError::InvalidFileName(name.to_string())),
    }
}

/// Validate and canonicalize the audited directory
pub fn validate_project_path(path: &Path) -> Result<PathBuf, SecurityError> {
    let canonical = path
        .canonicalize()
        .map_err(|_| SecurityError::PathDoesNotExist(path.to_path_buf()))?;

    if !canonical.is_dir() {
        return Err(SecurityError::NotADirectory(canonical));
    }

    Ok(canonical)
}
