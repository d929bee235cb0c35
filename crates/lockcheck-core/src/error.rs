//! Error types for lockcheck-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using lockcheck-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in lockcheck-core
#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The lock file could not be read
    #[error("Could not read lock file \"{path}\": {source}")]
    LockfileUnreadable {
        /// Path to the lock file
        path: PathBuf,
        /// The underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// The lock file could not be parsed or normalized
    #[error("Could not parse lock file \"{path}\": {source}")]
    LockfileInvalid {
        /// Path to the lock file
        path: PathBuf,
        /// The parse or normalization error
        #[source]
        source: Box<Error>,
    },

    /// A dependency entry is structurally invalid
    #[error("Malformed lock entry \"{path}\": {reason}")]
    MalformedEntry {
        /// Position of the entry in the lock file
        path: String,
        /// What is wrong with it
        reason: String,
    },

    /// Invalid run options
    #[error("Invalid options: {0}")]
    InvalidOptions(#[from] lockcheck_config::SecurityError),

    /// The diff baseline could not be obtained
    #[error("Baseline {source_name} unavailable: {reason}")]
    Baseline {
        /// Description of the baseline source
        source_name: String,
        /// Why it failed
        reason: String,
    },

    /// One or more branches of a concurrent traversal failed
    #[error("{} traversal error(s): {}", .0.len(), join_errors(.0))]
    Traversal(Vec<Error>),
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Build a [`Error::MalformedEntry`].
    pub fn malformed(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedEntry {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
