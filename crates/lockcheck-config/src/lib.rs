//! Configuration for lockcheck runs.
//!
//! Two layers: [`LockcheckConfig`] is read from `.lockcheck.toml` in the
//! audited directory (or an explicit path), and [`RunOptions`] carries the
//! per-invocation settings coming from the command line.

pub mod manager;
pub mod security;
pub mod types;

pub use manager::{ConfigError, ConfigManager, CONFIG_FILE_NAME};
pub use security::{validate_commit_ref, validate_file_name, validate_project_path, SecurityError};
pub use types::{CheckKind, LockcheckConfig, RunOptions};
