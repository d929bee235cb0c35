use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Settings read from `.lockcheck.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct LockcheckConfig {
    /// Lock file name inside the audited directory
    pub lockfile_name: String,

    /// Companion manifest name inside the audited directory
    pub manifest_name: String,

    /// Whether warning-level findings fail the run
    pub fail_on_warnings: bool,

    /// Analyses to skip in check mode
    pub disabled_checks: Vec<CheckKind>,
}

impl Default for LockcheckConfig {
    fn default() -> Self {
        Self {
            lockfile_name: "package-lock.json".to_string(),
            manifest_name: "package.json".to_string(),
            fail_on_warnings: true,
            disabled_checks: Vec::new(),
        }
    }
}

impl LockcheckConfig {
    /// Whether the given analysis should run.
    pub fn is_enabled(&self, check: CheckKind) -> bool {
        !self.disabled_checks.contains(&check)
    }
}

/// The analyses available in check mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CheckKind {
    /// Plaintext `http://` resolved URLs
    InsecureUri,
    /// Lock entries that disagree with the companion manifest
    ManifestConsistency,
    /// A single version bound to several URLs
    DuplicateUrls,
    /// Unscoped packages resolved from more than one registry
    RegistryConsistency,
}

impl CheckKind {
    /// All analyses, in the order they run.
    pub fn all() -> &'static [CheckKind] {
        &[
            CheckKind::InsecureUri,
            CheckKind::ManifestConsistency,
            CheckKind::DuplicateUrls,
            CheckKind::RegistryConsistency,
        ]
    }

    /// Name used in config files and output.
    pub fn name(&self) -> &'static str {
        match self {
            CheckKind::InsecureUri => "insecure-uri",
            CheckKind::ManifestConsistency => "manifest-consistency",
            CheckKind::DuplicateUrls => "duplicate-urls",
            CheckKind::RegistryConsistency => "registry-consistency",
        }
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-invocation options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Directory containing the lock file and manifest
    pub path: PathBuf,

    /// Diff against a baseline instead of running the analyses
    pub diff_mode: bool,

    /// Git ref to diff against; empty or `None` means the git index
    pub diff_commit: Option<String>,

    /// Pre-supplied baseline document, bypassing git
    pub diff_source: Option<String>,

    /// Extra listing output
    pub verbose: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            diff_mode: false,
            diff_commit: None,
            diff_source: None,
            verbose: false,
        }
    }
}

impl RunOptions {
    /// Options for check mode on `path`.
    pub fn check(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Options for diff mode on `path` against `commit`.
    pub fn diff(path: impl Into<PathBuf>, commit: Option<String>) -> Self {
        Self {
            path: path.into(),
            diff_mode: true,
            diff_commit: commit,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LockcheckConfig::default();
        assert_eq!(config.lockfile_name, "package-lock.json");
        assert_eq!(config.manifest_name, "package.json");
        assert!(config.fail_on_warnings);
        assert!(CheckKind::all().iter().all(|c| config.is_enabled(*c)));
    }

    #[test]
    fn test_parse_partial_config() {
        let config: LockcheckConfig = toml::from_str(
            r#"
fail-on-warnings = false
disabled-checks = ["registry-consistency"]
"#,
        )
        .unwrap();

        assert!(!config.fail_on_warnings);
        assert_eq!(config.lockfile_name, "package-lock.json");
        assert!(!config.is_enabled(CheckKind::RegistryConsistency));
        assert!(config.is_enabled(CheckKind::InsecureUri));
    }

    #[test]
    fn test_unknown_check_is_rejected() {
        let result: Result<LockcheckConfig, _> = toml::from_str(r#"disabled-checks = ["nope"]"#);
        assert!(result.is_err());
    }
}
