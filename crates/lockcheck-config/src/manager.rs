use crate::security::{validate_file_name, SecurityError};
use crate::types::LockcheckConfig;
use lockcheck_fs::FileSystem;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-project config file.
pub const CONFIG_FILE_NAME: &str = ".lockcheck.toml";

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("TOML deserialization error in {path}: {source}")]
    TomlDe {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Security error: {0}")]
    Security(#[from] SecurityError),

    #[error("Config file not found at {0}")]
    ConfigNotFound(PathBuf),
}

/// Loads and validates [`LockcheckConfig`].
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: LockcheckConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// Load `.lockcheck.toml` from the filesystem's project root.
    ///
    /// A missing file yields the defaults; a malformed one is an error.
    pub async fn load_for_project<F: FileSystem>(fs: &F) -> Result<Self, ConfigError> {
        let path = fs.project_root().join(CONFIG_FILE_NAME);
        let exists = fs.exists(&path).await.map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        if !exists {
            return Ok(Self {
                config: LockcheckConfig::default(),
                source: None,
            });
        }

        Self::load_from(fs, &path).await
    }

    /// Load config from an explicit path.
    pub async fn load_from<F: FileSystem>(fs: &F, path: &Path) -> Result<Self, ConfigError> {
        let contents = fs.read_to_string(path).await.map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::ConfigNotFound(path.to_path_buf())
            } else {
                ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        let config = Self::parse(&contents, path)?;

        Ok(Self {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    fn parse(contents: &str, path: &Path) -> Result<LockcheckConfig, ConfigError> {
        let config: LockcheckConfig =
            toml::from_str(contents).map_err(|source| ConfigError::TomlDe {
                path: path.to_path_buf(),
                source,
            })?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn validate(config: &LockcheckConfig) -> Result<(), ConfigError> {
        validate_file_name(&config.lockfile_name)?;
        validate_file_name(&config.manifest_name)?;
        Ok(())
    }

    /// The loaded configuration.
    pub fn config(&self) -> &LockcheckConfig {
        &self.config
    }

    /// Consume the manager, returning the configuration.
    pub fn into_config(self) -> LockcheckConfig {
        self.config
    }

    /// Path the configuration was read from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CheckKind;
    use lockcheck_fs::{MemoryFileSystem, NativeFileSystem};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_config_uses_defaults() {
        let fs = MemoryFileSystem::empty("/project").unwrap();
        let manager = ConfigManager::load_for_project(&fs).await.unwrap();

        assert_eq!(manager.config(), &LockcheckConfig::default());
        assert!(manager.source().is_none());
    }

    #[tokio::test]
    async fn test_project_config_is_loaded() {
        let fs = MemoryFileSystem::empty("/project").unwrap();
        fs.add_file(
            CONFIG_FILE_NAME,
            r#"
lockfile-name = "npm-shrinkwrap.json"
disabled-checks = ["duplicate-urls"]
"#,
        )
        .unwrap();

        let manager = ConfigManager::load_for_project(&fs).await.unwrap();
        assert_eq!(manager.config().lockfile_name, "npm-shrinkwrap.json");
        assert!(!manager.config().is_enabled(CheckKind::DuplicateUrls));
        assert_eq!(
            manager.source(),
            Some(Path::new("/project/.lockcheck.toml"))
        );
    }

    #[tokio::test]
    async fn test_malformed_config_is_error() {
        let fs = MemoryFileSystem::empty("/project").unwrap();
        fs.add_file(CONFIG_FILE_NAME, "fail-on-warnings = \"sometimes\"")
            .unwrap();

        let result = ConfigManager::load_for_project(&fs).await;
        assert!(matches!(result, Err(ConfigError::TomlDe { .. })));
    }

    #[tokio::test]
    async fn test_unsafe_lockfile_name_is_rejected() {
        let fs = MemoryFileSystem::empty("/project").unwrap();
        fs.add_file(CONFIG_FILE_NAME, "lockfile-name = \"../other.json\"")
            .unwrap();

        let result = ConfigManager::load_for_project(&fs).await;
        assert!(matches!(
            result,
            Err(ConfigError::Security(SecurityError::InvalidFileName(_)))
        ));
    }

    #[tokio::test]
    async fn test_explicit_missing_path() {
        let temp_dir = TempDir::new().unwrap();
        let fs = NativeFileSystem::new(temp_dir.path()).unwrap();

        let result = ConfigManager::load_from(&fs, &temp_dir.path().join("custom.toml")).await;
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[tokio::test]
    async fn test_explicit_native_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.toml");
        std::fs::write(&path, "fail-on-warnings = false\n").unwrap();

        let fs = NativeFileSystem::new(temp_dir.path()).unwrap();
        let manager = ConfigManager::load_from(&fs, &path).await.unwrap();
        assert!(!manager.config().fail_on_warnings);
    }
}
