//! package-lock.json parsing and schema normalization
//!
//! npm has written two incompatible shapes over time:
//! - the nested-tree schema (`lockfileVersion` 1 and 2), a top-level
//!   `dependencies` map whose entries embed their own `dependencies`
//! - the flat-package schema (`lockfileVersion` 2 and 3), a single
//!   `packages` map keyed by install path (`node_modules/a/node_modules/b`)
//!
//! Each shape has a [`SchemaNormalizer`] producing the canonical
//! [`Dependencies`] tree; analyses never see the raw document.

mod flat;
mod nested;

use crate::model::{Dependencies, Lockfile};
use crate::Result;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub(crate) use flat::FlatPackagesNormalizer;
pub(crate) use nested::NestedTreeNormalizer;

/// The schema variant a lock file was normalized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LockSchema {
    /// Recursive `dependencies` maps
    NestedTree,
    /// Path-keyed `packages` map
    FlatPackages,
    /// Neither map present
    Empty,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawLockfile {
    name: Option<String>,
    version: Option<String>,
    #[serde(rename = "lockfileVersion")]
    lockfile_version: Option<u32>,
    dependencies: Option<IndexMap<String, RawNestedEntry>>,
    packages: Option<IndexMap<String, RawPackageEntry>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawNestedEntry {
    version: Option<String>,
    resolved: Option<String>,
    integrity: Option<String>,
    #[serde(default)]
    dev: bool,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    requires: IndexMap<String, String>,
    #[serde(default)]
    dependencies: IndexMap<String, RawNestedEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawPackageEntry {
    version: Option<String>,
    resolved: Option<String>,
    integrity: Option<String>,
    #[serde(default)]
    dev: bool,
    #[serde(default, rename = "devOptional")]
    dev_optional: bool,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    link: bool,
    #[serde(default)]
    dependencies: IndexMap<String, String>,
    #[serde(default, rename = "optionalDependencies")]
    optional_dependencies: IndexMap<String, String>,
    #[serde(default, rename = "peerDependencies")]
    peer_dependencies: IndexMap<String, String>,
}

/// Converts one raw schema variant into the canonical tree.
pub(crate) trait SchemaNormalizer: Send + Sync {
    /// The schema this normalizer handles
    fn schema(&self) -> LockSchema;

    /// Whether the document carries this schema's data
    fn accepts(&self, raw: &RawLockfile) -> bool;

    /// Build the canonical tree
    fn normalize(&self, raw: &RawLockfile) -> Result<Dependencies>;
}

/// Normalizers in order of preference.
///
/// Version 2 lock files carry both shapes; the nested tree wins so that
/// reports stay stable across `lockfileVersion` 1 and 2.
fn normalizers() -> [&'static dyn SchemaNormalizer; 2] {
    [&NestedTreeNormalizer, &FlatPackagesNormalizer]
}

impl Lockfile {
    /// Parse and normalize a lock file document.
    ///
    /// # Errors
    /// Returns an error if the document is not valid JSON or contains a
    /// structurally malformed entry (a resolved URL without a version).
    pub fn from_json(contents: &str) -> Result<Self> {
        let raw: RawLockfile = serde_json::from_str(contents)?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawLockfile) -> Result<Self> {
        let normalizer = normalizers().into_iter().find(|n| n.accepts(&raw));

        let (schema, dependencies) = match normalizer {
            Some(normalizer) => (normalizer.schema(), normalizer.normalize(&raw)?),
            None => (LockSchema::Empty, Dependencies::new()),
        };

        tracing::debug!(
            schema = ?schema,
            top_level = dependencies.len(),
            "normalized lock file"
        );

        Ok(Self {
            name: raw.name,
            version: raw.version,
            lockfile_version: raw.lockfile_version,
            schema,
            dependencies: Arc::new(dependencies),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_empty_document() {
        let lock = Lockfile::from_json(r#"{"name":"app","lockfileVersion":1}"#).unwrap();
        assert_eq!(lock.schema, LockSchema::Empty);
        assert!(lock.dependencies.is_empty());
        assert_eq!(lock.name.as_deref(), Some("app"));
        assert_eq!(lock.lockfile_version, Some(1));
    }

    #[test]
    fn test_invalid_json() {
        let result = Lockfile::from_json("{ not json");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_v2_prefers_nested_tree() {
        let lock = Lockfile::from_json(
            r#"
{
  "lockfileVersion": 2,
  "requires": true,
  "packages": {
    "": { "name": "app" },
    "node_modules/a": {
      "version": "1.0.0",
      "resolved": "https://registry.npmjs.org/a/-/a-1.0.0.tgz"
    }
  },
  "dependencies": {
    "a": {
      "version": "1.0.0",
      "resolved": "https://registry.npmjs.org/a/-/a-1.0.0.tgz"
    }
  }
}
"#,
        )
        .unwrap();

        assert_eq!(lock.schema, LockSchema::NestedTree);
        assert_eq!(lock.dependencies["a"].version, "1.0.0");
    }

    #[test]
    fn test_v2_nested_and_flat_agree() {
        let nested = Lockfile::from_json(
            r#"
{
  "lockfileVersion": 1,
  "dependencies": {
    "a": {
      "version": "1.0.0",
      "resolved": "https://registry.npmjs.org/a/-/a-1.0.0.tgz",
      "requires": { "b": "^2.0.0" },
      "dependencies": {
        "b": {
          "version": "2.1.0",
          "resolved": "https://registry.npmjs.org/b/-/b-2.1.0.tgz"
        }
      }
    },
    "b": {
      "version": "1.0.0",
      "resolved": "https://registry.npmjs.org/b/-/b-1.0.0.tgz",
      "dev": true
    }
  }
}
"#,
        )
        .unwrap();

        let flat = Lockfile::from_json(
            r#"
{
  "lockfileVersion": 3,
  "packages": {
    "": { "name": "app", "dependencies": { "a": "^1.0.0" } },
    "node_modules/a": {
      "version": "1.0.0",
      "resolved": "https://registry.npmjs.org/a/-/a-1.0.0.tgz",
      "dependencies": { "b": "^2.0.0" }
    },
    "node_modules/a/node_modules/b": {
      "version": "2.1.0",
      "resolved": "https://registry.npmjs.org/b/-/b-2.1.0.tgz"
    },
    "node_modules/b": {
      "version": "1.0.0",
      "resolved": "https://registry.npmjs.org/b/-/b-1.0.0.tgz",
      "dev": true
    }
  }
}
"#,
        )
        .unwrap();

        assert_eq!(flat.schema, LockSchema::FlatPackages);
        assert_eq!(*nested.dependencies, *flat.dependencies);
    }
}
