//! Companion manifest (package.json)

use crate::Result;
use indexmap::IndexMap;
use serde::Deserialize;

/// The parts of `package.json` that declare version ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
    /// Package name
    #[serde(default)]
    pub name: Option<String>,

    /// Package version
    #[serde(default)]
    pub version: Option<String>,

    /// Runtime dependency ranges
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    /// Development dependency ranges
    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: IndexMap<String, String>,
}

impl PackageManifest {
    /// Parse a `package.json` document.
    pub fn from_json(contents: &str) -> Result<Self> {
        Ok(serde_json::from_str(contents)?)
    }

    /// The range declared for `name`, if any.
    ///
    /// Development declarations take precedence over runtime ones when a
    /// package appears in both.
    pub fn declared_range(&self, name: &str) -> Option<&str> {
        self.dev_dependencies
            .get(name)
            .or_else(|| self.dependencies.get(name))
            .map(String::as_str)
    }
}
