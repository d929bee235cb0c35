//! Canonical dependency tree shared by every analysis.

use crate::lockfile::LockSchema;
use indexmap::IndexMap;
use serde::Serialize;
use std::sync::Arc;

/// Dependencies keyed by package name, in document order.
pub type Dependencies = IndexMap<String, DependencyNode>;

/// One entry in the dependency tree.
///
/// `children` holds nested copies of transitive dependencies whose
/// resolution differs from a hoisted ancestor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DependencyNode {
    /// Package name (unique among siblings)
    pub name: String,
    /// Resolved version; not necessarily valid semver, empty for placeholders
    pub version: String,
    /// Source location; absent for local, workspace and linked entries
    pub resolved: Option<String>,
    /// Integrity hash, carried but never verified
    pub integrity: Option<String>,
    /// Development-only dependency
    pub dev: bool,
    /// Optional dependency
    pub optional: bool,
    /// Declared requirements (name -> range), informational
    pub requires: IndexMap<String, String>,
    /// Nested dependencies
    pub children: Dependencies,
}

impl DependencyNode {
    /// Create a node with a name and version and no source.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            ..Self::default()
        }
    }

    /// Set the resolved URL.
    pub fn with_resolved(mut self, url: impl Into<String>) -> Self {
        self.resolved = Some(url.into());
        self
    }

    /// Add a nested child dependency.
    pub fn with_child(mut self, child: DependencyNode) -> Self {
        self.children.insert(child.name.clone(), child);
        self
    }

    /// Whether this entry has no remote source (workspace, link, placeholder).
    pub fn is_local(&self) -> bool {
        self.resolved.is_none()
    }
}

/// A parsed, normalized lock manifest.
///
/// The top-level map is held in an [`Arc`] so its identity is stable for
/// [`crate::IndexCache`]: two lock files parsed separately never share a
/// cache entry, even when structurally equal.
#[derive(Debug, Clone)]
pub struct Lockfile {
    /// Root package name
    pub name: Option<String>,
    /// Root package version
    pub version: Option<String>,
    /// Declared `lockfileVersion`
    pub lockfile_version: Option<u32>,
    /// Which schema variant the tree was built from
    pub schema: LockSchema,
    /// Top-level dependencies
    pub dependencies: Arc<Dependencies>,
}

impl Lockfile {
    /// Wrap an already-built tree.
    pub fn from_dependencies(dependencies: Dependencies) -> Self {
        Self {
            name: None,
            version: None,
            lockfile_version: None,
            schema: LockSchema::NestedTree,
            dependencies: Arc::new(dependencies),
        }
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        fn count(deps: &Dependencies) -> usize {
            deps.values().map(|node| 1 + count(&node.children)).sum()
        }
        count(&self.dependencies)
    }
}

/// Build a [`Dependencies`] map from nodes, keyed by their names.
pub fn dependencies<I>(nodes: I) -> Dependencies
where
    I: IntoIterator<Item = DependencyNode>,
{
    nodes
        .into_iter()
        .map(|node| (node.name.clone(), node))
        .collect()
}
