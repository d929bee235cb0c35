//! Flattened `name -> version -> {url}` aggregation of a dependency tree

use crate::model::Dependencies;
use indexmap::{IndexMap, IndexSet};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Every resolved version of one package and the URLs it was bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSet {
    /// Package name
    pub name: String,
    /// Version -> distinct resolved URLs, in first-seen order
    pub versions: IndexMap<String, IndexSet<String>>,
}

impl VersionSet {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            versions: IndexMap::new(),
        }
    }

    /// URLs bound to `version`.
    pub fn urls(&self, version: &str) -> Option<&IndexSet<String>> {
        self.versions.get(version)
    }
}

/// Package name -> [`VersionSet`], unified across tree depth.
///
/// A `(name, version)` pair maps to every distinct URL seen anywhere in the
/// tree. Duplicates are kept as a set rather than collapsed, since a
/// version bound to several URLs is itself a defect worth reporting. Only
/// nodes with a resolved URL contribute.
///
/// Equality compares contents, not insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct VersionIndex {
    packages: IndexMap<String, VersionSet>,
}

impl VersionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a tree.
    pub fn build(tree: &Dependencies) -> Self {
        let mut index = Self::new();
        index.extend(tree);
        index
    }

    /// Aggregate another tree into this index.
    ///
    /// Children are folded into the same accumulator, so a package that
    /// appears at several depths ends up under one name.
    pub fn extend(&mut self, tree: &Dependencies) {
        for (name, node) in tree {
            if let Some(url) = &node.resolved {
                self.insert(name, &node.version, url);
            }

            if !node.children.is_empty() {
                self.extend(&node.children);
            }
        }
    }

    /// Record that `name@version` resolved to `url`.
    pub fn insert(&mut self, name: &str, version: &str, url: &str) {
        let set = self
            .packages
            .entry(name.to_string())
            .or_insert_with(|| VersionSet::new(name));

        set.versions
            .entry(version.to_string())
            .or_default()
            .insert(url.to_string());
    }

    /// The versions recorded for `name`.
    pub fn get(&self, name: &str) -> Option<&VersionSet> {
        self.packages.get(name)
    }

    /// Whether `name` has any resolved entry.
    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    /// Iterate packages in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &VersionSet> {
        self.packages.values()
    }

    /// Number of distinct packages.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

struct CacheEntry {
    // Held so the tree's address cannot be reused while the entry lives
    _tree: Arc<Dependencies>,
    index: Arc<VersionIndex>,
}

/// Run-scoped memo of built indexes, keyed by tree identity.
///
/// Several analyses read the same parsed lock file; each asks the cache and
/// the index is built once. Keys are the tree's allocation, not its
/// contents: two equal trees parsed from different documents are distinct
/// inputs and get distinct entries.
#[derive(Default)]
pub struct IndexCache {
    entries: Mutex<HashMap<usize, CacheEntry>>,
}

impl IndexCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The index for `tree`, building it on first request.
    pub fn get_or_build(&self, tree: &Arc<Dependencies>) -> Arc<VersionIndex> {
        let key = Arc::as_ptr(tree) as usize;
        let mut entries = self.entries.lock();

        if let Some(entry) = entries.get(&key) {
            tracing::trace!(packages = entry.index.len(), "version index cache hit");
            return Arc::clone(&entry.index);
        }

        let index = Arc::new(VersionIndex::build(tree));
        tracing::debug!(packages = index.len(), "built version index");

        entries.insert(
            key,
            CacheEntry {
                _tree: Arc::clone(tree),
                index: Arc::clone(&index),
            },
        );
        index
    }

    /// Number of cached indexes.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether nothing has been cached yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}


#[cfg(test)]
#[cfg(feature = "property-tests")]
mod proptests {
    use super::*;
    use crate::model::DependencyNode;
    use proptest::prelude::*;

    fn arb_node(depth: u32) -> BoxedStrategy<DependencyNode> {
        let leaf = (
            "[a-e]",
            "[0-2]\\.[0-2]\\.[0-2]",
            proptest::option::of("https://(r|m)\\.example/[a-c]\\.tgz"),
        )
            .prop_map(|(name, version, url)| {
                let mut node = DependencyNode::new(name, version);
                node.resolved = url;
                node
            });

        if depth == 0 {
            return leaf.boxed();
        }

        (leaf, proptest::collection::vec(arb_node(depth - 1), 0..3))
            .prop_map(|(mut node, children)| {
                for child in children {
                    node.children.insert(child.name.clone(), child);
                }
                node
            })
            .boxed()
    }

    fn arb_tree() -> impl Strategy<Value = Dependencies> {
        proptest::collection::vec(arb_node(3), 0..6).prop_map(|nodes| {
            nodes
                .into_iter()
                .map(|node| (node.name.clone(), node))
                .collect()
        })
    }

    fn collect(tree: &Dependencies, out: &mut Vec<(String, String, Option<String>)>) {
        for (name, node) in tree {
            out.push((name.clone(), node.version.clone(), node.resolved.clone()));
            collect(&node.children, out);
        }
    }

    proptest! {
        /// Property: building twice yields the same index
        #[test]
        fn build_is_idempotent(tree in arb_tree()) {
            prop_assert_eq!(VersionIndex::build(&tree), VersionIndex::build(&tree));
        }

        /// Property: every resolved node is indexed, unresolved names never appear
        #[test]
        fn build_is_complete(tree in arb_tree()) {
            let index = VersionIndex::build(&tree);
            let mut nodes = Vec::new();
            collect(&tree, &mut nodes);

            for (name, version, url) in &nodes {
                if let Some(url) = url {
                    let urls = index.get(name).and_then(|set| set.urls(version));
                    prop_assert!(urls.is_some_and(|urls| urls.contains(url)));
                }
            }

            for set in index.iter() {
                prop_assert!(nodes.iter().any(|(name, _, url)| name == &set.name && url.is_some()));
            }
        }
    }
}
