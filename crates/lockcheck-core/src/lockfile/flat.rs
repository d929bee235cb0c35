//! Flat-package schema (`packages` keyed by install path)

use super::{LockSchema, RawLockfile, RawPackageEntry, SchemaNormalizer};
use crate::model::{Dependencies, DependencyNode};
use crate::{Error, Result};

const NODE_MODULES: &str = "node_modules";

pub(crate) struct FlatPackagesNormalizer;

impl SchemaNormalizer for FlatPackagesNormalizer {
    fn schema(&self) -> LockSchema {
        LockSchema::FlatPackages
    }

    fn accepts(&self, raw: &RawLockfile) -> bool {
        raw.packages.is_some()
    }

    fn normalize(&self, raw: &RawLockfile) -> Result<Dependencies> {
        let mut root = Dependencies::new();

        let Some(packages) = &raw.packages else {
            return Ok(root);
        };

        for (key, entry) in packages {
            // The root project itself
            if key.is_empty() {
                continue;
            }

            let segments = split_install_path(key)?;
            let node = convert_entry(&segments, entry, key)?;
            insert_at(&mut root, &segments, node);
        }

        Ok(root)
    }
}

/// Decompose an install path into tree segments.
///
/// `node_modules/a/node_modules/@s/b` becomes `["a", "@s/b"]`. A leading
/// non-`node_modules` prefix (a workspace member such as `packages/app`)
/// becomes the first segment.
fn split_install_path(key: &str) -> Result<Vec<String>> {
    let parts: Vec<&str> = key.split('/').collect();
    let mut segments = Vec::new();

    let prefix_len = parts
        .iter()
        .position(|part| *part == NODE_MODULES)
        .unwrap_or(parts.len());
    if prefix_len > 0 {
        segments.push(parts[..prefix_len].join("/"));
    }

    let mut rest = parts[prefix_len..].iter();
    while let Some(part) = rest.next() {
        if *part != NODE_MODULES {
            return Err(Error::malformed(key, "expected a node_modules segment"));
        }

        let name = match rest.next() {
            Some(scope) if scope.starts_with('@') => match rest.next() {
                Some(name) if !name.is_empty() => format!("{scope}/{name}"),
                _ => return Err(Error::malformed(key, "scoped package without a name")),
            },
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return Err(Error::malformed(key, "node_modules without a package name")),
        };
        segments.push(name);
    }

    Ok(segments)
}

fn convert_entry(segments: &[String], entry: &RawPackageEntry, key: &str) -> Result<DependencyNode> {
    let name = segments
        .last()
        .cloned()
        .ok_or_else(|| Error::malformed(key, "empty install path"))?;

    // Linked entries point at a local directory, never a remote source
    let resolved = if entry.link {
        None
    } else {
        entry.resolved.clone()
    };

    let version = match (&entry.version, &resolved) {
        (Some(version), _) => version.clone(),
        (None, None) => String::new(),
        (None, Some(_)) => return Err(Error::malformed(key, "resolved URL without a version")),
    };

    let requires = entry
        .dependencies
        .iter()
        .chain(&entry.optional_dependencies)
        .chain(&entry.peer_dependencies)
        .map(|(name, range)| (name.clone(), range.clone()))
        .collect();

    Ok(DependencyNode {
        name,
        version,
        resolved,
        integrity: entry.integrity.clone(),
        dev: entry.dev || entry.dev_optional,
        optional: entry.optional || entry.dev_optional,
        requires,
        children: Dependencies::new(),
    })
}

/// Attach `node` at `segments`, creating placeholder parents as needed.
///
/// A placeholder that is later filled in by its own entry keeps the children
/// already attached to it.
fn insert_at(root: &mut Dependencies, segments: &[String], node: DependencyNode) {
    let Some((last, parents)) = segments.split_last() else {
        return;
    };

    let mut level = root;
    for parent in parents {
        level = &mut level
            .entry(parent.clone())
            .or_insert_with(|| DependencyNode::new(parent.clone(), ""))
            .children;
    }

    match level.get_mut(last) {
        Some(existing) => {
            let children = std::mem::take(&mut existing.children);
            *existing = DependencyNode { children, ..node };
        }
        None => {
            level.insert(last.clone(), node);
        }
    }
}
