//! Nested-tree schema (`dependencies` maps all the way down)

use super::{LockSchema, RawLockfile, RawNestedEntry, SchemaNormalizer};
use crate::model::{Dependencies, DependencyNode};
use crate::{Error, Result};
use indexmap::IndexMap;

pub(crate) struct NestedTreeNormalizer;

impl SchemaNormalizer for NestedTreeNormalizer {
    fn schema(&self) -> LockSchema {
        LockSchema::NestedTree
    }

    fn accepts(&self, raw: &RawLockfile) -> bool {
        raw.dependencies.is_some()
    }

    fn normalize(&self, raw: &RawLockfile) -> Result<Dependencies> {
        match &raw.dependencies {
            Some(entries) => convert_level(entries, ""),
            None => Ok(Dependencies::new()),
        }
    }
}

fn convert_level(entries: &IndexMap<String, RawNestedEntry>, parent: &str) -> Result<Dependencies> {
    entries
        .iter()
        .map(|(name, entry)| {
            let path = if parent.is_empty() {
                name.clone()
            } else {
                format!("{parent} > {name}")
            };
            convert_entry(name, entry, &path).map(|node| (name.clone(), node))
        })
        .collect()
}

fn convert_entry(name: &str, entry: &RawNestedEntry, path: &str) -> Result<DependencyNode> {
    let version = match (&entry.version, &entry.resolved) {
        (Some(version), _) => version.clone(),
        (None, None) => String::new(),
        (None, Some(_)) => {
            return Err(Error::malformed(path, "resolved URL without a version"));
        }
    };

    Ok(DependencyNode {
        name: name.to_string(),
        version,
        resolved: entry.resolved.clone(),
        integrity: entry.integrity.clone(),
        dev: entry.dev,
        optional: entry.optional,
        requires: entry.requires.clone(),
        children: convert_level(&entry.dependencies, path)?,
    })
}
