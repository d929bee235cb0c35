//! Deterministic diff between two version indexes
//!
//! The report lists removed packages first (baseline order), then one block
//! per current package that was added or changed (current order). Packages
//! that did not change produce nothing.

use crate::index::{VersionIndex, VersionSet};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// URL changes for a version present on both sides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionUrlChange {
    /// The version
    pub version: String,
    /// URLs only in the current index
    pub added_urls: Vec<String>,
    /// URLs only in the baseline
    pub removed_urls: Vec<String>,
}

/// One package-level difference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiffEntry {
    /// Present only in the baseline
    PackageRemoved {
        /// Package name
        name: String,
    },
    /// Present only in the current index
    PackageAdded {
        /// Package name
        name: String,
        /// Every version with its URLs
        versions: IndexMap<String, Vec<String>>,
    },
    /// Present on both sides with differences
    PackageChanged {
        /// Package name
        name: String,
        /// Versions only in the baseline
        removed_versions: Vec<String>,
        /// Versions only in the current index, with their URLs
        added_versions: IndexMap<String, Vec<String>>,
        /// Versions on both sides whose URLs differ
        changed_versions: Vec<VersionUrlChange>,
    },
}

impl DiffEntry {
    /// The package this entry is about.
    pub fn name(&self) -> &str {
        match self {
            DiffEntry::PackageRemoved { name }
            | DiffEntry::PackageAdded { name, .. }
            | DiffEntry::PackageChanged { name, .. } => name,
        }
    }
}

/// A rendered report line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLine {
    /// `- name`
    RemovedPackage(String),
    /// `name`
    PackageHeader(String),
    /// `- version`
    RemovedVersion(String),
    /// `+ version [url, ...]`
    AddedVersion {
        /// The version
        version: String,
        /// Its URLs
        urls: Vec<String>,
    },
    /// `  ~ version`
    ChangedVersion(String),
    /// `    + url`
    AddedUrl(String),
    /// `    - url`
    RemovedUrl(String),
}

impl fmt::Display for DiffLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffLine::RemovedPackage(name) => write!(f, "- {}", name),
            DiffLine::PackageHeader(name) => f.write_str(name),
            DiffLine::RemovedVersion(version) => write!(f, "- {}", version),
            DiffLine::AddedVersion { version, urls } => {
                write!(f, "+ {} [{}]", version, urls.join(", "))
            }
            DiffLine::ChangedVersion(version) => write!(f, "  ~ {}", version),
            DiffLine::AddedUrl(url) => write!(f, "    + {}", url),
            DiffLine::RemovedUrl(url) => write!(f, "    - {}", url),
        }
    }
}

/// Package names grouped by kind of change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    /// Packages only in the current index
    pub new_packages: Vec<String>,
    /// Packages only in the baseline
    pub removed_packages: Vec<String>,
    /// Packages on both sides that differ
    pub changed_packages: Vec<String>,
}

/// Ordered list of differences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffReport {
    /// Entries in report order
    pub entries: Vec<DiffEntry>,
}

impl DiffReport {
    /// Whether the two indexes were equivalent.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the report in line order.
    pub fn lines(&self) -> Vec<DiffLine> {
        let mut lines = Vec::new();

        for entry in &self.entries {
            match entry {
                DiffEntry::PackageRemoved { name } => {
                    lines.push(DiffLine::RemovedPackage(name.clone()));
                }
                DiffEntry::PackageAdded { name, versions } => {
                    lines.push(DiffLine::PackageHeader(name.clone()));
                    push_added_versions(&mut lines, versions);
                }
                DiffEntry::PackageChanged {
                    name,
                    removed_versions,
                    added_versions,
                    changed_versions,
                } => {
                    lines.push(DiffLine::PackageHeader(name.clone()));
                    lines.extend(
                        removed_versions
                            .iter()
                            .cloned()
                            .map(DiffLine::RemovedVersion),
                    );
                    push_added_versions(&mut lines, added_versions);

                    for change in changed_versions {
                        lines.push(DiffLine::ChangedVersion(change.version.clone()));
                        lines.extend(change.added_urls.iter().cloned().map(DiffLine::AddedUrl));
                        lines.extend(
                            change
                                .removed_urls
                                .iter()
                                .cloned()
                                .map(DiffLine::RemovedUrl),
                        );
                    }
                }
            }
        }

        lines
    }

    /// Package names by kind of change.
    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for entry in &self.entries {
            let bucket = match entry {
                DiffEntry::PackageRemoved { .. } => &mut summary.removed_packages,
                DiffEntry::PackageAdded { .. } => &mut summary.new_packages,
                DiffEntry::PackageChanged { .. } => &mut summary.changed_packages,
            };
            bucket.push(entry.name().to_string());
        }
        summary
    }
}

fn push_added_versions(lines: &mut Vec<DiffLine>, versions: &IndexMap<String, Vec<String>>) {
    lines.extend(versions.iter().map(|(version, urls)| DiffLine::AddedVersion {
        version: version.clone(),
        urls: urls.clone(),
    }));
}

fn all_versions(set: &VersionSet) -> IndexMap<String, Vec<String>> {
    set.versions
        .iter()
        .map(|(version, urls)| (version.clone(), urls.iter().cloned().collect()))
        .collect()
}

fn compare(current: &VersionSet, baseline: &VersionSet) -> Option<DiffEntry> {
    let removed_versions: Vec<String> = baseline
        .versions
        .keys()
        .filter(|version| !current.versions.contains_key(*version))
        .cloned()
        .collect();

    let mut added_versions = IndexMap::new();
    let mut changed_versions = Vec::new();

    for (version, urls) in &current.versions {
        let Some(previous) = baseline.versions.get(version) else {
            added_versions.insert(version.clone(), urls.iter().cloned().collect());
            continue;
        };

        let added_urls: Vec<String> = urls.difference(previous).cloned().collect();
        let removed_urls: Vec<String> = previous.difference(urls).cloned().collect();

        if !added_urls.is_empty() || !removed_urls.is_empty() {
            changed_versions.push(VersionUrlChange {
                version: version.clone(),
                added_urls,
                removed_urls,
            });
        }
    }

    if removed_versions.is_empty() && added_versions.is_empty() && changed_versions.is_empty() {
        return None;
    }

    Some(DiffEntry::PackageChanged {
        name: current.name.clone(),
        removed_versions,
        added_versions,
        changed_versions,
    })
}

/// Compare `current` against `baseline`.
pub fn diff(current: &VersionIndex, baseline: &VersionIndex) -> DiffReport {
    let mut entries: Vec<DiffEntry> = baseline
        .iter()
        .filter(|set| !current.contains(&set.name))
        .map(|set| DiffEntry::PackageRemoved {
            name: set.name.clone(),
        })
        .collect();

    for set in current.iter() {
        match baseline.get(&set.name) {
            None => entries.push(DiffEntry::PackageAdded {
                name: set.name.clone(),
                versions: all_versions(set),
            }),
            Some(previous) => entries.extend(compare(set, previous)),
        }
    }

    tracing::debug!(entries = entries.len(), "computed lock file diff");
    DiffReport { entries }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(entries: &[(&str, &str, &str)]) -> VersionIndex {
        let mut index = VersionIndex::new();
        for (name, version, url) in entries {
            index.insert(name, version, url);
        }
        index
    }

    fn rendered(report: &DiffReport) -> Vec<String> {
        report.lines().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_identical_indexes_have_empty_diff() {
        let x = index(&[
            ("a", "1.0.0", "https://r/a-1.tgz"),
            ("a", "1.0.0", "https://m/a-1.tgz"),
            ("b", "2.0.0", "https://r/b-2.tgz"),
        ]);

        let report = diff(&x, &x);
        assert!(report.is_empty());
        assert!(report.lines().is_empty());
        assert_eq!(report.summary(), DiffSummary::default());
    }

    #[test]
    fn test_added_package_lists_every_version() {
        let baseline = index(&[("a", "1.0.0", "https://r/a-1.tgz")]);
        let current = index(&[
            ("a", "1.0.0", "https://r/a-1.tgz"),
            ("p", "1.0.0", "https://r/p-1.tgz"),
            ("p", "2.0.0", "https://r/p-2.tgz"),
            ("p", "2.0.0", "https://m/p-2.tgz"),
        ]);

        let report = diff(&current, &baseline);

        assert_eq!(report.entries.len(), 1);
        match &report.entries[0] {
            DiffEntry::PackageAdded { name, versions } => {
                assert_eq!(name, "p");
                assert_eq!(versions["1.0.0"], vec!["https://r/p-1.tgz"]);
                assert_eq!(versions["2.0.0"], vec!["https://r/p-2.tgz", "https://m/p-2.tgz"]);
            }
            other => panic!("unexpected entry {:?}", other),
        }
        assert!(report
            .entries
            .iter()
            .all(|entry| !matches!(entry, DiffEntry::PackageChanged { .. })));
    }

    #[test]
    fn test_line_order() {
        let baseline = index(&[
            ("gone", "1.0.0", "https://r/gone.tgz"),
            ("a", "1.0.0", "https://r/a-1.tgz"),
            ("a", "2.0.0", "https://r/a-2.tgz"),
            ("same", "1.0.0", "https://r/same.tgz"),
        ]);
        let current = index(&[
            ("a", "2.0.0", "https://m/a-2.tgz"),
            ("a", "3.0.0", "https://r/a-3.tgz"),
            ("same", "1.0.0", "https://r/same.tgz"),
            ("new", "0.1.0", "https://r/new.tgz"),
        ]);

        let report = diff(&current, &baseline);

        assert_eq!(
            rendered(&report),
            vec![
                "- gone",
                "a",
                "- 1.0.0",
                "+ 3.0.0 [https://r/a-3.tgz]",
                "  ~ 2.0.0",
                "    + https://m/a-2.tgz",
                "    - https://r/a-2.tgz",
                "new",
                "+ 0.1.0 [https://r/new.tgz]",
            ]
        );

        let summary = report.summary();
        assert_eq!(summary.removed_packages, vec!["gone"]);
        assert_eq!(summary.changed_packages, vec!["a"]);
        assert_eq!(summary.new_packages, vec!["new"]);
    }

    #[test]
    fn test_diff_against_empty_baseline() {
        let current = index(&[("a", "1.0.0", "https://r/a.tgz")]);
        let report = diff(&current, &VersionIndex::new());
        assert_eq!(rendered(&report), vec!["a", "+ 1.0.0 [https://r/a.tgz]"]);

        let reverse = diff(&VersionIndex::new(), &current);
        assert_eq!(rendered(&reverse), vec!["- a"]);
    }

    #[test]
    fn test_serializes_entries_by_kind() {
        let report = diff(&VersionIndex::new(), &index(&[("a", "1.0.0", "https://r/a.tgz")]));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["entries"][0]["kind"], "package_removed");
        assert_eq!(json["entries"][0]["name"], "a");
    }
}
