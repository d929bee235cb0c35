use crate::error::Result;
use crate::finding::{Finding, FindingSet};
use crate::manifest::PackageManifest;
use crate::model::{Dependencies, Lockfile};
use crate::version::satisfies;
use crate::visitor::{AnalysisContext, Visitor};
use async_trait::async_trait;
use lockcheck_config::CheckKind;

/// Top-level lock entries whose version falls outside the declared range.
///
/// Only direct dependencies are compared. Entries without a version
/// (workspace members, links) have nothing to compare and are skipped.
pub fn manifest_findings(manifest: &PackageManifest, deps: &Dependencies) -> Vec<Finding> {
    deps.iter()
        .filter_map(|(name, node)| {
            let range = manifest.declared_range(name)?;

            if node.version.is_empty() {
                tracing::debug!(dependency = %name, "no locked version to compare");
                return None;
            }
            if satisfies(&node.version, range) {
                return None;
            }

            Some(Finding::error(format!(
                "Dependency \"{}\" version mismatch: {} from lock file does not satisfy {}",
                name, node.version, range
            )))
        })
        .collect()
}

/// Compares the lock file against the companion manifest.
///
/// Without a manifest the analysis records nothing.
#[derive(Debug, Default)]
pub struct ManifestConsistencyVisitor {
    findings: FindingSet,
    manifest: Option<PackageManifest>,
}

impl ManifestConsistencyVisitor {
    /// Create the visitor.
    pub fn new(manifest: Option<PackageManifest>) -> Self {
        Self {
            findings: FindingSet::default(),
            manifest,
        }
    }

    /// Use the given accumulator (and its failure threshold).
    pub fn with_findings(findings: FindingSet, manifest: Option<PackageManifest>) -> Self {
        Self { findings, manifest }
    }
}

#[async_trait]
impl Visitor for ManifestConsistencyVisitor {
    fn kind(&self) -> CheckKind {
        CheckKind::ManifestConsistency
    }

    async fn visit(&self, lock: &Lockfile, _ctx: &AnalysisContext) -> Result<()> {
        let Some(manifest) = &self.manifest else {
            tracing::debug!("no companion manifest, skipping manifest consistency");
            return Ok(());
        };

        for finding in manifest_findings(manifest, &lock.dependencies) {
            self.findings.insert(finding);
        }
        Ok(())
    }

    fn finding_set(&self) -> &FindingSet {
        &self.findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{dependencies, DependencyNode};

    fn manifest() -> PackageManifest {
        PackageManifest::from_json(
            r#"{
                "name": "app",
                "dependencies": { "a": "^1.0.0" },
                "devDependencies": { "b": "~2.1.0" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_out_of_range_direct_dependency() {
        let deps = dependencies([DependencyNode::new("a", "2.0.0")]);
        let findings = manifest_findings(&manifest(), &deps);

        assert_eq!(findings.len(), 1);
        assert_eq!(
            findings[0].message,
            "Dependency \"a\" version mismatch: 2.0.0 from lock file does not satisfy ^1.0.0"
        );
    }

    #[test]
    fn test_in_range_dependency() {
        let deps = dependencies([
            DependencyNode::new("a", "1.2.3"),
            DependencyNode::new("b", "2.1.9"),
        ]);
        assert!(manifest_findings(&manifest(), &deps).is_empty());
    }

    #[test]
    fn test_dev_dependencies_are_checked() {
        let deps = dependencies([DependencyNode::new("b", "2.2.0")]);
        assert_eq!(manifest_findings(&manifest(), &deps).len(), 1);
    }

    #[test]
    fn test_transitive_and_undeclared_are_skipped() {
        let deps = dependencies([
            DependencyNode::new("a", "1.0.0").with_child(DependencyNode::new("b", "9.9.9")),
            DependencyNode::new("undeclared", "0.0.1"),
        ]);
        assert!(manifest_findings(&manifest(), &deps).is_empty());
    }

    #[test]
    fn test_empty_range_accepts_any_version() {
        let manifest =
            PackageManifest::from_json(r#"{ "dependencies": { "a": "" } }"#).unwrap();
        let deps = dependencies([DependencyNode::new("a", "7.1.0")]);
        assert!(manifest_findings(&manifest, &deps).is_empty());
    }

    #[test]
    fn test_unparseable_versions_mismatch() {
        let deps = dependencies([DependencyNode::new("a", "github:user/a")]);
        assert_eq!(manifest_findings(&manifest(), &deps).len(), 1);
    }

    #[tokio::test]
    async fn test_missing_manifest_records_nothing() {
        let lock = Lockfile::from_dependencies(dependencies([DependencyNode::new("a", "2.0.0")]));
        let visitor = ManifestConsistencyVisitor::new(None);

        visitor.visit(&lock, &AnalysisContext::new()).await.unwrap();
        assert!(visitor.findings().is_empty());
        assert!(!visitor.has_errors());
    }
}
