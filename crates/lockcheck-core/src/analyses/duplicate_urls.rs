use crate::error::Result;
use crate::finding::{Finding, FindingSet};
use crate::index::VersionIndex;
use crate::model::Lockfile;
use crate::visitor::{AnalysisContext, Visitor};
use async_trait::async_trait;
use lockcheck_config::CheckKind;

/// One warning per `(package, version)` bound to more than one URL.
pub fn duplicate_url_findings(index: &VersionIndex) -> Vec<Finding> {
    index
        .iter()
        .flat_map(|set| {
            set.versions
                .iter()
                .filter(|(_, urls)| urls.len() > 1)
                .map(move |(version, urls)| {
                    Finding::warning(format!(
                        "\"{}\" has multiple URLs for version {}",
                        set.name, version
                    ))
                    .with_details(urls.iter().cloned())
                })
        })
        .collect()
}

/// Reports versions resolved from several locations.
#[derive(Debug, Default)]
pub struct DuplicateUrlsVisitor {
    findings: FindingSet,
}

impl DuplicateUrlsVisitor {
    /// Create the visitor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use the given accumulator (and its failure threshold).
    pub fn with_findings(findings: FindingSet) -> Self {
        Self { findings }
    }
}

#[async_trait]
impl Visitor for DuplicateUrlsVisitor {
    fn kind(&self) -> CheckKind {
        CheckKind::DuplicateUrls
    }

    async fn visit(&self, lock: &Lockfile, ctx: &AnalysisContext) -> Result<()> {
        let index = ctx.version_index(lock);
        for finding in duplicate_url_findings(&index) {
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
    use crate::Severity;

    #[test]
    fn test_duplicate_version_urls() {
        let mut index = VersionIndex::new();
        index.insert("left-pad", "1.3.0", "https://a/x.tgz");
        index.insert("left-pad", "1.3.0", "https://b/y.tgz");
        index.insert("left-pad", "1.2.0", "https://a/w.tgz");
        index.insert("other", "1.0.0", "https://a/o.tgz");

        let findings = duplicate_url_findings(&index);

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(
            findings[0].message,
            "\"left-pad\" has multiple URLs for version 1.3.0"
        );
        assert_eq!(findings[0].details, vec!["https://a/x.tgz", "https://b/y.tgz"]);
    }

    #[test]
    fn test_clean_index_has_no_findings() {
        let mut index = VersionIndex::new();
        index.insert("a", "1.0.0", "https://a/a.tgz");
        index.insert("a", "2.0.0", "https://a/a2.tgz");
        assert!(duplicate_url_findings(&index).is_empty());
    }

    #[tokio::test]
    async fn test_visitor_uses_index_across_depths() {
        let lock = Lockfile::from_dependencies(dependencies([
            DependencyNode::new("a", "1.0.0")
                .with_resolved("https://r/a.tgz")
                .with_child(DependencyNode::new("b", "1.0.0").with_resolved("https://mirror/b.tgz")),
            DependencyNode::new("b", "1.0.0").with_resolved("https://r/b.tgz"),
        ]));

        let visitor = DuplicateUrlsVisitor::new();
        visitor.visit(&lock, &AnalysisContext::new()).await.unwrap();

        assert_eq!(visitor.findings().len(), 1);
        assert!(visitor.has_errors());
        assert!(!DuplicateUrlsVisitor::with_findings(FindingSet::from_fail_on_warnings(false)).has_errors());
    }
}
