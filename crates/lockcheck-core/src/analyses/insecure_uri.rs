use crate::error::Result;
use crate::finding::{Finding, FindingSet};
use crate::model::{DependencyNode, Lockfile};
use crate::visitor::{visit_dependencies, AnalysisContext, Visitor};
use async_trait::async_trait;
use lockcheck_config::CheckKind;

const PLAINTEXT_SCHEME: &str = "http://";

/// Whether `url` uses plaintext HTTP.
pub fn is_insecure_url(url: &str) -> bool {
    url.get(..PLAINTEXT_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(PLAINTEXT_SCHEME))
}

/// Reports dependencies resolved over plaintext HTTP.
///
/// Walks the tree rather than the index so nested copies are reported
/// under the name that declared them.
#[derive(Debug, Default)]
pub struct InsecureUriVisitor {
    findings: FindingSet,
}

impl InsecureUriVisitor {
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
impl Visitor for InsecureUriVisitor {
    fn kind(&self) -> CheckKind {
        CheckKind::InsecureUri
    }

    async fn visit(&self, lock: &Lockfile, _ctx: &AnalysisContext) -> Result<()> {
        visit_dependencies(self, &lock.dependencies).await
    }

    async fn visit_dependency(&self, name: &str, node: &DependencyNode) -> Result<()> {
        visit_dependencies(self, &node.children).await?;

        if let Some(url) = node.resolved.as_deref().filter(|url| is_insecure_url(url)) {
            tracing::debug!(dependency = name, url, "insecure resolved URL");
            self.findings
                .insert(Finding::error(format!("\"{}\" has an insecure URL", name)).with_details([url]));
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
    use crate::model::dependencies;
    use crate::Severity;

    async fn run(lock: &Lockfile) -> InsecureUriVisitor {
        let visitor = InsecureUriVisitor::new();
        visitor.visit(lock, &AnalysisContext::new()).await.unwrap();
        visitor
    }

    #[tokio::test]
    async fn test_plaintext_url_is_reported() {
        let lock = Lockfile::from_dependencies(dependencies([DependencyNode::new("foo", "1.0.0")
            .with_resolved("http://registry.example/foo-1.0.0.tgz")]));

        let visitor = run(&lock).await;
        let findings = visitor.findings();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Error);
        assert!(findings[0].message.contains("\"foo\""));
        assert_eq!(findings[0].details, vec!["http://registry.example/foo-1.0.0.tgz"]);
        assert!(visitor.has_errors());
    }

    #[tokio::test]
    async fn test_https_url_is_clean() {
        let lock = Lockfile::from_dependencies(dependencies([DependencyNode::new("foo", "1.0.0")
            .with_resolved("https://registry.example/foo-1.0.0.tgz")]));

        let visitor = run(&lock).await;
        assert!(visitor.findings().is_empty());
        assert!(!visitor.has_errors());
    }

    #[tokio::test]
    async fn test_nested_dependencies_are_reported() {
        let lock = Lockfile::from_dependencies(dependencies([DependencyNode::new("a", "1.0.0")
            .with_resolved("https://registry.example/a-1.0.0.tgz")
            .with_child(
                DependencyNode::new("b", "1.0.0")
                    .with_resolved("HTTP://registry.example/b-1.0.0.tgz")
                    .with_child(
                        DependencyNode::new("c", "1.0.0")
                            .with_resolved("http://registry.example/c-1.0.0.tgz"),
                    ),
            )]));

        let visitor = run(&lock).await;
        let mut messages: Vec<_> = visitor.findings().into_iter().map(|f| f.message).collect();
        messages.sort();

        assert_eq!(
            messages,
            vec!["\"b\" has an insecure URL", "\"c\" has an insecure URL"]
        );
    }

    #[tokio::test]
    async fn test_same_url_at_two_depths_collapses() {
        let url = "http://registry.example/b-1.0.0.tgz";
        let lock = Lockfile::from_dependencies(dependencies([
            DependencyNode::new("a", "1.0.0")
                .with_child(DependencyNode::new("b", "1.0.0").with_resolved(url)),
            DependencyNode::new("b", "1.0.0").with_resolved(url),
        ]));

        assert_eq!(run(&lock).await.findings().len(), 1);
    }

    #[test]
    fn test_is_insecure_url() {
        assert!(is_insecure_url("http://x"));
        assert!(is_insecure_url("Http://x"));
        assert!(!is_insecure_url("https://x"));
        assert!(!is_insecure_url("git+http://x"));
        assert!(!is_insecure_url("http"));
    }
}
