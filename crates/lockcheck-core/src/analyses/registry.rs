use crate::error::Result;
use crate::finding::{Finding, FindingSet};
use crate::index::VersionIndex;
use crate::model::Lockfile;
use crate::visitor::{AnalysisContext, Visitor};
use async_trait::async_trait;
use indexmap::IndexSet;
use lockcheck_config::CheckKind;
use url::Url;

/// The registry a resolved URL points at: `scheme://host[:port]`.
///
/// Non-web schemes (`git+https:`, `git+ssh:`) keep their host. Hostless
/// URLs such as `file:` collapse to their scheme. Strings that are not URLs
/// are returned unchanged.
pub fn registry_origin(resolved: &str) -> String {
    let url = match Url::parse(resolved) {
        Ok(url) => url,
        Err(_) => return resolved.to_string(),
    };

    if url.origin().is_tuple() {
        return url.origin().ascii_serialization();
    }

    match (url.host_str(), url.port()) {
        (Some(host), Some(port)) => format!("{}://{}:{}", url.scheme(), host, port),
        (Some(host), None) => format!("{}://{}", url.scheme(), host),
        (None, _) => format!("{}:", url.scheme()),
    }
}

/// Registry findings for the unscoped packages in `index`.
///
/// Scoped packages (`@scope/name`) are ignored since per-scope registries
/// are a normal setup. With `verbose`, an info finding lists every origin.
pub fn registry_findings(index: &VersionIndex, verbose: bool) -> Vec<Finding> {
    let origins: IndexSet<String> = index
        .iter()
        .filter(|set| !set.name.starts_with('@'))
        .flat_map(|set| set.versions.values().flatten())
        .map(|url| registry_origin(url))
        .collect();

    let mut findings = Vec::new();

    if verbose {
        findings.push(Finding::info("Registries used").with_details(origins.iter().cloned()));
    }

    match origins.len() {
        1 => {}
        0 => findings.push(Finding::warning(
            "No registry referenced for unscoped dependencies",
        )),
        _ => findings.push(
            Finding::warning("Multiple registries referenced for unscoped dependencies")
                .with_details(origins.iter().cloned()),
        ),
    }

    findings
}

/// Reports unscoped packages resolved from more than one registry.
#[derive(Debug, Default)]
pub struct RegistryConsistencyVisitor {
    findings: FindingSet,
    verbose: bool,
}

impl RegistryConsistencyVisitor {
    /// Create the visitor.
    pub fn new(verbose: bool) -> Self {
        Self {
            findings: FindingSet::default(),
            verbose,
        }
    }

    /// Use the given accumulator (and its failure threshold).
    pub fn with_findings(findings: FindingSet, verbose: bool) -> Self {
        Self { findings, verbose }
    }
}

#[async_trait]
impl Visitor for RegistryConsistencyVisitor {
    fn kind(&self) -> CheckKind {
        CheckKind::RegistryConsistency
    }

    async fn visit(&self, lock: &Lockfile, ctx: &AnalysisContext) -> Result<()> {
        let index = ctx.version_index(lock);
        for finding in registry_findings(&index, self.verbose) {
            self.findings.insert(finding);
        }
        Ok(())
    }

    fn finding_set(&self) -> &FindingSet {
        &self.findings
    }
}
