//! Tree visitor capability and concurrent sibling fan-out

use crate::error::{Error, Result};
use crate::finding::{Finding, FindingSet};
use crate::index::{IndexCache, VersionIndex};
use crate::model::{Dependencies, DependencyNode, Lockfile};
use async_trait::async_trait;
use futures::future::{join_all, BoxFuture, FutureExt};
use lockcheck_config::CheckKind;
use std::sync::Arc;

/// Run-scoped state shared by every analysis.
///
/// Create one per run; nothing here outlives it.
#[derive(Default)]
pub struct AnalysisContext {
    index_cache: IndexCache,
}

impl AnalysisContext {
    /// Create a fresh context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The version index for `lock`, built at most once per parsed tree.
    pub fn version_index(&self, lock: &Lockfile) -> Arc<VersionIndex> {
        self.index_cache.get_or_build(&lock.dependencies)
    }

    /// The underlying cache.
    pub fn index_cache(&self) -> &IndexCache {
        &self.index_cache
    }
}

/// An analysis over a parsed lock file.
///
/// Implementations own their [`FindingSet`]; callers only read it after
/// [`Visitor::visit`] completes.
#[async_trait]
pub trait Visitor: Send + Sync {
    /// Which analysis this is.
    fn kind(&self) -> CheckKind;

    /// Display name.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Entry point. Implementations pick the version index, a tree walk
    /// through [`visit_dependencies`], or neither.
    async fn visit(&self, lock: &Lockfile, ctx: &AnalysisContext) -> Result<()>;

    /// Per-node hook used by [`visit_dependencies`].
    async fn visit_dependency(&self, _name: &str, _node: &DependencyNode) -> Result<()> {
        Ok(())
    }

    /// The accumulator findings are recorded into.
    fn finding_set(&self) -> &FindingSet;

    /// Findings recorded so far, in insertion order.
    fn findings(&self) -> Vec<Finding> {
        self.finding_set().snapshot()
    }

    /// Whether the recorded findings fail the run.
    fn has_errors(&self) -> bool {
        self.finding_set().has_failures()
    }
}

/// Visit every sibling in `deps` concurrently.
///
/// Completes only once every sibling has completed. A failing sibling does
/// not cancel the others, and findings they record are kept. One failure
/// is returned unchanged; several are collected into [`Error::Traversal`].
pub fn visit_dependencies<'a, V>(visitor: &'a V, deps: &'a Dependencies) -> BoxFuture<'a, Result<()>>
where
    V: Visitor + ?Sized,
{
    async move {
        if deps.is_empty() {
            return Ok(());
        }

        let results = join_all(
            deps.iter()
                .map(|(name, node)| visitor.visit_dependency(name, node)),
        )
        .await;

        merge_results(results)
    }
    .boxed()
}

fn merge_results(results: Vec<Result<()>>) -> Result<()> {
    let mut errors: Vec<Error> = results
        .into_iter()
        .filter_map(|result| result.err())
        .flat_map(|err| match err {
            Error::Traversal(inner) => inner,
            other => vec![other],
        })
        .collect();

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(Error::Traversal(errors)),
    }
}
