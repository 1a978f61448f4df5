//! Runtime file tracing.
//!
//! Starting from the entry files, every statically-referenced module is
//! resolved with Node semantics and followed until the set is closed. The
//! result maps each reached file to the files that referenced it and the ways
//! it was referenced.

pub mod extract;

use futures::future::join_all;
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use crate::runtime::{Runtime, RuntimeError};

pub use extract::{ExtractedSpecifier, InclusionReason, extract_specifiers, is_node_builtin};

/// How a traced file was reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceEntry {
    /// Files that referenced this one
    pub parents: FxHashSet<PathBuf>,
    /// Every way this file was referenced
    pub reasons: BTreeSet<InclusionReason>,
}

/// Outcome of tracing a set of entries.
#[derive(Debug, Default)]
pub struct TraceResult {
    /// Every reached file, keyed by canonical absolute path
    pub files: FxHashMap<PathBuf, TraceEntry>,
    /// Specifiers that could not be resolved or files that could not be read
    pub warnings: Vec<TraceWarning>,
}

/// A non-fatal problem met while tracing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceWarning {
    /// File being analyzed
    pub file: PathBuf,
    /// What went wrong
    pub message: String,
}

/// Follows imports and requires from a set of entry files.
#[derive(Debug, Clone)]
pub struct FileTracer {
    runtime: Arc<dyn Runtime>,
    follow_dynamic_imports: bool,
    batch_size: usize,
}

impl FileTracer {
    pub fn new(runtime: Arc<dyn Runtime>) -> Self {
        Self {
            runtime,
            follow_dynamic_imports: true,
            batch_size: crate::options::DEFAULT_BATCH_SIZE,
        }
    }

    /// Whether `import("literal")` edges are followed.
    pub fn follow_dynamic_imports(mut self, follow: bool) -> Self {
        self.follow_dynamic_imports = follow;
        self
    }

    /// Number of files analyzed concurrently.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Trace everything reachable from `entries`.
    ///
    /// Entries that do not exist are reported as warnings rather than errors
    /// so a single stale include does not abort a deploy.
    pub async fn trace(&self, entries: &[PathBuf]) -> TraceResult {
        let mut result = TraceResult::default();
        let mut frontier: Vec<PathBuf> = Vec::new();

        for entry in entries {
            match self.runtime.canonicalize(entry).await {
                Ok(canonical) => {
                    let node = result.files.entry(canonical.clone()).or_default();
                    node.reasons.insert(InclusionReason::Initial);
                    frontier.push(canonical);
                }
                Err(e) => result.warnings.push(TraceWarning {
                    file: entry.clone(),
                    message: e.to_string(),
                }),
            }
        }
        frontier.sort();
        frontier.dedup();

        let mut visited: FxHashSet<PathBuf> = frontier.iter().cloned().collect();

        while !frontier.is_empty() {
            let mut next = Vec::new();

            for batch in frontier.chunks(self.batch_size) {
                let analyses = join_all(batch.iter().map(|file| self.analyze(file))).await;

                for (file, analysis) in batch.iter().zip(analyses) {
                    result.warnings.extend(analysis.warnings);

                    for (dependency, reason) in analysis.dependencies {
                        let node = result.files.entry(dependency.clone()).or_default();
                        node.parents.insert(file.clone());
                        node.reasons.insert(reason);

                        if visited.insert(dependency.clone()) {
                            next.push(dependency);
                        }
                    }
                }
            }

            frontier = next;
        }

        debug!(
            files = result.files.len(),
            warnings = result.warnings.len(),
            "Trace complete"
        );
        result
    }

    async fn analyze(&self, file: &Path) -> FileAnalysis {
        let mut analysis = FileAnalysis::default();

        if !extract::is_parseable(file) {
            return analysis;
        }

        let bytes = match self.runtime.read_file(file).await {
            Ok(bytes) => bytes,
            Err(e) => {
                analysis.warnings.push(TraceWarning {
                    file: file.to_path_buf(),
                    message: e.to_string(),
                });
                return analysis;
            }
        };
        let source = String::from_utf8_lossy(&bytes);

        for found in extract::extract_specifiers(file, &source) {
            if is_node_builtin(&found.specifier) {
                continue;
            }
            if found.reason == InclusionReason::DynamicImport && !self.follow_dynamic_imports {
                continue;
            }

            match self
                .runtime
                .resolve(&found.specifier, file, found.reason.resolve_kind())
            {
                Ok(resolved) => {
                    trace!(
                        "{} -> {} ({:?})",
                        file.display(),
                        resolved.display(),
                        found.reason
                    );
                    analysis.dependencies.push((resolved, found.reason));
                }
                Err(RuntimeError::Builtin(_)) => {}
                Err(e) => {
                    warn!("{}", e);
                    analysis.warnings.push(TraceWarning {
                        file: file.to_path_buf(),
                        message: e.to_string(),
                    });
                }
            }
        }

        analysis
    }
}

#[derive(Default)]
struct FileAnalysis {
    dependencies: Vec<(PathBuf, InclusionReason)>,
    warnings: Vec<TraceWarning>,
}
