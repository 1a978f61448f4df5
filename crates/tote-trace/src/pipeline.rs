//! End-to-end run: trace, resolve, materialize, link.

use futures::future::join_all;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::layout::OutputLayout;
use crate::materialize::Materializer;
use crate::options::TraceOptions;
use crate::package::{PackageResolver, TracedFile};
use crate::registry::{PackageRegistry, TracedFiles};
use crate::runtime::Runtime;
use crate::summary::{ErrorCategory, ItemError, TraceSummary};
use crate::symlink::{create_links, plan_dependency_links, plan_top_level_links};
use crate::trace::{FileTracer, TraceEntry};
use crate::{Error, Result};

/// Files whose presence marks a Yarn Plug'n'Play install.
const PNP_MARKERS: &[&str] = &[".pnp.cjs", ".pnp.js"];

/// Trace the app's runtime files and materialize them under
/// `<out_dir>/node_modules`.
///
/// Per-file and per-link failures are collected in the returned summary.
/// Only invalid options (including an empty output directory path) and
/// failure to create `node_modules/.versions` are errors.
#[tracing::instrument(skip_all, fields(entries = options.entries.len()))]
pub async fn trace_dependencies(options: &TraceOptions) -> Result<TraceSummary> {
    options.validate()?;
    let exclude = options.exclude_patterns()?;
    let base_dir = options.resolved_base_dir()?;
    let runtime = options.resolved_runtime();

    if let Some(marker) = find_pnp_marker(runtime.as_ref(), &base_dir) {
        warn!(
            "Yarn Plug'n'Play detected ({}); skipping dependency tracing",
            marker.display()
        );
        return Ok(TraceSummary {
            pnp_detected: true,
            ..TraceSummary::default()
        });
    }

    // Traced paths are canonical, so the directories they are compared
    // against must be too.
    let base_dir = runtime.canonicalize(&base_dir).await?;
    let out_dir = canonical_out_dir(runtime.as_ref(), &base_dir.join(&options.out_dir)).await?;
    if let Some(root) = &options.root {
        debug!("Project root: {}", root.display());
    }

    let mut summary = TraceSummary::default();

    let mut roots = options.entries.clone();
    roots.extend(options.extra_includes.iter().cloned());
    let traced = FileTracer::new(runtime.clone())
        .follow_dynamic_imports(options.follow_dynamic_imports)
        .batch_size(options.batch_size)
        .trace(&roots)
        .await;

    summary.files_traced = traced.files.len();
    summary.errors.extend(
        traced
            .warnings
            .into_iter()
            .map(|w| ItemError::new(ErrorCategory::Trace, w.file, w.message)),
    );

    let mut candidates: Vec<(PathBuf, TraceEntry)> = Vec::with_capacity(traced.files.len());
    for (path, entry) in traced.files {
        if path.starts_with(&out_dir) {
            continue;
        }
        let shown = path.to_string_lossy();
        if exclude.iter().any(|pattern| pattern.is_match(&shown)) {
            debug!("Excluded {}", shown);
            summary.files_excluded += 1;
            continue;
        }
        candidates.push((path, entry));
    }
    candidates.sort_by(|a, b| a.0.cmp(&b.0));

    let files = resolve_packages(
        &PackageResolver::new(runtime.clone(), &base_dir),
        &candidates,
        options.batch_size,
        &mut summary,
    )
    .await;
    summary.files_resolved = files.len();

    let registry = PackageRegistry::build(files.values());
    summary.packages = registry.len();
    summary.multi_version_packages = registry
        .multi_version_packages()
        .into_iter()
        .map(str::to_string)
        .collect();
    for name in &summary.multi_version_packages {
        debug!("{} has versions {:?}", name, registry.versions(name));
    }

    let layout = OutputLayout::new(&out_dir);
    let materializer = Materializer::new(runtime.clone(), layout.clone());
    materializer
        .scaffold()
        .await
        .map_err(|source| Error::Scaffold {
            path: layout.versions_dir(),
            source,
        })?;

    // Every copy finishes before the first link is created.
    summary.record_copy(materializer.copy_all(&registry, &files).await);

    let dependency_links = plan_dependency_links(&files, &registry, &layout);
    summary.record_links(create_links(runtime.clone(), &dependency_links).await);

    let top_level_links = plan_top_level_links(&registry, &layout);
    summary.record_links(create_links(runtime.clone(), &top_level_links).await);

    info!(
        "Materialized {} files into {}",
        summary.files_copied,
        layout.node_modules().display()
    );
    summary.log();
    Ok(summary)
}

/// Resolve owning packages in fixed-size concurrent batches.
async fn resolve_packages(
    resolver: &PackageResolver,
    candidates: &[(PathBuf, TraceEntry)],
    batch_size: usize,
    summary: &mut TraceSummary,
) -> TracedFiles {
    let mut files: TracedFiles = FxHashMap::default();

    for batch in candidates.chunks(batch_size.max(1)) {
        let results = join_all(batch.iter().map(|(path, _)| resolver.resolve(path))).await;

        for ((path, entry), result) in batch.iter().zip(results) {
            match result {
                Ok(package) => {
                    files
                        .entry(path.clone())
                        .or_insert_with(|| TracedFile::new(path.clone(), entry, package));
                }
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    summary.files_skipped += 1;
                    summary
                        .errors
                        .push(ItemError::new(ErrorCategory::Resolve, path, e));
                }
            }
        }
    }

    files
}

/// Canonical form of `out_dir`, which may not exist yet.
///
/// The deepest existing ancestor is canonicalized and the missing components
/// are appended, so the result compares equal to canonical traced paths once
/// scaffolding creates the directory.
async fn canonical_out_dir(runtime: &dyn Runtime, out_dir: &Path) -> Result<PathBuf> {
    for ancestor in out_dir.ancestors() {
        if !runtime.exists(ancestor) {
            continue;
        }
        let canonical = runtime.canonicalize(ancestor).await?;
        return Ok(match out_dir.strip_prefix(ancestor) {
            Ok(rest) => canonical.join(rest),
            Err(_) => canonical,
        });
    }
    Ok(out_dir.to_path_buf())
}

/// First Plug'n'Play marker in `dir` or one of its ancestors.
pub fn find_pnp_marker(runtime: &dyn Runtime, dir: &Path) -> Option<PathBuf> {
    dir.ancestors().find_map(|ancestor| {
        PNP_MARKERS
            .iter()
            .map(|marker| ancestor.join(marker))
            .find(|candidate| runtime.exists(candidate))
    })
}
