//! Directory links between materialized packages.
//!
//! A consumer that requires a specific version of a multi-version package
//! gets a private `node_modules/<dep>` link pointing at that version's copy
//! under `.versions`. Node's upward `node_modules` lookup then finds the
//! right version without any runtime support.

use futures::future::join_all;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::layout::{self, MAX_PATH_LENGTH, OutputLayout};
use crate::package::path::NODE_MODULES;
use crate::registry::{PackageRegistry, TracedFiles};
use crate::runtime::{Runtime, RuntimeError};
use crate::summary::{ErrorCategory, ItemError, LinkReport};

/// A directory link to create: `target` will point at `source`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLink {
    /// Existing directory the link refers to
    pub source: PathBuf,
    /// Where the link is created
    pub target: PathBuf,
}

/// What [`create_symlink`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created,
    AlreadyExists,
}

#[derive(Debug, thiserror::Error)]
pub enum SymlinkError {
    #[error("link path is {length} characters, over the {MAX_PATH_LENGTH} character limit")]
    PathTooLong { length: usize },

    #[error("cannot compute a relative path from {from} to {to}")]
    NoRelativePath { from: PathBuf, to: PathBuf },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Plan the consumer-specific links needed by `files`.
///
/// For every edge `parent → file` crossing a package boundary where the
/// file's package has several versions, the parent's package directory gets
/// `node_modules/<dep>` pointing at `.versions/<dep>@<version>`. Links are
/// keyed by target path; when two edges want the same target the last one
/// seen wins. The plan is sorted by target.
pub fn plan_dependency_links(
    files: &TracedFiles,
    registry: &PackageRegistry,
    layout: &OutputLayout,
) -> Vec<DependencyLink> {
    let mut planned: FxHashMap<PathBuf, PathBuf> = FxHashMap::default();

    let mut ordered: Vec<_> = files.values().collect();
    ordered.sort_by(|a, b| a.path.cmp(&b.path));

    for file in ordered {
        let dep = &file.package;
        if !registry.is_multi_version(&dep.name) {
            continue;
        }

        for parent_path in &file.parents {
            let Some(parent) = files.get(parent_path) else {
                continue;
            };
            let consumer = &parent.package;
            if consumer.name == dep.name {
                continue;
            }

            let consumer_dir = layout.package_dir(
                &consumer.name,
                &consumer.version,
                registry.is_multi_version(&consumer.name),
            );
            let target = layout::join_package_name(&consumer_dir.join(NODE_MODULES), &dep.name);
            let source = layout.version_dir(&dep.name, &dep.version);

            planned.insert(target, source);
        }
    }

    let mut links: Vec<DependencyLink> = planned
        .into_iter()
        .map(|(target, source)| DependencyLink { source, target })
        .collect();
    links.sort_by(|a, b| a.target.cmp(&b.target));
    links
}

/// Top-level links promoting the newest version of each multi-version
/// package: `node_modules/<name>` → `.versions/<name>@<newest>`.
pub fn plan_top_level_links(registry: &PackageRegistry, layout: &OutputLayout) -> Vec<DependencyLink> {
    registry
        .multi_version_packages()
        .into_iter()
        .filter_map(|name| {
            let newest = registry.newest(name)?;
            Some(DependencyLink {
                source: layout.version_dir(name, newest),
                target: layout.top_level_dir(name),
            })
        })
        .collect()
}

/// Create a relative directory link at `target` pointing at `source`.
///
/// Parent directories of `target` are created. An existing entry at
/// `target` (link, directory or file) is left untouched.
pub async fn create_symlink(
    runtime: &dyn Runtime,
    source: &Path,
    target: &Path,
) -> Result<LinkOutcome, SymlinkError> {
    if !layout::within_path_limit(target) {
        return Err(SymlinkError::PathTooLong {
            length: target.to_string_lossy().chars().count(),
        });
    }

    if runtime.symlink_metadata(target).await.is_ok() {
        debug!("Link already exists: {}", target.display());
        return Ok(LinkOutcome::AlreadyExists);
    }

    let parent = target.parent().unwrap_or(target);
    runtime.create_dir(parent, true).await?;

    let relative = pathdiff::diff_paths(source, parent).ok_or_else(|| {
        SymlinkError::NoRelativePath {
            from: parent.to_path_buf(),
            to: source.to_path_buf(),
        }
    })?;

    runtime.symlink_dir(&relative, source, target).await?;
    debug!("{} -> {}", target.display(), relative.display());
    Ok(LinkOutcome::Created)
}

/// Create every link concurrently, recording failures per link.
#[tracing::instrument(skip_all, fields(links = links.len()))]
pub async fn create_links(runtime: Arc<dyn Runtime>, links: &[DependencyLink]) -> LinkReport {
    let outcomes = join_all(
        links
            .iter()
            .map(|link| create_symlink(runtime.as_ref(), &link.source, &link.target)),
    )
    .await;

    let mut report = LinkReport::default();
    for (link, outcome) in links.iter().zip(outcomes) {
        match outcome {
            Ok(LinkOutcome::Created) => report.created += 1,
            Ok(LinkOutcome::AlreadyExists) => report.existing += 1,
            Err(e) => {
                warn!("Failed to link {}: {}", link.target.display(), e);
                report
                    .errors
                    .push(ItemError::new(ErrorCategory::Symlink, &link.target, e));
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::test_support::traced;
    use crate::runtime::NativeRuntime;
    use tempfile::TempDir;

    fn files(list: Vec<crate::package::TracedFile>) -> TracedFiles {
        list.into_iter().map(|f| (f.path.clone(), f)).collect()
    }

    #[test]
    fn test_consumer_specific_links() {
        let files = files(vec![
            traced("/p/a.js", "A", "1.0.0", &[]),
            traced("/p/c.js", "C", "1.0.0", &[]),
            traced("/p/b1.js", "B", "1.0.0", &["/p/a.js"]),
            traced("/p/b2.js", "B", "2.0.0", &["/p/c.js"]),
        ]);
        let registry = PackageRegistry::build(files.values());
        let layout = OutputLayout::new(Path::new("/out"));

        let links = plan_dependency_links(&files, &registry, &layout);

        assert_eq!(
            links,
            vec![
                DependencyLink {
                    source: PathBuf::from("/out/node_modules/.versions/B@1.0.0"),
                    target: PathBuf::from("/out/node_modules/A/node_modules/B"),
                },
                DependencyLink {
                    source: PathBuf::from("/out/node_modules/.versions/B@2.0.0"),
                    target: PathBuf::from("/out/node_modules/C/node_modules/B"),
                },
            ]
        );

        let top = plan_top_level_links(&registry, &layout);
        assert_eq!(
            top,
            vec![DependencyLink {
                source: PathBuf::from("/out/node_modules/.versions/B@2.0.0"),
                target: PathBuf::from("/out/node_modules/B"),
            }]
        );
    }

    #[test]
    fn test_no_links_within_a_package_or_to_single_version_deps() {
        let files = files(vec![
            traced("/p/a.js", "A", "1.0.0", &[]),
            traced("/p/a2.js", "A", "1.0.0", &["/p/a.js"]),
            traced("/p/d.js", "D", "1.0.0", &["/p/a.js"]),
            traced("/p/b1.js", "B", "1.0.0", &["/p/b2.js"]),
            traced("/p/b2.js", "B", "2.0.0", &["/missing.js"]),
        ]);
        let registry = PackageRegistry::build(files.values());
        let layout = OutputLayout::new(Path::new("/out"));

        assert!(plan_dependency_links(&files, &registry, &layout).is_empty());
    }

    #[test]
    fn test_multi_version_consumer_links_from_versions_dir() {
        let files = files(vec![
            traced("/p/x1.js", "X", "1.0.0", &[]),
            traced("/p/x2.js", "X", "2.0.0", &[]),
            traced("/p/y1.js", "Y", "1.0.0", &["/p/x1.js"]),
            traced("/p/y2.js", "Y", "2.0.0", &["/p/x2.js"]),
        ]);
        let registry = PackageRegistry::build(files.values());
        let layout = OutputLayout::new(Path::new("/out"));

        let links = plan_dependency_links(&files, &registry, &layout);

        assert_eq!(links.len(), 2);
        assert_eq!(
            links[0].target,
            PathBuf::from("/out/node_modules/.versions/X@1.0.0/node_modules/Y")
        );
        assert_eq!(
            links[0].source,
            PathBuf::from("/out/node_modules/.versions/Y@1.0.0")
        );
    }

    #[test]
    fn test_duplicate_targets_are_planned_once() {
        let files = files(vec![
            traced("/p/a.js", "A", "1.0.0", &[]),
            traced("/p/a2.js", "A", "1.0.0", &[]),
            traced("/p/b1.js", "B", "1.0.0", &["/p/a.js", "/p/a2.js"]),
            traced("/p/b1b.js", "B", "1.0.0", &["/p/a.js"]),
            traced("/p/b2.js", "B", "2.0.0", &[]),
        ]);
        let registry = PackageRegistry::build(files.values());
        let layout = OutputLayout::new(Path::new("/out"));

        let links = plan_dependency_links(&files, &registry, &layout);
        assert_eq!(links.len(), 1);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_create_symlink_is_relative_and_idempotent() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let source = root.join("node_modules/.versions/B@1.0.0");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("index.js"), "").unwrap();
        let target = root.join("node_modules/A/node_modules/B");
        let runtime = NativeRuntime::new();

        let first = create_symlink(&runtime, &source, &target).await.unwrap();
        let second = create_symlink(&runtime, &source, &target).await.unwrap();

        assert_eq!(first, LinkOutcome::Created);
        assert_eq!(second, LinkOutcome::AlreadyExists);
        assert_eq!(
            std::fs::read_link(&target).unwrap(),
            PathBuf::from("../../.versions/B@1.0.0")
        );
        assert!(target.join("index.js").exists());
    }

    #[tokio::test]
    async fn test_overlong_link_is_an_error() {
        let temp = TempDir::new().unwrap();
        let runtime: Arc<dyn Runtime> = Arc::new(NativeRuntime::new());
        let target = temp.path().join("x".repeat(MAX_PATH_LENGTH));
        let links = vec![DependencyLink {
            source: temp.path().join("src"),
            target: target.clone(),
        }];

        let report = create_links(runtime, &links).await;

        assert_eq!(report.created, 0);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].category, ErrorCategory::Symlink);
        assert!(!target.exists());
    }
}
