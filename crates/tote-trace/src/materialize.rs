//! Copying traced packages into the output tree.

use futures::future::join_all;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::layout::{self, MAX_PATH_LENGTH, OutputLayout};
use crate::manifest::PackageJson;
use crate::registry::{PackageRegistry, TracedFiles};
use crate::runtime::{Runtime, RuntimeError};
use crate::summary::{CopyReport, ErrorCategory, ItemError};

#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    #[error("destination is {length} characters, over the {MAX_PATH_LENGTH} character limit")]
    PathTooLong { length: usize },

    #[error("{0} was not resolved to a package")]
    Untracked(PathBuf),

    #[error("cannot serialize package.json: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Copies each `(name, version)` bucket into its package directory.
#[derive(Debug, Clone)]
pub struct Materializer {
    runtime: Arc<dyn Runtime>,
    layout: OutputLayout,
}

impl Materializer {
    pub fn new(runtime: Arc<dyn Runtime>, layout: OutputLayout) -> Self {
        Self { runtime, layout }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// Create `node_modules/.versions`.
    pub async fn scaffold(&self) -> Result<(), RuntimeError> {
        self.runtime
            .create_dir(&self.layout.versions_dir(), true)
            .await
    }

    /// Copy every bucket concurrently and wait for all of them.
    #[tracing::instrument(skip_all, fields(packages = registry.len()))]
    pub async fn copy_all(&self, registry: &PackageRegistry, files: &TracedFiles) -> CopyReport {
        let copies = registry.buckets().map(|(name, version, paths)| {
            let dest = self
                .layout
                .package_dir(name, version, registry.is_multi_version(name));
            async move { self.copy_package_version(paths, files, &dest).await }
        });

        let mut report = CopyReport::default();
        for bucket in join_all(copies).await {
            report.merge(bucket);
        }
        report
    }

    /// Copy one package version's files into `dest_dir`, then write its
    /// production manifest.
    ///
    /// Files are copied one at a time; a failure is recorded and the rest of
    /// the bucket is still copied.
    pub async fn copy_package_version(
        &self,
        paths: &[PathBuf],
        files: &TracedFiles,
        dest_dir: &Path,
    ) -> CopyReport {
        let mut report = CopyReport::default();
        let mut manifest: Option<Arc<PackageJson>> = None;

        for path in paths {
            let Some(file) = files.get(path) else {
                report.errors.push(ItemError::new(
                    ErrorCategory::Copy,
                    path,
                    CopyError::Untracked(path.clone()),
                ));
                continue;
            };
            manifest.get_or_insert_with(|| file.package.manifest.clone());

            let dest = dest_dir.join(&file.package.subpath);
            match self.copy_file(path, &dest).await {
                Ok(()) => report.files_copied += 1,
                Err(e) => {
                    warn!("Failed to copy {}: {}", path.display(), e);
                    report.errors.push(ItemError::new(ErrorCategory::Copy, path, e));
                }
            }
        }

        if let Some(manifest) = manifest {
            let dest = dest_dir.join("package.json");
            match self.write_manifest(&manifest, &dest).await {
                Ok(()) => report.manifests_written += 1,
                Err(e) => {
                    warn!("Failed to write {}: {}", dest.display(), e);
                    report.errors.push(ItemError::new(ErrorCategory::Copy, &dest, e));
                }
            }
        }

        if !report.errors.is_empty() {
            debug!(
                "{} file(s) failed to copy into {}",
                report.errors.len(),
                dest_dir.display()
            );
        }
        report
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> Result<(), CopyError> {
        if !layout::within_path_limit(to) {
            return Err(CopyError::PathTooLong {
                length: to.to_string_lossy().chars().count(),
            });
        }

        if let Some(parent) = to.parent() {
            self.runtime.create_dir(parent, true).await?;
        }
        self.runtime.copy_file(from, to).await?;
        Ok(())
    }

    async fn write_manifest(&self, manifest: &PackageJson, dest: &Path) -> Result<(), CopyError> {
        let json = manifest.for_output().to_pretty_json()?;
        self.runtime.write_file(dest, json.as_bytes()).await?;
        Ok(())
    }
}
