//! Package resolution for traced files.
//!
//! Every traced file belongs to exactly one package: either an installed
//! package under some `node_modules` directory, or the workspace package
//! whose `package.json` is the nearest one above the file.

pub mod path;

use path_clean::PathClean;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::manifest::{ManifestError, PackageJson};
use crate::runtime::{Runtime, RuntimeError};
use crate::trace::TraceEntry;

pub use path::NodeModulesPath;

/// Package identity and location of a traced file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPackage {
    /// Package name (scoped names keep their `@scope/` prefix)
    pub name: String,
    /// Installed version, or the `0.0.0` sentinel
    pub version: String,
    /// Package root, relative to the base directory
    pub path: PathBuf,
    /// Absolute package root
    pub root: PathBuf,
    /// File path relative to the package root
    pub subpath: PathBuf,
    /// The package's manifest, or a stub when it could not be read
    pub manifest: Arc<PackageJson>,
}

/// A traced file joined with the package it belongs to.
#[derive(Debug, Clone)]
pub struct TracedFile {
    /// Absolute path of the source file
    pub path: PathBuf,
    /// Files that referenced this one
    pub parents: Vec<PathBuf>,
    /// Owning package
    pub package: ResolvedPackage,
}

impl TracedFile {
    pub fn new(path: PathBuf, entry: &TraceEntry, package: ResolvedPackage) -> Self {
        let mut parents: Vec<PathBuf> = entry.parents.iter().cloned().collect();
        parents.sort();
        Self {
            path,
            parents,
            package,
        }
    }
}

/// Reasons a traced file is left out of the materialized tree.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("cannot stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    #[error("{0} is not a regular file")]
    NotAFile(PathBuf),

    #[error("no package.json found above {0}")]
    NoPackageJson(PathBuf),

    #[error("workspace package at {0} has no name")]
    UnnamedWorkspace(PathBuf),

    #[error(transparent)]
    Manifest(#[from] ManifestError),
}

/// Maps traced files to the packages that own them.
#[derive(Debug, Clone)]
pub struct PackageResolver {
    runtime: Arc<dyn Runtime>,
    base_dir: PathBuf,
}

impl PackageResolver {
    pub fn new(runtime: Arc<dyn Runtime>, base_dir: impl Into<PathBuf>) -> Self {
        Self {
            runtime,
            base_dir: base_dir.into(),
        }
    }

    /// Resolve the package owning `file` (absolute path).
    pub async fn resolve(&self, file: &Path) -> Result<ResolvedPackage, ResolveError> {
        match self.runtime.metadata(file).await {
            Ok(metadata) if metadata.is_file => {}
            Ok(_) => return Err(ResolveError::NotAFile(file.to_path_buf())),
            Err(source) => {
                return Err(ResolveError::Stat {
                    path: file.to_path_buf(),
                    source,
                });
            }
        }

        let relative = relative_slash_path(&self.base_dir, file);

        if let Some(parsed) = NodeModulesPath::parse(&relative) {
            return Ok(self.resolve_installed(&parsed).await);
        }

        self.resolve_workspace(file).await
    }

    async fn resolve_installed(&self, parsed: &NodeModulesPath<'_>) -> ResolvedPackage {
        let path = PathBuf::from(parsed.package_path());
        let root = self.base_dir.join(&path).clean();
        let manifest_path = root.join("package.json");

        let manifest = match PackageJson::from_path(self.runtime.as_ref(), &manifest_path).await {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("Using stub manifest for {}: {}", parsed.name, e);
                PackageJson::stub(parsed.name)
            }
        };

        ResolvedPackage {
            name: parsed.name.to_string(),
            version: manifest.version_or_sentinel().to_string(),
            path,
            root,
            subpath: PathBuf::from(parsed.subpath),
            manifest: Arc::new(manifest),
        }
    }

    async fn resolve_workspace(&self, file: &Path) -> Result<ResolvedPackage, ResolveError> {
        let mut dir = file.parent();

        while let Some(candidate) = dir {
            let manifest_path = candidate.join("package.json");
            if self.runtime.exists(&manifest_path) {
                let manifest = PackageJson::from_path(self.runtime.as_ref(), &manifest_path).await?;

                let Some(name) = manifest.name.clone() else {
                    debug!(
                        "Skipping {}: workspace package at {} has no name",
                        file.display(),
                        candidate.display()
                    );
                    return Err(ResolveError::UnnamedWorkspace(candidate.to_path_buf()));
                };

                let subpath = file
                    .strip_prefix(candidate)
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|_| file.to_path_buf());

                return Ok(ResolvedPackage {
                    name,
                    version: manifest.version_or_sentinel().to_string(),
                    path: pathdiff::diff_paths(candidate, &self.base_dir)
                        .unwrap_or_else(|| candidate.to_path_buf()),
                    root: candidate.to_path_buf(),
                    subpath,
                    manifest: Arc::new(manifest),
                });
            }
            dir = candidate.parent();
        }

        Err(ResolveError::NoPackageJson(file.to_path_buf()))
    }
}

/// `file` relative to `base`, with `/` separators.
fn relative_slash_path(base: &Path, file: &Path) -> String {
    let relative = pathdiff::diff_paths(file, base).unwrap_or_else(|| file.to_path_buf());
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::NativeRuntime;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, contents).unwrap();
    }

    fn resolver(root: &Path) -> PackageResolver {
        PackageResolver::new(Arc::new(NativeRuntime::new()), root)
    }

    #[tokio::test]
    async fn test_installed_package() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            "node_modules/@scope/pkg/package.json",
            r#"{"name":"@scope/pkg","version":"2.1.0"}"#,
        );
        write(root, "node_modules/@scope/pkg/lib/index.js", "");

        let resolved = resolver(root)
            .resolve(&root.join("node_modules/@scope/pkg/lib/index.js"))
            .await
            .unwrap();

        assert_eq!(resolved.name, "@scope/pkg");
        assert_eq!(resolved.version, "2.1.0");
        assert_eq!(resolved.path, PathBuf::from("node_modules/@scope/pkg"));
        assert_eq!(resolved.subpath, PathBuf::from("lib/index.js"));
    }

    #[tokio::test]
    async fn test_nested_install_uses_innermost_package() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "node_modules/a/package.json", r#"{"name":"a","version":"1.0.0"}"#);
        write(
            root,
            "node_modules/a/node_modules/b/package.json",
            r#"{"name":"b","version":"1.0.0"}"#,
        );
        write(root, "node_modules/a/node_modules/b/index.js", "");

        let resolved = resolver(root)
            .resolve(&root.join("node_modules/a/node_modules/b/index.js"))
            .await
            .unwrap();

        assert_eq!(resolved.name, "b");
        assert_eq!(resolved.path, PathBuf::from("node_modules/a/node_modules/b"));
    }

    #[tokio::test]
    async fn test_unreadable_manifest_falls_back_to_stub() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "node_modules/native/build/addon.node", "");

        let resolved = resolver(root)
            .resolve(&root.join("node_modules/native/build/addon.node"))
            .await
            .unwrap();

        assert_eq!(resolved.name, "native");
        assert_eq!(resolved.version, "0.0.0");
        assert_eq!(resolved.manifest.as_ref(), &PackageJson::stub("native"));
    }

    #[tokio::test]
    async fn test_workspace_package() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(
            root,
            "packages/utils/package.json",
            r#"{"name":"@app/utils","version":"0.3.0"}"#,
        );
        write(root, "packages/utils/src/index.js", "");

        let resolved = resolver(root)
            .resolve(&root.join("packages/utils/src/index.js"))
            .await
            .unwrap();

        assert_eq!(resolved.name, "@app/utils");
        assert_eq!(resolved.version, "0.3.0");
        assert_eq!(resolved.path, PathBuf::from("packages/utils"));
        assert_eq!(resolved.subpath, PathBuf::from("src/index.js"));
    }

    #[tokio::test]
    async fn test_unnamed_workspace_is_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "package.json", r#"{"private":true}"#);
        write(root, "server/index.js", "");

        let err = resolver(root)
            .resolve(&root.join("server/index.js"))
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::UnnamedWorkspace(_)));
    }

    #[tokio::test]
    async fn test_directories_and_missing_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "package.json", r#"{"name":"app"}"#);
        std::fs::create_dir_all(root.join("server")).unwrap();

        let resolver = resolver(root);
        assert!(matches!(
            resolver.resolve(&root.join("server")).await,
            Err(ResolveError::NotAFile(_))
        ));
        assert!(matches!(
            resolver.resolve(&root.join("server/missing.js")).await,
            Err(ResolveError::Stat { .. })
        ));
    }

    #[tokio::test]
    async fn test_unversioned_workspace_gets_sentinel() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write(root, "package.json", r#"{"name":"app"}"#);
        write(root, "server/index.js", "");

        let resolved = resolver(root)
            .resolve(&root.join("server/index.js"))
            .await
            .unwrap();

        assert_eq!(resolved.name, "app");
        assert_eq!(resolved.version, "0.0.0");
        assert_eq!(resolved.path, PathBuf::from(""));
    }
}
