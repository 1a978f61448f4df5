//! Native runtime implementation backed by `tokio::fs` and `oxc_resolver`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{FileMetadata, ResolveKind, Runtime, RuntimeError, RuntimeResult};

/// Export conditions used when none are configured.
pub const DEFAULT_CONDITIONS: &[&str] = &["node", "production", "default"];

/// Extensions tried for extensionless specifiers, in Node's order plus the
/// TypeScript sources a workspace entry may still point at.
const EXTENSIONS: &[&str] = &[".js", ".json", ".node", ".mjs", ".cjs", ".ts", ".mts", ".cts"];

/// Native filesystem runtime using tokio
#[derive(Debug, Clone)]
pub struct NativeRuntime {
    esm_resolver: Arc<oxc_resolver::Resolver>,
    cjs_resolver: Arc<oxc_resolver::Resolver>,
}

impl NativeRuntime {
    /// Create a runtime using the default export conditions.
    pub fn new() -> Self {
        let conditions: Vec<String> = DEFAULT_CONDITIONS.iter().map(|c| c.to_string()).collect();
        Self::with_conditions(&conditions)
    }

    /// Create a runtime with custom export conditions.
    ///
    /// `import` is appended for ESM resolution and `require` for CommonJS, so
    /// `conditions` should only carry the environment-specific names.
    pub fn with_conditions(conditions: &[String]) -> Self {
        Self {
            esm_resolver: Arc::new(build_resolver(conditions, "import")),
            cjs_resolver: Arc::new(build_resolver(conditions, "require")),
        }
    }
}

impl Default for NativeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

fn build_resolver(conditions: &[String], kind_condition: &str) -> oxc_resolver::Resolver {
    let mut condition_names: Vec<String> = conditions.to_vec();
    if !condition_names.iter().any(|c| c == kind_condition) {
        // Keep "default" last so the kind-specific condition can still match
        let insert_at = condition_names
            .iter()
            .position(|c| c == "default")
            .unwrap_or(condition_names.len());
        condition_names.insert(insert_at, kind_condition.to_string());
    }

    oxc_resolver::Resolver::new(oxc_resolver::ResolveOptions {
        condition_names,
        extensions: EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        main_fields: vec!["main".into()],
        builtin_modules: true,
        ..Default::default()
    })
}

fn io_error(action: &str, path: &Path, e: std::io::Error) -> RuntimeError {
    if e.kind() == std::io::ErrorKind::NotFound {
        RuntimeError::FileNotFound(path.to_path_buf())
    } else {
        RuntimeError::Io(format!("Failed to {} {}: {}", action, path.display(), e))
    }
}

fn to_file_metadata(metadata: std::fs::Metadata) -> FileMetadata {
    FileMetadata {
        size: metadata.len(),
        is_dir: metadata.is_dir(),
        is_file: metadata.is_file(),
    }
}

#[async_trait]
impl Runtime for NativeRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| io_error("read", path, e))
    }

    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error("create directory", parent, e))?;
        }

        tokio::fs::write(path, content)
            .await
            .map_err(|e| io_error("write", path, e))
    }

    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        tokio::fs::metadata(path)
            .await
            .map(to_file_metadata)
            .map_err(|e| io_error("get metadata for", path, e))
    }

    async fn symlink_metadata(&self, path: &Path) -> RuntimeResult<FileMetadata> {
        tokio::fs::symlink_metadata(path)
            .await
            .map(to_file_metadata)
            .map_err(|e| io_error("get metadata for", path, e))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    async fn canonicalize(&self, path: &Path) -> RuntimeResult<PathBuf> {
        tokio::fs::canonicalize(path)
            .await
            .map_err(|e| io_error("canonicalize", path, e))
    }

    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()> {
        let result = if recursive {
            tokio::fs::create_dir_all(path).await
        } else {
            tokio::fs::create_dir(path).await
        };

        result.map_err(|e| io_error("create directory", path, e))
    }

    async fn copy_file(&self, from: &Path, to: &Path) -> RuntimeResult<u64> {
        tokio::fs::copy(from, to).await.map_err(|e| {
            RuntimeError::Io(format!(
                "Failed to copy {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })
    }

    async fn symlink_dir(
        &self,
        original: &Path,
        absolute_original: &Path,
        link: &Path,
    ) -> RuntimeResult<()> {
        #[cfg(unix)]
        {
            let _ = absolute_original;
            tokio::fs::symlink(original, link)
                .await
                .map_err(|e| io_error("symlink", link, e))
        }

        #[cfg(windows)]
        {
            // Directory symlinks need elevated privileges on most Windows
            // setups; junctions do not but only accept absolute targets.
            match tokio::fs::symlink_dir(original, link).await {
                Ok(()) => Ok(()),
                Err(symlink_err) => {
                    tracing::debug!(
                        "symlink_dir failed for {} ({}), falling back to a junction",
                        link.display(),
                        symlink_err
                    );
                    let target = absolute_original.to_path_buf();
                    let link = link.to_path_buf();
                    tokio::task::spawn_blocking(move || {
                        junction::create(&target, &link).map_err(|e| io_error("junction", &link, e))
                    })
                    .await
                    .map_err(|e| RuntimeError::Other(format!("Task join error: {}", e)))?
                }
            }
        }
    }

    fn resolve(&self, specifier: &str, from: &Path, kind: ResolveKind) -> RuntimeResult<PathBuf> {
        let from_dir = if from.is_dir() {
            from
        } else {
            from.parent().unwrap_or(from)
        };

        let resolver = match kind {
            ResolveKind::Esm => &self.esm_resolver,
            ResolveKind::CommonJs => &self.cjs_resolver,
        };

        resolver
            .resolve(from_dir, specifier)
            .map(|res| res.path().to_path_buf())
            .map_err(|e| match e {
                oxc_resolver::ResolveError::Builtin { .. } => {
                    RuntimeError::Builtin(specifier.to_string())
                }
                other => RuntimeError::ResolutionFailed {
                    specifier: specifier.to_string(),
                    from: from.to_path_buf(),
                    reason: other.to_string(),
                },
            })
    }
}
