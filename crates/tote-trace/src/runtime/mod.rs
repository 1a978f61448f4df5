//! Filesystem runtime abstraction for the tracer
//!
//! This module defines the `Runtime` trait that abstracts every filesystem
//! operation the tracer and materializer perform: reading sources and
//! manifests, copying files into the output tree, creating directory links and
//! resolving module specifiers. `NativeRuntime` implements it on top of
//! `tokio::fs` and `oxc_resolver`.

pub mod native;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

pub use native::NativeRuntime;

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Module resolution failed
    #[error("Failed to resolve module '{specifier}' from '{from}': {reason}")]
    ResolutionFailed {
        specifier: String,
        from: PathBuf,
        reason: String,
    },

    /// Specifier names a runtime builtin rather than a file
    #[error("'{0}' is a builtin module")]
    Builtin(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// Which export condition family a specifier is resolved with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveKind {
    /// `import` statements, `export ... from` and `import()`
    Esm,
    /// `require()` and `require.resolve()`
    CommonJs,
}

/// File metadata
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Whether this is a file
    pub is_file: bool,
}

/// Platform runtime trait
///
/// All paths handed to a runtime are absolute; callers join relative paths
/// against their base directory first.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file from the filesystem
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Write a file, creating parent directories as needed
    async fn write_file(&self, path: &Path, content: &[u8]) -> RuntimeResult<()>;

    /// Get file metadata, following symlinks
    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;

    /// Get metadata of the entry itself without following symlinks
    async fn symlink_metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;

    /// Check if a path exists (following symlinks)
    fn exists(&self, path: &Path) -> bool;

    /// Resolve every symlink and relative component of `path`
    async fn canonicalize(&self, path: &Path) -> RuntimeResult<PathBuf>;

    /// Create a directory
    async fn create_dir(&self, path: &Path, recursive: bool) -> RuntimeResult<()>;

    /// Copy a single file, returning the number of bytes written
    async fn copy_file(&self, from: &Path, to: &Path) -> RuntimeResult<u64>;

    /// Create a directory link at `link` whose contents are `original`.
    ///
    /// `original` is stored verbatim, so relative targets are interpreted
    /// against the directory containing `link`. `absolute_original` is used
    /// where the platform cannot store relative targets (Windows junctions).
    async fn symlink_dir(
        &self,
        original: &Path,
        absolute_original: &Path,
        link: &Path,
    ) -> RuntimeResult<()>;

    /// Resolve a module specifier imported from the file `from`
    fn resolve(&self, specifier: &str, from: &Path, kind: ResolveKind) -> RuntimeResult<PathBuf>;
}
