#![cfg_attr(docsrs, feature(doc_cfg))]

//! # tote-trace
//!
//! Trace the files a Node.js server needs at runtime and materialize them
//! into a self-contained `node_modules` tree.
//!
//! Each `(name, version)` of a package is copied exactly once. When several
//! versions of a package are needed they live side by side under
//! `node_modules/.versions/<name>@<version>`, the newest is promoted to the
//! top level through a link, and every consumer that needs an older version
//! gets its own `node_modules/<dep>` link to it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tote_trace::TraceOptions;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let summary = TraceOptions::new(["/app/.output/server/index.mjs"], "/app/.output/server")
//!     .base_dir("/app")
//!     .exclude([r"\.map$"])
//!     .run()
//!     .await?;
//!
//! for name in &summary.multi_version_packages {
//!     println!("{name} has several versions");
//! }
//! # Ok(()) }
//! ```
//!
//! Copy and link failures never fail the run; they are listed in
//! [`TraceSummary::errors`].

use std::path::PathBuf;

pub mod layout;
pub mod manifest;
pub mod materialize;
pub mod options;
pub mod package;
pub mod pipeline;
pub mod registry;
pub mod runtime;
pub mod summary;
pub mod symlink;
pub mod trace;
pub mod version;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

pub use manifest::{PackageJson, apply_production_condition};
pub use options::TraceOptions;
pub use package::{PackageResolver, ResolvedPackage, TracedFile};
pub use pipeline::trace_dependencies;
pub use registry::PackageRegistry;
pub use runtime::{NativeRuntime, ResolveKind, Runtime, RuntimeError};
pub use summary::{ErrorCategory, ItemError, TraceSummary};
pub use version::compare_versions;

/// Error types for tote-trace operations.
///
/// These stop a run before anything is written (or, for `Scaffold`, before
/// any package is copied). A missing output directory is not one of them:
/// it is created along with `node_modules/.versions`. Everything else is recorded in the
/// [`TraceSummary`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No entry files were given.
    #[error("No entry files to trace")]
    MissingEntries,

    /// No output directory was given.
    #[error("No output directory specified")]
    MissingOutputDir,

    /// `node_modules/.versions` could not be created.
    #[error("Failed to create {}: {source}", .path.display())]
    Scaffold {
        path: PathBuf,
        #[source]
        source: RuntimeError,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Filesystem runtime error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Result type alias for tote-trace operations.
pub type Result<T> = std::result::Result<T, Error>;

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::InvalidConfig(_) => "INVALID_CONFIG",
            Error::MissingEntries => "MISSING_ENTRIES",
            Error::MissingOutputDir => "MISSING_OUTPUT_DIR",
            Error::Scaffold { .. } => "SCAFFOLD_FAILED",
            Error::Io(_) => "IO_ERROR",
            Error::Runtime(_) => "RUNTIME_ERROR",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::InvalidConfig(msg) => Some(Box::new(format!(
                "Check your configuration.\nError: {}",
                msg
            ))),
            Error::MissingEntries => Some(Box::new(
                "Pass at least one entry file, e.g. the built server entry.",
            )),
            Error::MissingOutputDir => Some(Box::new(
                "Pass the directory node_modules should be written into, e.g. the built server directory.",
            )),
            Error::Scaffold { path, .. } => Some(Box::new(format!(
                "Could not create '{}'. Check disk space and permissions.",
                path.display()
            ))),
            Error::Io(_) | Error::Runtime(_) => None,
        }
    }
}
