//! Per-run results.
//!
//! Each phase returns its own report; the pipeline folds them into a
//! [`TraceSummary`] that is handed back to the caller instead of being
//! accumulated in shared state.

use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

/// Number of example errors logged per category.
pub const MAX_LOGGED_ERRORS: usize = 5;

/// Phase an error was recorded in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Trace,
    Resolve,
    Copy,
    Symlink,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::Trace => "trace",
            ErrorCategory::Resolve => "resolve",
            ErrorCategory::Copy => "copy",
            ErrorCategory::Symlink => "symlink",
        };
        f.write_str(name)
    }
}

/// A non-fatal failure for a single file or link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemError {
    pub category: ErrorCategory,
    pub path: PathBuf,
    pub message: String,
}

impl ItemError {
    pub fn new(category: ErrorCategory, path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self {
            category,
            path: path.into(),
            message: message.to_string(),
        }
    }
}

/// Result of copying every package bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CopyReport {
    pub files_copied: usize,
    pub manifests_written: usize,
    pub errors: Vec<ItemError>,
}

impl CopyReport {
    pub fn merge(&mut self, other: CopyReport) {
        self.files_copied += other.files_copied;
        self.manifests_written += other.manifests_written;
        self.errors.extend(other.errors);
    }
}

/// Result of one symlink phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub created: usize,
    pub existing: usize,
    pub errors: Vec<ItemError>,
}

/// Everything a run did, returned by [`crate::trace_dependencies`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TraceSummary {
    /// Set when a Plug'n'Play install was detected and nothing was done
    pub pnp_detected: bool,
    pub files_traced: usize,
    pub files_resolved: usize,
    pub files_skipped: usize,
    /// Traced files dropped by an `exclude` pattern
    pub files_excluded: usize,
    pub packages: usize,
    pub multi_version_packages: Vec<String>,
    pub files_copied: usize,
    pub manifests_written: usize,
    pub symlinks_created: usize,
    pub symlinks_existing: usize,
    pub errors: Vec<ItemError>,
}

impl TraceSummary {
    pub fn record_copy(&mut self, report: CopyReport) {
        self.files_copied += report.files_copied;
        self.manifests_written += report.manifests_written;
        self.errors.extend(report.errors);
    }

    pub fn record_links(&mut self, report: LinkReport) {
        self.symlinks_created += report.created;
        self.symlinks_existing += report.existing;
        self.errors.extend(report.errors);
    }

    /// Errors recorded in one phase.
    pub fn errors_in(&self, category: ErrorCategory) -> impl Iterator<Item = &ItemError> {
        self.errors.iter().filter(move |e| e.category == category)
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Log the run's counts and a bounded sample of errors per category.
    pub fn log(&self) {
        info!(
            files = self.files_traced,
            packages = self.packages,
            multi_version = self.multi_version_packages.len(),
            "Traced {} files across {} packages ({} with multiple versions)",
            self.files_traced,
            self.packages,
            self.multi_version_packages.len()
        );

        for category in [
            ErrorCategory::Trace,
            ErrorCategory::Resolve,
            ErrorCategory::Copy,
            ErrorCategory::Symlink,
        ] {
            let errors: Vec<&ItemError> = self.errors_in(category).collect();
            if errors.is_empty() {
                continue;
            }

            for error in errors.iter().take(MAX_LOGGED_ERRORS) {
                warn!("[{}] {}: {}", category, error.path.display(), error.message);
            }
            if errors.len() > MAX_LOGGED_ERRORS {
                warn!(
                    "[{}] ... and {} more",
                    category,
                    errors.len() - MAX_LOGGED_ERRORS
                );
            }
            warn!("{} {} error(s) in total", errors.len(), category);
        }
    }
}
