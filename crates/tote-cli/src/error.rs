//! Error handling for the tote CLI.
//!
//! - [`CliError`] is what commands return
//! - [`ConfigError`] and [`TraceError`] carry hints for the user
//! - Library errors keep their diagnostic codes and help text
//!
//! # Example
//!
//! ```rust,no_run
//! use tote_cli::error::{Result, TraceError};
//! use std::path::Path;
//!
//! fn require_entry(path: &Path) -> Result<()> {
//!     if !path.is_file() {
//!         return Err(TraceError::EntryNotFound(path.to_path_buf()).into());
//!     }
//!     Ok(())
//! }
//! ```

mod miette;

use std::path::PathBuf;
use thiserror::Error;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration loading or validation failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The run could not start or finish
    #[error("Trace error: {0}")]
    Trace(#[from] TraceError),

    /// Fatal error from the tracer
    #[error(transparent)]
    Library(#[from] tote_trace::Error),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file doesn't exist
    #[error("Config file not found: {}\n\nHint: Create a tote.config.json file or check the --config path", .0.display())]
    NotFound(PathBuf),

    /// Sources could not be merged into a valid configuration
    #[error("Invalid configuration: {message}\n\nHint: Run 'tote schema' to see the accepted fields and types")]
    Extract {
        /// Figment's description of the problem
        message: String,
    },

    /// Missing required configuration field
    #[error("Missing required field: {field}\n\nHint: {hint}")]
    MissingField {
        /// Name of the missing field
        field: String,
        /// Helpful hint for providing the field
        hint: String,
    },

    /// Invalid value for a configuration option
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The invalid value
        value: String,
        /// Helpful hint for correct values
        hint: String,
    },
}

/// Errors around a trace run that the tracer itself does not report.
#[derive(Debug, Error)]
pub enum TraceError {
    /// Entry file doesn't exist
    #[error("Entry point not found: {}\n\nHint: Entries are relative to the base directory; build the server first", .0.display())]
    EntryNotFound(PathBuf),

    /// The summary could not be written
    #[error("Failed to write report to {}: {reason}\n\nHint: Check that the directory exists and is writable", .path.display())]
    ReportWriteFailed {
        /// Requested report path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },
}

/// Result type alias using `CliError` as the default error type.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
