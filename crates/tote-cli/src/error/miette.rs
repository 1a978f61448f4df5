//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        // Keeps the library's error code and help text
        CliError::Library(e) => Report::new(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        CliError::Trace(e) => miette::miette!("{}", e),
        _ => miette::miette!("{}", err),
    }
}
