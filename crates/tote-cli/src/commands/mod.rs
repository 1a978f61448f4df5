//! Command implementations for the tote CLI.
//!
//! - [`trace`] - Trace entries and materialize `node_modules`
//! - [`check`] - Configuration and environment validation
//! - [`schema`] - JSON schema for `tote.config.json`

pub mod check;
pub mod schema;
pub mod trace;

pub use check::execute as check_execute;
pub use schema::execute as schema_execute;
pub use trace::execute as trace_execute;

use crate::error::{Result, TraceError};
use std::path::PathBuf;

/// Fail on the first entry that is not a file.
pub(crate) fn ensure_entries_exist(entries: &[PathBuf]) -> Result<()> {
    match entries.iter().find(|entry| !entry.is_file()) {
        Some(missing) => Err(TraceError::EntryNotFound(missing.clone()).into()),
        None => Ok(()),
    }
}
