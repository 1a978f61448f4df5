//! Tote CLI - trace a Node.js server and materialize its `node_modules`.
//!
//! This crate wraps [`tote_trace`] with configuration loading, terminal
//! output, and error reporting.
//!
//! # Architecture
//!
//! - [`cli`] - Argument definitions (clap)
//! - [`commands`] - `trace`, `check` and `schema`
//! - [`config`] - `tote.config.json` loading with figment
//! - [`error`] - Error types with actionable hints
//! - [`logger`] - `tracing` subscriber setup
//! - [`ui`] - Spinners, status messages and the run summary
//!
//! # Example
//!
//! ```rust,no_run
//! use tote_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, ConfigError, Result, TraceError};
