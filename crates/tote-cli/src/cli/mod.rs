//! Command-line interface definition for tote.
//!
//! # Command Structure
//!
//! - `tote trace` - Trace entries and materialize `node_modules` into the output directory
//! - `tote check` - Validate configuration and entries without writing anything
//! - `tote schema` - Print the JSON schema for `tote.config.json`

mod commands;
mod tests;
mod validation;

use clap::Parser;

pub use commands::{CheckArgs, Command, TraceArgs};
pub use validation::{parse_batch_size, parse_condition};

/// Tote - ship a Node.js server with only the node_modules it uses
#[derive(Parser, Debug)]
#[command(
    name = "tote",
    version,
    about = "Trace a Node.js server and materialize the node_modules it needs",
    long_about = "Tote follows every import and require from your server entry points,\n\
                  then copies exactly the files it found into <out-dir>/node_modules.\n\
                  Packages needed in several versions are kept side by side under\n\
                  node_modules/.versions and linked to the consumers that need them."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows every skipped specifier, copied file and created link.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
