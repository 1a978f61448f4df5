use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::validation::{parse_batch_size, parse_condition};

/// Available tote subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Trace entry points and materialize node_modules
    ///
    /// Copies every traced package file into <out-dir>/node_modules, one copy
    /// per package version, and creates the links each consumer needs.
    Trace(TraceArgs),

    /// Validate configuration and entry points
    ///
    /// Loads tote.config.json, checks that entries and the output directory
    /// exist, and reports Yarn Plug'n'Play installs. Nothing is written.
    Check(CheckArgs),

    /// Print the JSON schema for tote.config.json
    Schema,
}

/// Arguments for the trace command
#[derive(Args, Debug, Default)]
pub struct TraceArgs {
    /// Entry files to trace, relative to the current directory
    ///
    /// Falls back to `entries` in tote.config.json when omitted.
    ///
    /// Examples:
    ///   tote trace .output/server/index.mjs
    ///   tote trace dist/server.js dist/worker.js --out-dir dist
    #[arg(value_name = "ENTRY")]
    pub entries: Vec<PathBuf>,

    /// Directory that receives node_modules (created if missing)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Directory traced paths are made relative to (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Project root, recorded for reference
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Export condition used during resolution (repeatable)
    ///
    /// Replaces the default `node`, `production`, `default` set. `import` and
    /// `require` are always added per edge.
    #[arg(long = "condition", value_name = "NAME", value_parser = parse_condition)]
    pub conditions: Vec<String>,

    /// Extra file traced as a root (repeatable)
    ///
    /// For code only reachable through computed requires.
    #[arg(long = "include", value_name = "FILE")]
    pub include: Vec<PathBuf>,

    /// Regular expression; matching traced files are dropped (repeatable)
    #[arg(long = "exclude", value_name = "REGEX")]
    pub exclude: Vec<String>,

    /// Files resolved concurrently per batch
    #[arg(long, value_name = "N", value_parser = parse_batch_size)]
    pub batch_size: Option<usize>,

    /// Do not follow `import("...")` expressions
    #[arg(long)]
    pub no_dynamic_imports: bool,

    /// Path to config file (default: tote.config.json)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the run summary as JSON to this file
    #[arg(long, value_name = "FILE")]
    pub report: Option<PathBuf>,
}

/// Arguments for the check command
#[derive(Args, Debug, Default)]
pub struct CheckArgs {
    /// Entry files to check, relative to the current directory
    #[arg(value_name = "ENTRY")]
    pub entries: Vec<PathBuf>,

    /// Directory that receives node_modules
    #[arg(short = 'o', long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Directory traced paths are made relative to (default: current directory)
    #[arg(long, value_name = "DIR")]
    pub base_dir: Option<PathBuf>,

    /// Path to config file (default: tote.config.json)
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}
