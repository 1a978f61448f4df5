//! Tote CLI - ship a Node.js server with only the node_modules it needs.
//!
//! Parses arguments, sets up logging, and dispatches to the command
//! implementations.

use clap::Parser;
use miette::Result;
use tote_cli::{cli, commands, error, logger, ui};

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    let color = ui::color_enabled(args.no_color);
    logger::init_logger(args.verbose, args.quiet, color);
    ui::init_colors(color);

    let result = match args.command {
        cli::Command::Trace(trace_args) => commands::trace_execute(trace_args).await,
        cli::Command::Check(check_args) => commands::check_execute(check_args).await,
        cli::Command::Schema => commands::schema_execute(),
    };

    result.map_err(error::cli_error_to_miette)
}
