//! Logging setup for the tote CLI.
//!
//! `--verbose` shows debug events from the tracer, `--quiet` only errors.
//! Otherwise `RUST_LOG` is honoured, falling back to warnings from the tracer
//! and info from the CLI; the run summary itself is printed by [`crate::ui`].
//!
//! ```rust,no_run
//! use tote_cli::logger::init_logger;
//!
//! init_logger(false, false, true);
//! tracing::info!("Tracing entries");
//! ```

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const VERBOSE_FILTER: &str = "tote_trace=debug,tote_cli=debug";
const QUIET_FILTER: &str = "tote_trace=error,tote_cli=error";
const DEFAULT_FILTER: &str = "tote_trace=warn,tote_cli=info";

/// Filter directives for the given flags, ignoring `RUST_LOG`.
pub fn filter_directives(verbose: bool, quiet: bool) -> &'static str {
    if verbose {
        VERBOSE_FILTER
    } else if quiet {
        QUIET_FILTER
    } else {
        DEFAULT_FILTER
    }
}

/// Initialize the tracing subscriber.
///
/// Should be called once at the start of the program. Precedence:
/// 1. `--verbose`
/// 2. `--quiet`
/// 3. `RUST_LOG`
/// 4. Default filter
///
/// `ansi` is the color decision from [`crate::ui::color_enabled`].
pub fn init_logger(verbose: bool, quiet: bool, ansi: bool) {
    let filter = if verbose || quiet {
        EnvFilter::new(filter_directives(verbose, quiet))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    };

    init_logger_with_filter(filter, ansi);
}

/// Initialize logger with a custom environment filter.
pub fn init_logger_with_filter(filter: EnvFilter, ansi: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(ansi)
        .with_writer(std::io::stderr)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}
