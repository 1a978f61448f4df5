//! Trace command implementation.

use std::path::Path;
use std::time::Instant;

use tote_trace::TraceSummary;

use crate::cli::TraceArgs;
use crate::commands::ensure_entries_exist;
use crate::config::{ConfigOverrides, ToteConfig};
use crate::error::{Result, TraceError};
use crate::ui;

/// Execute the trace command.
///
/// 1. Load and validate configuration
/// 2. Check entry points exist
/// 3. Trace, copy and link
/// 4. Print the summary and optionally write the JSON report
///
/// Per-file copy and link failures are listed but do not fail the command.
pub async fn execute(args: TraceArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let config = ToteConfig::load(
        &ConfigOverrides::from(&args).relative_to(&cwd),
        args.config.as_deref(),
        &cwd,
    )?;
    config.validate()?;

    let options = config.to_trace_options(&cwd);
    ensure_entries_exist(&options.entries)?;

    tracing::debug!(
        entries = options.entries.len(),
        out_dir = %options.out_dir.display(),
        "Starting trace"
    );

    let start = Instant::now();
    let spinner = ui::Spinner::new("Tracing dependencies...");
    let summary = match options.run().await {
        Ok(summary) => summary,
        Err(e) => {
            spinner.fail("Trace failed");
            return Err(e.into());
        }
    };
    let elapsed = start.elapsed();

    if summary.pnp_detected {
        spinner.fail("Yarn Plug'n'Play install detected");
        ui::warning("Nothing was copied: tote needs a node_modules install (nodeLinker: node-modules)");
        return Ok(());
    }

    spinner.finish(&format!(
        "Materialized {} packages in {}",
        summary.packages,
        ui::format_duration(elapsed)
    ));
    ui::print_trace_summary(&summary, elapsed);

    if let Some(report) = &args.report {
        let path = cwd.join(report);
        write_report(&summary, &path).await?;
        ui::success(&format!("Report written to {}", path.display()));
    }

    Ok(())
}

/// Write `summary` as pretty JSON.
pub async fn write_report(summary: &TraceSummary, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| TraceError::ReportWriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    Ok(())
}
