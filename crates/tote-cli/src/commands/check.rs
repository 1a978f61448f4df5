//! Check command implementation.
//!
//! Validates configuration and the project layout without writing anything.

use tote_trace::pipeline::find_pnp_marker;

use crate::cli::CheckArgs;
use crate::commands::ensure_entries_exist;
use crate::config::{ConfigOverrides, ToteConfig};
use crate::error::Result;
use crate::ui;

/// Execute the check command.
///
/// # Validation Steps
///
/// 1. Load and validate configuration
/// 2. Check entry points exist and report whether the output directory will be created
/// 3. Report a Yarn Plug'n'Play install, which tote cannot materialize
pub async fn execute(args: CheckArgs) -> Result<()> {
    ui::info("Checking configuration...");

    let cwd = std::env::current_dir()?;
    let config = ToteConfig::load(
        &ConfigOverrides::from(&args).relative_to(&cwd),
        args.config.as_deref(),
        &cwd,
    )?;
    config.validate()?;

    let options = config.to_trace_options(&cwd);
    options.validate()?;
    ui::success("Configuration is valid");

    ui::info("Checking entry points...");
    if let Err(err) = ensure_entries_exist(&options.entries) {
        ui::error(&err.to_string());
        return Err(err);
    }
    for entry in &options.entries {
        ui::success(&format!("  {} exists", entry.display()));
    }

    if options.out_dir.is_dir() {
        ui::success(&format!("Output directory {} exists", options.out_dir.display()));
    } else {
        ui::info(&format!(
            "Output directory {} will be created",
            options.out_dir.display()
        ));
    }

    let base_dir = options.resolved_base_dir()?;
    let runtime = options.resolved_runtime();
    match find_pnp_marker(runtime.as_ref(), &base_dir) {
        Some(marker) => ui::warning(&format!(
            "Yarn Plug'n'Play install detected ({}); 'tote trace' will not copy anything",
            marker.display()
        )),
        None => ui::success("node_modules install layout"),
    }

    Ok(())
}
