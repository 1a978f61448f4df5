//! Schema command implementation.

use crate::config::ToteConfig;
use crate::error::Result;

/// Print the JSON schema for `tote.config.json` to stdout.
pub fn execute() -> Result<()> {
    let schema = ToteConfig::json_schema()?;
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
