use crate::config::ToteConfig;
use crate::error::{ConfigError, Result};

impl ToteConfig {
    /// Validate configuration for logical consistency.
    ///
    /// Exclude patterns are compiled later by the tracer, which reports
    /// invalid ones before any work starts.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(ConfigError::MissingField {
                field: "entries".to_string(),
                hint: "Pass entry files on the command line or set 'entries' in tote.config.json"
                    .to_string(),
            }
            .into());
        }

        if self.out_dir.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "outDir".to_string(),
                value: "\"\"".to_string(),
                hint: "Set outDir to the server build output, e.g. .output/server".to_string(),
            }
            .into());
        }

        if self.batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "batchSize".to_string(),
                value: "0".to_string(),
                hint: "Must be at least 1".to_string(),
            }
            .into());
        }

        if let Some(condition) = self
            .conditions
            .iter()
            .find(|c| c.is_empty() || c.chars().any(char::is_whitespace))
        {
            return Err(ConfigError::InvalidValue {
                field: "conditions".to_string(),
                value: format!("{:?}", condition),
                hint: "Condition names are matched literally against package exports keys"
                    .to_string(),
            }
            .into());
        }

        Ok(())
    }
}
