//! Configuration for tote, merged from several sources.
//!
//! Priority: CLI > Environment (`TOTE_*`) > `tote.config.json` > Defaults

mod loading;
mod validation;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tote_trace::TraceOptions;

pub use loading::{CONFIG_FILE_NAME, ConfigOverrides};

/// Tote configuration - loaded from tote.config.json, the environment, and CLI args.
///
/// Relative paths are resolved against `baseDir`, which is itself resolved
/// against the working directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ToteConfig {
    /// Entry files to trace (e.g. [".output/server/index.mjs"])
    #[serde(default)]
    pub entries: Vec<PathBuf>,

    /// Directory that receives node_modules; created if missing
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Directory traced paths are made relative to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,

    /// Project root, recorded for reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,

    /// Export conditions used during resolution
    #[serde(default = "default_conditions")]
    pub conditions: Vec<String>,

    /// Extra files traced as roots
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathBuf>,

    /// Regular expressions; matching traced files are dropped
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Files resolved concurrently per batch
    #[schemars(range(min = 1))]
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Follow `import("...")` expressions
    #[serde(default = "default_dynamic_imports")]
    pub dynamic_imports: bool,
}

pub fn default_out_dir() -> PathBuf {
    PathBuf::from(".output/server")
}

pub fn default_conditions() -> Vec<String> {
    tote_trace::runtime::native::DEFAULT_CONDITIONS
        .iter()
        .map(|c| c.to_string())
        .collect()
}

pub fn default_batch_size() -> usize {
    tote_trace::options::DEFAULT_BATCH_SIZE
}

pub fn default_dynamic_imports() -> bool {
    true
}

impl Default for ToteConfig {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            out_dir: default_out_dir(),
            base_dir: None,
            root: None,
            conditions: default_conditions(),
            include: Vec::new(),
            exclude: Vec::new(),
            batch_size: default_batch_size(),
            dynamic_imports: default_dynamic_imports(),
        }
    }
}

impl ToteConfig {
    /// Generate JSON Schema for tote.config.json.
    pub fn json_schema() -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(schemars::schema_for!(ToteConfig))
    }

    /// Absolute base directory: `baseDir` resolved against `cwd`.
    pub fn base_dir(&self, cwd: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) => cwd.join(dir),
            None => cwd.to_path_buf(),
        }
    }

    /// Build library options, resolving relative paths against the base directory.
    ///
    /// Command-line paths arrive already absolute through
    /// [`ConfigOverrides::relative_to`].
    pub fn to_trace_options(&self, cwd: &Path) -> TraceOptions {
        let base = self.base_dir(cwd);
        let resolve = |path: &PathBuf| base.join(path);

        let mut options = TraceOptions::new(self.entries.iter().map(resolve), resolve(&self.out_dir))
            .base_dir(&base)
            .conditions(self.conditions.iter().cloned())
            .extra_includes(self.include.iter().map(resolve))
            .exclude(self.exclude.iter().cloned())
            .batch_size(self.batch_size)
            .follow_dynamic_imports(self.dynamic_imports);

        if let Some(root) = &self.root {
            options = options.root(resolve(root));
        }

        options
    }
}
