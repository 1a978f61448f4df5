//! Options for a trace-and-materialize run.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::runtime::{NativeRuntime, Runtime};
use crate::{Error, Result, TraceSummary};

/// Files resolved concurrently per batch.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// Guard against runaway entry lists.
const MAX_ENTRIES: usize = 10_000;

/// Configuration for a trace-and-materialize run.
///
/// Use the builder methods, then [`TraceOptions::run`].
#[derive(Debug, Clone)]
pub struct TraceOptions {
    /// Absolute paths of the files the app starts from.
    pub entries: Vec<PathBuf>,

    /// Directory traced paths are made relative to (default: current directory).
    ///
    /// Package paths and the `node_modules` segments that identify installed
    /// packages are read relative to this directory.
    pub base_dir: Option<PathBuf>,

    /// Directory the `node_modules` tree is materialized into. Created,
    /// with any missing parents, if it does not exist yet. Relative paths are
    /// taken against the base directory.
    ///
    /// Traced files already under this directory are left out.
    pub out_dir: PathBuf,

    /// Project root. Recorded for callers; it does not filter traced files.
    pub root: Option<PathBuf>,

    /// Export conditions for resolution (default: `node`, `production`,
    /// `default`). `import` / `require` are added per edge kind.
    pub conditions: Vec<String>,

    /// Extra files traced as roots, for code only reachable through
    /// computed requires.
    pub extra_includes: Vec<PathBuf>,

    /// Regular expressions; traced files whose path matches any are dropped.
    pub exclude: Vec<String>,

    /// Files resolved concurrently per batch (default: 100).
    pub batch_size: usize,

    /// Follow `import("literal")` (default: true).
    pub follow_dynamic_imports: bool,

    /// Filesystem runtime (default: [`NativeRuntime`]).
    pub runtime: Option<Arc<dyn Runtime>>,
}

impl TraceOptions {
    /// Options for tracing `entries` into `out_dir`.
    ///
    /// ```no_run
    /// use tote_trace::TraceOptions;
    ///
    /// # #[tokio::main]
    /// # async fn main() -> tote_trace::Result<()> {
    /// let summary = TraceOptions::new(["/app/.output/server/index.mjs"], "/app/.output/server")
    ///     .base_dir("/app")
    ///     .run()
    ///     .await?;
    /// println!("{} files traced", summary.files_traced);
    /// # Ok(()) }
    /// ```
    pub fn new<P, I>(entries: I, out_dir: impl Into<PathBuf>) -> Self
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|p| p.as_ref().to_path_buf())
                .collect(),
            base_dir: None,
            out_dir: out_dir.into(),
            root: None,
            conditions: crate::runtime::native::DEFAULT_CONDITIONS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            extra_includes: Vec::new(),
            exclude: Vec::new(),
            batch_size: DEFAULT_BATCH_SIZE,
            follow_dynamic_imports: true,
            runtime: None,
        }
    }

    pub fn base_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(dir.into());
        self
    }

    pub fn root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.root = Some(dir.into());
        self
    }

    /// Replace the export conditions.
    pub fn conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }

    pub fn extra_includes<P, I>(mut self, paths: I) -> Self
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        self.extra_includes
            .extend(paths.into_iter().map(|p| p.as_ref().to_path_buf()));
        self
    }

    pub fn exclude<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(patterns.into_iter().map(Into::into));
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn follow_dynamic_imports(mut self, follow: bool) -> Self {
        self.follow_dynamic_imports = follow;
        self
    }

    /// Set the runtime for filesystem operations.
    pub fn runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Check the options for internal consistency.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::MissingEntries);
        }

        if self.out_dir.as_os_str().is_empty() {
            return Err(Error::MissingOutputDir);
        }

        if self.entries.len() > MAX_ENTRIES {
            return Err(Error::InvalidConfig(format!(
                "Too many entries: {} (max {})",
                self.entries.len(),
                MAX_ENTRIES
            )));
        }

        if self.batch_size == 0 {
            return Err(Error::InvalidConfig(
                "batch_size must be at least 1".into(),
            ));
        }

        self.exclude_patterns()?;
        Ok(())
    }

    /// Compiled `exclude` patterns.
    pub fn exclude_patterns(&self) -> Result<Vec<Regex>> {
        self.exclude
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| {
                    Error::InvalidConfig(format!("Invalid exclude pattern '{}': {}", pattern, e))
                })
            })
            .collect()
    }

    /// Base directory, falling back to the current directory.
    pub fn resolved_base_dir(&self) -> Result<PathBuf> {
        match &self.base_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(std::env::current_dir()?),
        }
    }

    /// The configured runtime, or a [`NativeRuntime`] built from these options.
    pub fn resolved_runtime(&self) -> Arc<dyn Runtime> {
        match &self.runtime {
            Some(runtime) => runtime.clone(),
            None => Arc::new(NativeRuntime::with_conditions(&self.conditions)),
        }
    }

    /// Trace and materialize.
    pub async fn run(self) -> Result<TraceSummary> {
        crate::pipeline::trace_dependencies(&self).await
    }
}
