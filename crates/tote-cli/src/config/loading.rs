use crate::cli::{CheckArgs, TraceArgs};
use crate::config::ToteConfig;
use crate::error::{ConfigError, Result};
use figment::{
    Figment,
    providers::{Env, Format as _, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file looked up in the working directory when `--config` is not given.
pub const CONFIG_FILE_NAME: &str = "tote.config.json";

/// Values given on the command line. Unset fields leave lower-priority
/// sources untouched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entries: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dynamic_imports: Option<bool>,
}

/// `TOTE_*` environment variables, keyed by their snake_case suffix.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    entries: Option<Vec<PathBuf>>,
    out_dir: Option<PathBuf>,
    base_dir: Option<PathBuf>,
    root: Option<PathBuf>,
    conditions: Option<Vec<String>>,
    include: Option<Vec<PathBuf>>,
    exclude: Option<Vec<String>>,
    batch_size: Option<usize>,
    dynamic_imports: Option<bool>,
}

impl From<EnvOverrides> for ConfigOverrides {
    fn from(env: EnvOverrides) -> Self {
        Self {
            entries: env.entries.unwrap_or_default(),
            out_dir: env.out_dir,
            base_dir: env.base_dir,
            root: env.root,
            conditions: env.conditions.unwrap_or_default(),
            include: env.include.unwrap_or_default(),
            exclude: env.exclude.unwrap_or_default(),
            batch_size: env.batch_size,
            dynamic_imports: env.dynamic_imports,
        }
    }
}

impl From<&TraceArgs> for ConfigOverrides {
    fn from(args: &TraceArgs) -> Self {
        Self {
            entries: args.entries.clone(),
            out_dir: args.out_dir.clone(),
            base_dir: args.base_dir.clone(),
            root: args.root.clone(),
            conditions: args.conditions.clone(),
            include: args.include.clone(),
            exclude: args.exclude.clone(),
            batch_size: args.batch_size,
            // The flag can only turn following off
            dynamic_imports: args.no_dynamic_imports.then_some(false),
        }
    }
}

impl ConfigOverrides {
    /// Anchor command-line paths at `cwd`.
    ///
    /// Paths typed on the command line are relative to where `tote` runs,
    /// while the same fields in `tote.config.json` stay relative to
    /// `baseDir`. Absolute paths are left as they are.
    pub fn relative_to(mut self, cwd: &Path) -> Self {
        let anchor = |path: PathBuf| cwd.join(path);
        self.entries = self.entries.into_iter().map(anchor).collect();
        self.include = self.include.into_iter().map(anchor).collect();
        self.out_dir = self.out_dir.map(anchor);
        self.root = self.root.map(anchor);
        self
    }
}

impl From<&CheckArgs> for ConfigOverrides {
    fn from(args: &CheckArgs) -> Self {
        Self {
            entries: args.entries.clone(),
            out_dir: args.out_dir.clone(),
            base_dir: args.base_dir.clone(),
            ..Self::default()
        }
    }
}

impl ToteConfig {
    /// Load configuration from multiple sources.
    ///
    /// Priority: CLI args > `TOTE_*` environment variables > config file > defaults.
    /// Without `config_path`, `tote.config.json` in `cwd` is used if present.
    pub fn load(overrides: &ConfigOverrides, config_path: Option<&Path>, cwd: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) => {
                let path = cwd.join(path);
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path).into());
                }
                Some(path)
            }
            None => {
                let default_path = cwd.join(CONFIG_FILE_NAME);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            tracing::debug!("Loading config from {}", path.display());
            figment = figment.merge(Json::file(path));
        }

        let env: EnvOverrides = Figment::from(Env::prefixed("TOTE_"))
            .extract()
            .map_err(|e| ConfigError::Extract {
                message: format!("TOTE_* environment: {}", e),
            })?;
        figment = figment.merge(Serialized::defaults(ConfigOverrides::from(env)));

        figment = figment.merge(Serialized::defaults(overrides));

        figment.extract().map_err(|e| {
            ConfigError::Extract {
                message: e.to_string(),
            }
            .into()
        })
    }
}
