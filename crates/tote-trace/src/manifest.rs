//! `package.json` loading and production-condition flattening.
//!
//! Manifests are kept as loosely-typed JSON apart from the identity fields so
//! that every field a runtime might read (`main`, `type`, `imports`, ...)
//! survives the copy into the output tree untouched. Only `exports` is
//! rewritten.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::runtime::{Runtime, RuntimeError};

/// Maximum allowed size for package.json files (10MB)
const MAX_PACKAGE_JSON_SIZE: u64 = 10 * 1024 * 1024;

/// Version recorded for manifests that do not declare one.
pub const SENTINEL_VERSION: &str = "0.0.0";

/// Errors that can occur while loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: RuntimeError,
    },

    #[error("{path} exceeds maximum size of {}MB", MAX_PACKAGE_JSON_SIZE / 1024 / 1024)]
    TooLarge { path: String },

    #[error("{path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Parsed package.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageJson {
    /// Package name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Package version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Every other field, in source order
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PackageJson {
    /// Load package.json from a specific path using the provided runtime.
    pub async fn from_path(runtime: &dyn Runtime, path: &Path) -> Result<Self, ManifestError> {
        let display = path.display().to_string();

        let metadata = runtime
            .metadata(path)
            .await
            .map_err(|source| ManifestError::Read {
                path: display.clone(),
                source,
            })?;

        if metadata.size > MAX_PACKAGE_JSON_SIZE {
            return Err(ManifestError::TooLarge { path: display });
        }

        let bytes = runtime
            .read_file(path)
            .await
            .map_err(|source| ManifestError::Read {
                path: display.clone(),
                source,
            })?;

        serde_json::from_slice(&bytes).map_err(|source| ManifestError::Parse {
            path: display,
            source,
        })
    }

    /// Minimal manifest used when a package's own manifest is unreadable.
    pub fn stub(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            version: Some(SENTINEL_VERSION.to_string()),
            fields: Map::new(),
        }
    }

    /// Declared version, or the `0.0.0` sentinel.
    pub fn version_or_sentinel(&self) -> &str {
        self.version.as_deref().unwrap_or(SENTINEL_VERSION)
    }

    /// Copy of this manifest prepared for the output tree.
    pub fn for_output(&self) -> Self {
        let mut manifest = self.clone();
        if let Some(exports) = manifest.fields.get_mut("exports") {
            apply_production_condition(exports);
        }
        manifest
    }

    /// Pretty-printed JSON with a trailing newline.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }
}

/// Flatten the `production` export condition in place.
///
/// The materialized tree is the production artifact, so resolution inside it
/// must not depend on the runtime being started with
/// `--conditions=production`. At every object level of `exports`:
///
/// - a string `production` target replaces the whole level with
///   `{".": target}`, dropping sibling conditions and subpaths;
/// - an object `production` target is shallow-merged into the level (see
///   [`merge_production`] for how key order is kept);
/// - every remaining object-valued property is then processed recursively.
///
/// `null` production targets are left alone. Array targets (fallback lists)
/// are left in place since neither rule applies to them.
pub fn apply_production_condition(exports: &mut Value) {
    let Value::Object(level) = exports else {
        return;
    };

    match level.get("production") {
        Some(Value::String(_)) => {
            if let Some(Value::String(target)) = level.shift_remove("production") {
                level.clear();
                level.insert(".".to_string(), Value::String(target));
            }
        }
        Some(Value::Object(_)) => merge_production(level),
        _ => {}
    }

    for value in level.values_mut() {
        if value.is_object() {
            apply_production_condition(value);
        }
    }
}

/// Replace an object `production` entry with its own conditions.
///
/// Node matches conditions in key order, so order decides which target
/// wins. Siblings keep their source order. A condition the level already
/// has keeps its slot and takes the production target; new conditions are
/// inserted where `production` stood.
fn merge_production(level: &mut Map<String, Value>) {
    let Some(Value::Object(mut conditions)) = level.get("production").cloned() else {
        return;
    };
    let fresh: Vec<String> = conditions
        .keys()
        .filter(|key| !level.contains_key(key.as_str()))
        .cloned()
        .collect();

    let mut merged = Map::with_capacity(level.len() + fresh.len());
    for (key, value) in std::mem::take(level) {
        if key == "production" {
            for name in &fresh {
                if let Some(target) = conditions.shift_remove(name) {
                    merged.insert(name.clone(), target);
                }
            }
        } else {
            let value = conditions.shift_remove(&key).unwrap_or(value);
            merged.insert(key, value);
        }
    }
    *level = merged;
}
