//! Output tree paths.

use std::path::{Path, PathBuf};

use crate::package::path::NODE_MODULES;

/// Directory holding one copy per `(name, version)` of multi-version packages.
pub const VERSIONS_DIR: &str = ".versions";

/// Longest destination path, in characters, the materializer will create.
pub const MAX_PATH_LENGTH: usize = 260;

/// Paths inside `<out_dir>/node_modules`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    node_modules: PathBuf,
}

impl OutputLayout {
    pub fn new(out_dir: &Path) -> Self {
        Self {
            node_modules: out_dir.join(NODE_MODULES),
        }
    }

    pub fn node_modules(&self) -> &Path {
        &self.node_modules
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.node_modules.join(VERSIONS_DIR)
    }

    /// `node_modules/<name>`
    pub fn top_level_dir(&self, name: &str) -> PathBuf {
        join_package_name(&self.node_modules, name)
    }

    /// `node_modules/.versions/<name>@<version>`
    pub fn version_dir(&self, name: &str, version: &str) -> PathBuf {
        join_package_name(&self.versions_dir(), &format!("{}@{}", name, version))
    }

    /// Where a package's files are copied.
    pub fn package_dir(&self, name: &str, version: &str, multi_version: bool) -> PathBuf {
        if multi_version {
            self.version_dir(name, version)
        } else {
            self.top_level_dir(name)
        }
    }
}

/// Join a package name onto `dir`, one segment per `/` part so scoped
/// names become nested directories on every platform.
pub fn join_package_name(dir: &Path, name: &str) -> PathBuf {
    let mut path = dir.to_path_buf();
    for part in name.split('/') {
        path.push(part);
    }
    path
}

/// Whether `path` fits under [`MAX_PATH_LENGTH`].
pub fn within_path_limit(path: &Path) -> bool {
    path.to_string_lossy().chars().count() <= MAX_PATH_LENGTH
}
