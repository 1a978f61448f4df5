//! Index of traced files by package name and version.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::package::TracedFile;
use crate::version;

/// name → version → absolute file paths.
///
/// Every traced file lands in exactly one `(name, version)` bucket. Names are
/// kept sorted so phases that walk the registry do so deterministically.
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    packages: BTreeMap<String, BTreeMap<String, Vec<PathBuf>>>,
}

impl PackageRegistry {
    /// Fold traced files into their buckets.
    pub fn build<'a>(files: impl IntoIterator<Item = &'a TracedFile>) -> Self {
        let mut registry = Self::default();
        for file in files {
            registry.insert(file);
        }
        for versions in registry.packages.values_mut() {
            for paths in versions.values_mut() {
                paths.sort();
            }
        }
        registry
    }

    fn insert(&mut self, file: &TracedFile) {
        self.packages
            .entry(file.package.name.clone())
            .or_default()
            .entry(file.package.version.clone())
            .or_default()
            .push(file.path.clone());
    }

    /// Number of distinct package names.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// Versions present for `name`, newest first.
    pub fn versions(&self, name: &str) -> Vec<&str> {
        let mut versions: Vec<&str> = self
            .packages
            .get(name)
            .map(|v| v.keys().map(String::as_str).collect())
            .unwrap_or_default();
        version::sort_newest_first(&mut versions);
        versions
    }

    /// Files in one bucket.
    pub fn files(&self, name: &str, version: &str) -> &[PathBuf] {
        self.packages
            .get(name)
            .and_then(|v| v.get(version))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Whether more than one version of `name` was traced.
    pub fn is_multi_version(&self, name: &str) -> bool {
        self.packages.get(name).is_some_and(|v| v.len() > 1)
    }

    /// Newest traced version of `name`.
    pub fn newest(&self, name: &str) -> Option<&str> {
        self.packages
            .get(name)
            .and_then(|v| version::newest(v.keys().map(String::as_str)))
    }

    /// Names of every multi-version package.
    pub fn multi_version_packages(&self) -> Vec<&str> {
        self.packages
            .iter()
            .filter(|(_, versions)| versions.len() > 1)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// Every `(name, version, files)` bucket.
    pub fn buckets(&self) -> impl Iterator<Item = (&str, &str, &[PathBuf])> {
        self.packages.iter().flat_map(|(name, versions)| {
            versions
                .iter()
                .map(move |(version, files)| (name.as_str(), version.as_str(), files.as_slice()))
        })
    }
}

/// Traced files keyed by absolute path.
pub type TracedFiles = FxHashMap<PathBuf, TracedFile>;
