//! Shared fixtures for tote-trace integration tests

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;
use tote_trace::{NativeRuntime, TraceOptions};

/// Output directory used by every fixture, mirroring a built server.
pub const OUT_DIR: &str = ".output/server";

/// A throwaway project directory.
pub struct Project {
    _temp: TempDir,
    root: PathBuf,
}

impl Project {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp dir");
        let root = temp.path().canonicalize().expect("canonicalize temp dir");
        std::fs::create_dir_all(root.join(OUT_DIR)).expect("create output dir");
        Self { _temp: temp, root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root.join(OUT_DIR)
    }

    /// `<out_dir>/node_modules/<relative>`
    pub fn output(&self, relative: &str) -> PathBuf {
        self.out_dir().join("node_modules").join(relative)
    }

    pub fn write(&self, relative: &str, contents: &str) -> &Self {
        let path = self.path(relative);
        std::fs::create_dir_all(path.parent().expect("file has a parent")).expect("create dirs");
        std::fs::write(path, contents).expect("write fixture file");
        self
    }

    /// Write `node_modules/...<name>/package.json` under `dir`.
    pub fn package(&self, dir: &str, manifest: Value) -> &Self {
        self.write(
            &format!("{}/package.json", dir),
            &serde_json::to_string_pretty(&manifest).expect("serialize manifest"),
        )
    }

    /// Options tracing `entries` (relative to the root) into the output dir.
    pub fn options(&self, entries: &[&str]) -> TraceOptions {
        TraceOptions::new(entries.iter().map(|e| self.path(e)), self.out_dir())
            .base_dir(&self.root)
            .runtime(Arc::new(NativeRuntime::new()))
    }

    /// Every file and link under `dir`, relative to it, sorted. Links are
    /// listed but not followed.
    pub fn list_files(&self, dir: &Path) -> Vec<String> {
        fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
            for entry in std::fs::read_dir(dir).expect("read dir") {
                let path = entry.expect("dir entry").path();
                let file_type = std::fs::symlink_metadata(&path)
                    .expect("stat entry")
                    .file_type();
                if file_type.is_dir() {
                    walk(root, &path, out);
                } else {
                    let relative = path.strip_prefix(root).expect("under root");
                    out.push(relative.to_string_lossy().replace('\\', "/"));
                }
            }
        }

        let mut files = Vec::new();
        walk(dir, dir, &mut files);
        files.sort();
        files
    }

    pub fn read_json(&self, path: &Path) -> Value {
        let text = std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("read {}: {}", path.display(), e));
        serde_json::from_str(&text).expect("valid JSON")
    }
}

/// Two consumers needing different versions of `b`:
///
/// ```text
/// .output/server/index.mjs -> a, c
/// a@1.0.0 -> b@1.0.0 (nested install)
/// c@1.0.0 -> b@2.0.0 (hoisted install)
/// ```
pub fn multi_version_project() -> Project {
    let project = Project::new();
    project
        .write(
            ".output/server/index.mjs",
            "import a from 'a';\nimport c from 'c';\nexport default [a, c];\n",
        )
        .package(
            "node_modules/a",
            serde_json::json!({ "name": "a", "version": "1.0.0", "main": "index.js" }),
        )
        .write("node_modules/a/index.js", "module.exports = require('b');\n")
        .package(
            "node_modules/a/node_modules/b",
            serde_json::json!({ "name": "b", "version": "1.0.0", "main": "index.js" }),
        )
        .write("node_modules/a/node_modules/b/index.js", "module.exports = 1;\n")
        .package(
            "node_modules/c",
            serde_json::json!({ "name": "c", "version": "1.0.0", "main": "index.js" }),
        )
        .write("node_modules/c/index.js", "module.exports = require('b');\n")
        .package(
            "node_modules/b",
            serde_json::json!({
                "name": "b",
                "version": "2.0.0",
                "exports": {
                    "production": { "require": "./index.js" },
                    "default": "./dev.js"
                }
            }),
        )
        .write("node_modules/b/index.js", "module.exports = 2;\n")
        .write("node_modules/b/dev.js", "module.exports = 'dev';\n");
    project
}

/// Scoped variant of [`multi_version_project`]:
///
/// ```text
/// .output/server/index.mjs -> @s/a, @s/c
/// @s/a@1.0.0 -> @s/b@1.0.0 (nested install)
/// @s/c@1.0.0 -> @s/b@2.0.0 (hoisted install)
/// ```
pub fn scoped_multi_version_project() -> Project {
    let project = Project::new();
    project
        .write(
            ".output/server/index.mjs",
            "import a from '@s/a';\nimport c from '@s/c';\nexport default [a, c];\n",
        )
        .package(
            "node_modules/@s/a",
            serde_json::json!({ "name": "@s/a", "version": "1.0.0", "main": "index.js" }),
        )
        .write("node_modules/@s/a/index.js", "module.exports = require('@s/b');\n")
        .package(
            "node_modules/@s/a/node_modules/@s/b",
            serde_json::json!({ "name": "@s/b", "version": "1.0.0", "main": "lib/main.js" }),
        )
        .write(
            "node_modules/@s/a/node_modules/@s/b/lib/main.js",
            "module.exports = 1;\n",
        )
        .write(
            "node_modules/@s/a/node_modules/@s/b/lib/unused.js",
            "module.exports = 'unused';\n",
        )
        .package(
            "node_modules/@s/c",
            serde_json::json!({ "name": "@s/c", "version": "1.0.0", "main": "index.js" }),
        )
        .write("node_modules/@s/c/index.js", "module.exports = require('@s/b');\n")
        .package(
            "node_modules/@s/b",
            serde_json::json!({ "name": "@s/b", "version": "2.0.0", "main": "index.js" }),
        )
        .write("node_modules/@s/b/index.js", "module.exports = 2;\n");
    project
}
