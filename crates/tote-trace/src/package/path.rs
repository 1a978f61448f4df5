//! Parsing of `node_modules` paths into package name and subpath.

/// Directory name that marks installed packages.
pub const NODE_MODULES: &str = "node_modules";

/// A path that lies inside an installed package.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeModulesPath<'a> {
    /// Everything up to and including the innermost `node_modules/`
    pub prefix: &'a str,
    /// Package name, including its scope when present
    pub name: &'a str,
    /// Path of the file relative to the package root
    pub subpath: &'a str,
}

impl<'a> NodeModulesPath<'a> {
    /// Split a `/`-separated relative path at its innermost `node_modules`
    /// segment.
    ///
    /// Returns `None` when the path has no `node_modules` segment or does not
    /// name a file inside a package (`node_modules/pkg`, `node_modules/@scope/`).
    ///
    /// ```
    /// use tote_trace::package::path::NodeModulesPath;
    ///
    /// let parsed = NodeModulesPath::parse("node_modules/a/node_modules/@s/b/lib/x.js").unwrap();
    /// assert_eq!(parsed.prefix, "node_modules/a/node_modules/");
    /// assert_eq!(parsed.name, "@s/b");
    /// assert_eq!(parsed.subpath, "lib/x.js");
    /// ```
    pub fn parse(path: &'a str) -> Option<Self> {
        let start = innermost_package_start(path)?;
        let (prefix, rest) = path.split_at(start);

        let name_len = if rest.starts_with('@') {
            let scope_end = rest.find('/')?;
            let name_end = rest[scope_end + 1..].find('/')?;
            if name_end == 0 {
                return None;
            }
            scope_end + 1 + name_end
        } else {
            rest.find('/')?
        };

        if name_len == 0 || scope_only(&rest[..name_len]) {
            return None;
        }

        let subpath = &rest[name_len + 1..];
        if subpath.is_empty() {
            return None;
        }

        Some(Self {
            prefix,
            name: &rest[..name_len],
            subpath,
        })
    }

    /// Path of the package root, relative to the same base as the input.
    pub fn package_path(&self) -> String {
        format!("{}{}", self.prefix, self.name)
    }
}

fn scope_only(name: &str) -> bool {
    name.starts_with('@') && !name.contains('/')
}

/// Byte offset just past the innermost `node_modules/` segment.
fn innermost_package_start(path: &str) -> Option<usize> {
    let marker = "node_modules/";
    let mut search_end = path.len();

    while let Some(pos) = path[..search_end].rfind(marker) {
        if pos == 0 || path.as_bytes()[pos - 1] == b'/' {
            return Some(pos + marker.len());
        }
        search_end = pos;
    }

    None
}
