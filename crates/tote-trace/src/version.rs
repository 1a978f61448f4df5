//! Installed-version ordering.
//!
//! Versions seen by the tracer are exact installed versions read from
//! manifests, so ordering only has to pick the newest of a handful of
//! concrete strings; no range matching is involved.
//!
//! # Limitation
//!
//! Pre-release tags are ignored: `2.0.0-beta.1` orders equal to `2.0.0`.
//! Semantic-version precedence would sort the pre-release first; the simpler
//! ordering is kept until product decides which build should be promoted.

use std::cmp::Ordering;

/// Compare two installed versions so that an ascending sort yields the
/// newest version first.
///
/// The pre-release suffix (everything after the first `-`) is dropped, the
/// remaining core is split on `.` and compared component-wise as integers.
/// Missing trailing components count as `0`, as do components that are not
/// numbers.
///
/// # Example
///
/// ```
/// use tote_trace::version::compare_versions;
/// use std::cmp::Ordering;
///
/// assert_eq!(compare_versions("1.2.0", "1.10.0"), Ordering::Greater);
/// assert_eq!(compare_versions("1.0", "1.0.0"), Ordering::Equal);
/// ```
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    let a_parts = numeric_core(a);
    let b_parts = numeric_core(b);
    let len = a_parts.len().max(b_parts.len());

    for i in 0..len {
        let a_part = a_parts.get(i).copied().unwrap_or(0);
        let b_part = b_parts.get(i).copied().unwrap_or(0);
        match b_part.cmp(&a_part) {
            Ordering::Equal => continue,
            other => return other,
        }
    }

    Ordering::Equal
}

/// Sort versions newest-first using [`compare_versions`].
pub fn sort_newest_first<S: AsRef<str>>(versions: &mut [S]) {
    versions.sort_by(|a, b| compare_versions(a.as_ref(), b.as_ref()));
}

/// Pick the newest version, if any.
pub fn newest<'a, I>(versions: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    versions
        .into_iter()
        .min_by(|a, b| compare_versions(a, b))
}

fn numeric_core(version: &str) -> Vec<u64> {
    let core = version.split('-').next().unwrap_or(version);
    core.split('.')
        .map(|part| part.trim().parse::<u64>().unwrap_or(0))
        .collect()
}
