//! Formatting for durations and the run summary.

use console::Term;
use owo_colors::Style;
use std::time::Duration;
use tote_trace::{ErrorCategory, TraceSummary};

use super::paint;

/// Errors listed per category before the rest are counted.
const MAX_LISTED_ERRORS: usize = 5;

/// Format duration in human-readable format.
///
/// ```
/// use std::time::Duration;
/// use tote_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// Rows of the summary table, as `(label, value)`.
fn summary_rows(summary: &TraceSummary) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Files traced", summary.files_traced.to_string()),
        ("Files resolved", summary.files_resolved.to_string()),
    ];
    if summary.files_skipped > 0 {
        rows.push(("Files skipped", summary.files_skipped.to_string()));
    }
    if summary.files_excluded > 0 {
        rows.push(("Files excluded", summary.files_excluded.to_string()));
    }
    rows.push(("Packages", summary.packages.to_string()));
    if !summary.multi_version_packages.is_empty() {
        rows.push((
            "Multi-version",
            summary.multi_version_packages.join(", "),
        ));
    }
    rows.push((
        "Files copied",
        format!(
            "{} ({} manifests)",
            summary.files_copied, summary.manifests_written
        ),
    ));
    rows.push((
        "Links",
        format!(
            "{} created, {} existing",
            summary.symlinks_created, summary.symlinks_existing
        ),
    ));
    rows
}

/// Print the run summary table, then a bounded list of errors per phase.
pub fn print_trace_summary(summary: &TraceSummary, elapsed: Duration) {
    let width = (Term::stderr().size().1 as usize).min(60);
    let heading = Style::new().bold().underline();
    let label = Style::new().bright_white().bold();
    let dim = Style::new().dimmed();

    eprintln!("\n{}", paint("Trace Summary", heading));
    eprintln!("{}", "─".repeat(width));

    for (name, value) in summary_rows(summary) {
        eprintln!(
            "  {} {} {}",
            paint("▸", Style::new().blue()),
            paint(&format!("{:<16}", name), label),
            value
        );
    }

    eprintln!("{}", "─".repeat(width));
    eprintln!(
        "  {} {}",
        paint("Done in", Style::new().bold()),
        paint(&format_duration(elapsed), Style::new().green())
    );

    for category in [
        ErrorCategory::Trace,
        ErrorCategory::Resolve,
        ErrorCategory::Copy,
        ErrorCategory::Symlink,
    ] {
        let errors: Vec<_> = summary.errors_in(category).collect();
        if errors.is_empty() {
            continue;
        }

        super::warning(&format!("{} {} error(s)", errors.len(), category));
        for error in errors.iter().take(MAX_LISTED_ERRORS) {
            eprintln!(
                "    {} {}",
                paint(&error.path.display().to_string(), dim),
                error.message
            );
        }
        if errors.len() > MAX_LISTED_ERRORS {
            eprintln!(
                "    {}",
                paint(
                    &format!("... and {} more", errors.len() - MAX_LISTED_ERRORS),
                    dim
                )
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tote_trace::ItemError;

    #[test]
    fn test_format_duration_milliseconds() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
    }

    #[test]
    fn test_format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_millis(1000)), "1.00s");
        assert_eq!(format_duration(Duration::from_millis(59_999)), "60.00s");
    }

    #[test]
    fn test_format_duration_minutes() {
        assert_eq!(format_duration(Duration::from_secs(60)), "1m 0s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_summary_rows_hide_zero_counters() {
        let summary = TraceSummary {
            files_traced: 10,
            files_resolved: 9,
            packages: 4,
            ..TraceSummary::default()
        };
        let labels: Vec<_> = summary_rows(&summary).into_iter().map(|(l, _)| l).collect();
        assert!(!labels.contains(&"Files skipped"));
        assert!(!labels.contains(&"Multi-version"));
        assert!(labels.contains(&"Links"));
    }

    #[test]
    fn test_summary_rows_list_multi_version_packages() {
        let summary = TraceSummary {
            files_skipped: 1,
            multi_version_packages: vec!["debug".into(), "semver".into()],
            ..TraceSummary::default()
        };
        let rows = summary_rows(&summary);
        assert!(rows.contains(&("Files skipped", "1".to_string())));
        assert!(rows.contains(&("Multi-version", "debug, semver".to_string())));
    }

    #[test]
    fn test_print_trace_summary_with_errors() {
        let mut summary = TraceSummary::default();
        for i in 0..7 {
            summary.errors.push(ItemError::new(
                ErrorCategory::Copy,
                format!("/app/node_modules/x/{i}.js"),
                "path too long",
            ));
        }
        print_trace_summary(&summary, Duration::from_millis(12));
    }
}
