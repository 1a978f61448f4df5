//! Terminal output: status messages, a spinner for the run, and the summary.
//!
//! Everything goes to stderr so `tote schema` output can be piped.
//!
//! ```no_run
//! use tote_cli::ui;
//!
//! ui::init_colors(ui::color_enabled(false));
//! let spinner = ui::Spinner::new("Tracing dependencies...");
//! spinner.finish("Done");
//! ui::success("node_modules ready");
//! ```

mod format;
mod messages;
mod spinner;

pub use format::{format_duration, print_trace_summary};
pub use messages::{error, info, success, warning};
pub use spinner::Spinner;

use owo_colors::{OwoColorize, Stream, Style};

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
}

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise colors follow whether
/// stderr is a terminal.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }

    console::user_attended_stderr()
}

/// Whether output is colored, given the `--no-color` flag.
///
/// The flag disables colors unconditionally; otherwise the environment
/// decides through [`should_use_color`].
pub fn color_enabled(no_color: bool) -> bool {
    !no_color && should_use_color()
}

/// Apply the color decision to the `owo-colors` and `console` output.
pub fn init_colors(enabled: bool) {
    owo_colors::set_override(enabled);
    console::set_colors_enabled_stderr(enabled);
}

/// Render `text` with `style` when stderr output is colored.
pub(crate) fn paint(text: &str, style: Style) -> String {
    text.if_supports_color(Stream::Stderr, |t| t.style(style))
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_color_vars() {
        unsafe {
            std::env::remove_var("NO_COLOR");
            std::env::remove_var("FORCE_COLOR");
        }
    }

    #[test]
    #[serial]
    fn test_is_ci_with_ci_var() {
        unsafe { std::env::set_var("CI", "true") };
        assert!(is_ci());
        unsafe { std::env::remove_var("CI") };
    }

    #[test]
    #[serial]
    fn test_no_color_overrides_force_color() {
        clear_color_vars();
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_color());
        clear_color_vars();
    }

    #[test]
    #[serial]
    fn test_paint_without_colors_is_plain() {
        init_colors(false);
        assert_eq!(paint("tote", Style::new().green().bold()), "tote");
    }

    #[test]
    #[serial]
    fn test_no_color_flag_beats_force_color() {
        clear_color_vars();
        unsafe { std::env::set_var("FORCE_COLOR", "1") };
        assert!(color_enabled(false));
        assert!(!color_enabled(true));
        clear_color_vars();
    }

    #[test]
    #[serial]
    fn test_force_color() {
        clear_color_vars();
        unsafe { std::env::set_var("FORCE_COLOR", "1") };
        assert!(should_use_color());
        clear_color_vars();
    }
}
