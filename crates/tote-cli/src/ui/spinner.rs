//! Spinner shown while a run is in progress.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::Style;
use std::time::Duration;

use super::paint;

/// Spinner for the trace run.
///
/// Hidden in CI, where redraws only clutter the log.
///
/// ```no_run
/// use tote_cli::ui::Spinner;
///
/// let spinner = Spinner::new("Tracing dependencies...");
/// spinner.finish("Traced 120 files");
/// ```
pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create and start a new spinner.
    pub fn new(message: &str) -> Self {
        if super::is_ci() {
            return Self {
                pb: ProgressBar::hidden(),
            };
        }

        let pb = ProgressBar::new_spinner();
        let style = ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["◐", "◓", "◑", "◒"]);
        pb.set_style(style);
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    /// Finish with a green checkmark.
    pub fn finish(&self, message: &str) {
        self.pb
            .finish_with_message(format!("{} {}", paint("✓", Style::new().green()), message));
    }

    /// Finish with a red X.
    pub fn fail(&self, message: &str) {
        self.pb
            .finish_with_message(format!("{} {}", paint("✗", Style::new().red()), message));
    }
}
