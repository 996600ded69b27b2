//! Progress indicators with CI fallback

use super::context::UiContext;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner shown while repositories are probed or an artifact fetched
///
/// Draws an indicatif spinner on stderr in interactive mode and stays
/// silent in CI and pipes, where stdout may carry command output or
/// artifact bytes.
pub struct TaskSpinner {
    bar: Option<ProgressBar>,
}

impl TaskSpinner {
    /// Start spinning with a message
    pub fn start(ctx: &UiContext, message: &str) -> Self {
        let bar = if ctx.use_styling() {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.cyan} {msg}")
                    .unwrap(),
            );
            bar.set_message(message.to_string());
            bar.enable_steady_tick(std::time::Duration::from_millis(100));
            Some(bar)
        } else {
            None
        };
        Self { bar }
    }

    /// Finish and clear; the caller prints the outcome
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_and_clear();
        }
    }
}
