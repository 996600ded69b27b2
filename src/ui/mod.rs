//! UI module for consistent CLI output
//!
//! Styled output in interactive terminals with automatic fallback to
//! plain prefixed lines in CI and pipes.
//!
//! # Example
//!
//! ```rust,ignore
//! use quarry::ui::{self, UiContext};
//!
//! let ctx = UiContext::detect();
//!
//! ui::section(&ctx, "repositories");
//! ui::key_value_status(&ctx, "repo0", "https://repo1.maven.org/maven2/", true);
//! ui::step_warn_hint(&ctx, "repo1 unreachable", "Check the URL");
//! ```

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{
    key_value_status, remark, section, step_ok, step_ok_detail, step_warn_hint,
};
pub use progress::TaskSpinner;
