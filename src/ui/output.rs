//! Output functions for consistent CLI formatting

use super::context::UiContext;
use console::{style, Style};

/// Display a section header
pub fn section(ctx: &UiContext, title: &str) {
    if ctx.use_styling() {
        println!("{}", style(title).bold());
    } else {
        println!("{}", title);
    }
}

/// Display a success step
pub fn step_ok(ctx: &UiContext, message: &str) {
    if ctx.use_styling() {
        println!("{} {}", style("ok").green().bold(), message);
    } else {
        println!("  [OK] {}", message);
    }
}

/// Display a success step with detail
pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    if ctx.use_styling() {
        println!(
            "{} {} ({})",
            style("ok").green().bold(),
            message,
            style(detail).dim()
        );
    } else {
        println!("  [OK] {} ({})", message, detail);
    }
}

/// Display a warning step with hint
pub fn step_warn_hint(ctx: &UiContext, message: &str, hint: &str) {
    if ctx.use_styling() {
        println!(
            "{} {} - {}",
            style("warn").yellow().bold(),
            message,
            style(hint).dim()
        );
    } else {
        println!("  [WARN] {} - {}", message, hint);
    }
}

/// Display a remark/hint
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_styling() {
        println!("  {}", style(message).dim());
    } else {
        println!("  {}", message);
    }
}

/// Print styled key-value with status color
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    let value_style = if ok {
        Style::new().green()
    } else {
        Style::new().yellow()
    };

    if ctx.use_styling() {
        println!("  {}: {}", style(key).dim(), value_style.apply_to(value));
    } else {
        let prefix = if ok { "[OK]" } else { "[WARN]" };
        println!("  {} {}: {}", prefix, key, value);
    }
}
