//! User-facing status lines.
//!
//! Logs go to stderr through `tracing`; these lines are the build's
//! contract with CI and always print, whatever the log filter.

use console::style;

/// Line printed after a completed step or passed gate
#[must_use]
pub fn success_line(step: &str, detail: &str) -> String {
    if detail.is_empty() {
        format!("✅ {}", step)
    } else {
        format!("✅ {} {}", step, detail)
    }
}

/// Line printed when a step or gate fails
#[must_use]
pub fn failure_line(label: &str, reason: &str) -> String {
    format!("❌ {} FAILED: {}", label, reason)
}

/// Print a success line to stdout
pub fn success(step: &str, detail: &str) {
    println!("{}", style(success_line(step, detail)).green());
}

/// Print a failure line to stderr
pub fn failure(label: &str, reason: &str) {
    eprintln!("{}", style(failure_line(label, reason)).red().bold());
}

/// Print a warning to stderr
pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}
