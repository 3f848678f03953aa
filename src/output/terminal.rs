//! Terminal output utilities.
//!
//! Diagnostics go to stderr so they never mix with prefix output on stdout.

use colored::Colorize;
use std::fmt::Display;

/// Format a diagnostic as `<label>: <message>`, colouring the label.
pub fn format_diagnostic<T: Display>(label: &str, message: T, error: bool) -> String {
    let label = format!("{label}:");
    let label = if error { label.red().bold() } else { label.yellow() };
    format!("{label} {message}")
}

/// Print `Warning: <message>` to stderr.
pub fn print_warning<T: Display>(message: T) {
    eprintln!("{}", format_diagnostic("Warning", message, false));
}

/// Print `Error: <message>` to stderr.
pub fn print_error<T: Display>(message: T) {
    eprintln!("{}", format_diagnostic("Error", message, true));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_diagnostic_plain() {
        colored::control::set_override(false);
        assert_eq!(format_diagnostic("Warning", "bad line", false), "Warning: bad line");
        assert_eq!(format_diagnostic("Error", 42, true), "Error: 42");
    }
}
