//! Output formatting.
//!
//! - [`lines`] - canonical prefix listings, one per line
//! - [`terminal`] - coloured diagnostics on stderr

mod lines;
mod terminal;

pub use lines::write_prefixes;
pub use terminal::{format_diagnostic, print_error, print_warning};
