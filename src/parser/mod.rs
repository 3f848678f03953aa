//! Streaming record parser.
//!
//! - [`ValueParser`] - turns one value into a [`Prefix`](crate::models::Prefix)
//! - [`RecordParser`] and [`ParsedLine`] - whole-line or per-field extraction
//! - [`LineProcessor`] - the read/parse/handle loop

mod processor;
mod record;
mod value;

pub use processor::LineProcessor;
pub use record::{ParsedLine, RecordParser, TAB_ESCAPE};
pub use value::ValueParser;
