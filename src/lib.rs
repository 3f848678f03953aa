//! Set operations and filtering over streamed lists of IP prefixes.
//!
//! - [`models`] - the [`Prefix`] type
//! - [`prefix_set`] - trie-backed [`PrefixSetBuilder`] and [`PrefixSet`]
//! - [`parser`] - extracting prefixes from text lines
//! - [`processing`] - combine, filter, sort and merge evaluators
//! - [`cli`] - the `cidrq` command line

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod output;
pub mod parser;
pub mod prefix_set;
pub mod processing;

pub use config::Context;
pub use error::{CidrqError, ConfigError, LineError, ParseError, Result};
pub use models::{Family, Prefix, PrefixParseError};
pub use prefix_set::{PrefixSet, PrefixSetBuilder};
pub use processing::{ErrorPolicy, MembershipMode};
