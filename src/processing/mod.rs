//! Evaluators built on the prefix-set engine.
//!
//! - [`error_policy`] - per-line fault handling
//! - [`membership`] - overlap / encompass predicates
//! - [`loader`] - list files and input path iteration
//! - [`combine`] - ordered union / intersect / subtract chains
//! - [`filter`] - match and exclude filtering of streamed lines
//! - [`sort`] - sorted and merged listings

mod combine;
mod error_policy;
mod filter;
mod loader;
mod membership;
mod sort;

// Re-export public types and functions
pub use combine::{CombineChain, CombineOp, CombineOperator};
pub use error_policy::ErrorPolicy;
pub use filter::{Filter, FilterOptions, OutputForm};
pub use loader::{
    add_from_reader, check_files_exist, for_each_input, load_builder, load_builder_from_file,
    load_inputs, open_file, STDIN_PATH,
};
pub use membership::MembershipMode;
pub use sort::{merge_inputs, sort_inputs};
