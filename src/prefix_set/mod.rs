//! Trie-backed prefix sets.
//!
//! - [`PrefixSetBuilder`] - mutable accumulator with union, intersect and
//!   subtract
//! - [`PrefixSet`] - immutable compacted view with membership queries

mod builder;
mod node;
mod set;

pub use builder::PrefixSetBuilder;
pub use set::PrefixSet;
