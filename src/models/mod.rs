//! Domain models for cidrq.
//!
//! - [`Prefix`] - IPv4/IPv6 network in canonical CIDR form
//! - [`Family`] - address family of a prefix

mod prefix;

// Re-export public types
pub use prefix::{
    broadcast_bits, cut_addr, get_cidr_mask, Family, Prefix, PrefixParseError, MAX_LENGTH_V4,
    MAX_LENGTH_V6,
};
