//! Membership modes for match and exclude lists.

use crate::error::ConfigError;
use crate::models::Prefix;
use crate::prefix_set::PrefixSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How a prefix is compared against a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipMode {
    /// The prefix intersects any entry (ancestor, descendant or equal).
    Overlap,
    /// Some entry is the prefix itself or one of its ancestors.
    Encompass,
}

impl MembershipMode {
    pub fn test(self, set: &PrefixSet, prefix: &Prefix) -> bool {
        match self {
            MembershipMode::Overlap => set.overlaps_prefix(prefix),
            MembershipMode::Encompass => set.encompasses(prefix),
        }
    }
}

impl FromStr for MembershipMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<MembershipMode, ConfigError> {
        match s {
            "overlap" => Ok(MembershipMode::Overlap),
            "encompass" => Ok(MembershipMode::Encompass),
            _ => Err(ConfigError::InvalidChoice {
                kind: "membership mode",
                value: s.to_string(),
                expected: "overlap, encompass",
            }),
        }
    }
}

impl fmt::Display for MembershipMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MembershipMode::Overlap => write!(f, "overlap"),
            MembershipMode::Encompass => write!(f, "encompass"),
        }
    }
}
