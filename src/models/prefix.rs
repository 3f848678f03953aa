//! IP prefix (CIDR) representation and mask utilities.
//!
//! Provides [`Prefix`] for IPv4 and IPv6 networks. Address bits are kept in a
//! `u128` for both families so the prefix-set trie can walk either one with
//! the same bit arithmetic.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// Maximum length for an IPv4 prefix (32 bits).
pub const MAX_LENGTH_V4: u8 = 32;
/// Maximum length for an IPv6 prefix (128 bits).
pub const MAX_LENGTH_V6: u8 = 128;

/// Address family of a [`Prefix`]. IPv4 sorts before IPv6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Family {
    V4,
    V6,
}

impl Family {
    /// Width of an address of this family in bits.
    pub fn max_len(self) -> u8 {
        match self {
            Family::V4 => MAX_LENGTH_V4,
            Family::V6 => MAX_LENGTH_V6,
        }
    }

    pub fn of(addr: &IpAddr) -> Family {
        match addr {
            IpAddr::V4(_) => Family::V4,
            IpAddr::V6(_) => Family::V6,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Family::V4 => write!(f, "IPv4"),
            Family::V6 => write!(f, "IPv6"),
        }
    }
}

/// Failure to turn text into a [`Prefix`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrefixParseError {
    #[error("invalid address in '{0}'")]
    InvalidAddress(String),
    #[error("invalid prefix length in '{0}'")]
    InvalidLength(String),
    #[error("prefix length /{len} is too long for {family} (max /{max})")]
    LengthOutOfRange { family: Family, len: u8, max: u8 },
}

/// Convert a prefix length to a network mask over the family's address width.
///
/// # Examples
/// ```
/// use cidrq::models::{get_cidr_mask, Family};
/// assert_eq!(get_cidr_mask(Family::V4, 24), 0xFFFF_FF00);
/// ```
pub fn get_cidr_mask(family: Family, len: u8) -> u128 {
    let all_bits = all_bits(family);
    let len = len.min(family.max_len());
    all_bits ^ all_bits.checked_shr(len as u32).unwrap_or(0)
}

/// Get the network bits for the given address bits and prefix length.
pub fn cut_addr(family: Family, bits: u128, len: u8) -> u128 {
    bits & get_cidr_mask(family, len)
}

/// Get the highest (broadcast) bits for the given address bits and prefix length.
pub fn broadcast_bits(family: Family, bits: u128, len: u8) -> u128 {
    cut_addr(family, bits, len) | (all_bits(family) & !get_cidr_mask(family, len))
}

fn all_bits(family: Family) -> u128 {
    match family {
        Family::V4 => u32::MAX as u128,
        Family::V6 => u128::MAX,
    }
}

fn addr_to_bits(addr: IpAddr) -> u128 {
    match addr {
        IpAddr::V4(v4) => u32::from(v4) as u128,
        IpAddr::V6(v6) => u128::from(v6),
    }
}

fn bits_to_addr(family: Family, bits: u128) -> IpAddr {
    match family {
        Family::V4 => IpAddr::V4(Ipv4Addr::from(bits as u32)),
        Family::V6 => IpAddr::V6(Ipv6Addr::from(bits)),
    }
}

/// An IP network in CIDR notation, always stored in canonical (masked) form.
///
/// Ordering is family first, then prefix length, then numeric address. This
/// is the order every listing produced by the crate uses.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Prefix {
    family: Family,
    len: u8,
    bits: u128,
}

impl Prefix {
    /// Create a prefix from an address and length, clearing the host bits.
    pub fn new(addr: IpAddr, len: u8) -> Result<Prefix, PrefixParseError> {
        let family = Family::of(&addr);
        if len > family.max_len() {
            return Err(PrefixParseError::LengthOutOfRange {
                family,
                len,
                max: family.max_len(),
            });
        }
        Ok(Prefix::from_bits(family, addr_to_bits(addr), len))
    }

    /// The single-address prefix (`/32` or `/128`) for `addr`.
    pub fn host(addr: IpAddr) -> Prefix {
        let family = Family::of(&addr);
        Prefix::from_bits(family, addr_to_bits(addr), family.max_len())
    }

    /// The whole address space of a family (`0.0.0.0/0` or `::/0`).
    pub fn root(family: Family) -> Prefix {
        Prefix {
            family,
            len: 0,
            bits: 0,
        }
    }

    pub(crate) fn from_bits(family: Family, bits: u128, len: u8) -> Prefix {
        debug_assert!(len <= family.max_len());
        Prefix {
            family,
            len,
            bits: cut_addr(family, bits, len),
        }
    }

    pub fn family(&self) -> Family {
        self.family
    }

    /// The prefix length (number of network bits).
    pub fn len(&self) -> u8 {
        self.len
    }

    pub fn max_len(&self) -> u8 {
        self.family.max_len()
    }

    /// True when the prefix covers exactly one address.
    pub fn is_host(&self) -> bool {
        self.len == self.max_len()
    }

    pub(crate) fn bits(&self) -> u128 {
        self.bits
    }

    /// The network address.
    pub fn addr(&self) -> IpAddr {
        bits_to_addr(self.family, self.bits)
    }

    /// Get the lowest (network) address in the prefix.
    pub fn lo(&self) -> IpAddr {
        self.addr()
    }

    /// Get the highest (broadcast) address in the prefix.
    pub fn hi(&self) -> IpAddr {
        bits_to_addr(
            self.family,
            broadcast_bits(self.family, self.bits, self.len),
        )
    }

    /// Bit of the address at `depth` (0 is the most significant bit).
    pub(crate) fn bit(&self, depth: u8) -> usize {
        let shift = self.max_len() - 1 - depth;
        ((self.bits >> shift) & 1) as usize
    }

    /// One of the two halves of this prefix, selected by `bit`.
    pub(crate) fn child(&self, bit: usize) -> Prefix {
        debug_assert!(self.len < self.max_len());
        let shift = self.max_len() - 1 - self.len;
        Prefix {
            family: self.family,
            len: self.len + 1,
            bits: self.bits | ((bit as u128) << shift),
        }
    }

    /// The enclosing prefix one bit shorter, or `None` for a `/0`.
    pub fn parent(&self) -> Option<Prefix> {
        if self.len == 0 {
            None
        } else {
            Some(self.truncate(self.len - 1))
        }
    }

    /// The ancestor of this prefix at length `len` (`len <= self.len()`).
    pub fn truncate(&self, len: u8) -> Prefix {
        Prefix::from_bits(self.family, self.bits, len.min(self.len))
    }

    /// True when `other` is equal to this prefix or inside it.
    pub fn encompasses(&self, other: &Prefix) -> bool {
        self.family == other.family
            && self.len <= other.len
            && cut_addr(self.family, other.bits, self.len) == self.bits
    }

    /// True when the address ranges intersect. CIDR ranges never partially
    /// overlap, so this means one encompasses the other.
    pub fn overlaps(&self, other: &Prefix) -> bool {
        self.encompasses(other) || other.encompasses(self)
    }

    pub fn contains_addr(&self, addr: IpAddr) -> bool {
        self.encompasses(&Prefix::host(addr))
    }

    /// Render as `address/length`, even for single-address prefixes.
    pub fn to_cidr_string(&self) -> String {
        format!("{}/{}", self.addr(), self.len)
    }
}

impl Ord for Prefix {
    fn cmp(&self, other: &Prefix) -> Ordering {
        self.family
            .cmp(&other.family)
            .then_with(|| self.len.cmp(&other.len))
            .then_with(|| self.bits.cmp(&other.bits))
    }
}

impl PartialOrd for Prefix {
    fn partial_cmp(&self, other: &Prefix) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Canonical form: a bare address for full-length prefixes, otherwise
/// `address/length`.
impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_host() {
            write!(f, "{}", self.addr())
        } else {
            write!(f, "{}/{}", self.addr(), self.len)
        }
    }
}

/// Parse `<address>["/"<length>]`. A bare address gets the full-length mask.
impl FromStr for Prefix {
    type Err = PrefixParseError;

    fn from_str(s: &str) -> Result<Prefix, PrefixParseError> {
        let (addr_str, len_str) = match s.split_once('/') {
            Some((addr, len)) => (addr, Some(len)),
            None => (s, None),
        };
        let addr: IpAddr = addr_str
            .parse()
            .map_err(|_| PrefixParseError::InvalidAddress(s.to_string()))?;
        let len = match len_str {
            Some(len) => {
                let leading_zero = len.len() > 1 && len.starts_with('0');
                if len.is_empty() || leading_zero || !len.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(PrefixParseError::InvalidLength(s.to_string()));
                }
                len.parse::<u8>()
                    .map_err(|_| PrefixParseError::InvalidLength(s.to_string()))?
            }
            None => Family::of(&addr).max_len(),
        };
        Prefix::new(addr, len)
    }
}

impl Serialize for Prefix {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_cidr_string())
    }
}

impl<'de> Deserialize<'de> for Prefix {
    fn deserialize<D>(deserializer: D) -> Result<Prefix, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}
