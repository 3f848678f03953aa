//! Immutable, compacted prefix set.

use super::node::Tree;
use super::PrefixSetBuilder;
use crate::models::Prefix;
use itertools::Itertools;
use std::net::IpAddr;

/// Read-only view materialized by [`PrefixSetBuilder::prefix_set`].
///
/// Keeps the builder's entries as they were added, and the compacted
/// minimal covering of the same address space. Membership queries are
/// answered against the compacted covering.
#[derive(Debug, Clone, Default)]
pub struct PrefixSet {
    entries: Tree,
    compact: Tree,
}

impl PrefixSet {
    pub(crate) fn from_tree(entries: Tree) -> PrefixSet {
        let mut compact = entries.clone();
        compact.compact();
        PrefixSet { entries, compact }
    }

    pub(crate) fn entries(&self) -> &Tree {
        &self.entries
    }

    pub(crate) fn compact_tree(&self) -> &Tree {
        &self.compact
    }

    /// Stored entries in canonical order, without sibling merging.
    pub fn prefixes(&self) -> Vec<Prefix> {
        self.entries.prefixes().into_iter().sorted().collect()
    }

    /// The minimal set of prefixes covering the same space, in canonical order.
    pub fn prefixes_compact(&self) -> Vec<Prefix> {
        self.compact.prefixes().into_iter().sorted().collect()
    }

    /// True if some entry is equal to, inside, or around `prefix`.
    pub fn overlaps_prefix(&self, prefix: &Prefix) -> bool {
        self.compact.overlaps(prefix)
    }

    /// True if some entry is equal to or an ancestor of `prefix`.
    pub fn encompasses(&self, prefix: &Prefix) -> bool {
        self.compact.encompasses(prefix)
    }

    pub fn contains_addr(&self, addr: IpAddr) -> bool {
        self.compact.encompasses(&Prefix::host(addr))
    }

    /// The parts of `prefix` not covered by this set.
    pub fn subtract_from_prefix(&self, prefix: &Prefix) -> Vec<Prefix> {
        let mut builder = PrefixSetBuilder::from_iter([*prefix]);
        builder.subtract(self);
        builder.prefix_set().prefixes_compact()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A builder seeded with this set's entries.
    pub fn to_builder(&self) -> PrefixSetBuilder {
        PrefixSetBuilder::from_tree(self.entries.clone())
    }
}

impl FromIterator<Prefix> for PrefixSet {
    fn from_iter<I: IntoIterator<Item = Prefix>>(iter: I) -> PrefixSet {
        iter.into_iter().collect::<PrefixSetBuilder>().prefix_set()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Prefix {
        s.parse().unwrap()
    }

    fn set(items: &[&str]) -> PrefixSet {
        items.iter().map(|s| p(s)).collect()
    }

    fn rendered(prefixes: &[Prefix]) -> Vec<String> {
        prefixes.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_prefixes_canonical_order() {
        let s = set(&["2001:db8::/32", "10.0.0.1", "10.0.0.0/8", "9.9.0.0/16"]);
        assert_eq!(
            rendered(&s.prefixes()),
            vec!["10.0.0.0/8", "9.9.0.0/16", "2001:db8::/32"]
        );
    }

    #[test]
    fn test_compaction_is_idempotent() {
        let s = set(&[
            "10.0.0.0/26",
            "10.0.0.64/26",
            "10.0.0.128/25",
            "10.0.1.0/24",
            "10.0.3.0/24",
            "::/1",
            "8000::/1",
        ]);
        let once = s.prefixes_compact();
        assert_eq!(rendered(&once), vec!["10.0.0.0/23", "10.0.3.0/24", "::/0"]);
        let twice: PrefixSet = once.iter().copied().collect();
        assert_eq!(twice.prefixes_compact(), once);
    }

    #[test]
    fn test_encompass_implies_overlap() {
        let s = set(&["10.0.0.0/16", "192.168.1.0/24", "2001:db8::/32"]);
        for q in [
            "10.0.0.0/8",
            "10.0.5.0/24",
            "10.0.0.0/16",
            "192.168.0.0/16",
            "192.168.1.7",
            "2001:db8:1::/48",
            "2001::/16",
            "8.8.8.8",
        ] {
            let q = p(q);
            if s.encompasses(&q) {
                assert!(s.overlaps_prefix(&q), "{q} encompassed but not overlapping");
            }
        }
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let pairs = [
            ("10.0.0.0/8", "10.1.2.0/24"),
            ("10.0.1.128/25", "10.0.1.0/24"),
            ("10.0.0.0/25", "10.0.0.128/25"),
            ("::/0", "0.0.0.0/0"),
        ];
        for (a, b) in pairs {
            assert_eq!(
                set(&[a]).overlaps_prefix(&p(b)),
                set(&[b]).overlaps_prefix(&p(a)),
                "asymmetric overlap for {a} / {b}"
            );
        }
    }

    #[test]
    fn test_membership_uses_compacted_covering() {
        let s = set(&["10.0.0.0/25", "10.0.0.128/25"]);
        assert!(s.encompasses(&p("10.0.0.0/24")));
        assert!(!s.encompasses(&p("10.0.0.0/23")));
        assert!(s.overlaps_prefix(&p("10.0.0.0/23")));
        assert!(s.contains_addr("10.0.0.200".parse().unwrap()));
        assert!(!s.contains_addr("10.0.1.0".parse().unwrap()));
    }

    #[test]
    fn test_subtract_from_prefix() {
        let exclusions = set(&["10.0.0.0/26", "10.0.0.192/26", "11.0.0.0/8"]);
        assert_eq!(
            rendered(&exclusions.subtract_from_prefix(&p("10.0.0.0/24"))),
            vec!["10.0.0.64/26", "10.0.0.128/26"]
        );
        assert!(exclusions
            .subtract_from_prefix(&p("11.1.0.0/16"))
            .is_empty());
        assert_eq!(
            rendered(&exclusions.subtract_from_prefix(&p("12.0.0.0/8"))),
            vec!["12.0.0.0/8"]
        );
    }

    #[test]
    fn test_sort_is_input_order_independent() {
        let items = ["10.0.0.0/24", "10.0.0.0/8", "1.2.3.4", "::1", "10.0.0.0/24", "172.16.0.0/12"];
        let forward = set(&items).prefixes();
        let mut reversed = items;
        reversed.reverse();
        assert_eq!(set(&reversed).prefixes(), forward);
        let mut rotated = items;
        rotated.rotate_left(2);
        assert_eq!(set(&rotated).prefixes(), forward);
    }

    #[test]
    fn test_empty_set() {
        let s = PrefixSet::default();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert!(!s.overlaps_prefix(&p("0.0.0.0/0")));
        assert!(s.prefixes_compact().is_empty());
    }
}
