//! Mutable prefix accumulator and set algebra.

use super::node::Tree;
use super::PrefixSet;
use crate::models::Prefix;

/// Accumulates prefixes and applies union, intersection and subtraction.
///
/// Entries are kept as an antichain: adding a prefix that is already
/// covered does nothing, and adding an ancestor absorbs its descendants.
/// Sibling merging only happens when a [`PrefixSet`] is materialized.
#[derive(Debug, Clone, Default)]
pub struct PrefixSetBuilder {
    tree: Tree,
}

impl PrefixSetBuilder {
    pub fn new() -> PrefixSetBuilder {
        PrefixSetBuilder::default()
    }

    pub(crate) fn from_tree(tree: Tree) -> PrefixSetBuilder {
        PrefixSetBuilder { tree }
    }

    /// Insert a prefix.
    pub fn add(&mut self, prefix: Prefix) {
        self.tree.insert(&prefix);
    }

    /// Union: add every entry of `other`.
    pub fn merge(&mut self, other: &PrefixSet) {
        for prefix in other.entries().prefixes() {
            self.tree.insert(&prefix);
        }
    }

    /// Keep only the address space shared with `other`.
    ///
    /// For each stored prefix and each entry of `other` that overlap, the
    /// more specific of the two is kept.
    pub fn intersect(&mut self, other: &PrefixSet) {
        self.tree = self.tree.intersect(other.entries());
    }

    /// Remove every entry of `other` from the builder, splitting stored
    /// prefixes that strictly encompass a removed one.
    pub fn subtract(&mut self, other: &PrefixSet) {
        for prefix in other.compact_tree().prefixes() {
            self.tree.remove(&prefix);
        }
    }

    /// Remove one prefix.
    ///
    /// - stored entries inside `prefix` are dropped
    /// - a stored entry strictly containing `prefix` is replaced by the
    ///   `prefix.len() - entry.len()` fragments that remain
    /// - disjoint entries are untouched
    pub fn subtract_prefix(&mut self, prefix: &Prefix) {
        self.tree.remove(prefix);
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Number of stored entries (before sibling merging).
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Materialize the immutable, compacted view of the current entries.
    pub fn prefix_set(&self) -> PrefixSet {
        PrefixSet::from_tree(self.tree.clone())
    }
}

impl FromIterator<Prefix> for PrefixSetBuilder {
    fn from_iter<I: IntoIterator<Item = Prefix>>(iter: I) -> PrefixSetBuilder {
        let mut builder = PrefixSetBuilder::new();
        builder.extend(iter);
        builder
    }
}

impl Extend<Prefix> for PrefixSetBuilder {
    fn extend<I: IntoIterator<Item = Prefix>>(&mut self, iter: I) {
        for prefix in iter {
            self.add(prefix);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Prefix {
        s.parse().unwrap()
    }

    fn set(items: &[&str]) -> PrefixSet {
        items.iter().map(|s| p(s)).collect::<PrefixSetBuilder>().prefix_set()
    }

    fn compact(set: &PrefixSet) -> Vec<String> {
        set.prefixes_compact().iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_subtract_with_split() {
        let mut working = PrefixSetBuilder::from_iter([p("10.0.0.0/24")]);
        working.subtract(&set(&["10.0.0.128/25"]));
        assert_eq!(compact(&working.prefix_set()), vec!["10.0.0.0/25"]);
    }

    #[test]
    fn test_subtract_prefix_cases() {
        let mut b = PrefixSetBuilder::from_iter([
            p("10.0.0.0/24"),
            p("10.1.0.0/24"),
            p("10.2.0.0/24"),
        ]);
        // encompassing: removes 10.1.0.0/24 entirely
        b.subtract_prefix(&p("10.1.0.0/16"));
        // strictly inside: splits 10.2.0.0/24 into 8 fragments
        b.subtract_prefix(&p("10.2.0.0/32"));
        // disjoint
        b.subtract_prefix(&p("172.16.0.0/12"));

        let s = b.prefix_set();
        assert!(s.encompasses(&p("10.0.0.0/24")));
        assert!(!s.overlaps_prefix(&p("10.1.0.0/24")));
        assert!(!s.overlaps_prefix(&p("10.2.0.0")));
        assert!(s.encompasses(&p("10.2.0.1")));
        assert_eq!(s.prefixes().len(), 1 + 8);
    }

    #[test]
    fn test_restoration_law() {
        let a = "10.0.0.0/16";
        for b in ["10.0.0.0/16", "10.0.3.0/24", "10.0.255.255", "10.0.128.0/17"] {
            let mut working = PrefixSetBuilder::from_iter([p(a)]);
            working.subtract(&set(&[b]));
            working.merge(&set(&[b]));
            assert_eq!(compact(&working.prefix_set()), vec![a], "failed for {b}");
        }
    }

    #[test]
    fn test_self_intersection() {
        let s = set(&[
            "10.0.0.0/25",
            "10.0.0.128/25",
            "192.168.0.0/16",
            "192.168.4.0/24",
            "2001:db8::/32",
        ]);
        let mut b = s.to_builder();
        b.intersect(&s);
        assert_eq!(b.prefix_set().prefixes_compact(), s.prefixes_compact());
    }

    #[test]
    fn test_intersect_disjoint_is_empty() {
        let mut b = PrefixSetBuilder::from_iter([p("10.0.0.0/8")]);
        b.intersect(&set(&["11.0.0.0/8", "::/0"]));
        assert!(b.is_empty());
    }

    #[test]
    fn test_intersect_union_of_pairwise_overlaps() {
        let mut b = PrefixSetBuilder::from_iter([p("10.0.0.0/8"), p("10.5.0.0/16")]);
        b.intersect(&set(&["10.5.5.0/24", "10.6.0.0/16", "9.0.0.0/8"]));
        assert_eq!(
            compact(&b.prefix_set()),
            vec!["10.6.0.0/16", "10.5.5.0/24"]
        );
    }

    #[test]
    fn test_intersect_keeps_entries_of_other() {
        let mut b = PrefixSetBuilder::from_iter([p("10.0.0.0/24")]);
        b.intersect(&set(&["10.0.0.0/25", "10.0.0.128/25"]));
        assert_eq!(b.len(), 2);
        let s = b.prefix_set();
        assert_eq!(s.prefixes(), vec![p("10.0.0.0/25"), p("10.0.0.128/25")]);
        assert_eq!(compact(&s), vec!["10.0.0.0/24"]);
    }

    #[test]
    fn test_merge_does_not_tile_entries() {
        let mut b = PrefixSetBuilder::new();
        b.merge(&set(&["10.0.0.0/25"]));
        b.merge(&set(&["10.0.0.128/25"]));
        assert_eq!(b.len(), 2);
        let s = b.prefix_set();
        assert_eq!(s.prefixes().len(), 2);
        assert_eq!(compact(&s), vec!["10.0.0.0/24"]);
    }

    #[test]
    fn test_families_are_independent() {
        let mut b = PrefixSetBuilder::from_iter([p("0.0.0.0/0"), p("::/0")]);
        b.subtract(&set(&["::/1"]));
        assert_eq!(compact(&b.prefix_set()), vec!["0.0.0.0/0", "8000::/1"]);
    }
}
