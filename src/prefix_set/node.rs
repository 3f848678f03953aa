//! Binary trie shared by [`PrefixSetBuilder`](super::PrefixSetBuilder) and
//! [`PrefixSet`](super::PrefixSet).
//!
//! Each family has its own root, standing for `0.0.0.0/0` or `::/0`. Going
//! down a level appends one address bit. Two invariants hold after every
//! operation:
//! - a node marked `present` has no children (entries form an antichain)
//! - every node has at least one `present` node in its subtree

use crate::models::{Family, Prefix};

type Link = Option<Box<Node>>;

#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    present: bool,
    children: [Link; 2],
}

impl Node {
    fn leaf() -> Box<Node> {
        Box::new(Node {
            present: true,
            children: [None, None],
        })
    }

    fn is_empty(&self) -> bool {
        !self.present && self.children.iter().all(Option::is_none)
    }

    fn count(&self) -> usize {
        if self.present {
            1
        } else {
            self.children.iter().flatten().map(|c| c.count()).sum()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Tree {
    v4: Link,
    v6: Link,
}

impl Tree {
    fn root(&self, family: Family) -> &Link {
        match family {
            Family::V4 => &self.v4,
            Family::V6 => &self.v6,
        }
    }

    fn root_mut(&mut self, family: Family) -> &mut Link {
        match family {
            Family::V4 => &mut self.v4,
            Family::V6 => &mut self.v6,
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.v4.is_none() && self.v6.is_none()
    }

    /// Number of stored entries.
    pub(crate) fn len(&self) -> usize {
        [&self.v4, &self.v6]
            .into_iter()
            .flatten()
            .map(|n| n.count())
            .sum()
    }

    pub(crate) fn insert(&mut self, prefix: &Prefix) {
        insert(self.root_mut(prefix.family()), prefix, 0);
    }

    /// Remove `prefix` from the covered space, splitting any entry that
    /// strictly encompasses it.
    pub(crate) fn remove(&mut self, prefix: &Prefix) {
        remove(self.root_mut(prefix.family()), prefix, 0);
    }

    pub(crate) fn intersect(&self, other: &Tree) -> Tree {
        Tree {
            v4: intersect(&self.v4, &other.v4),
            v6: intersect(&self.v6, &other.v6),
        }
    }

    /// Merge sibling entries that tile their parent, bottom up.
    pub(crate) fn compact(&mut self) {
        compact(&mut self.v4);
        compact(&mut self.v6);
    }

    /// True when an entry is equal to or an ancestor of `prefix`.
    pub(crate) fn encompasses(&self, prefix: &Prefix) -> bool {
        let mut link = self.root(prefix.family());
        let mut depth = 0;
        while let Some(node) = link {
            if node.present {
                return true;
            }
            if depth == prefix.len() {
                return false;
            }
            link = &node.children[prefix.bit(depth)];
            depth += 1;
        }
        false
    }

    /// True when an entry is equal to, an ancestor of, or a descendant of
    /// `prefix`.
    pub(crate) fn overlaps(&self, prefix: &Prefix) -> bool {
        let mut link = self.root(prefix.family());
        let mut depth = 0;
        while let Some(node) = link {
            // Non-empty subtree below the query means a descendant entry.
            if node.present || depth == prefix.len() {
                return true;
            }
            link = &node.children[prefix.bit(depth)];
            depth += 1;
        }
        false
    }

    /// Entries in address order, IPv4 first.
    pub(crate) fn prefixes(&self) -> Vec<Prefix> {
        let mut out = Vec::new();
        collect(&self.v4, Prefix::root(Family::V4), &mut out);
        collect(&self.v6, Prefix::root(Family::V6), &mut out);
        out
    }
}

fn insert(link: &mut Link, prefix: &Prefix, depth: u8) {
    let node = link.get_or_insert_with(Box::default);
    if node.present {
        return;
    }
    if depth == prefix.len() {
        node.present = true;
        node.children = [None, None];
        return;
    }
    insert(&mut node.children[prefix.bit(depth)], prefix, depth + 1);
}

fn remove(link: &mut Link, prefix: &Prefix, depth: u8) {
    if depth == prefix.len() {
        *link = None;
        return;
    }
    let Some(node) = link.as_deref_mut() else {
        return;
    };
    if node.present {
        split(node, prefix, depth);
        return;
    }
    remove(&mut node.children[prefix.bit(depth)], prefix, depth + 1);
    let empty = node.is_empty();
    if empty {
        *link = None;
    }
}

/// Replace the entry at `node` with the complement of `prefix` inside it:
/// one sibling fragment per level between `depth` and `prefix.len()`.
fn split(node: &mut Node, prefix: &Prefix, depth: u8) {
    let bit = prefix.bit(depth);
    node.present = false;
    node.children[1 - bit] = Some(Node::leaf());
    if depth + 1 < prefix.len() {
        let child = node.children[bit].insert(Box::default());
        split(child, prefix, depth + 1);
    } else {
        node.children[bit] = None;
    }
}

fn intersect(a: &Link, b: &Link) -> Link {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        _ => return None,
    };
    // The overlap of two nested prefixes is the more specific one.
    if a.present {
        return Some(b.clone());
    }
    if b.present {
        return Some(a.clone());
    }
    let node = Node {
        present: false,
        children: [
            intersect(&a.children[0], &b.children[0]),
            intersect(&a.children[1], &b.children[1]),
        ],
    };
    if node.is_empty() {
        None
    } else {
        Some(Box::new(node))
    }
}

fn compact(link: &mut Link) {
    let Some(node) = link.as_deref_mut() else {
        return;
    };
    if node.present {
        return;
    }
    for child in node.children.iter_mut() {
        compact(child);
    }
    let tiled = node
        .children
        .iter()
        .all(|c| matches!(c.as_deref(), Some(Node { present: true, .. })));
    if tiled {
        node.present = true;
        node.children = [None, None];
    }
}

fn collect(link: &Link, prefix: Prefix, out: &mut Vec<Prefix>) {
    let Some(node) = link else {
        return;
    };
    if node.present {
        out.push(prefix);
        return;
    }
    for (bit, child) in node.children.iter().enumerate() {
        if child.is_some() {
            collect(child, prefix.child(bit), out);
        }
    }
}
