//! Tree algebra: union, difference and containment.
//!
//! Both set operations walk the two trees in lock-step. At each visited path
//! the effective masks of both inputs are combined, and the stored delta is
//! whatever makes the result's running XOR equal that combination. Subtrees
//! that only exist on one side are still visited, because the other side's
//! inherited value applies there.
//!
//! Pruning happens while the result is assembled bottom-up, so the output
//! keeps the same canonical shape as any other mutation.

use std::collections::BTreeMap;
use std::mem;
use std::vec;

use crate::privilege::Privilege;
use crate::tree::{Node, PrivilegeTree};

#[derive(Debug, Clone, Copy)]
enum Combine {
    Union,
    Difference,
}

impl Combine {
    fn apply(self, a: Privilege, b: Privilege) -> Privilege {
        match self {
            Combine::Union => a | b,
            Combine::Difference => a - b,
        }
    }
}

impl PrivilegeTree {
    /// Merge `other` into `self`: afterwards every path holds what either
    /// tree held there.
    ///
    /// The law is exact on raw bits ([`PrivilegeTree::effective`]). Queries
    /// through [`PrivilegeTree::contain`] can see more than either input,
    /// because the legacy READ/WRITE rule looks at the merged mask as a
    /// whole: SHOW DATABASES|CREATE CQ from one tree and SELECT from the
    /// other make a complete read group, which satisfies READ.
    ///
    /// ```
    /// use privtree_core::{Privilege, PrivilegeTree, ResourcePath};
    ///
    /// let db: ResourcePath = "db".parse().unwrap();
    /// let mut a = PrivilegeTree::new();
    /// a.add(&db, Privilege::SELECT);
    /// let mut b = PrivilegeTree::new();
    /// b.add_global(Privilege::INSERT);
    ///
    /// a.union_with(&b);
    /// assert!(a.contain(&db, Privilege::SELECT | Privilege::INSERT));
    /// assert!(!a.contain(&"other".parse().unwrap(), Privilege::SELECT));
    /// ```
    pub fn union_with(&mut self, other: &PrivilegeTree) {
        self.combine(other, Combine::Union);
    }

    /// Remove from `self` everything `other` holds, path by path.
    ///
    /// To subtract a tree from itself, pass a clone.
    pub fn different_with(&mut self, other: &PrivilegeTree) {
        self.combine(other, Combine::Difference);
    }

    /// Whether `self` holds everything `other` holds, at every path.
    ///
    /// Same answer as subtracting `self` from a copy of `other` and asking
    /// whether anything is left, but read-only: both trees are walked in
    /// lock-step and the walk stops at the first uncovered path.
    pub fn contains(&self, other: &PrivilegeTree) -> bool {
        let mut stack = vec![(Some(&self.root), Some(&other.root), Privilege::NONE, Privilege::NONE)];

        while let Some((mine, theirs, sum_mine, sum_theirs)) = stack.pop() {
            let sum_mine = sum_mine ^ mine.map_or(Privilege::NONE, |n| n.delta);
            let sum_theirs = sum_theirs ^ theirs.map_or(Privilege::NONE, |n| n.delta);
            if !(sum_theirs - sum_mine).is_empty() {
                return false;
            }

            if let Some(theirs) = theirs {
                for (name, child) in &theirs.children {
                    let own = mine.and_then(|m| m.children.get(name));
                    stack.push((own, Some(child), sum_mine, sum_theirs));
                }
            }
            if let Some(mine) = mine {
                for (name, child) in &mine.children {
                    if !theirs.is_some_and(|t| t.children.contains_key(name)) {
                        stack.push((Some(child), None, sum_mine, sum_theirs));
                    }
                }
            }
        }
        true
    }

    fn combine(&mut self, other: &PrivilegeTree, op: Combine) {
        let root = mem::take(&mut self.root);
        self.root = combine_nodes(root, &other.root, op);
    }
}

type Pending<'b> = vec::IntoIter<(String, Node, Option<&'b Node>)>;

struct Frame<'b> {
    name: String,
    delta: Privilege,
    sum_a: Privilege,
    sum_b: Privilege,
    sum_r: Privilege,
    pending: Pending<'b>,
    kept: BTreeMap<String, Node>,
}

impl<'b> Frame<'b> {
    /// Frame holding only the root as its pending child.
    fn top(a: Node, b: &'b Node) -> Self {
        Frame {
            name: String::new(),
            delta: Privilege::NONE,
            sum_a: Privilege::NONE,
            sum_b: Privilege::NONE,
            sum_r: Privilege::NONE,
            pending: vec![(String::new(), a, Some(b))].into_iter(),
            kept: BTreeMap::new(),
        }
    }

    /// Open `a`/`b` as a child of `self`, computing the result delta.
    fn child(&self, name: String, mut a: Node, b: Option<&'b Node>, op: Combine, is_root: bool) -> Self {
        let sum_a = self.sum_a ^ a.delta;
        let sum_b = self.sum_b ^ b.map_or(Privilege::NONE, |b| b.delta);

        let mut delta = op.apply(sum_a, sum_b) ^ self.sum_r;
        if !is_root {
            delta = delta.resource_scoped();
        }

        let mut a_children = mem::take(&mut a.children);
        let mut pending = Vec::with_capacity(a_children.len());
        if let Some(b) = b {
            for (name, b_child) in &b.children {
                let a_child = a_children.remove(name).unwrap_or_default();
                pending.push((name.clone(), a_child, Some(b_child)));
            }
        }
        pending.extend(a_children.into_iter().map(|(name, a_child)| (name, a_child, None)));

        Frame {
            name,
            delta,
            sum_a,
            sum_b,
            sum_r: self.sum_r ^ delta,
            pending: pending.into_iter(),
            kept: BTreeMap::new(),
        }
    }
}

/// Consume `a`, combine it with `b` and return the new root.
///
/// Runs on an explicit stack so tree depth never turns into call depth.
fn combine_nodes(a: Node, b: &Node, op: Combine) -> Node {
    let mut stack = vec![Frame::top(a, b)];

    while let Some(mut frame) = stack.pop() {
        if let Some((name, a, b)) = frame.pending.next() {
            let is_root = stack.is_empty();
            let child = frame.child(name, a, b, op, is_root);
            stack.push(frame);
            stack.push(child);
            continue;
        }

        let Some(parent) = stack.last_mut() else {
            return frame.kept.into_values().next().unwrap_or_default();
        };
        let done = Node {
            delta: frame.delta,
            children: frame.kept,
        };
        if !done.is_empty_leaf() {
            parent.kept.insert(frame.name, done);
        }
    }

    Node::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::ResourcePath;

    fn path(s: &str) -> ResourcePath {
        ResourcePath::parse(s).unwrap()
    }

    /// GRANT|INSERT globally, SELECT on mydb.autogen, DELETE|DROP on two
    /// measurements and SELECT on yourdb.daily.
    fn role_a() -> PrivilegeTree {
        let mut tree = PrivilegeTree::new();
        tree.add_global(Privilege::GRANT | Privilege::INSERT);
        tree.add(&path("mydb.autogen"), Privilege::SELECT);
        tree.add(&path("mydb.autogen.cpu"), Privilege::DELETE | Privilege::DROP);
        tree.add(&path("mydb.autogen.mem"), Privilege::DELETE | Privilege::DROP);
        tree.add(&path("yourdb.daily"), Privilege::SELECT);
        tree
    }

    /// SHOW DATABASES|INSERT globally, SELECT on mydb.autogen, DELETE on
    /// yourdb.autogen.speed and INSERT revoked from yourdb.weekly.
    fn role_b() -> PrivilegeTree {
        let mut tree = PrivilegeTree::new();
        tree.add_global(Privilege::SHOW_DATABASES | Privilege::INSERT);
        tree.add(&path("mydb.autogen"), Privilege::SELECT);
        tree.add(&path("yourdb.autogen.speed"), Privilege::DELETE);
        tree.delete(&path("yourdb.weekly"), Privilege::INSERT);
        tree
    }

    #[test]
    fn test_union() {
        let mut tree = role_a();
        tree.union_with(&role_b());

        let cases = [
            ("", Privilege::GRANT | Privilege::INSERT | Privilege::SHOW_DATABASES, true),
            ("", Privilege::SELECT, false),
            ("mydb.autogen", Privilege::SELECT | Privilege::INSERT, true),
            ("mydb.autogen.cpu", Privilege::DELETE | Privilege::DROP | Privilege::SELECT, true),
            ("mydb.autogen.mem", Privilege::DELETE | Privilege::DROP, true),
            ("mydb.autogen.disk", Privilege::DELETE, false),
            ("yourdb.daily", Privilege::SELECT | Privilege::INSERT, true),
            ("yourdb.autogen.speed", Privilege::DELETE | Privilege::INSERT, true),
            ("yourdb.autogen", Privilege::DELETE, false),
            // Role A never revoked INSERT on yourdb.weekly.
            ("yourdb.weekly", Privilege::INSERT, true),
        ];
        for (resource, privilege, expected) in cases {
            assert_eq!(
                tree.contain(&path(resource), privilege),
                expected,
                "{resource:?} {privilege}"
            );
        }
        assert!(tree.global_contain(Privilege::SHOW_DATABASES));
    }

    #[test]
    fn test_difference() {
        let mut tree = role_a();
        tree.different_with(&role_b());

        let cases = [
            ("", Privilege::GRANT, true),
            ("", Privilege::INSERT, false),
            ("", Privilege::SHOW_DATABASES, false),
            ("mydb.autogen", Privilege::SELECT, false),
            ("mydb.autogen.cpu", Privilege::DELETE | Privilege::DROP, true),
            ("mydb.autogen.cpu", Privilege::SELECT, false),
            ("yourdb.daily", Privilege::SELECT, true),
            ("yourdb.daily", Privilege::INSERT, false),
            // B revoked INSERT here, so A's INSERT survives the subtraction.
            ("yourdb.weekly", Privilege::INSERT, true),
            ("yourdb.weekly.cpu", Privilege::INSERT, true),
            ("yourdb.autogen.speed", Privilege::DELETE, false),
        ];
        for (resource, privilege, expected) in cases {
            assert_eq!(
                tree.contain(&path(resource), privilege),
                expected,
                "{resource:?} {privilege}"
            );
        }
    }

    #[test]
    fn test_difference_with_self_is_powerless() {
        let mut tree = role_a();
        let copy = tree.clone();
        tree.different_with(&copy);
        assert!(tree.is_powerless());
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_union_with_self_is_identity() {
        let mut tree = role_a();
        let copy = tree.clone();
        tree.union_with(&copy);
        assert_eq!(tree, copy);
    }

    #[test]
    fn test_union_with_empty_is_identity() {
        let mut tree = role_b();
        tree.union_with(&PrivilegeTree::new());
        assert_eq!(tree, role_b());

        let mut empty = PrivilegeTree::new();
        empty.union_with(&role_b());
        assert_eq!(empty, role_b());
    }

    #[test]
    fn test_union_keeps_global_bits_at_root() {
        let mut a = PrivilegeTree::new();
        a.add_global(Privilege::AUDIT);
        a.delete(&path("db"), Privilege::SELECT);
        let mut b = PrivilegeTree::new();
        b.add(&path("db"), Privilege::SELECT);

        a.union_with(&b);
        assert!(a.contain(&path("db"), Privilege::AUDIT | Privilege::SELECT));
        assert!(a.global_contain(Privilege::AUDIT));
        assert!(!a.global_contain(Privilege::SELECT));
    }

    #[test]
    fn test_contains() {
        let mut big = PrivilegeTree::new();
        big.add_global(Privilege::SELECT | Privilege::GRANT);
        big.add(&path("db"), Privilege::INSERT);

        let mut small = PrivilegeTree::new();
        small.add(&path("db.rp"), Privilege::SELECT | Privilege::INSERT);

        assert!(big.contains(&small));
        assert!(!small.contains(&big));
        assert!(big.contains(&PrivilegeTree::new()));
        assert!(big.contains(&big.clone()));

        // Neither side changed.
        assert!(small.contain(&path("db.rp"), Privilege::SELECT));
        assert!(big.global_contain(Privilege::GRANT));
    }

    #[test]
    fn test_union_can_complete_legacy_group() {
        let mut a = PrivilegeTree::new();
        a.add_global(Privilege::SHOW_DATABASES | Privilege::CREATE_CQ);
        let mut b = PrivilegeTree::new();
        b.add_global(Privilege::SELECT);

        assert!(!a.contain(&path("db"), Privilege::READ));
        assert!(!b.contain(&path("db"), Privilege::READ));

        a.union_with(&b);
        assert_eq!(a.effective(&path("db")), Privilege::READ_GROUP);
        assert!(a.contain(&path("db"), Privilege::READ));
    }

    #[test]
    fn test_contains_agrees_with_difference() {
        let pairs = [
            (role_a(), role_b()),
            (role_b(), role_a()),
            (role_a(), role_a()),
            (PrivilegeTree::new(), role_b()),
            (role_b(), PrivilegeTree::new()),
        ];
        for (mine, theirs) in pairs {
            let mut uncovered = theirs.clone();
            uncovered.different_with(&mine);
            assert_eq!(mine.contains(&theirs), uncovered.is_powerless());
        }
    }

    #[test]
    fn test_contains_on_deep_trees() {
        let deep = ResourcePath::new((0..200_000).map(|i| format!("s{i}")));
        let mut theirs = PrivilegeTree::new();
        theirs.add(&deep, Privilege::SELECT);

        assert!(!PrivilegeTree::new().contains(&theirs));
        assert!(theirs.contains(&PrivilegeTree::new()));

        let mut mine = PrivilegeTree::new();
        mine.add_global(Privilege::SELECT);
        assert!(mine.contains(&theirs));
        assert!(!theirs.contains(&mine));
    }

    #[test]
    fn test_contains_sees_revocations() {
        let mut everywhere = PrivilegeTree::new();
        everywhere.add_global(Privilege::SELECT);

        let mut holey = everywhere.clone();
        holey.delete(&path("secret"), Privilege::SELECT);

        assert!(everywhere.contains(&holey));
        assert!(!holey.contains(&everywhere));
    }

    #[test]
    fn test_deep_union_does_not_recurse() {
        let deep = ResourcePath::new((0..20_000).map(|i| format!("s{i}")));
        let mut a = PrivilegeTree::new();
        a.add(&deep, Privilege::SELECT);
        let mut b = PrivilegeTree::new();
        b.add(&deep, Privilege::INSERT);

        a.union_with(&b);
        assert!(a.contain(&deep, Privilege::SELECT | Privilege::INSERT));

        let mut both = PrivilegeTree::new();
        both.add(&deep, Privilege::SELECT | Privilege::INSERT);
        assert_eq!(a, both);

        a.different_with(&both);
        assert_eq!(a.node_count(), 1);
    }
}
