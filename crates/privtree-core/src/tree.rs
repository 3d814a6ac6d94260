//! The delta-encoded privilege tree.
//!
//! Every node stores a `delta`. The effective privilege at a resource path is
//! the XOR of the deltas from the root down to the deepest node that exists
//! on that path; deeper, missing segments inherit that value.
//!
//! ```text
//!   (root, GRANT|INSERT)            effective: GRANT|INSERT
//!     └─ mydb (SELECT)              effective: GRANT|INSERT|SELECT
//!          └─ autogen (SELECT)      effective: GRANT|INSERT
//!               └─ cpu (DELETE)     effective: GRANT|INSERT|DELETE
//! ```
//!
//! Invariants kept by every mutator:
//! - a node with no delta and no children never survives (pruning);
//! - non-root deltas only hold resource-scoped bits.
//!
//! With both invariants in place the encoding is canonical: two trees answer
//! every query identically exactly when they are structurally equal.

use std::collections::{btree_map, BTreeMap};
use std::fmt;
use std::mem;

use crate::path::{quote_ident, ResourcePath};
use crate::privilege::Privilege;

/// One node of a [`PrivilegeTree`]. Children are exclusively owned.
///
/// `Clone`, `PartialEq` and `Drop` are written by hand so that no trait walks
/// the tree through nested calls.
#[derive(Default)]
pub(crate) struct Node {
    pub(crate) delta: Privilege,
    pub(crate) children: BTreeMap<String, Node>,
}

impl Node {
    pub(crate) fn is_empty_leaf(&self) -> bool {
        self.delta.is_empty() && self.children.is_empty()
    }
}

struct CloneFrame<'a> {
    name: String,
    delta: Privilege,
    pending: btree_map::Iter<'a, String, Node>,
    kept: BTreeMap<String, Node>,
}

impl Clone for Node {
    fn clone(&self) -> Self {
        let mut stack = vec![CloneFrame {
            name: String::new(),
            delta: self.delta,
            pending: self.children.iter(),
            kept: BTreeMap::new(),
        }];

        while let Some(mut frame) = stack.pop() {
            if let Some((name, child)) = frame.pending.next() {
                stack.push(frame);
                stack.push(CloneFrame {
                    name: name.clone(),
                    delta: child.delta,
                    pending: child.children.iter(),
                    kept: BTreeMap::new(),
                });
                continue;
            }

            let copy = Node {
                delta: frame.delta,
                children: frame.kept,
            };
            let Some(parent) = stack.last_mut() else {
                return copy;
            };
            parent.kept.insert(frame.name, copy);
        }

        // The root frame always returns above.
        Node::default()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((a, b)) = stack.pop() {
            if a.delta != b.delta || a.children.len() != b.children.len() {
                return false;
            }
            for ((name_a, child_a), (name_b, child_b)) in a.children.iter().zip(&b.children) {
                if name_a != name_b {
                    return false;
                }
                stack.push((child_a, child_b));
            }
        }
        true
    }
}

impl Eq for Node {}

// Tear subtrees down level by level instead of through nested drops.
impl Drop for Node {
    fn drop(&mut self) {
        if self.children.is_empty() {
            return;
        }
        let mut stack = vec![mem::take(&mut self.children)];
        while let Some(children) = stack.pop() {
            for (_, mut child) in children {
                if !child.children.is_empty() {
                    stack.push(mem::take(&mut child.children));
                }
            }
        }
    }
}

/// Privileges granted over a hierarchy of named resources plus the global
/// scope.
///
/// Mutations need `&mut self`; concurrent readers should be handed clones.
/// Cloning, comparing and dropping work at any depth.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PrivilegeTree {
    pub(crate) root: Node,
}

impl PrivilegeTree {
    /// Create an empty tree with no privileges anywhere.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutators
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant every privilege everywhere.
    pub fn set_all(&mut self) {
        self.root = Node {
            delta: Privilege::ALL_GLOBAL,
            children: BTreeMap::new(),
        };
    }

    /// Revoke every privilege everywhere.
    pub fn clear_all(&mut self) {
        self.root = Node::default();
    }

    /// Grant privileges at the global scope.
    ///
    /// Overrides below the root are dropped for these bits so that every
    /// resource inherits the new global value.
    pub fn add_global(&mut self, privilege: Privilege) {
        self.root.delta |= privilege;
        sweep(&mut self.root, privilege);
    }

    /// Revoke privileges from the global scope and from every resource.
    pub fn delete_global(&mut self, privilege: Privilege) {
        self.root.delta -= privilege;
        sweep(&mut self.root, privilege);
    }

    /// Grant resource-scoped privileges on `resource` and everything below it.
    ///
    /// Global-only bits in `privilege` are ignored.
    pub fn add(&mut self, resource: &ResourcePath, privilege: Privilege) {
        let privilege = privilege.resource_scoped();
        let (target, path_sum) = self.descend_or_create(resource);

        // After this, path_sum ^ target.delta has every bit of `privilege` set.
        let want = privilege - path_sum;
        target.delta = (target.delta - privilege) | want;
        sweep(target, privilege);

        self.prune_path(resource);
    }

    /// Revoke resource-scoped privileges from `resource` and everything below
    /// it. Ancestors and siblings keep their privileges.
    pub fn delete(&mut self, resource: &ResourcePath, privilege: Privilege) {
        let privilege = privilege.resource_scoped();
        let (target, path_sum) = self.descend_or_create(resource);

        // After this, path_sum ^ target.delta has every bit of `privilege` clear.
        let want = path_sum & privilege;
        target.delta = (target.delta - privilege) | want;
        sweep(target, privilege);

        self.prune_path(resource);
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether `privilege` is held at the global scope.
    ///
    /// This says nothing about resources that override the global value.
    pub fn global_contain(&self, privilege: Privilege) -> bool {
        self.root.delta.satisfies(privilege)
    }

    /// Whether `privilege` is held on `resource`.
    pub fn contain(&self, resource: &ResourcePath, privilege: Privilege) -> bool {
        self.effective(resource).satisfies(privilege)
    }

    /// The effective privileges on `resource`, without legacy group expansion.
    pub fn effective(&self, resource: &ResourcePath) -> Privilege {
        let mut node = &self.root;
        let mut sum = node.delta;
        for segment in resource {
            match node.children.get(segment) {
                Some(child) => {
                    node = child;
                    sum ^= child.delta;
                }
                None => break,
            }
        }
        sum
    }

    /// Whether no privilege is held anywhere.
    pub fn is_powerless(&self) -> bool {
        self.nodes().all(|(_, node)| node.delta.is_empty())
    }

    /// Number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Length of the longest stored path.
    pub fn depth(&self) -> usize {
        self.nodes().map(|(depth, _)| depth).max().unwrap_or(0)
    }

    /// Every stored resource with its effective privileges, in depth-first
    /// order. The global scope comes first.
    pub fn entries(&self) -> Vec<(ResourcePath, Privilege)> {
        let mut out = Vec::new();
        let mut stack = vec![(ResourcePath::global(), &self.root, self.root.delta)];
        while let Some((path, node, effective)) = stack.pop() {
            for (name, child) in node.children.iter().rev() {
                stack.push((path.join(name.as_str()), child, effective ^ child.delta));
            }
            out.push((path, effective));
        }
        out
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    /// Walk to `resource`, creating missing nodes. Returns the target and the
    /// XOR of its ancestors' deltas.
    fn descend_or_create(&mut self, resource: &ResourcePath) -> (&mut Node, Privilege) {
        let mut node = &mut self.root;
        let mut path_sum = Privilege::NONE;
        for segment in resource {
            path_sum ^= node.delta;
            node = node.children.entry(segment.clone()).or_default();
        }
        (node, path_sum)
    }

    fn node_mut(&mut self, segments: &[String]) -> Option<&mut Node> {
        let mut node = &mut self.root;
        for segment in segments {
            node = node.children.get_mut(segment)?;
        }
        Some(node)
    }

    /// Drop empty leaves along `resource`, deepest first.
    fn prune_path(&mut self, resource: &ResourcePath) {
        let segments = resource.segments();
        for depth in (1..=segments.len()).rev() {
            let Some(parent) = self.node_mut(&segments[..depth - 1]) else {
                continue;
            };
            let segment = &segments[depth - 1];
            if !parent.children.get(segment).is_some_and(Node::is_empty_leaf) {
                break;
            }
            parent.children.remove(segment);
        }
    }

    /// Pre-order iterator over `(depth, node)`.
    fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: vec![(0, &self.root)],
        }
    }
}

struct Nodes<'a> {
    stack: Vec<(usize, &'a Node)>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = (usize, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.values().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

struct SweepFrame {
    name: String,
    delta: Privilege,
    pending: btree_map::IntoIter<String, Node>,
    kept: BTreeMap<String, Node>,
}

/// Clear `bits` from every descendant of `node` and drop the empty leaves
/// this leaves behind. `node` itself keeps its delta.
///
/// Runs on an explicit stack so tree depth never turns into call depth.
pub(crate) fn sweep(node: &mut Node, bits: Privilege) {
    let children = mem::take(&mut node.children);
    let mut stack = vec![SweepFrame {
        name: String::new(),
        delta: node.delta,
        pending: children.into_iter(),
        kept: BTreeMap::new(),
    }];

    while let Some(mut frame) = stack.pop() {
        if let Some((name, mut child)) = frame.pending.next() {
            child.delta -= bits;
            let grandchildren = mem::take(&mut child.children);
            stack.push(frame);
            stack.push(SweepFrame {
                name,
                delta: child.delta,
                pending: grandchildren.into_iter(),
                kept: BTreeMap::new(),
            });
            continue;
        }

        let Some(parent) = stack.last_mut() else {
            node.children = frame.kept;
            return;
        };
        let done = Node {
            delta: frame.delta,
            children: frame.kept,
        };
        if !done.is_empty_leaf() {
            parent.kept.insert(frame.name, done);
        }
    }
}

impl fmt::Debug for PrivilegeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PrivilegeTree")
            .field(&format_args!("{self}"))
            .finish()
    }
}

/// Debug-only breadth-first rendering.
///
/// Each floor is wrapped in `{}`, each group of siblings in `[]` and each node
/// is `(name,delta)`. The root has an empty name. Not a stable format.
impl fmt::Display for PrivilegeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut floor: Vec<Vec<(Option<&str>, &Node)>> = vec![vec![(None, &self.root)]];
        while !floor.is_empty() {
            let mut next = Vec::new();
            f.write_str("{")?;
            for group in &floor {
                f.write_str("[")?;
                for (name, node) in group {
                    let name = name.map(quote_ident).unwrap_or_default();
                    write!(f, "({},{})", name, node.delta.bits())?;
                    next.push(
                        node.children
                            .iter()
                            .map(|(name, child)| (Some(name.as_str()), child))
                            .collect(),
                    );
                }
                f.write_str("]")?;
            }
            f.write_str("}")?;
            floor = next;
        }
        Ok(())
    }
}
