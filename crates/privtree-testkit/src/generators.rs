//! Proptest generators for privtree types.

use privtree_core::{Privilege, PrivilegeTree, ResourcePath};
use proptest::prelude::*;

/// Segment names drawn by [`segment`].
pub const SEGMENTS: &[&str] = &["db0", "db1", "rp", "cpu", "mem"];

/// A segment name never produced by [`segment`], for probing inherited values.
pub const UNSEEN_SEGMENT: &str = "zz";

/// Deepest path produced by [`resource_path`].
pub const MAX_DEPTH: usize = 3;

/// Generate a segment from a small alphabet so that paths collide often.
pub fn segment() -> impl Strategy<Value = String> {
    prop::sample::select(SEGMENTS).prop_map(String::from)
}

/// Generate a resource path of 0 to [`MAX_DEPTH`] segments.
pub fn resource_path() -> impl Strategy<Value = ResourcePath> {
    prop::collection::vec(segment(), 0..=MAX_DEPTH).prop_map(ResourcePath::new)
}

/// Generate a mask of named resource-scoped privileges.
pub fn resource_mask() -> impl Strategy<Value = Privilege> {
    (0u32..=0x7F).prop_map(Privilege::from_bits_truncate)
}

/// Generate a mask of any named privileges.
pub fn any_mask() -> impl Strategy<Value = Privilege> {
    any::<u32>().prop_map(Privilege::from_bits_truncate)
}

/// A single tree mutation.
#[derive(Debug, Clone)]
pub enum Op {
    AddGlobal(Privilege),
    DeleteGlobal(Privilege),
    Add(ResourcePath, Privilege),
    Delete(ResourcePath, Privilege),
}

impl Op {
    /// Apply this mutation to `tree`.
    pub fn apply(&self, tree: &mut PrivilegeTree) {
        match self {
            Op::AddGlobal(p) => tree.add_global(*p),
            Op::DeleteGlobal(p) => tree.delete_global(*p),
            Op::Add(path, p) => tree.add(path, *p),
            Op::Delete(path, p) => tree.delete(path, *p),
        }
    }
}

impl Arbitrary for Op {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            1 => any_mask().prop_map(Op::AddGlobal),
            1 => any_mask().prop_map(Op::DeleteGlobal),
            3 => (resource_path(), resource_mask()).prop_map(|(path, p)| Op::Add(path, p)),
            3 => (resource_path(), resource_mask()).prop_map(|(path, p)| Op::Delete(path, p)),
        ]
        .boxed()
    }
}

/// Generate a sequence of up to `max_ops` mutations.
pub fn ops(max_ops: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(any::<Op>(), 0..=max_ops)
}

/// Build a tree by applying `ops` to an empty tree.
pub fn tree_from_ops(ops: &[Op]) -> PrivilegeTree {
    let mut tree = PrivilegeTree::new();
    for op in ops {
        op.apply(&mut tree);
    }
    tree
}

/// Generate a tree built from up to 16 mutations.
pub fn privilege_tree() -> impl Strategy<Value = PrivilegeTree> {
    ops(16).prop_map(|ops| tree_from_ops(&ops))
}

/// Every path of up to [`MAX_DEPTH`] + 1 segments over [`SEGMENTS`] and
/// [`UNSEEN_SEGMENT`].
///
/// Any two trees built from generated paths differ, if at all, on one of
/// these paths.
pub fn path_universe() -> Vec<ResourcePath> {
    let alphabet: Vec<&str> = SEGMENTS
        .iter()
        .copied()
        .chain(std::iter::once(UNSEEN_SEGMENT))
        .collect();

    let mut universe = vec![ResourcePath::global()];
    let mut frontier = vec![ResourcePath::global()];
    for _ in 0..=MAX_DEPTH {
        let next: Vec<ResourcePath> = frontier
            .iter()
            .flat_map(|path| alphabet.iter().map(move |seg| path.join(*seg)))
            .collect();
        universe.extend(next.iter().cloned());
        frontier = next;
    }
    universe
}

/// Whether `path` is `prefix` or lies below it.
pub fn is_under(path: &ResourcePath, prefix: &ResourcePath) -> bool {
    path.segments().starts_with(prefix.segments())
}
