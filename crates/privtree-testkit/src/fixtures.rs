//! Test fixtures and helpers.
//!
//! Common setup code for unit and integration tests.

use privtree_core::{Privilege, PrivilegeTree, ResourcePath};

/// Parse a dotted path, panicking on malformed input.
pub fn path(text: &str) -> ResourcePath {
    ResourcePath::parse(text).unwrap_or_else(|e| panic!("bad fixture path {text:?}: {e}"))
}

/// Build a tree from `(path, privileges)` grants. A blank path grants
/// globally.
pub fn tree_with(grants: &[(&str, Privilege)]) -> PrivilegeTree {
    let mut tree = PrivilegeTree::new();
    for (resource, privileges) in grants {
        let resource = path(resource);
        if resource.is_empty() {
            tree.add_global(*privileges);
        } else {
            tree.add(&resource, *privileges);
        }
    }
    tree
}

/// An operator role: GRANT and INSERT everywhere, SELECT on `mydb.autogen`,
/// DELETE and DROP on two of its measurements, SELECT on `yourdb.daily`.
pub fn operator_role() -> PrivilegeTree {
    tree_with(&[
        ("", Privilege::GRANT | Privilege::INSERT),
        ("mydb.autogen", Privilege::SELECT),
        ("mydb.autogen.cpu", Privilege::DELETE | Privilege::DROP),
        ("mydb.autogen.mem", Privilege::DELETE | Privilege::DROP),
        ("yourdb.daily", Privilege::SELECT),
    ])
}

/// An analyst role: SHOW DATABASES and INSERT everywhere, SELECT on
/// `mydb.autogen`, DELETE on `yourdb.autogen.speed`, and INSERT revoked from
/// `yourdb.weekly`.
pub fn analyst_role() -> PrivilegeTree {
    let mut tree = tree_with(&[
        ("", Privilege::SHOW_DATABASES | Privilege::INSERT),
        ("mydb.autogen", Privilege::SELECT),
        ("yourdb.autogen.speed", Privilege::DELETE),
    ]);
    tree.delete(&path("yourdb.weekly"), Privilege::INSERT);
    tree
}

/// A tree whose only grant sits `depth` segments deep.
pub fn deep_tree(depth: usize, privileges: Privilege) -> (PrivilegeTree, ResourcePath) {
    let resource = ResourcePath::new((0..depth).map(|i| format!("s{i}")));
    let mut tree = PrivilegeTree::new();
    tree.add(&resource, privileges);
    (tree, resource)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_with_global_and_resource_grants() {
        let tree = tree_with(&[("", Privilege::AUDIT), ("db", Privilege::SELECT)]);
        assert!(tree.global_contain(Privilege::AUDIT));
        assert!(tree.contain(&path("db.rp"), Privilege::AUDIT | Privilege::SELECT));
        assert!(!tree.global_contain(Privilege::SELECT));
    }

    #[test]
    fn test_roles_differ() {
        let operator = operator_role();
        let analyst = analyst_role();
        assert!(!operator.contains(&analyst));
        assert!(!analyst.contains(&operator));
        assert!(analyst.contain(&path("yourdb.daily"), Privilege::INSERT));
        assert!(!analyst.contain(&path("yourdb.weekly"), Privilege::INSERT));
    }

    #[test]
    fn test_deep_tree() {
        let (tree, resource) = deep_tree(64, Privilege::DROP);
        assert_eq!(tree.depth(), 64);
        assert!(tree.contain(&resource, Privilege::DROP));
        assert!(!tree.contain(&resource.parent().unwrap(), Privilege::DROP));
    }
}
