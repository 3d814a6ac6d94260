//! # Privtree Core
//!
//! Pure primitives for hierarchical privileges: the privilege bitmask, dotted
//! resource paths and the delta-encoded privilege tree.
//!
//! This crate does no I/O and keeps no global state. Every operation is plain
//! computation over owned values.
//!
//! ## Key Types
//!
//! - [`Privilege`] - Bitmask of resource-scoped and global-only privileges
//! - [`ResourcePath`] - Ordered resource segments such as `db.rp.measurement`
//! - [`PrivilegeTree`] - Per-resource grants with inheritance and overrides
//!
//! ## Tree Algebra
//!
//! Trees can be merged, subtracted and compared for containment. See
//! [`PrivilegeTree::union_with`], [`PrivilegeTree::different_with`] and
//! [`PrivilegeTree::contains`].

mod algebra;
pub mod error;
pub mod path;
pub mod privilege;
pub mod tree;

pub use error::{CoreError, PathError, Result};
pub use path::{quote_ident, ResourcePath, DEFAULT_MIDDLE_SEGMENT};
pub use privilege::Privilege;
pub use tree::PrivilegeTree;
