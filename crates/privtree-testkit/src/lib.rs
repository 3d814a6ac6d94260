//! # Privtree Testkit
//!
//! Testing utilities for privtree.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Scenario vectors**: Fixed grant/revoke sequences with expected answers
//! - **Generators**: Proptest strategies for property-based testing
//! - **Fixtures**: Helper functions for setting up test trees
//!
//! ## Scenario Vectors
//!
//! ```rust
//! use privtree_testkit::vectors::verify_all_scenarios;
//!
//! for (name, passed, detail) in verify_all_scenarios() {
//!     assert!(passed, "{name}: {detail}");
//! }
//! ```
//!
//! ## Property Testing
//!
//! Use the generators with proptest:
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use privtree_testkit::generators::{path_universe, privilege_tree};
//!
//! proptest! {
//!     #[test]
//!     fn union_is_pointwise_or(a in privilege_tree(), b in privilege_tree()) {
//!         let mut merged = a.clone();
//!         merged.union_with(&b);
//!         for q in path_universe() {
//!             prop_assert_eq!(merged.effective(&q), a.effective(&q) | b.effective(&q));
//!         }
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use privtree_testkit::fixtures::{operator_role, path};
//! use privtree_core::Privilege;
//!
//! let tree = operator_role();
//! assert!(tree.contain(&path("mydb.autogen.cpu"), Privilege::DROP));
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{analyst_role, deep_tree, operator_role, path, tree_with};
pub use generators::{path_universe, privilege_tree, tree_from_ops, Op};
pub use vectors::{all_scenarios, verify_all_scenarios, Scenario, Step};
