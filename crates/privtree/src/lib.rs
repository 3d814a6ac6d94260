//! # Privtree
//!
//! Hierarchical privileges for a database-like resource tree: grant and
//! revoke privileges globally or on any resource, and answer whether a
//! principal holds a set of privileges on a resource.
//!
//! ## Overview
//!
//! - **Privileges**: A bitmask of resource-scoped and global-only privileges
//! - **Resource paths**: Dotted paths such as `db.rp.measurement`
//! - **Inheritance**: A grant on a resource applies to everything below it,
//!   unless a deeper grant or revoke overrides it
//! - **Algebra**: Trees of different roles can be merged, subtracted and
//!   compared for containment
//!
//! ## Usage
//!
//! ```rust
//! use privtree::{Authorizer, AuthorizerConfig};
//!
//! let mut authz = Authorizer::new(AuthorizerConfig::default());
//!
//! // Everything may be read, one measurement may be written
//! authz.grant("", "select").unwrap();
//! authz.grant("mydb..cpu", "insert").unwrap();
//!
//! assert!(authz.check("mydb.autogen.cpu", "select, insert").unwrap());
//! assert!(!authz.check("mydb.autogen.mem", "insert").unwrap());
//!
//! // Revoking on a database hides it from every measurement below
//! authz.revoke("mydb", "select").unwrap();
//! assert!(!authz.check("mydb.autogen.cpu", "select").unwrap());
//! assert!(authz.check("otherdb", "select").unwrap());
//! ```
//!
//! ## Re-exports
//!
//! - `privtree::core` - Core primitives (Privilege, ResourcePath, PrivilegeTree)

pub mod authorizer;
pub mod config;
pub mod error;

// Re-export component crates
pub use privtree_core as core;

// Re-export main types for convenience
pub use authorizer::Authorizer;
pub use config::{AuthorizerConfig, UnknownBitPolicy};
pub use error::{AuthzError, Result};

// Re-export commonly used core types
pub use privtree_core::{CoreError, PathError, Privilege, PrivilegeTree, ResourcePath};
