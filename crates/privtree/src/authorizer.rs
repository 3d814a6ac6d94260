//! The Authorizer: string-facing API over a [`PrivilegeTree`].
//!
//! The Authorizer owns one tree (typically one user's or one role's grants)
//! and turns text input into tree operations. Input is always fully parsed
//! before anything is mutated, so a rejected call leaves the tree untouched.

use privtree_core::{Privilege, PrivilegeTree, ResourcePath};

use crate::config::{AuthorizerConfig, UnknownBitPolicy};
use crate::error::{AuthzError, Result};

/// Grants, revokes and checks privileges for a single principal.
#[derive(Debug, Clone, Default)]
pub struct Authorizer {
    /// The privileges held.
    tree: PrivilegeTree,
    /// Configuration.
    config: AuthorizerConfig,
}

impl Authorizer {
    /// Create an authorizer that holds nothing.
    pub fn new(config: AuthorizerConfig) -> Self {
        Self::from_tree(PrivilegeTree::new(), config)
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: PrivilegeTree, config: AuthorizerConfig) -> Self {
        Self { tree, config }
    }

    /// Get the underlying tree.
    pub fn tree(&self) -> &PrivilegeTree {
        &self.tree
    }

    /// Give back the underlying tree.
    pub fn into_tree(self) -> PrivilegeTree {
        self.tree
    }

    /// Get the configuration.
    pub fn config(&self) -> &AuthorizerConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Parsing
    // ─────────────────────────────────────────────────────────────────────────

    /// Segment a dotted resource path and enforce the depth cap.
    pub fn parse_path(&self, text: &str) -> Result<ResourcePath> {
        let path = ResourcePath::parse_with(text, self.config.default_middle_segment.as_deref())?;
        if let Some(max) = self.config.max_segments {
            if path.len() > max {
                return Err(AuthzError::InvalidSegmentCount {
                    found: path.len(),
                    max,
                });
            }
        }
        Ok(path)
    }

    /// Resolve a comma-separated list of privilege names.
    pub fn parse_privileges(&self, text: &str) -> Result<Privilege> {
        Ok(Privilege::parse_list(text)?)
    }

    /// Turn a raw mask into a [`Privilege`], applying the configured
    /// [`UnknownBitPolicy`].
    ///
    /// The exact values of the two aggregates are accepted as they are.
    pub fn privilege_from_bits(&self, raw: u32) -> Result<Privilege> {
        for aggregate in [Privilege::ALL_GLOBAL, Privilege::ALL_RESOURCE] {
            if raw == aggregate.bits() {
                return Ok(aggregate);
            }
        }

        let unknown = Privilege::unknown_bits(raw);
        if unknown != 0 {
            match self.config.unknown_bits {
                UnknownBitPolicy::Reject => {
                    tracing::warn!(raw, unknown, "rejecting undefined privilege bits");
                    return Err(AuthzError::UnknownPrivilegeBits(unknown));
                }
                UnknownBitPolicy::Mask => {
                    tracing::warn!(raw, unknown, "masking undefined privilege bits");
                }
            }
        }
        Ok(Privilege::from_bits_truncate(raw))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Grant privileges on a resource. A blank path grants globally.
    pub fn grant(&mut self, path: &str, privileges: &str) -> Result<()> {
        let path = self.parse_path(path)?;
        let privileges = self.parse_privileges(privileges)?;
        self.apply_grant(&path, privileges);
        Ok(())
    }

    /// Revoke privileges from a resource. A blank path revokes globally.
    pub fn revoke(&mut self, path: &str, privileges: &str) -> Result<()> {
        let path = self.parse_path(path)?;
        let privileges = self.parse_privileges(privileges)?;
        self.apply_revoke(&path, privileges);
        Ok(())
    }

    /// Grant a raw mask on a resource.
    pub fn grant_bits(&mut self, path: &str, raw: u32) -> Result<()> {
        let path = self.parse_path(path)?;
        let privileges = self.privilege_from_bits(raw)?;
        self.apply_grant(&path, privileges);
        Ok(())
    }

    /// Revoke a raw mask from a resource.
    pub fn revoke_bits(&mut self, path: &str, raw: u32) -> Result<()> {
        let path = self.parse_path(path)?;
        let privileges = self.privilege_from_bits(raw)?;
        self.apply_revoke(&path, privileges);
        Ok(())
    }

    /// Grant every privilege everywhere.
    pub fn grant_all(&mut self) {
        tracing::info!("granting all privileges");
        self.tree.set_all();
    }

    /// Revoke every privilege everywhere.
    pub fn revoke_all(&mut self) {
        tracing::info!("revoking all privileges");
        self.tree.clear_all();
    }

    /// Add everything `other` holds.
    pub fn merge(&mut self, other: &PrivilegeTree) {
        self.tree.union_with(other);
        tracing::debug!(nodes = self.tree.node_count(), "merged privileges");
    }

    /// Remove everything `other` holds.
    pub fn subtract(&mut self, other: &PrivilegeTree) {
        self.tree.different_with(other);
        tracing::debug!(nodes = self.tree.node_count(), "subtracted privileges");
    }

    fn apply_grant(&mut self, path: &ResourcePath, privileges: Privilege) {
        if path.is_empty() {
            self.tree.add_global(privileges);
        } else {
            self.tree.add(path, privileges);
        }
        tracing::debug!(resource = %path, privileges = %privileges, "granted");
    }

    fn apply_revoke(&mut self, path: &ResourcePath, privileges: Privilege) {
        if path.is_empty() {
            self.tree.delete_global(privileges);
        } else {
            self.tree.delete(path, privileges);
        }
        tracing::debug!(resource = %path, privileges = %privileges, "revoked");
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────

    /// Whether all listed privileges are held on a resource.
    pub fn check(&self, path: &str, privileges: &str) -> Result<bool> {
        let path = self.parse_path(path)?;
        let privileges = self.parse_privileges(privileges)?;
        let allowed = self.tree.contain(&path, privileges);
        tracing::trace!(resource = %path, privileges = %privileges, allowed, "check");
        Ok(allowed)
    }

    /// Whether all listed privileges are held at the global scope.
    pub fn check_global(&self, privileges: &str) -> Result<bool> {
        let privileges = self.parse_privileges(privileges)?;
        let allowed = self.tree.global_contain(privileges);
        tracing::trace!(privileges = %privileges, allowed, "global check");
        Ok(allowed)
    }

    /// Whether this authorizer holds everything `other` holds.
    pub fn covers(&self, other: &PrivilegeTree) -> bool {
        self.tree.contains(other)
    }

    /// Debug rendering of the tree. Not a stable format.
    pub fn render(&self) -> String {
        self.tree.to_string()
    }
}
