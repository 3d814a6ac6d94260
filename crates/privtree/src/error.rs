//! Error types for the Authorizer.

use privtree_core::{CoreError, PathError};
use thiserror::Error;

/// Errors that can occur during Authorizer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    /// Privilege name or resource path could not be parsed.
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Resource path is deeper than the configured cap.
    #[error("resource path has {found} segments, at most {max} allowed")]
    InvalidSegmentCount { found: usize, max: usize },

    /// Raw mask carries bits no privilege is defined for.
    #[error("undefined privilege bits {0:#x}")]
    UnknownPrivilegeBits(u32),
}

impl From<PathError> for AuthzError {
    fn from(err: PathError) -> Self {
        Self::Core(err.into())
    }
}

/// Result type for Authorizer operations.
pub type Result<T> = std::result::Result<T, AuthzError>;
