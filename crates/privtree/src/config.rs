//! Authorizer configuration.

use privtree_core::DEFAULT_MIDDLE_SEGMENT;
use serde::{Deserialize, Serialize};

/// What to do with raw masks that carry undefined bits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownBitPolicy {
    /// Drop the undefined bits and log a warning.
    #[default]
    Mask,
    /// Fail with [`AuthzError::UnknownPrivilegeBits`](crate::AuthzError::UnknownPrivilegeBits).
    Reject,
}

/// Configuration for the Authorizer.
///
/// Missing fields take their default when deserialized, so the struct can sit
/// inside a larger host configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizerConfig {
    /// Deepest resource path accepted. `None` disables the cap.
    pub max_segments: Option<usize>,
    /// Replacement for a blank middle segment in `a..c`. `None` rejects it.
    pub default_middle_segment: Option<String>,
    /// Handling of undefined bits in raw masks.
    pub unknown_bits: UnknownBitPolicy,
}

impl Default for AuthorizerConfig {
    fn default() -> Self {
        Self {
            max_segments: Some(3),
            default_middle_segment: Some(DEFAULT_MIDDLE_SEGMENT.to_string()),
            unknown_bits: UnknownBitPolicy::Mask,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AuthorizerConfig::default();
        assert_eq!(config.max_segments, Some(3));
        assert_eq!(config.default_middle_segment.as_deref(), Some("autogen"));
        assert_eq!(config.unknown_bits, UnknownBitPolicy::Mask);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: AuthorizerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AuthorizerConfig::default());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{ "max_segments": null, "unknown_bits": "reject" }"#;
        let config: AuthorizerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.max_segments, None);
        assert_eq!(config.unknown_bits, UnknownBitPolicy::Reject);
        assert_eq!(config.default_middle_segment.as_deref(), Some("autogen"));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AuthorizerConfig {
            max_segments: Some(5),
            default_middle_segment: None,
            unknown_bits: UnknownBitPolicy::Reject,
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(r#""unknown_bits":"reject""#));
        let back: AuthorizerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_unknown_policy_rejected() {
        let json = r#"{ "unknown_bits": "ignore" }"#;
        assert!(serde_json::from_str::<AuthorizerConfig>(json).is_err());
    }
}
