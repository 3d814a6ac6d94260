//! Error types for privtree core.

use thiserror::Error;

/// Core errors raised while turning text into privileges or resource paths.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("unknown privilege '{0}'")]
    UnknownPrivilegeName(String),

    #[error("malformed resource path: {0}")]
    MalformedResourcePath(#[from] PathError),
}

/// Segmentation errors for dotted resource path text.
///
/// Positions are 1-based and count characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("found {found}, expected {expected} at line {line}, char {char}")]
    Unexpected {
        found: String,
        expected: String,
        line: usize,
        char: usize,
    },

    #[error("unterminated quoted identifier at line {line}, char {char}")]
    UnterminatedQuote { line: usize, char: usize },

    #[error("bad escape sequence \\{escape} at line {line}, char {char}")]
    BadEscape {
        escape: char,
        line: usize,
        char: usize,
    },

    #[error("blank segment at position {index} of a {count}-segment path")]
    BlankSegment { index: usize, count: usize },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
