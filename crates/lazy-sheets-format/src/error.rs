//! Error types for lazy-sheets-format

use thiserror::Error;

/// Result type alias using [`FormatError`]
pub type Result<T> = std::result::Result<T, FormatError>;

/// Problems with a format code.
///
/// These never reach callers of a reader: the interpreter logs them and falls
/// back to the unformatted value.
#[derive(Debug, Error)]
pub enum FormatError {
    /// Format code could not be understood
    #[error("Malformed format code {code:?}: {reason}")]
    Malformed { code: String, reason: String },

    /// Value cannot be rendered with an otherwise valid code
    #[error("Cannot render {value} with format code {code:?}")]
    OutOfRange { code: String, value: f64 },
}

impl FormatError {
    /// Create a malformed-code error
    pub fn malformed<C: Into<String>, R: Into<String>>(code: C, reason: R) -> Self {
        FormatError::Malformed {
            code: code.into(),
            reason: reason.into(),
        }
    }
}
