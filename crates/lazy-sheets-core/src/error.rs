//! Error types for lazy-sheets-core

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced to callers of any reader.
///
/// Each format crate keeps its own error enum and converts into this one, so
/// callers can tell "wrong format" from "corrupt data" from "security
/// rejection" without knowing which reader produced the error.
#[derive(Debug, Error)]
pub enum Error {
    /// Path missing or unreadable
    #[error("Could not open file [{}] for reading! File does not exist.", .0.display())]
    NotFound(PathBuf),

    /// Extension or content does not match a known format
    #[error("Could not identify file format: {0}")]
    FormatUnrecognized(String),

    /// Archive unreadable, manifest missing/unparsable, or no office document
    #[error("Malformed container: {0}")]
    MalformedContainer(String),

    /// Entity/DOCTYPE declaration found in an XML stream
    #[error("Security check failed: {0}")]
    SecurityRejected(String),

    /// Seek target is not a positive row number
    #[error("Row {0} is invalid")]
    SeekInvalid(usize),

    /// Sheet index out of bounds
    #[error("Sheet index {0} out of bounds (count: {1})")]
    SheetOutOfBounds(usize, usize),

    /// Data inside a valid container could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a parse error with a message
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse(msg.into())
    }

    /// Whether the error means "this file is not in the expected format"
    /// rather than "the file is damaged".
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Error::FormatUnrecognized(_) | Error::MalformedContainer(_))
    }
}
