//! XLS error types

use std::path::PathBuf;

use thiserror::Error;

/// Result type for XLS operations
pub type XlsResult<T> = std::result::Result<T, XlsError>;

/// Errors that can occur while reading an XLS file
#[derive(Debug, Error)]
pub enum XlsError {
    /// File missing or unreadable
    #[error("Could not open file [{}] for reading! File does not exist.", .0.display())]
    NotFound(PathBuf),

    /// IO error (also covers CFB errors which use std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid file format
    #[error("Invalid XLS format: {0}")]
    InvalidFormat(String),

    /// Unsupported version
    #[error("Unsupported XLS version: {0}")]
    UnsupportedVersion(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] lazy_sheets_core::Error),
}

impl From<XlsError> for lazy_sheets_core::Error {
    fn from(err: XlsError) -> Self {
        use lazy_sheets_core::Error;

        match err {
            XlsError::NotFound(path) => Error::NotFound(path),
            XlsError::Io(e) => Error::Io(e),
            XlsError::InvalidFormat(msg) => Error::MalformedContainer(msg),
            XlsError::UnsupportedVersion(msg) => {
                Error::MalformedContainer(format!("unsupported version: {}", msg))
            }
            XlsError::Parse(msg) => Error::Parse(msg),
            XlsError::Core(e) => e,
        }
    }
}
