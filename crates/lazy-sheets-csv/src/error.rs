//! CSV error types

use std::path::PathBuf;

use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur while reading delimited text
#[derive(Debug, Error)]
pub enum CsvError {
    /// File missing or unreadable
    #[error("Could not open file [{}] for reading! File does not exist.", .0.display())]
    NotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Encoding label not known
    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] lazy_sheets_core::Error),
}

impl From<CsvError> for lazy_sheets_core::Error {
    fn from(err: CsvError) -> Self {
        use lazy_sheets_core::Error;

        match err {
            CsvError::NotFound(path) => Error::NotFound(path),
            CsvError::Io(e) => Error::Io(e),
            CsvError::Csv(e) => {
                let msg = e.to_string();
                match e.into_kind() {
                    csv::ErrorKind::Io(io) => Error::Io(io),
                    _ => Error::Parse(msg),
                }
            }
            CsvError::UnknownEncoding(label) => Error::Parse(format!("unknown encoding: {}", label)),
            CsvError::Core(e) => e,
        }
    }
}
