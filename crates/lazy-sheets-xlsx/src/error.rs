//! XLSX error types

use std::path::PathBuf;

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while reading an XLSX package
#[derive(Debug, Error)]
pub enum XlsxError {
    /// File missing or unreadable
    #[error("Could not open file [{}] for reading! File does not exist.", .0.display())]
    NotFound(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Not an Office Open XML spreadsheet
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// Missing required part
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// DOCTYPE declaration in a package part
    #[error("Detected use of ENTITY in {0}, load aborted to prevent XXE/XEE attacks")]
    Security(String),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] lazy_sheets_core::Error),
}

impl From<XlsxError> for lazy_sheets_core::Error {
    fn from(err: XlsxError) -> Self {
        use lazy_sheets_core::Error;

        match err {
            XlsxError::NotFound(path) => Error::NotFound(path),
            XlsxError::Io(e) => Error::Io(e),
            XlsxError::Zip(e) => Error::MalformedContainer(e.to_string()),
            XlsxError::InvalidFormat(msg) => Error::MalformedContainer(msg),
            XlsxError::MissingPart(part) => {
                Error::MalformedContainer(format!("missing part {}", part))
            }
            XlsxError::Security(part) => Error::SecurityRejected(format!(
                "DOCTYPE declaration in {}, load aborted to prevent XXE/XEE attacks",
                part
            )),
            XlsxError::Xml(e) => Error::Parse(e.to_string()),
            XlsxError::Parse(msg) => Error::Parse(msg),
            XlsxError::Core(e) => e,
        }
    }
}
