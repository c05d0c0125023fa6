//! # lazy-sheets-xlsx
//!
//! Streaming XLSX (Office Open XML) reader for lazy-sheets.
//!
//! The package is opened once, its parts are extracted into a temporary
//! directory (removed on drop) and every worksheet is pre-scanned for its
//! dimensions. Rows are then streamed from the active worksheet and numeric
//! cells are rendered through the workbook's number formats.

pub mod error;
pub mod options;
pub mod package;
pub mod parser;
pub mod security;
pub mod shared_strings;
pub mod styles;
pub mod workbook;

mod escape;

use std::path::Path;

use lazy_sheets_core::{ReadOptions, RowReader};

pub use error::{XlsxError, XlsxResult};
pub use options::{XlsxOptions, SHARED_STRING_CACHE_LIMIT};
pub use parser::XlsxParser;

/// Lazy row reader over an XLSX workbook
pub type XlsxReader = RowReader<XlsxParser>;

/// Open an XLSX workbook for reading.
pub fn open<P: AsRef<Path>>(
    path: P,
    options: &XlsxOptions,
    read_options: ReadOptions,
) -> lazy_sheets_core::Result<XlsxReader> {
    let parser = XlsxParser::open(path.as_ref(), options)?;
    Ok(RowReader::new(parser, read_options))
}

/// Whether `path` is a readable XLSX package.
pub fn can_read<P: AsRef<Path>>(path: P) -> bool {
    package::is_package(path.as_ref())
}
