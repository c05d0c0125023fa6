//! # lazy-sheets-xls
//!
//! XLS (BIFF8) reader for lazy-sheets.
//!
//! This crate handles the legacy Excel binary format (.xls): a compound
//! document whose `Workbook` stream holds BIFF8 records. Records are read
//! lazily; the cells of the active worksheet are indexed when the sheet is
//! first read.

pub mod biff;
pub mod error;
pub mod parser;
pub mod sheet;
pub mod workbook;

use std::path::Path;

use lazy_sheets_core::{ReadOptions, RowReader};

pub use error::{XlsError, XlsResult};
pub use parser::XlsParser;

/// Lazy row reader over an XLS workbook
pub type XlsReader = RowReader<XlsParser>;

/// Open an XLS workbook for reading.
pub fn open<P: AsRef<Path>>(path: P, read_options: ReadOptions) -> lazy_sheets_core::Result<XlsReader> {
    let parser = XlsParser::open(path.as_ref())?;
    Ok(RowReader::new(parser, read_options))
}

/// Whether `path` is a compound document with a workbook stream.
pub fn can_read<P: AsRef<Path>>(path: P) -> bool {
    parser::is_compound_workbook(path.as_ref())
}
