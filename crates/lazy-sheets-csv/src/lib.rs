//! # lazy-sheets-csv
//!
//! Streaming delimited-text reader for lazy-sheets.
//!
//! The encoding is taken from a byte-order mark (UTF-8, UTF-16, UTF-32), an
//! explicit label, or a UTF-8/GBK check of the first line. A first line of the
//! form `sep=X` sets the delimiter and is not returned as data. Values are
//! returned as text.

pub mod decode;
pub mod detect;
pub mod error;
pub mod options;
pub mod parser;

use std::path::Path;

use lazy_sheets_core::{ReadOptions, RowReader};

pub use detect::TextEncoding;
pub use error::{CsvError, CsvResult};
pub use options::CsvOptions;
pub use parser::CsvParser;

/// Lazy row reader over a delimited text file
pub type CsvReader = RowReader<CsvParser>;

/// Open a delimited text file for reading.
pub fn open<P: AsRef<Path>>(
    path: P,
    options: CsvOptions,
    read_options: ReadOptions,
) -> lazy_sheets_core::Result<CsvReader> {
    let parser = CsvParser::open(path.as_ref(), options)?;
    Ok(RowReader::new(parser, read_options))
}

/// Whether `path` is a readable file.
///
/// Any readable file is accepted; there is no signature to check.
pub fn can_read<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    path.is_file() && std::fs::File::open(path).is_ok()
}
