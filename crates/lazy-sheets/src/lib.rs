//! # lazy-sheets
//!
//! Memory-bounded, lazy row reading for spreadsheets.
//!
//! Rows are produced one at a time from XLSX, XLS and delimited-text files,
//! with every cell rendered the way a spreadsheet application displays it
//! (dates, percentages, currency, fractions, scientific notation).
//!
//! ## Features
//!
//! - XLSX: streamed worksheets, bounded shared-string cache, number formats
//! - XLS: BIFF8 workbooks (the `xls` feature, on by default)
//! - CSV: byte-order-mark, `sep=` line and UTF-8/GBK detection
//! - Row and column limits, empty-row skipping, seeking by row number
//!
//! ## Example
//!
//! ```rust,no_run
//! use lazy_sheets::prelude::*;
//!
//! let mut reader = load("report.xlsx").unwrap();
//! for sheet in reader.sheets().unwrap() {
//!     println!("{}: {} rows", sheet.name, sheet.total_rows);
//! }
//!
//! reader.set_column_limit(Some(5));
//! for row in reader.rows() {
//!     println!("{:?}", row.unwrap());
//! }
//! ```

pub mod format;
pub mod load;
pub mod prelude;
pub mod reader;

pub use format::Format;
pub use load::{can_read, load, LoadOptions};
pub use reader::Reader;

// Re-export core types
pub use lazy_sheets_core::{
    column_to_letters, letters_to_column, CursorState, Error, ReadOptions, Result, Row,
    RowReader, RowSource, SheetInfo, SheetReader,
};

// Re-export format types
pub use lazy_sheets_format::{DateSystem, FormatInterpreter, FormatSettings};

// Re-export readers
pub use lazy_sheets_csv::{CsvOptions, CsvParser, CsvReader};
#[cfg(feature = "xls")]
pub use lazy_sheets_xls::{XlsParser, XlsReader};
pub use lazy_sheets_xlsx::{XlsxOptions, XlsxParser, XlsxReader};
