//! # lazy-sheets-core
//!
//! Shared types and the row-iteration protocol for lazy-sheets.
//!
//! Every format reader (XLSX, XLS, CSV) implements [`RowSource`], a forward-only
//! producer of raw rows. [`RowReader`] wraps a source with the cursor state
//! machine that provides `current`/`advance`/`rewind`/`seek`, row and column
//! limits, and empty-row skipping. The [`SheetReader`] trait is the uniform,
//! object-safe surface callers program against.
//!
//! ## Example
//!
//! ```rust
//! use lazy_sheets_core::{ReadOptions, Result, Row, RowReader, RowSource, SheetInfo, SheetReader};
//!
//! struct Numbers {
//!     next: usize,
//! }
//!
//! impl RowSource for Numbers {
//!     fn restart(&mut self) -> Result<()> {
//!         self.next = 0;
//!         Ok(())
//!     }
//!
//!     fn next_row(&mut self, _column_limit: Option<usize>) -> Result<Option<Row>> {
//!         self.next += 1;
//!         Ok((self.next <= 3).then(|| vec![self.next.to_string()]))
//!     }
//!
//!     fn sheets(&mut self) -> Result<Vec<SheetInfo>> {
//!         Ok(vec![SheetInfo::new("Numbers", 1, 3, 1)])
//!     }
//!
//!     fn sheet_index(&self) -> usize {
//!         0
//!     }
//!
//!     fn set_sheet_index(&mut self, _index: usize) -> Result<()> {
//!         Ok(())
//!     }
//! }
//!
//! let mut reader = RowReader::new(Numbers { next: 0 }, ReadOptions::default());
//! reader.seek(2).unwrap();
//! assert_eq!(reader.current(), Some(&vec!["2".to_string()]));
//! ```

pub mod cursor;
pub mod error;
pub mod options;
pub mod reader;
pub mod sheet;
pub mod source;

pub use cursor::{CursorState, RowReader};
pub use error::{Error, Result};
pub use options::ReadOptions;
pub use reader::{Rows, SheetReader};
pub use sheet::{column_index_from_ref, column_to_letters, letters_to_column, SheetInfo};
pub use source::RowSource;

/// One row of display-ready cell values.
pub type Row = Vec<String>;
