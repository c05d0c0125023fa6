//! The per-format row producer

use crate::error::Result;
use crate::options::ReadOptions;
use crate::sheet::SheetInfo;
use crate::Row;

/// A forward-only producer of raw rows for the active sheet.
///
/// Implementations only know how to start over and pull the next row; limits,
/// padding, empty-row skipping and positions are handled by
/// [`RowReader`](crate::RowReader).
pub trait RowSource {
    /// Reposition the underlying stream at the first row of the active sheet.
    fn restart(&mut self) -> Result<()>;

    /// Produce the next row of the active sheet, or `None` at the end.
    ///
    /// `column_limit` is a hint: sources may stop decoding cells past it.
    /// Sparse rows must have their gaps filled with empty strings up to the
    /// last populated column.
    fn next_row(&mut self, column_limit: Option<usize>) -> Result<Option<Row>>;

    /// Sheets of the underlying file in caller-visible order.
    fn sheets(&mut self) -> Result<Vec<SheetInfo>>;

    /// 0-based index of the active sheet.
    fn sheet_index(&self) -> usize;

    /// Make another sheet active. The caller restarts the sequence afterwards.
    fn set_sheet_index(&mut self, index: usize) -> Result<()>;

    /// Rows and columns of the active sheet as seen through `options`.
    ///
    /// The default uses the pre-scanned [`SheetInfo`] clamped to the limits
    /// and ignores `read_empty_cells`. Sources that stream to count override
    /// it to apply the empty-row policy.
    fn dimensions(&mut self, options: &ReadOptions) -> Result<(usize, usize)> {
        let index = self.sheet_index();
        let sheets = self.sheets()?;
        Ok(sheets
            .get(index)
            .map(|info| options.clamp(info.total_rows, info.total_columns))
            .unwrap_or((0, 0)))
    }
}
