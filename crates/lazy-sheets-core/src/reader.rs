//! The uniform reader surface

use crate::cursor::{CursorState, RowReader};
use crate::error::{Error, Result};
use crate::sheet::SheetInfo;
use crate::source::RowSource;
use crate::Row;

/// Uniform, object-safe surface over every format reader.
///
/// Positions are 0-based; `seek` takes a 1-based row number.
pub trait SheetReader {
    /// The current row, if the cursor is on one
    fn current(&self) -> Option<&Row>;

    /// Move to the next row. An unstarted reader moves to the first row; an
    /// exhausted reader stays exhausted.
    fn advance(&mut self) -> Result<()>;

    /// 0-based position of the current row
    fn position(&self) -> Option<usize>;

    /// Whether the cursor is on a row
    fn is_valid(&self) -> bool {
        self.current().is_some()
    }

    /// Restart from the first row of the active sheet
    fn rewind(&mut self) -> Result<()>;

    /// Move to 1-based row `n`.
    ///
    /// Seeking past the end leaves the reader exhausted without an error;
    /// `n == 0` fails with [`Error::SeekInvalid`] and leaves the cursor alone.
    fn seek(&mut self, n: usize) -> Result<()>;

    /// Number of rows in the active sheet under the current limits.
    ///
    /// Workbook readers report the pre-scanned row total clamped to the row
    /// limit, empty rows included whatever the empty-cell policy. Delimited
    /// text counts in a separate pass that skips empty rows when empty cells
    /// are not read, so it matches the rows the cursor yields.
    fn count(&mut self) -> Result<usize> {
        Ok(self.dimensions()?.0)
    }

    /// `(rows, columns)` of the active sheet under the current limits
    fn dimensions(&mut self) -> Result<(usize, usize)>;

    /// All sheets of the file
    fn sheets(&mut self) -> Result<Vec<SheetInfo>>;

    /// One sheet by 0-based index
    fn sheet(&mut self, index: usize) -> Result<SheetInfo> {
        let mut sheets = self.sheets()?;
        let count = sheets.len();
        if index >= count {
            return Err(Error::SheetOutOfBounds(index, count));
        }
        Ok(sheets.swap_remove(index))
    }

    /// 0-based index of the active sheet
    fn sheet_index(&self) -> usize;

    /// Make another sheet active; the sequence starts over on the next pull
    fn set_sheet_index(&mut self, index: usize) -> Result<()>;

    /// Stop after `limit` yielded rows (`None` = unlimited)
    fn set_row_limit(&mut self, limit: Option<usize>);

    /// Drop cells past `limit` columns (`None` = unlimited)
    fn set_column_limit(&mut self, limit: Option<usize>);

    /// Whether rows made only of empty cells are yielded
    fn set_read_empty_cells(&mut self, read: bool);

    /// Iterate over the rows from the start of the active sheet
    fn rows(&mut self) -> Rows<'_, Self>
    where
        Self: Sized,
    {
        Rows::new(self)
    }
}

impl<S: RowSource> SheetReader for RowReader<S> {
    fn current(&self) -> Option<&Row> {
        match &self.state {
            CursorState::Active { row, .. } => Some(row),
            _ => None,
        }
    }

    fn advance(&mut self) -> Result<()> {
        match self.state {
            CursorState::Unstarted => self.restart(),
            CursorState::Active { position, .. } => self.step(position + 1),
            CursorState::Exhausted => Ok(()),
        }
    }

    fn position(&self) -> Option<usize> {
        match self.state {
            CursorState::Active { position, .. } => Some(position),
            _ => None,
        }
    }

    fn rewind(&mut self) -> Result<()> {
        self.restart()
    }

    fn seek(&mut self, n: usize) -> Result<()> {
        if n == 0 {
            return Err(Error::SeekInvalid(n));
        }
        let target = n - 1;

        let restart = match self.position() {
            None => true,
            Some(position) => n == 1 || target < position,
        };
        if restart {
            self.restart()?;
        }

        while let Some(position) = self.position() {
            if position >= target {
                break;
            }
            self.step(position + 1)?;
        }
        Ok(())
    }

    fn dimensions(&mut self) -> Result<(usize, usize)> {
        if let Some(dimensions) = self.dimensions {
            return Ok(dimensions);
        }
        let dimensions = self.source.dimensions(&self.options)?;
        self.dimensions = Some(dimensions);
        Ok(dimensions)
    }

    fn sheets(&mut self) -> Result<Vec<SheetInfo>> {
        self.source.sheets()
    }

    fn sheet_index(&self) -> usize {
        self.source.sheet_index()
    }

    fn set_sheet_index(&mut self, index: usize) -> Result<()> {
        if index == self.source.sheet_index() {
            return Ok(());
        }

        let count = self.source.sheets()?.len();
        if index >= count {
            return Err(Error::SheetOutOfBounds(index, count));
        }

        log::debug!("switching to sheet {}", index);
        self.source.set_sheet_index(index)?;
        self.dimensions = None;
        self.state = CursorState::Unstarted;
        self.yielded = 0;
        Ok(())
    }

    fn set_row_limit(&mut self, limit: Option<usize>) {
        self.options.row_limit = limit;
        self.dimensions = None;
    }

    fn set_column_limit(&mut self, limit: Option<usize>) {
        self.options.column_limit = limit;
        self.dimensions = None;
    }

    fn set_read_empty_cells(&mut self, read: bool) {
        self.options.read_empty_cells = read;
        self.dimensions = None;
    }
}

/// Iterator over the rows of a reader, starting with a rewind.
pub struct Rows<'a, R: ?Sized> {
    reader: &'a mut R,
    started: bool,
    failed: bool,
}

impl<'a, R: SheetReader + ?Sized> Rows<'a, R> {
    /// Iterate over `reader`, which is rewound on the first call to `next`
    pub fn new(reader: &'a mut R) -> Self {
        Self {
            reader,
            started: false,
            failed: false,
        }
    }
}

impl<R: SheetReader + ?Sized> Iterator for Rows<'_, R> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let moved = if self.started {
            self.reader.advance()
        } else {
            self.started = true;
            self.reader.rewind()
        };

        match moved {
            Ok(()) => self.reader.current().cloned().map(Ok),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
