//! The lazy row cursor shared by every format.
//!
//! `RowReader` is an explicit state machine rather than an iterator adaptor:
//! `seek` has to look at the current position and restart the underlying
//! stream, which a one-shot iterator cannot do.

use crate::error::Result;
use crate::options::ReadOptions;
use crate::source::RowSource;
use crate::Row;

/// Where the cursor stands in the row sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorState {
    /// No row has been pulled since the reader was created or reconfigured
    Unstarted,
    /// `row` is the current row at 0-based `position`
    Active { position: usize, row: Row },
    /// The sequence has ended (end of sheet, row limit, or a failed pull)
    Exhausted,
}

/// Lazy row sequence over a [`RowSource`].
///
/// Positions count emitted rows: with empty rows skipped, two readers over
/// the same file can report different positions for the same underlying row.
#[derive(Debug)]
pub struct RowReader<S> {
    pub(crate) source: S,
    pub(crate) options: ReadOptions,
    pub(crate) state: CursorState,
    /// Rows yielded since the last restart (drives the row limit)
    pub(crate) yielded: usize,
    /// Cached `(rows, columns)` for the active sheet under current options
    pub(crate) dimensions: Option<(usize, usize)>,
}

impl<S: RowSource> RowReader<S> {
    /// Wrap a source. The sequence starts on the first `rewind`, `advance`
    /// or `seek`.
    pub fn new(source: S, options: ReadOptions) -> Self {
        Self {
            source,
            options,
            state: CursorState::Unstarted,
            yielded: 0,
            dimensions: None,
        }
    }

    /// The underlying source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the underlying source (format-specific settings).
    ///
    /// Settings that change how rows are produced take effect on the next
    /// `rewind`.
    pub fn source_mut(&mut self) -> &mut S {
        self.dimensions = None;
        &mut self.source
    }

    /// Consume the reader, returning the source
    pub fn into_source(self) -> S {
        self.source
    }

    /// Current options
    pub fn options(&self) -> &ReadOptions {
        &self.options
    }

    /// Current cursor state
    pub fn state(&self) -> &CursorState {
        &self.state
    }

    /// Restart the source and move to the first qualifying row.
    pub(crate) fn restart(&mut self) -> Result<()> {
        self.state = CursorState::Unstarted;
        self.yielded = 0;
        self.source.restart()?;
        self.step(0)
    }

    /// Pull one row into `position`, or move to `Exhausted`.
    pub(crate) fn step(&mut self, position: usize) -> Result<()> {
        match self.pull() {
            Ok(Some(row)) => {
                self.state = CursorState::Active { position, row };
                Ok(())
            }
            Ok(None) => {
                log::trace!("row sequence exhausted after {} rows", self.yielded);
                self.state = CursorState::Exhausted;
                Ok(())
            }
            Err(e) => {
                self.state = CursorState::Exhausted;
                Err(e)
            }
        }
    }

    /// Pull the next row that passes the limits and the empty-row policy.
    fn pull(&mut self) -> Result<Option<Row>> {
        loop {
            if let Some(limit) = self.options.row_limit {
                if self.yielded >= limit {
                    return Ok(None);
                }
            }

            let column_limit = self.options.column_limit;
            let mut row = match self.source.next_row(column_limit)? {
                Some(row) => row,
                None => return Ok(None),
            };

            if let Some(limit) = column_limit {
                row.truncate(limit);
                if self.options.read_empty_cells {
                    row.resize(limit, String::new());
                }
            }

            if !self.options.read_empty_cells && row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }

            self.yielded += 1;
            return Ok(Some(row));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::SheetReader;
    use crate::sheet::SheetInfo;
    use crate::Error;
    use pretty_assertions::assert_eq;

    /// In-memory source that records how often it was restarted.
    struct VecSource {
        rows: Vec<Row>,
        next: usize,
        restarts: usize,
    }

    impl VecSource {
        fn new(rows: &[&[&str]]) -> Self {
            Self {
                rows: rows
                    .iter()
                    .map(|r| r.iter().map(|c| c.to_string()).collect())
                    .collect(),
                next: 0,
                restarts: 0,
            }
        }
    }

    impl RowSource for VecSource {
        fn restart(&mut self) -> Result<()> {
            self.next = 0;
            self.restarts += 1;
            Ok(())
        }

        fn next_row(&mut self, _column_limit: Option<usize>) -> Result<Option<Row>> {
            let row = self.rows.get(self.next).cloned();
            self.next += 1;
            Ok(row)
        }

        fn sheets(&mut self) -> Result<Vec<SheetInfo>> {
            let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
            Ok(vec![SheetInfo::new("Sheet1", 1, self.rows.len(), columns)])
        }

        fn sheet_index(&self) -> usize {
            0
        }

        fn set_sheet_index(&mut self, _index: usize) -> Result<()> {
            Ok(())
        }
    }

    fn reader(rows: &[&[&str]]) -> RowReader<VecSource> {
        RowReader::new(VecSource::new(rows), ReadOptions::default())
    }

    fn first_cell(reader: &RowReader<VecSource>) -> Option<String> {
        reader.current().and_then(|row| row.first().cloned())
    }

    #[test]
    fn test_unstarted_until_rewind() {
        let mut r = reader(&[&["a"], &["b"]]);
        assert_eq!(r.state(), &CursorState::Unstarted);
        assert_eq!(r.position(), None);
        assert!(!r.is_valid());

        r.rewind().unwrap();
        assert_eq!(r.position(), Some(0));
        assert_eq!(first_cell(&r), Some("a".into()));
    }

    #[test]
    fn test_advance_to_exhaustion() {
        let mut r = reader(&[&["a"], &["b"]]);
        r.rewind().unwrap();
        r.advance().unwrap();
        assert_eq!(r.position(), Some(1));
        r.advance().unwrap();
        assert_eq!(r.state(), &CursorState::Exhausted);
        assert!(!r.is_valid());

        // Advancing an exhausted cursor is a no-op
        r.advance().unwrap();
        assert_eq!(r.state(), &CursorState::Exhausted);
    }

    #[test]
    fn test_empty_sheet_rewinds_to_exhausted() {
        let mut r = reader(&[]);
        r.rewind().unwrap();
        assert_eq!(r.state(), &CursorState::Exhausted);
    }

    #[test]
    fn test_seek_forward_does_not_restart() {
        let mut r = reader(&[&["1"], &["2"], &["3"], &["4"]]);
        r.rewind().unwrap();
        r.seek(3).unwrap();
        assert_eq!(first_cell(&r), Some("3".into()));
        assert_eq!(r.source().restarts, 1);

        r.seek(4).unwrap();
        assert_eq!(first_cell(&r), Some("4".into()));
        assert_eq!(r.source().restarts, 1);
    }

    #[test]
    fn test_seek_backwards_restarts() {
        let mut r = reader(&[&["1"], &["2"], &["3"], &["4"]]);
        r.seek(4).unwrap();
        let restarts = r.source().restarts;

        r.seek(2).unwrap();
        assert_eq!(first_cell(&r), Some("2".into()));
        assert_eq!(r.position(), Some(1));
        assert_eq!(r.source().restarts, restarts + 1);
    }

    #[test]
    fn test_seek_one_always_restarts() {
        let mut r = reader(&[&["1"], &["2"]]);
        r.rewind().unwrap();
        let restarts = r.source().restarts;

        r.seek(1).unwrap();
        assert_eq!(r.source().restarts, restarts + 1);
        assert_eq!(first_cell(&r), Some("1".into()));

        r.advance().unwrap();
        r.seek(1).unwrap();
        assert_eq!(r.source().restarts, restarts + 2);
        assert_eq!(r.position(), Some(0));
    }

    #[test]
    fn test_seek_past_end_is_exhausted_without_error() {
        let mut r = reader(&[&["1"], &["2"]]);
        r.seek(50).unwrap();
        assert_eq!(r.state(), &CursorState::Exhausted);

        // From exhaustion, seek restarts and finds the row again
        r.seek(2).unwrap();
        assert_eq!(first_cell(&r), Some("2".into()));
    }

    #[test]
    fn test_seek_zero_is_invalid_and_keeps_state() {
        let mut r = reader(&[&["1"], &["2"]]);
        r.seek(2).unwrap();

        let err = r.seek(0).unwrap_err();
        assert!(matches!(err, Error::SeekInvalid(0)));
        assert_eq!(r.position(), Some(1));
        assert_eq!(first_cell(&r), Some("2".into()));
    }

    #[test]
    fn test_row_limit_counts_yielded_rows() {
        let mut r = reader(&[&["1"], &["2"], &["3"]]);
        r.set_row_limit(Some(2));
        r.rewind().unwrap();
        r.advance().unwrap();
        assert!(r.is_valid());
        r.advance().unwrap();
        assert!(!r.is_valid());
    }

    #[test]
    fn test_column_limit_pads_sparse_rows() {
        let mut r = reader(&[&["a", "", "", "d"]]);
        r.set_column_limit(Some(5));
        r.rewind().unwrap();
        assert_eq!(
            r.current(),
            Some(&vec![
                "a".to_string(),
                String::new(),
                String::new(),
                "d".to_string(),
                String::new()
            ])
        );
    }

    #[test]
    fn test_column_limit_truncates() {
        let mut r = reader(&[&["a", "b", "c"]]);
        r.set_column_limit(Some(2));
        r.rewind().unwrap();
        assert_eq!(r.current(), Some(&vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn test_ignore_empty_rows_changes_positions() {
        let rows: &[&[&str]] = &[&["a"], &["", " "], &["c"]];

        let mut all = reader(rows);
        all.seek(2).unwrap();
        assert_eq!(first_cell(&all), Some("".into()));

        let mut skipping = reader(rows);
        skipping.set_read_empty_cells(false);
        skipping.seek(2).unwrap();
        assert_eq!(first_cell(&skipping), Some("c".into()));
    }

    #[test]
    fn test_no_padding_when_skipping_empty_cells() {
        let mut r = reader(&[&["a"]]);
        r.set_column_limit(Some(3));
        r.set_read_empty_cells(false);
        r.rewind().unwrap();
        assert_eq!(r.current(), Some(&vec!["a".to_string()]));
    }

    #[test]
    fn test_count_and_dimensions_follow_limits() {
        let mut r = reader(&[&["a", "b", "c"], &["d"], &["e"]]);
        assert_eq!(r.count().unwrap(), 3);
        assert_eq!(r.dimensions().unwrap(), (3, 3));

        r.set_row_limit(Some(2));
        r.set_column_limit(Some(1));
        assert_eq!(r.dimensions().unwrap(), (2, 1));
    }

    #[test]
    fn test_prescanned_count_includes_empty_rows() {
        let mut r = reader(&[&["a"], &[""], &["b"]]);
        r.set_read_empty_cells(false);
        assert_eq!(r.count().unwrap(), 3);

        let rows: Vec<Row> = r.rows().collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_rows_iterator() {
        let mut r = reader(&[&["1"], &["2"], &["3"]]);
        let rows: Vec<Row> = r.rows().collect::<Result<_>>().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], vec!["3".to_string()]);
    }
}
