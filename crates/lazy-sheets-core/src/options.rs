//! Reader options

/// Options that shape the lazy row sequence of any reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Maximum number of rows to yield (`None` = unlimited)
    pub row_limit: Option<usize>,
    /// Maximum number of cells per row (`None` = unlimited)
    pub column_limit: Option<usize>,
    /// Read every cell (default). When false, rows whose cells are all empty
    /// are skipped and rows are not padded to the column limit.
    pub read_empty_cells: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            row_limit: None,
            column_limit: None,
            read_empty_cells: true,
        }
    }
}

impl ReadOptions {
    /// Clamp raw sheet dimensions to the configured limits.
    pub fn clamp(&self, rows: usize, columns: usize) -> (usize, usize) {
        let rows = self.row_limit.map_or(rows, |limit| rows.min(limit));
        let columns = self.column_limit.map_or(columns, |limit| columns.min(limit));
        (rows, columns)
    }
}
