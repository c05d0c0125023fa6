//! Worksheet metadata and column addressing

/// Information about one worksheet, collected in a pre-scan pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetInfo {
    /// Sheet name as declared in the workbook
    pub name: String,
    /// Ordering key (numeric suffix of the relationship id for XLSX,
    /// declaration order for XLS/CSV)
    pub sheet_id: u32,
    /// Number of rows (last row number seen in the sheet)
    pub total_rows: usize,
    /// Number of columns (widest row)
    pub total_columns: usize,
    /// 0-based index of the last column
    pub last_column_index: usize,
    /// Letters of the last column (`A` for an empty sheet)
    pub last_column_letter: String,
}

impl SheetInfo {
    /// Create sheet info, deriving the last-column fields.
    pub fn new<S: Into<String>>(
        name: S,
        sheet_id: u32,
        total_rows: usize,
        total_columns: usize,
    ) -> Self {
        let last_column_index = total_columns.saturating_sub(1);
        Self {
            name: name.into(),
            sheet_id,
            total_rows,
            total_columns,
            last_column_index,
            last_column_letter: column_to_letters(last_column_index),
        }
    }
}

/// Convert a 0-based column index to letters (0 = A, 25 = Z, 26 = AA).
pub fn column_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col + 1;

    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + b'A') as char;
        result.insert(0, c);
        n /= 26;
    }

    result
}

/// Convert column letters to a 0-based index (A = 0, Z = 25, AA = 26).
///
/// Returns `None` for an empty string or non-alphabetic input.
pub fn letters_to_column(letters: &str) -> Option<usize> {
    if letters.is_empty() {
        return None;
    }

    let mut col: usize = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(c.to_ascii_uppercase() as usize - 'A' as usize + 1)?;
    }

    Some(col - 1)
}

/// Extract the 0-based column index from an A1-style reference (`"C7"` → 2).
pub fn column_index_from_ref(cell_ref: &str) -> Option<usize> {
    let end = cell_ref
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(cell_ref.len());
    letters_to_column(&cell_ref[..end])
}
