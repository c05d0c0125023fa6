//! CSV options

/// Options for reading delimited text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvOptions {
    /// Field delimiter. `None` takes it from a `sep=X` first line, or uses
    /// a comma.
    pub delimiter: Option<u8>,
    /// Quote character (default: double quote)
    pub enclosure: u8,
    /// Encoding label (`"UTF-8"`, `"GBK"`, `"UTF-16LE"`, ...). `None` detects
    /// it from the byte-order mark or the first line.
    pub encoding: Option<String>,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            enclosure: b'"',
            encoding: None,
        }
    }
}
