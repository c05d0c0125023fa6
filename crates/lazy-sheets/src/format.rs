//! File-format dispatch

use std::fmt;
use std::path::Path;

use lazy_sheets_core::{Error, Result};

/// Spreadsheet formats lazy-sheets can read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Office Open XML workbook (`xlsx`, `xlsm`, `xltx`, `xltm`)
    Xlsx,
    /// Legacy BIFF8 workbook (`xls`, `xlt`)
    Xls,
    /// Delimited text (`csv`, `txt`)
    Csv,
}

impl Format {
    /// Format for a file extension (case-insensitive, without the dot)
    pub fn from_extension(extension: &str) -> Option<Format> {
        match extension.to_ascii_lowercase().as_str() {
            "xlsx" | "xlsm" | "xltx" | "xltm" => Some(Format::Xlsx),
            "xls" | "xlt" => Some(Format::Xls),
            "csv" | "txt" => Some(Format::Csv),
            _ => None,
        }
    }

    /// Format of `path`, from its extension.
    pub fn detect(path: &Path) -> Result<Format> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default();

        Format::from_extension(extension).ok_or_else(|| {
            Error::FormatUnrecognized(format!(
                "Could not identify file format for file [{}] with extension [{}]",
                path.display(),
                extension
            ))
        })
    }

    /// Whether the reader for this format can open `path`
    pub fn can_read(&self, path: &Path) -> bool {
        match self {
            Format::Xlsx => lazy_sheets_xlsx::can_read(path),
            #[cfg(feature = "xls")]
            Format::Xls => lazy_sheets_xls::can_read(path),
            #[cfg(not(feature = "xls"))]
            Format::Xls => false,
            Format::Csv => lazy_sheets_csv::can_read(path),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Format::Xlsx => "XLSX",
            Format::Xls => "XLS",
            Format::Csv => "CSV",
        };
        f.write_str(name)
    }
}
