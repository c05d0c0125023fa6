//! Format-independent reader

use lazy_sheets_core::{Result, Row, SheetInfo, SheetReader};
use lazy_sheets_csv::CsvReader;
#[cfg(feature = "xls")]
use lazy_sheets_xls::XlsReader;
use lazy_sheets_xlsx::XlsxReader;

use crate::format::Format;

/// A reader for any supported format.
#[derive(Debug)]
pub enum Reader {
    Xlsx(XlsxReader),
    #[cfg(feature = "xls")]
    Xls(XlsReader),
    Csv(CsvReader),
}

macro_rules! dispatch {
    ($self:expr, $reader:ident => $body:expr) => {
        match $self {
            Reader::Xlsx($reader) => $body,
            #[cfg(feature = "xls")]
            Reader::Xls($reader) => $body,
            Reader::Csv($reader) => $body,
        }
    };
}

impl Reader {
    /// Format of the underlying file
    pub fn format(&self) -> Format {
        match self {
            Reader::Xlsx(_) => Format::Xlsx,
            #[cfg(feature = "xls")]
            Reader::Xls(_) => Format::Xls,
            Reader::Csv(_) => Format::Csv,
        }
    }

    /// Set the input encoding of a delimited-text reader.
    ///
    /// Workbook formats carry their own encoding; the call is ignored for
    /// them.
    pub fn set_input_encoding(&mut self, label: &str) -> Result<()> {
        match self {
            Reader::Csv(reader) => Ok(reader.source_mut().set_input_encoding(label)?),
            other => {
                log::debug!("input encoding ignored for {} files", other.format());
                Ok(())
            }
        }
    }

    pub fn as_xlsx_mut(&mut self) -> Option<&mut XlsxReader> {
        match self {
            Reader::Xlsx(reader) => Some(reader),
            _ => None,
        }
    }

    #[cfg(feature = "xls")]
    pub fn as_xls_mut(&mut self) -> Option<&mut XlsReader> {
        match self {
            Reader::Xls(reader) => Some(reader),
            _ => None,
        }
    }

    pub fn as_csv_mut(&mut self) -> Option<&mut CsvReader> {
        match self {
            Reader::Csv(reader) => Some(reader),
            _ => None,
        }
    }
}

impl SheetReader for Reader {
    fn current(&self) -> Option<&Row> {
        dispatch!(self, r => r.current())
    }

    fn advance(&mut self) -> Result<()> {
        dispatch!(self, r => r.advance())
    }

    fn position(&self) -> Option<usize> {
        dispatch!(self, r => r.position())
    }

    fn rewind(&mut self) -> Result<()> {
        dispatch!(self, r => r.rewind())
    }

    fn seek(&mut self, n: usize) -> Result<()> {
        dispatch!(self, r => r.seek(n))
    }

    fn count(&mut self) -> Result<usize> {
        dispatch!(self, r => r.count())
    }

    fn dimensions(&mut self) -> Result<(usize, usize)> {
        dispatch!(self, r => r.dimensions())
    }

    fn sheets(&mut self) -> Result<Vec<SheetInfo>> {
        dispatch!(self, r => r.sheets())
    }

    fn sheet(&mut self, index: usize) -> Result<SheetInfo> {
        dispatch!(self, r => r.sheet(index))
    }

    fn sheet_index(&self) -> usize {
        dispatch!(self, r => r.sheet_index())
    }

    fn set_sheet_index(&mut self, index: usize) -> Result<()> {
        dispatch!(self, r => r.set_sheet_index(index))
    }

    fn set_row_limit(&mut self, limit: Option<usize>) {
        dispatch!(self, r => r.set_row_limit(limit))
    }

    fn set_column_limit(&mut self, limit: Option<usize>) {
        dispatch!(self, r => r.set_column_limit(limit))
    }

    fn set_read_empty_cells(&mut self, read: bool) {
        dispatch!(self, r => r.set_read_empty_cells(read))
    }
}
