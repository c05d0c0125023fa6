//! Opening files

use std::fmt;
use std::path::Path;

use lazy_sheets_core::{ReadOptions, Result};
use lazy_sheets_csv::CsvOptions;
use lazy_sheets_xlsx::XlsxOptions;

use crate::format::Format;
use crate::reader::Reader;

type Configure = Box<dyn FnOnce(&mut Reader) -> Result<()>>;

/// How to open a file.
///
/// ```rust,no_run
/// use lazy_sheets::{LoadOptions, SheetReader};
///
/// let mut reader = LoadOptions::new()
///     .row_limit(10)
///     .column_limit(10)
///     .encoding("GBK")
///     .load("files/03.csv")
///     .unwrap();
/// reader.seek(2).unwrap();
/// ```
#[derive(Default)]
pub struct LoadOptions {
    format: Option<Format>,
    encoding: Option<String>,
    read: ReadOptions,
    xlsx: XlsxOptions,
    csv: CsvOptions,
    configure: Option<Configure>,
}

impl fmt::Debug for LoadOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadOptions")
            .field("format", &self.format)
            .field("encoding", &self.encoding)
            .field("read", &self.read)
            .field("xlsx", &self.xlsx)
            .field("csv", &self.csv)
            .field("configure", &self.configure.is_some())
            .finish()
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the file as `format` whatever its extension
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Input encoding for delimited text; ignored for workbooks
    pub fn encoding<S: Into<String>>(mut self, label: S) -> Self {
        self.encoding = Some(label.into());
        self
    }

    pub fn row_limit(mut self, limit: usize) -> Self {
        self.read.row_limit = Some(limit);
        self
    }

    pub fn column_limit(mut self, limit: usize) -> Self {
        self.read.column_limit = Some(limit);
        self
    }

    pub fn read_empty_cells(mut self, read: bool) -> Self {
        self.read.read_empty_cells = read;
        self
    }

    pub fn read_options(mut self, options: ReadOptions) -> Self {
        self.read = options;
        self
    }

    pub fn xlsx_options(mut self, options: XlsxOptions) -> Self {
        self.xlsx = options;
        self
    }

    pub fn csv_options(mut self, options: CsvOptions) -> Self {
        self.csv = options;
        self
    }

    /// Run `f` on the reader once it is open, before any row is read.
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Reader) -> Result<()> + 'static,
    {
        self.configure = Some(Box::new(f));
        self
    }

    /// Open `path`.
    pub fn load<P: AsRef<Path>>(self, path: P) -> Result<Reader> {
        let path = path.as_ref();
        let format = match self.format {
            Some(format) => format,
            None => Format::detect(path)?,
        };
        log::debug!("loading {} as {}", path.display(), format);

        let mut reader = match format {
            Format::Xlsx => Reader::Xlsx(lazy_sheets_xlsx::open(path, &self.xlsx, self.read)?),
            #[cfg(feature = "xls")]
            Format::Xls => Reader::Xls(lazy_sheets_xls::open(path, self.read)?),
            #[cfg(not(feature = "xls"))]
            Format::Xls => {
                return Err(lazy_sheets_core::Error::FormatUnrecognized(format!(
                    "XLS support is not enabled for file [{}]",
                    path.display()
                )))
            }
            Format::Csv => {
                let mut csv = self.csv;
                if let Some(label) = &self.encoding {
                    csv.encoding = Some(label.clone());
                }
                Reader::Csv(lazy_sheets_csv::open(path, csv, self.read)?)
            }
        };

        if let Some(configure) = self.configure {
            configure(&mut reader)?;
        }
        Ok(reader)
    }
}

/// Open `path` with default options, choosing the reader by extension.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Reader> {
    LoadOptions::new().load(path)
}

/// Whether any reader can open `path`.
pub fn can_read<P: AsRef<Path>>(path: P) -> bool {
    let path = path.as_ref();
    Format::detect(path).map_or(false, |format| format.can_read(path))
}
