//! CSV row source
//!
//! Detection (encoding, delimiter, `sep=` line) runs once when the file is
//! opened and again whenever a setting changes. Rows are then streamed from
//! the file; restarting reopens it.

use std::fs::File;
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use lazy_sheets_core::{ReadOptions, Row, RowSource, SheetInfo};

use crate::decode::DecodingReader;
use crate::detect::{guess_encoding, parse_sep_line, sniff_bom, TextEncoding};
use crate::error::{CsvError, CsvResult};
use crate::options::CsvOptions;

/// Bytes sampled for encoding detection
const SAMPLE_SIZE: u64 = 4096;

type Records = csv::Reader<Box<dyn BufRead>>;

fn field_text(field: &[u8]) -> String {
    String::from_utf8_lossy(field).into_owned()
}

fn is_blank(field: &[u8]) -> bool {
    String::from_utf8_lossy(field).trim().is_empty()
}

/// Result of inspecting the start of the file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Detected {
    encoding: TextEncoding,
    /// Byte-order mark length
    data_start: u64,
    delimiter: u8,
    /// First line is `sep=X` and is not data
    sep_line: bool,
}

/// Row source over one delimited text file.
pub struct CsvParser {
    path: PathBuf,
    options: CsvOptions,
    detected: Detected,
    records: Option<Records>,
    record: csv::ByteRecord,
    info: Option<SheetInfo>,
}

impl std::fmt::Debug for CsvParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CsvParser")
            .field("path", &self.path)
            .field("options", &self.options)
            .field("detected", &self.detected)
            .finish()
    }
}

impl CsvParser {
    /// Open a file and detect its encoding and delimiter.
    pub fn open(path: &Path, options: CsvOptions) -> CsvResult<Self> {
        if !path.is_file() {
            return Err(CsvError::NotFound(path.to_path_buf()));
        }

        let detected = detect(path, &options)?;
        log::debug!(
            "opened {} (encoding {}, delimiter {:?}, sep line {})",
            path.display(),
            detected.encoding.name(),
            detected.delimiter as char,
            detected.sep_line
        );

        Ok(Self {
            path: path.to_path_buf(),
            options,
            detected,
            records: None,
            record: csv::ByteRecord::new(),
            info: None,
        })
    }

    /// Path of the file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the encoding rows are decoded with
    pub fn input_encoding(&self) -> &'static str {
        self.detected.encoding.name()
    }

    /// Read the file with the encoding named by `label` instead of the
    /// detected one. A byte-order mark still takes precedence.
    pub fn set_input_encoding(&mut self, label: &str) -> CsvResult<()> {
        let mut options = self.options.clone();
        options.encoding = Some(label.to_string());
        self.reconfigure(options)
    }

    /// Field delimiter in use
    pub fn delimiter(&self) -> u8 {
        self.detected.delimiter
    }

    pub fn set_delimiter(&mut self, delimiter: u8) -> CsvResult<()> {
        let mut options = self.options.clone();
        options.delimiter = Some(delimiter);
        self.reconfigure(options)
    }

    /// Quote character in use
    pub fn enclosure(&self) -> u8 {
        self.options.enclosure
    }

    pub fn set_enclosure(&mut self, enclosure: u8) -> CsvResult<()> {
        let mut options = self.options.clone();
        options.enclosure = enclosure;
        self.reconfigure(options)
    }

    fn reconfigure(&mut self, options: CsvOptions) -> CsvResult<()> {
        self.detected = detect(&self.path, &options)?;
        self.options = options;
        self.records = None;
        self.info = None;
        Ok(())
    }

    /// A fresh record reader positioned at the first data line
    fn open_records(&self) -> CsvResult<Records> {
        let mut stream = decoded_stream(&self.path, &self.detected)?;
        if self.detected.sep_line {
            let mut line = Vec::new();
            stream.read_until(b'\n', &mut line)?;
        }

        Ok(csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.detected.delimiter)
            .quote(self.options.enclosure)
            .from_reader(stream))
    }

    fn read_record(&mut self, column_limit: Option<usize>) -> CsvResult<Option<Row>> {
        if self.records.is_none() {
            self.records = Some(self.open_records()?);
        }
        let Some(records) = self.records.as_mut() else {
            return Ok(None);
        };
        if !records.read_byte_record(&mut self.record)? {
            return Ok(None);
        }

        let width = column_limit.map_or(self.record.len(), |limit| self.record.len().min(limit));
        Ok(Some(self.record.iter().take(width).map(field_text).collect()))
    }

    /// `(rows, columns)` as the reader would yield them under `options`.
    pub fn count_rows(&self, options: &ReadOptions) -> CsvResult<(usize, usize)> {
        let mut records = self.open_records()?;
        let mut record = csv::ByteRecord::new();
        let mut rows = 0usize;
        let mut columns = 0usize;

        while records.read_byte_record(&mut record)? {
            if options.row_limit.map_or(false, |limit| rows >= limit) {
                break;
            }
            let width = options
                .column_limit
                .map_or(record.len(), |limit| record.len().min(limit));
            if !options.read_empty_cells && record.iter().take(width).all(is_blank) {
                continue;
            }
            rows += 1;
            columns = columns.max(width);
        }

        if options.read_empty_cells && rows > 0 {
            if let Some(limit) = options.column_limit {
                columns = limit;
            }
        }
        log::trace!("counted {} rows, {} columns", rows, columns);
        Ok((rows, columns))
    }

    fn sheet_info(&mut self) -> CsvResult<SheetInfo> {
        if let Some(info) = &self.info {
            return Ok(info.clone());
        }
        let (rows, columns) = self.count_rows(&ReadOptions::default())?;
        let name = self
            .path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Sheet1".to_string());
        let info = SheetInfo::new(name, 1, rows, columns);
        self.info = Some(info.clone());
        Ok(info)
    }
}

/// The file as UTF-8, past its byte-order mark
fn decoded_stream(path: &Path, detected: &Detected) -> CsvResult<Box<dyn BufRead>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(detected.data_start))?;

    if detected.encoding.is_utf8() {
        Ok(Box::new(BufReader::new(file)))
    } else {
        Ok(Box::new(BufReader::new(DecodingReader::new(
            file,
            detected.encoding,
        ))))
    }
}

fn detect(path: &Path, options: &CsvOptions) -> CsvResult<Detected> {
    let mut head = Vec::new();
    File::open(path)?.take(SAMPLE_SIZE).read_to_end(&mut head)?;

    let (encoding, data_start) = match sniff_bom(&head) {
        Some((encoding, len)) => (encoding, len as u64),
        None => match &options.encoding {
            Some(label) => (
                TextEncoding::from_label(label).ok_or_else(|| CsvError::UnknownEncoding(label.clone()))?,
                0,
            ),
            None => (guess_encoding(&head), 0),
        },
    };

    let mut detected = Detected {
        encoding,
        data_start,
        delimiter: options.delimiter.unwrap_or(b','),
        sep_line: false,
    };

    let mut first = Vec::new();
    decoded_stream(path, &detected)?.read_until(b'\n', &mut first)?;
    if let Some(sep) = parse_sep_line(&String::from_utf8_lossy(&first)) {
        detected.sep_line = true;
        match (options.delimiter, u8::try_from(sep)) {
            (Some(_), _) => {}
            (None, Ok(byte)) if sep.is_ascii() => detected.delimiter = byte,
            (None, _) => log::warn!("ignoring non-ASCII delimiter {:?} from sep line", sep),
        }
    }

    Ok(detected)
}

impl RowSource for CsvParser {
    fn restart(&mut self) -> lazy_sheets_core::Result<()> {
        self.records = Some(self.open_records()?);
        Ok(())
    }

    fn next_row(&mut self, column_limit: Option<usize>) -> lazy_sheets_core::Result<Option<Row>> {
        Ok(self.read_record(column_limit)?)
    }

    fn sheets(&mut self) -> lazy_sheets_core::Result<Vec<SheetInfo>> {
        Ok(vec![self.sheet_info()?])
    }

    fn sheet_index(&self) -> usize {
        0
    }

    fn set_sheet_index(&mut self, index: usize) -> lazy_sheets_core::Result<()> {
        if index != 0 {
            return Err(lazy_sheets_core::Error::SheetOutOfBounds(index, 1));
        }
        Ok(())
    }

    fn dimensions(&mut self, options: &ReadOptions) -> lazy_sheets_core::Result<(usize, usize)> {
        Ok(self.count_rows(options)?)
    }
}
