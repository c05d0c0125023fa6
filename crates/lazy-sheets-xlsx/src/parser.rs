//! Streaming worksheet parser
//!
//! [`XlsxParser`] owns one package and everything derived from it (shared
//! strings, style table, sheet list). Rows of the active sheet are read
//! straight from the extracted worksheet part, one `<row>` at a time.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use lazy_sheets_core::{column_index_from_ref, Row, RowSource, SheetInfo};
use lazy_sheets_format::{DateSystem, FormatInterpreter};
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;
use crate::options::XlsxOptions;
use crate::package::Package;
use crate::shared_strings::SharedStrings;
use crate::styles::{read_styles, StyleTable};
use crate::workbook::{read_relationships, read_workbook};

type XmlReader = Reader<BufReader<File>>;

fn open_xml(path: &Path) -> XlsxResult<XmlReader> {
    let mut reader = Reader::from_reader(BufReader::new(File::open(path)?));
    reader.trim_text(false);
    Ok(reader)
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|s| s.to_string()))
}

/// 0-based row index from a `<row r="..">` attribute
fn row_index(e: &BytesStart<'_>) -> Option<usize> {
    attr(e, b"r")
        .and_then(|r| r.trim().parse::<usize>().ok())
        .filter(|&r| r > 0)
        .map(|r| r - 1)
}

/// A worksheet discovered in the pre-scan
#[derive(Debug, Clone)]
struct SheetEntry {
    info: SheetInfo,
    /// Extracted worksheet part; `None` when the package lacks it
    path: Option<PathBuf>,
}

/// Open stream over the active worksheet
struct SheetStream {
    reader: XmlReader,
    buf: Vec<u8>,
    /// Rows handed out so far
    emitted: usize,
    /// Index the next `<row>` without an `r` attribute gets
    next_index: usize,
    /// A parsed row waiting behind gap rows
    pending: Option<(usize, Row)>,
}

impl SheetStream {
    fn open(path: &Path) -> XlsxResult<Self> {
        Ok(Self {
            reader: open_xml(path)?,
            buf: Vec::new(),
            emitted: 0,
            next_index: 0,
            pending: None,
        })
    }

    /// Hand out the pending row, or an empty row while it is still ahead.
    fn emit_pending(&mut self) -> Option<Row> {
        let (index, row) = self.pending.take()?;
        if index > self.emitted {
            self.pending = Some((index, row));
            self.emitted += 1;
            return Some(Vec::new());
        }
        self.emitted += 1;
        Some(row)
    }
}

/// Per-cell parse state
#[derive(Default)]
struct CellState {
    column: Option<usize>,
    kind: Option<String>,
    style: Option<usize>,
    value: String,
    has_value: bool,
    in_value: bool,
    in_inline: bool,
    in_inline_text: bool,
    in_phonetic: bool,
}

impl CellState {
    fn start(e: &BytesStart<'_>) -> Self {
        Self {
            column: attr(e, b"r").and_then(|r| column_index_from_ref(&r)),
            kind: attr(e, b"t"),
            style: attr(e, b"s").and_then(|s| s.parse().ok()),
            ..Self::default()
        }
    }
}

/// Turn a raw cell value into display text.
fn cell_text(
    cell: CellState,
    shared_strings: &mut SharedStrings,
    interpreter: &mut FormatInterpreter,
) -> XlsxResult<String> {
    let raw = cell.value;
    let text = match cell.kind.as_deref() {
        Some("s") => {
            let index: usize = raw.trim().parse().map_err(|_| {
                XlsxError::Parse(format!("Invalid shared string index: {}", raw))
            })?;
            match shared_strings.get(index)? {
                Some(text) => text,
                None => {
                    log::warn!("shared string index {} not found", index);
                    String::new()
                }
            }
        }
        Some("inlineStr") | Some("str") => decode_excel_escapes(&raw).into_owned(),
        Some("b") => {
            if raw.trim() == "1" || raw.trim().eq_ignore_ascii_case("true") {
                "TRUE".to_string()
            } else {
                "FALSE".to_string()
            }
        }
        None | Some("n") => interpreter.apply(&raw, cell.style.unwrap_or(0)),
        // Errors (`e`) and ISO dates (`d`) are shown as written
        Some(_) => raw,
    };
    Ok(text)
}

fn place(row: &mut Row, column: usize, text: String) {
    if column >= row.len() {
        row.resize(column, String::new());
        row.push(text);
    } else {
        row[column] = text;
    }
}

/// Read the next `<row>` of a worksheet stream as `(index, cells)`.
fn read_row(
    stream: &mut SheetStream,
    shared_strings: &mut SharedStrings,
    interpreter: &mut FormatInterpreter,
    column_limit: Option<usize>,
) -> XlsxResult<Option<(usize, Row)>> {
    let mut in_row = false;
    let mut index = stream.next_index;
    let mut cells: Row = Vec::new();
    let mut cell: Option<CellState> = None;

    loop {
        stream.buf.clear();
        match stream.reader.read_event_into(&mut stream.buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"row" => {
                    in_row = true;
                    index = row_index(&e).unwrap_or(stream.next_index);
                    cells.clear();
                }
                b"c" if in_row => cell = Some(CellState::start(&e)),
                b"v" => {
                    if let Some(cell) = cell.as_mut() {
                        cell.in_value = true;
                        cell.has_value = true;
                    }
                }
                b"is" => {
                    if let Some(cell) = cell.as_mut() {
                        cell.in_inline = true;
                        cell.has_value = true;
                    }
                }
                b"rPh" => {
                    if let Some(cell) = cell.as_mut() {
                        cell.in_phonetic = true;
                    }
                }
                b"t" => {
                    if let Some(cell) = cell.as_mut() {
                        cell.in_inline_text = cell.in_inline && !cell.in_phonetic;
                    }
                }
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"row" => {
                let index = row_index(&e).unwrap_or(stream.next_index);
                stream.next_index = index + 1;
                return Ok(Some((index, Vec::new())));
            }
            Ok(Event::Text(e)) => {
                if let Some(cell) = cell.as_mut() {
                    if cell.in_value || cell.in_inline_text {
                        cell.value.push_str(&e.unescape()?);
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(cell) = cell.as_mut() {
                    if cell.in_value || cell.in_inline_text {
                        cell.value.push_str(&String::from_utf8_lossy(&e));
                    }
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"v" => {
                    if let Some(cell) = cell.as_mut() {
                        cell.in_value = false;
                    }
                }
                b"t" => {
                    if let Some(cell) = cell.as_mut() {
                        cell.in_inline_text = false;
                    }
                }
                b"rPh" => {
                    if let Some(cell) = cell.as_mut() {
                        cell.in_phonetic = false;
                    }
                }
                b"is" => {
                    if let Some(cell) = cell.as_mut() {
                        cell.in_inline = false;
                    }
                }
                b"c" => {
                    let Some(finished) = cell.take() else {
                        continue;
                    };
                    let column = finished.column.unwrap_or(cells.len());
                    if !finished.has_value || column_limit.map_or(false, |limit| column >= limit) {
                        continue;
                    }
                    let text = cell_text(finished, shared_strings, interpreter)?;
                    place(&mut cells, column, text);
                }
                b"row" if in_row => {
                    stream.next_index = index + 1;
                    return Ok(Some((index, cells)));
                }
                _ => {}
            },
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
    }
}

/// Count rows and columns of a worksheet without materializing cells.
fn scan_dimensions(path: &Path) -> XlsxResult<(usize, usize)> {
    let mut reader = open_xml(path)?;
    let mut buf = Vec::new();
    let mut rows = 0usize;
    let mut columns = 0usize;
    let mut cells_in_row = 0usize;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"row" => {
                    rows = row_index(&e).map_or(rows + 1, |index| rows.max(index + 1));
                    cells_in_row = 0;
                }
                b"c" => {
                    let column = attr(&e, b"r")
                        .and_then(|r| column_index_from_ref(&r))
                        .unwrap_or(cells_in_row);
                    cells_in_row = column + 1;
                    columns = columns.max(column + 1);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
    }

    Ok((rows, columns))
}

fn part_in(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Row source over one XLSX package.
pub struct XlsxParser {
    package: Package,
    shared_strings: SharedStrings,
    interpreter: FormatInterpreter,
    sheets: Vec<SheetEntry>,
    sheet_index: usize,
    stream: Option<SheetStream>,
}

impl std::fmt::Debug for XlsxParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsxParser")
            .field("package", &self.package)
            .field("shared_strings", &self.shared_strings)
            .field("sheets", &self.sheets)
            .field("sheet_index", &self.sheet_index)
            .finish()
    }
}

impl XlsxParser {
    /// Open a package, read its workbook manifest, shared strings and
    /// styles, and pre-scan every worksheet.
    pub fn open(path: &Path, options: &XlsxOptions) -> XlsxResult<Self> {
        let mut package = Package::open(path, options.temp_dir.as_deref())?;
        let workbook_part = package.workbook_part().to_string();
        let dir = package.workbook_dir().to_string();

        let workbook_path = package
            .extract(&workbook_part)?
            .ok_or_else(|| XlsxError::MissingPart(workbook_part.clone()))?;
        let manifest = read_workbook(BufReader::new(File::open(&workbook_path)?))?;

        let basename = workbook_part.rsplit('/').next().unwrap_or("workbook.xml");
        let rels_part = part_in(&dir, &format!("_rels/{}.rels", basename));
        let rels = match package.extract(&rels_part)? {
            Some(rels_path) => read_relationships(BufReader::new(File::open(rels_path)?), &dir)?,
            None => Default::default(),
        };
        let related = |kind: &str, fallback: &str| -> String {
            rels.values()
                .find(|rel| rel.is(kind))
                .map(|rel| rel.target.clone())
                .unwrap_or_else(|| part_in(&dir, fallback))
        };

        // Every part is extracted, and so scanned, before any of them is parsed
        let sst_path = package.extract(&related("sharedStrings", "sharedStrings.xml"))?;
        let styles_path = package.extract(&related("styles", "styles.xml"))?;
        let mut sheet_parts = Vec::with_capacity(manifest.sheets.len());
        for decl in &manifest.sheets {
            let Some(sheet_id) = decl.rel_number() else {
                log::warn!("sheet {:?} has unresolvable relationship id {:?}", decl.name, decl.r_id);
                continue;
            };
            let part = match rels.get(&decl.r_id) {
                Some(rel) if rel.is("worksheet") => rel.target.clone(),
                _ => part_in(&dir, &format!("worksheets/sheet{}.xml", sheet_id)),
            };
            let sheet_path = package.extract(&part)?;
            sheet_parts.push((decl, sheet_id, part, sheet_path));
        }

        let shared_strings = match &sst_path {
            Some(path) => SharedStrings::open(path, options.shared_string_cache_limit)?,
            None => SharedStrings::empty(),
        };

        let styles = match &styles_path {
            Some(path) => read_styles(BufReader::new(File::open(path)?))?,
            None => StyleTable::default(),
        };
        let mut interpreter =
            FormatInterpreter::with_settings(styles.formats, styles.custom_formats, options.format.clone());
        if manifest.date1904 {
            interpreter.set_date_system(DateSystem::Excel1904);
        }

        let mut sheets = Vec::with_capacity(sheet_parts.len());
        for (decl, sheet_id, part, sheet_path) in sheet_parts {
            let (rows, columns) = match &sheet_path {
                Some(p) => scan_dimensions(p)?,
                None => {
                    log::warn!("worksheet part {} missing for sheet {:?}", part, decl.name);
                    (0, 0)
                }
            };
            log::debug!(
                "sheet {:?} (id {}): {} rows, {} columns",
                decl.name,
                sheet_id,
                rows,
                columns
            );
            sheets.push(SheetEntry {
                info: SheetInfo::new(decl.name.clone(), sheet_id, rows, columns),
                path: sheet_path,
            });
        }
        sheets.sort_by_key(|entry| entry.info.sheet_id);

        Ok(Self {
            package,
            shared_strings,
            interpreter,
            sheets,
            sheet_index: 0,
            stream: None,
        })
    }

    /// The underlying package
    pub fn package(&self) -> &Package {
        &self.package
    }

    /// The number-format interpreter for this workbook
    pub fn interpreter_mut(&mut self) -> &mut FormatInterpreter {
        &mut self.interpreter
    }

    /// Whether shared strings are served from memory
    pub fn shared_strings_cached(&self) -> bool {
        self.shared_strings.is_cached()
    }

    fn next_parsed_row(&mut self, column_limit: Option<usize>) -> XlsxResult<Option<Row>> {
        if self.stream.is_none() {
            let Some(path) = self.sheets.get(self.sheet_index).and_then(|s| s.path.as_ref()) else {
                return Ok(None);
            };
            log::debug!("streaming worksheet {}", path.display());
            self.stream = Some(SheetStream::open(path)?);
        }
        let Some(stream) = self.stream.as_mut() else {
            return Ok(None);
        };

        if stream.pending.is_none() {
            match read_row(stream, &mut self.shared_strings, &mut self.interpreter, column_limit)? {
                Some(parsed) => stream.pending = Some(parsed),
                None => return Ok(None),
            }
        }
        Ok(stream.emit_pending())
    }
}

impl RowSource for XlsxParser {
    fn restart(&mut self) -> lazy_sheets_core::Result<()> {
        self.stream = None;
        Ok(())
    }

    fn next_row(&mut self, column_limit: Option<usize>) -> lazy_sheets_core::Result<Option<Row>> {
        let row = self.next_parsed_row(column_limit)?;
        if let Some(row) = &row {
            log::trace!("row with {} cells", row.len());
        }
        Ok(row)
    }

    fn sheets(&mut self) -> lazy_sheets_core::Result<Vec<SheetInfo>> {
        Ok(self.sheets.iter().map(|entry| entry.info.clone()).collect())
    }

    fn sheet_index(&self) -> usize {
        self.sheet_index
    }

    fn set_sheet_index(&mut self, index: usize) -> lazy_sheets_core::Result<()> {
        if index >= self.sheets.len() {
            return Err(lazy_sheets_core::Error::SheetOutOfBounds(index, self.sheets.len()));
        }
        self.sheet_index = index;
        self.stream = None;
        Ok(())
    }
}
