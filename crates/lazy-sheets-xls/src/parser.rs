//! XLS row source
//!
//! Opens the compound document, reads the workbook globals once and builds
//! the cell index of the active worksheet when it is first needed.

use std::fs::File;
use std::io::{BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use cfb::CompoundFile;
use lazy_sheets_core::{Row, RowSource, SheetInfo};
use lazy_sheets_format::{DateSystem, FormatInterpreter, FormatSettings};

use crate::biff::RecordReader;
use crate::error::{XlsError, XlsResult};
use crate::sheet::{scan_dimensions, CellContext, SheetCells};
use crate::workbook::{read_globals, BoundSheet};

/// Stream names holding the BIFF records
const WORKBOOK_STREAMS: [&str; 2] = ["/Workbook", "/Book"];

fn open_compound(path: &Path) -> XlsResult<CompoundFile<File>> {
    if !path.is_file() {
        return Err(XlsError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|_| XlsError::NotFound(path.to_path_buf()))?;
    CompoundFile::open(file).map_err(|e| {
        XlsError::InvalidFormat(format!(
            "The file [{}] is not a compound document: {}",
            path.display(),
            e
        ))
    })
}

fn workbook_stream(compound: &CompoundFile<File>) -> XlsResult<&'static str> {
    WORKBOOK_STREAMS
        .iter()
        .copied()
        .find(|name| compound.is_stream(name))
        .ok_or_else(|| XlsError::InvalidFormat("no Workbook or Book stream found in CFB".into()))
}

/// Whether `path` is a compound document with a workbook stream.
pub fn is_compound_workbook(path: &Path) -> bool {
    open_compound(path)
        .and_then(|compound| workbook_stream(&compound).map(|_| ()))
        .is_ok()
}

/// Row source over one XLS workbook.
pub struct XlsParser {
    path: PathBuf,
    compound: CompoundFile<File>,
    stream_name: &'static str,
    sst: Vec<String>,
    /// Worksheets only; charts and macro sheets are not readable
    worksheets: Vec<BoundSheet>,
    interpreter: FormatInterpreter,
    info: Option<Vec<SheetInfo>>,
    sheet_index: usize,
    cells: Option<SheetCells>,
    next_row: usize,
}

impl std::fmt::Debug for XlsParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XlsParser")
            .field("path", &self.path)
            .field("stream", &self.stream_name)
            .field("worksheets", &self.worksheets)
            .field("sheet_index", &self.sheet_index)
            .finish()
    }
}

impl XlsParser {
    /// Open a workbook with default format settings.
    pub fn open(path: &Path) -> XlsResult<Self> {
        Self::open_with_settings(path, FormatSettings::default())
    }

    /// Open a workbook and read its globals.
    pub fn open_with_settings(path: &Path, settings: FormatSettings) -> XlsResult<Self> {
        let mut compound = open_compound(path)?;
        let stream_name = workbook_stream(&compound)?;

        let globals = {
            let stream = compound.open_stream(stream_name)?;
            let mut records = RecordReader::new(BufReader::new(stream), 0);
            read_globals(&mut records)?
        };

        let mut interpreter = FormatInterpreter::with_settings(globals.xf_formats, globals.formats, settings);
        if globals.date1904 {
            interpreter.set_date_system(DateSystem::Excel1904);
        }

        let worksheets: Vec<BoundSheet> = globals
            .sheets
            .into_iter()
            .filter(BoundSheet::is_worksheet)
            .collect();
        log::debug!("opened {} ({} worksheets)", path.display(), worksheets.len());

        Ok(Self {
            path: path.to_path_buf(),
            compound,
            stream_name,
            sst: globals.sst,
            worksheets,
            interpreter,
            info: None,
            sheet_index: 0,
            cells: None,
            next_row: 0,
        })
    }

    /// Path of the workbook file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The number-format interpreter for this workbook
    pub fn interpreter_mut(&mut self) -> &mut FormatInterpreter {
        &mut self.interpreter
    }

    /// Records of the substream starting at `offset` in the workbook stream
    fn records_at(&mut self, offset: u32) -> XlsResult<RecordReader<BufReader<cfb::Stream<File>>>> {
        let mut stream = self.compound.open_stream(self.stream_name)?;
        stream.seek(SeekFrom::Start(offset as u64))?;
        Ok(RecordReader::new(BufReader::new(stream), offset as u64))
    }

    /// Name and dimensions of every worksheet, read once.
    pub fn parse_worksheet_info(&mut self) -> XlsResult<Vec<SheetInfo>> {
        if let Some(info) = &self.info {
            return Ok(info.clone());
        }

        let mut info = Vec::with_capacity(self.worksheets.len());
        for (index, sheet) in self.worksheets.clone().into_iter().enumerate() {
            let mut records = self.records_at(sheet.offset)?;
            let (rows, columns) = scan_dimensions(&mut records)?;
            log::debug!("sheet {:?}: {} rows, {} columns", sheet.name, rows, columns);
            info.push(SheetInfo::new(sheet.name, index as u32 + 1, rows, columns));
        }

        self.info = Some(info.clone());
        Ok(info)
    }

    fn ensure_cells(&mut self) -> XlsResult<()> {
        if self.cells.is_some() {
            return Ok(());
        }
        let Some(offset) = self.worksheets.get(self.sheet_index).map(|s| s.offset) else {
            self.cells = Some(SheetCells::default());
            return Ok(());
        };

        let mut records = self.records_at(offset)?;
        let mut ctx = CellContext {
            sst: &self.sst,
            interpreter: &mut self.interpreter,
        };
        self.cells = Some(SheetCells::read(&mut records, &mut ctx)?);
        Ok(())
    }

    /// Row `index` (0-based) of the active worksheet
    pub fn get_row(&mut self, index: usize, column_limit: Option<usize>) -> XlsResult<Row> {
        self.ensure_cells()?;
        Ok(self
            .cells
            .as_ref()
            .map(|cells| cells.row(index, column_limit))
            .unwrap_or_default())
    }

    fn total_rows(&self) -> usize {
        self.cells.as_ref().map_or(0, |cells| cells.dimensions().0)
    }
}

impl RowSource for XlsParser {
    fn restart(&mut self) -> lazy_sheets_core::Result<()> {
        self.next_row = 0;
        self.ensure_cells()?;
        Ok(())
    }

    fn next_row(&mut self, column_limit: Option<usize>) -> lazy_sheets_core::Result<Option<Row>> {
        self.ensure_cells()?;
        if self.next_row >= self.total_rows() {
            return Ok(None);
        }
        let row = self.get_row(self.next_row, column_limit)?;
        self.next_row += 1;
        Ok(Some(row))
    }

    fn sheets(&mut self) -> lazy_sheets_core::Result<Vec<SheetInfo>> {
        Ok(self.parse_worksheet_info()?)
    }

    fn sheet_index(&self) -> usize {
        self.sheet_index
    }

    fn set_sheet_index(&mut self, index: usize) -> lazy_sheets_core::Result<()> {
        if index >= self.worksheets.len() {
            return Err(lazy_sheets_core::Error::SheetOutOfBounds(
                index,
                self.worksheets.len(),
            ));
        }
        self.sheet_index = index;
        self.cells = None;
        self.next_row = 0;
        Ok(())
    }
}
