//! Worksheet substreams
//!
//! A worksheet is read record by record from its BOF to the matching EOF.
//! Cell values are rendered to display text as they are read and kept in a
//! row-ordered index, so rows can be served in any order afterwards.

use std::collections::BTreeMap;
use std::io::Read;

use lazy_sheets_core::Row;
use lazy_sheets_format::FormatInterpreter;

use crate::biff::parser::{read_bytes8, read_f64, read_rk, read_u16, read_u32, read_u8};
use crate::biff::records;
use crate::biff::strings::read_unicode_string;
use crate::biff::{BiffRecord, RecordReader};
use crate::error::{XlsError, XlsResult};

/// Display text of a BIFF error code
pub fn error_text(code: u8) -> &'static str {
    match code {
        0x00 => "#NULL!",
        0x07 => "#DIV/0!",
        0x0F => "#VALUE!",
        0x17 => "#REF!",
        0x1D => "#NAME?",
        0x24 => "#NUM!",
        0x2A => "#N/A",
        _ => "#VALUE!",
    }
}

fn bool_text(value: u8) -> String {
    let text = if value != 0 { "TRUE" } else { "FALSE" };
    text.to_string()
}

/// Lookup tables needed to render cells
pub struct CellContext<'a> {
    pub sst: &'a [String],
    pub interpreter: &'a mut FormatInterpreter,
}

impl CellContext<'_> {
    fn number(&mut self, value: f64, xf: u16) -> String {
        self.interpreter.apply(&value.to_string(), xf as usize)
    }
}

/// Outcome of decoding one cell record
enum Decoded {
    Cells(Vec<(usize, usize, String)>),
    /// FORMULA whose string result follows in a STRING record
    PendingString(usize, usize),
    Nothing,
}

fn cell_header(data: &[u8], off: &mut usize) -> XlsResult<(usize, usize, u16)> {
    let row = read_u16(data, off)? as usize;
    let col = read_u16(data, off)? as usize;
    let xf = read_u16(data, off)?;
    Ok((row, col, xf))
}

fn decode_cell(record: &BiffRecord, ctx: &mut CellContext<'_>) -> XlsResult<Decoded> {
    let data = &record.data;
    let mut off = 0;

    let decoded = match record.record_type {
        records::LABELSST => {
            let (row, col, _) = cell_header(data, &mut off)?;
            let index = read_u32(data, &mut off)? as usize;
            let text = match ctx.sst.get(index) {
                Some(text) => text.clone(),
                None => {
                    log::warn!("SST index {} out of range ({} strings)", index, ctx.sst.len());
                    String::new()
                }
            };
            Decoded::Cells(vec![(row, col, text)])
        }
        records::LABEL => {
            let (row, col, _) = cell_header(data, &mut off)?;
            Decoded::Cells(vec![(row, col, read_unicode_string(data, &mut off)?)])
        }
        records::NUMBER => {
            let (row, col, xf) = cell_header(data, &mut off)?;
            let value = read_f64(data, &mut off)?;
            Decoded::Cells(vec![(row, col, ctx.number(value, xf))])
        }
        records::RK => {
            let (row, col, xf) = cell_header(data, &mut off)?;
            let value = read_rk(data, &mut off)?;
            Decoded::Cells(vec![(row, col, ctx.number(value, xf))])
        }
        records::MULRK => {
            // row(2) + first_col(2) + [xf(2) + rk(4)]* + last_col(2)
            if data.len() < 6 {
                return Err(XlsError::Parse("MULRK record too short".into()));
            }
            let row = read_u16(data, &mut off)? as usize;
            let mut col = read_u16(data, &mut off)? as usize;
            let end = data.len() - 2;

            let mut cells = Vec::new();
            while off + 6 <= end {
                let xf = read_u16(data, &mut off)?;
                let value = read_rk(data, &mut off)?;
                cells.push((row, col, ctx.number(value, xf)));
                col += 1;
            }
            Decoded::Cells(cells)
        }
        records::BOOLERR => {
            let (row, col, _) = cell_header(data, &mut off)?;
            let value = read_u8(data, &mut off)?;
            let is_error = read_u8(data, &mut off)?;
            let text = if is_error != 0 {
                error_text(value).to_string()
            } else {
                bool_text(value)
            };
            Decoded::Cells(vec![(row, col, text)])
        }
        records::FORMULA => {
            let (row, col, xf) = cell_header(data, &mut off)?;
            let result = read_bytes8(data, &mut off)?;
            if result[6] == 0xFF && result[7] == 0xFF {
                match result[0] {
                    0x00 => Decoded::PendingString(row, col),
                    0x01 => Decoded::Cells(vec![(row, col, bool_text(result[2]))]),
                    0x02 => Decoded::Cells(vec![(row, col, error_text(result[2]).to_string())]),
                    _ => Decoded::Cells(vec![(row, col, String::new())]),
                }
            } else {
                let value = f64::from_le_bytes(result);
                Decoded::Cells(vec![(row, col, ctx.number(value, xf))])
            }
        }
        _ => Decoded::Nothing,
    };
    Ok(decoded)
}

/// `(rows, columns)` from a DIMENSION record body
fn parse_dimension(data: &[u8]) -> XlsResult<(usize, usize)> {
    let mut off = 0;
    let _first_row = read_u32(data, &mut off)?;
    let last_row_plus1 = read_u32(data, &mut off)? as usize;
    let _first_col = read_u16(data, &mut off)?;
    let last_col_plus1 = read_u16(data, &mut off)? as usize;
    Ok((last_row_plus1, last_col_plus1))
}

/// Walk one substream from its BOF, calling `f` for records of the sheet
/// itself (records of embedded substreams are skipped).
fn for_each_record<R: Read, F>(records: &mut RecordReader<R>, mut f: F) -> XlsResult<()>
where
    F: FnMut(&BiffRecord) -> XlsResult<bool>,
{
    let mut depth = 0usize;
    while let Some(record) = records.next_record()? {
        match record.record_type {
            records::BOF => depth += 1,
            records::EOF => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    break;
                }
            }
            _ if depth == 1 => {
                if !f(&record)? {
                    break;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Row/column extent of a cell record without decoding its value
fn cell_extent(record: &BiffRecord) -> Option<(usize, usize)> {
    let data = &record.data;
    let mut off = 0;
    match record.record_type {
        records::LABELSST
        | records::LABEL
        | records::NUMBER
        | records::RK
        | records::BOOLERR
        | records::FORMULA => {
            let row = read_u16(data, &mut off).ok()? as usize;
            let col = read_u16(data, &mut off).ok()? as usize;
            Some((row, col))
        }
        records::MULRK if data.len() >= 6 => {
            let row = read_u16(data, &mut off).ok()? as usize;
            let first_col = read_u16(data, &mut off).ok()? as usize;
            let count = (data.len() - 6) / 6;
            Some((row, first_col + count.saturating_sub(1)))
        }
        _ => None,
    }
}

/// `(rows, columns)` of a worksheet: its DIMENSION record, or the extent of
/// its cells when there is none.
pub fn scan_dimensions<R: Read>(records: &mut RecordReader<R>) -> XlsResult<(usize, usize)> {
    let mut dimension = None;
    let mut extent = (0usize, 0usize);

    for_each_record(records, |record| {
        if record.record_type == records::DIMENSION {
            dimension = Some(parse_dimension(&record.data)?);
            return Ok(false);
        }
        if let Some((row, col)) = cell_extent(record) {
            extent = (extent.0.max(row + 1), extent.1.max(col + 1));
        }
        Ok(true)
    })?;

    Ok(dimension.unwrap_or(extent))
}

/// Rendered cells of one worksheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetCells {
    rows: BTreeMap<usize, BTreeMap<usize, String>>,
    dimension: Option<(usize, usize)>,
}

impl SheetCells {
    /// Read a worksheet substream. `records` must be positioned at the
    /// sheet's BOF.
    pub fn read<R: Read>(records: &mut RecordReader<R>, ctx: &mut CellContext<'_>) -> XlsResult<Self> {
        let mut cells = SheetCells::default();
        let mut pending_string: Option<(usize, usize)> = None;

        for_each_record(records, |record| {
            match record.record_type {
                records::DIMENSION => match parse_dimension(&record.data) {
                    Ok(dimension) => cells.dimension = Some(dimension),
                    Err(e) => log::warn!("malformed DIMENSION record: {}", e),
                },
                records::STRING => {
                    if let Some((row, col)) = pending_string.take() {
                        let mut off = 0;
                        match read_unicode_string(&record.data, &mut off) {
                            Ok(text) => cells.insert(row, col, text),
                            Err(e) => log::warn!("malformed STRING record: {}", e),
                        }
                    }
                }
                _ => match decode_cell(record, ctx) {
                    Ok(Decoded::Cells(decoded)) => {
                        pending_string = None;
                        for (row, col, text) in decoded {
                            cells.insert(row, col, text);
                        }
                    }
                    Ok(Decoded::PendingString(row, col)) => pending_string = Some((row, col)),
                    Ok(Decoded::Nothing) => {}
                    Err(e) => log::warn!(
                        "skipping record 0x{:04X} at offset {}: {}",
                        record.record_type,
                        record.stream_offset,
                        e
                    ),
                },
            }
            Ok(true)
        })?;

        log::debug!(
            "read {} rows of cells (dimension {:?})",
            cells.rows.len(),
            cells.dimension
        );
        Ok(cells)
    }

    fn insert(&mut self, row: usize, col: usize, text: String) {
        self.rows.entry(row).or_default().insert(col, text);
    }

    /// `(rows, columns)`: the DIMENSION record, or the extent of the cells
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimension.unwrap_or_else(|| {
            let rows = self.rows.keys().next_back().map_or(0, |&r| r + 1);
            let cols = self
                .rows
                .values()
                .filter_map(|cells| cells.keys().next_back())
                .max()
                .map_or(0, |&c| c + 1);
            (rows, cols)
        })
    }

    /// Cells of row `index`, up to the last populated column (or
    /// `column_limit`)
    pub fn row(&self, index: usize, column_limit: Option<usize>) -> Row {
        let Some(cells) = self.rows.get(&index) else {
            return Vec::new();
        };
        let mut row = Vec::new();
        for (&col, text) in cells {
            if column_limit.map_or(false, |limit| col >= limit) {
                break;
            }
            row.resize(col, String::new());
            row.push(text.clone());
        }
        row
    }
}
