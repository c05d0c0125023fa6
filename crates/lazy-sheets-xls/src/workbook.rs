//! Workbook globals substream
//!
//! The globals come first in the `Workbook` stream and hold everything the
//! sheets refer to: shared strings, sheet offsets, number formats, cell
//! formats and the date system.

use std::collections::HashMap;
use std::io::Read;

use crate::biff::parser::{read_u16, read_u32, read_u8};
use crate::biff::records;
use crate::biff::strings::{parse_sst, read_short_string, read_unicode_string};
use crate::biff::{parse_bof, RecordReader};
use crate::error::{XlsError, XlsResult};

/// A BOUNDSHEET record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundSheet {
    /// Absolute byte offset of the sheet's BOF in the Workbook stream
    pub offset: u32,
    /// 0 = visible, 1 = hidden, 2 = very hidden
    pub visibility: u8,
    /// 0 = worksheet, 2 = chart, 6 = macro/VBA
    pub sheet_type: u8,
    pub name: String,
}

impl BoundSheet {
    pub fn is_worksheet(&self) -> bool {
        self.sheet_type == records::SHEET_TYPE_WORKSHEET
    }
}

/// Parsed workbook globals
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Globals {
    pub sst: Vec<String>,
    /// Every BOUNDSHEET in stream order
    pub sheets: Vec<BoundSheet>,
    /// FORMAT records: format index → code
    pub formats: HashMap<u32, String>,
    /// Format index of each XF record, by XF index
    pub xf_formats: Vec<u32>,
    pub date1904: bool,
}

/// Parse a BOUNDSHEET record body.
pub fn parse_boundsheet(data: &[u8]) -> XlsResult<BoundSheet> {
    let mut offset = 0;
    let abs_offset = read_u32(data, &mut offset)?;
    let visibility = read_u8(data, &mut offset)?;
    let sheet_type = read_u8(data, &mut offset)?;
    let name = read_short_string(data, &mut offset)?;

    Ok(BoundSheet {
        offset: abs_offset,
        visibility,
        sheet_type,
        name,
    })
}

/// Parse a FORMAT record: `ifmt` (u16) + unicode string.
pub fn parse_format(data: &[u8]) -> XlsResult<(u32, String)> {
    let mut off = 0;
    let ifmt = read_u16(data, &mut off)?;
    let code = read_unicode_string(data, &mut off)?;
    Ok((ifmt as u32, code))
}

/// Format index of an XF record (`ifnt` u16, then `ifmt` u16).
pub fn parse_xf_format(data: &[u8]) -> XlsResult<u32> {
    let mut off = 2;
    read_u16(data, &mut off).map(u32::from)
}

/// Read the globals substream. `records` must be at the start of the
/// Workbook stream.
pub fn read_globals<R: Read>(records: &mut RecordReader<R>) -> XlsResult<Globals> {
    let first = records
        .next_record()?
        .ok_or_else(|| XlsError::InvalidFormat("empty Workbook stream".into()))?;
    if first.record_type != records::BOF {
        return Err(XlsError::InvalidFormat(
            "Workbook stream does not start with BOF".into(),
        ));
    }
    let (version, dt) = parse_bof(&first.data)?;
    if dt != records::BOF_WORKBOOK_GLOBALS {
        return Err(XlsError::InvalidFormat(format!(
            "expected workbook globals, got substream type 0x{:04X}",
            dt
        )));
    }
    if version != records::BIFF8_VERSION {
        return Err(XlsError::UnsupportedVersion(format!(
            "expected BIFF8 (0x0600), got 0x{:04X}",
            version
        )));
    }

    let mut globals = Globals::default();
    while let Some(rec) = records.next_record()? {
        match rec.record_type {
            records::EOF => break,
            records::SST => globals.sst = parse_sst(&rec.data, &rec.continue_offsets)?,
            records::BOUNDSHEET => globals.sheets.push(parse_boundsheet(&rec.data)?),
            records::DATEMODE => {
                let mut off = 0;
                globals.date1904 = read_u16(&rec.data, &mut off).map_or(false, |mode| mode == 1);
            }
            records::FORMAT => match parse_format(&rec.data) {
                Ok((id, code)) => {
                    globals.formats.insert(id, code);
                }
                Err(e) => log::warn!("skipping FORMAT record: {}", e),
            },
            records::XF => match parse_xf_format(&rec.data) {
                Ok(id) => globals.xf_formats.push(id),
                Err(e) => {
                    // Keep XF indices aligned
                    log::warn!("malformed XF record: {}", e);
                    globals.xf_formats.push(0);
                }
            },
            _ => {}
        }
    }

    log::debug!(
        "workbook globals: {} sheets, {} shared strings, {} XFs, date1904={}",
        globals.sheets.len(),
        globals.sst.len(),
        globals.xf_formats.len(),
        globals.date1904
    );
    Ok(globals)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_boundsheet() {
        let mut data = Vec::new();
        data.extend_from_slice(&0x1234u32.to_le_bytes());
        data.extend_from_slice(&[0x00, 0x00, 0x04, 0x00]);
        data.extend_from_slice(b"Data");

        let sheet = parse_boundsheet(&data).unwrap();
        assert_eq!(sheet.offset, 0x1234);
        assert_eq!(sheet.name, "Data");
        assert!(sheet.is_worksheet());
    }

    #[test]
    fn test_parse_format() {
        let mut data = vec![0xA4, 0x00, 0x04, 0x00, 0x00];
        data.extend_from_slice(b"0.0%");
        assert_eq!(parse_format(&data).unwrap(), (164, "0.0%".to_string()));
    }

    #[test]
    fn test_parse_xf_format() {
        let mut data = vec![0u8; 20];
        data[2] = 0x0E;
        assert_eq!(parse_xf_format(&data).unwrap(), 14);
        assert!(parse_xf_format(&[0, 0, 1]).is_err());
    }
}
