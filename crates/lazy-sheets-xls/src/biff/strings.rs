//! BIFF8 Unicode string decoding.
//!
//! A BIFF8 string is `char_count` (1 or 2 bytes) + flags (1 byte), then:
//! - flags bit 0 (`fHighByte`): 0 = compressed Latin-1, 1 = UTF-16LE
//! - flags bit 2 (`fExtSt`): 4-byte extended data size follows
//! - flags bit 3 (`fRichSt`): 2-byte run count follows
//!
//! then the character data, the rich text runs (4 bytes each) and the
//! extended data. In the SST a string's character data may continue in the
//! next CONTINUE record, which then starts with a fresh flags byte that can
//! switch between compressed and UTF-16.

use super::parser::{read_u16, read_u32, read_u8};
use crate::error::{XlsError, XlsResult};

const HIGH_BYTE: u8 = 0x01;
const EXT_ST: u8 = 0x04;
const RICH_ST: u8 = 0x08;

/// Read a BIFF8 "short" string (1-byte length prefix, used in BOUNDSHEET).
pub fn read_short_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    let char_count = read_u8(data, offset)? as usize;
    let flags = read_u8(data, offset)?;
    read_characters(data, offset, char_count, flags & HIGH_BYTE != 0)
}

/// Read a BIFF8 Unicode string with a 2-byte length prefix (LABEL, FORMAT,
/// STRING).
pub fn read_unicode_string(data: &[u8], offset: &mut usize) -> XlsResult<String> {
    read_split_string(data, offset, &[])
}

fn read_characters(data: &[u8], offset: &mut usize, count: usize, wide: bool) -> XlsResult<String> {
    let byte_len = if wide { count * 2 } else { count };
    if *offset + byte_len > data.len() {
        return Err(XlsError::Parse(format!(
            "string data too short: need {} bytes at offset {}, have {}",
            byte_len,
            *offset,
            data.len().saturating_sub(*offset)
        )));
    }

    let bytes = &data[*offset..*offset + byte_len];
    *offset += byte_len;
    if wide {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        Ok(String::from_utf16_lossy(&units))
    } else {
        Ok(bytes.iter().map(|&b| b as char).collect())
    }
}

/// Read one string whose character data may be split at `boundaries`
/// (offsets where a CONTINUE body starts).
fn read_split_string(data: &[u8], offset: &mut usize, boundaries: &[usize]) -> XlsResult<String> {
    let char_count = read_u16(data, offset)? as usize;
    let flags = read_u8(data, offset)?;

    let run_count = if flags & RICH_ST != 0 {
        read_u16(data, offset)? as usize
    } else {
        0
    };
    let ext_size = if flags & EXT_ST != 0 {
        read_u32(data, offset)? as usize
    } else {
        0
    };

    let mut text = String::with_capacity(char_count);
    let mut remaining = char_count;
    let mut wide = flags & HIGH_BYTE != 0;

    while remaining > 0 {
        let boundary = boundaries
            .iter()
            .copied()
            .find(|&b| b >= *offset)
            .unwrap_or(data.len());

        let width = if wide { 2 } else { 1 };
        let available = (boundary - *offset) / width;
        let count = remaining.min(available);
        text.push_str(&read_characters(data, offset, count, wide)?);
        remaining -= count;

        if remaining > 0 {
            if *offset >= data.len() {
                return Err(XlsError::Parse(format!(
                    "string truncated with {} characters left",
                    remaining
                )));
            }
            // Continuation starts with its own flags byte
            *offset = boundary;
            wide = read_u8(data, offset)? & HIGH_BYTE != 0;
        }
    }

    *offset += run_count * 4 + ext_size;
    Ok(text)
}

/// Parse the SST (Shared String Table) record body.
///
/// The body starts with the total number of string references (u32) and
/// the number of unique strings (u32), followed by the strings.
/// `boundaries` are the record's CONTINUE offsets.
pub fn parse_sst(data: &[u8], boundaries: &[usize]) -> XlsResult<Vec<String>> {
    let mut offset = 0;

    let _total_strings = read_u32(data, &mut offset)?;
    let unique_count = read_u32(data, &mut offset)? as usize;

    let mut strings = Vec::with_capacity(unique_count.min(data.len()));

    for i in 0..unique_count {
        match read_split_string(data, &mut offset, boundaries) {
            Ok(s) => strings.push(s),
            Err(e) => {
                // Some writers pad or truncate the table
                log::warn!("SST parse error at string {}/{}: {}", i, unique_count, e);
                break;
            }
        }
    }

    Ok(strings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_compressed_string() {
        let data = [0x03, 0x00, 0x00, b'A', b'B', b'C'];
        let mut offset = 0;
        assert_eq!(read_unicode_string(&data, &mut offset).unwrap(), "ABC");
        assert_eq!(offset, 6);
    }

    #[test]
    fn test_read_wide_string() {
        let data = [0x02, 0x00, 0x01, b'H', 0x00, b'i', 0x00];
        let mut offset = 0;
        assert_eq!(read_unicode_string(&data, &mut offset).unwrap(), "Hi");
        assert_eq!(offset, 7);
    }

    #[test]
    fn test_rich_text_runs_skipped() {
        // 2 chars, rich flag, 1 run
        let data = [0x02, 0x00, 0x08, 0x01, 0x00, b'O', b'K', 0, 0, 1, 0, 0xFF];
        let mut offset = 0;
        assert_eq!(read_unicode_string(&data, &mut offset).unwrap(), "OK");
        assert_eq!(offset, 11);
    }

    #[test]
    fn test_read_short_string() {
        let data = [0x02, 0x00, b'O', b'K'];
        let mut offset = 0;
        assert_eq!(read_short_string(&data, &mut offset).unwrap(), "OK");
    }

    #[test]
    fn test_parse_sst() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&[0x01, 0x00, 0x00, b'A']);
        buf.extend_from_slice(&[0x02, 0x00, 0x00, b'B', b'C']);

        assert_eq!(parse_sst(&buf, &[]).unwrap(), vec!["A", "BC"]);
    }

    #[test]
    fn test_sst_string_split_across_continue() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&1u32.to_le_bytes());
        buf.extend_from_slice(&1u32.to_le_bytes());
        // "Héllo": first two chars compressed, the rest continues as UTF-16
        buf.extend_from_slice(&[0x05, 0x00, 0x00, b'H', 0xE9]);
        let boundary = buf.len();
        buf.push(0x01);
        for c in ['l', 'l', 'o'] {
            buf.extend_from_slice(&(c as u16).to_le_bytes());
        }

        assert_eq!(parse_sst(&buf, &[boundary]).unwrap(), vec!["Héllo"]);
    }

    #[test]
    fn test_sst_string_starting_at_continue() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&[0x01, 0x00, 0x00, b'A']);
        let boundary = buf.len();
        // A new string at a boundary has no extra flags byte
        buf.extend_from_slice(&[0x01, 0x00, 0x00, b'B']);

        assert_eq!(parse_sst(&buf, &[boundary]).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn test_truncated_sst_keeps_complete_strings() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&2u32.to_le_bytes());
        buf.extend_from_slice(&[0x01, 0x00, 0x00, b'A']);
        buf.extend_from_slice(&[0x05, 0x00, 0x00, b'B']);

        assert_eq!(parse_sst(&buf, &[]).unwrap(), vec!["A"]);
    }
}
