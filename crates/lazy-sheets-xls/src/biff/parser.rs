//! Low-level binary parsing helpers for BIFF8 records.
//!
//! All multi-byte integers in BIFF8 are little-endian.

use crate::error::{XlsError, XlsResult};

fn take<'a>(data: &'a [u8], offset: &mut usize, len: usize) -> XlsResult<&'a [u8]> {
    let end = offset.checked_add(len).filter(|&end| end <= data.len());
    match end {
        Some(end) => {
            let bytes = &data[*offset..end];
            *offset = end;
            Ok(bytes)
        }
        None => Err(XlsError::Parse(format!(
            "unexpected end of data at offset {}, need {} bytes",
            *offset, len
        ))),
    }
}

/// Read a `u8` at `offset`, advancing `offset`.
#[inline]
pub fn read_u8(data: &[u8], offset: &mut usize) -> XlsResult<u8> {
    Ok(take(data, offset, 1)?[0])
}

/// Read a `u16` at `offset`, advancing `offset`.
#[inline]
pub fn read_u16(data: &[u8], offset: &mut usize) -> XlsResult<u16> {
    let b = take(data, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

/// Read a `u32` at `offset`, advancing `offset`.
#[inline]
pub fn read_u32(data: &[u8], offset: &mut usize) -> XlsResult<u32> {
    let b = take(data, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

/// Read 8 raw bytes at `offset`, advancing `offset`.
#[inline]
pub fn read_bytes8(data: &[u8], offset: &mut usize) -> XlsResult<[u8; 8]> {
    let mut out = [0u8; 8];
    out.copy_from_slice(take(data, offset, 8)?);
    Ok(out)
}

/// Read an IEEE 754 double at `offset`, advancing `offset`.
#[inline]
pub fn read_f64(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    read_bytes8(data, offset).map(f64::from_le_bytes)
}

/// Decode an RK-encoded number.
///
/// - Bit 0: divide the decoded number by 100
/// - Bit 1: bits 2..31 are a signed 30-bit integer; otherwise they are the
///   upper 30 bits of a double whose lower 34 bits are zero
#[inline]
pub fn decode_rk(rk: u32) -> f64 {
    let div100 = (rk & 0x01) != 0;
    let is_integer = (rk & 0x02) != 0;

    let value = if is_integer {
        ((rk as i32) >> 2) as f64
    } else {
        f64::from_bits(((rk & 0xFFFF_FFFC) as u64) << 32)
    };

    if div100 {
        value / 100.0
    } else {
        value
    }
}

/// Read an RK value at `offset`, advancing `offset`.
#[inline]
pub fn read_rk(data: &[u8], offset: &mut usize) -> XlsResult<f64> {
    read_u32(data, offset).map(decode_rk)
}
