//! DOCTYPE scan for package parts
//!
//! Parts are rejected outright when they declare a DOCTYPE, in plain or
//! NUL-interleaved (UTF-16) form, before any XML parser sees them.

use std::io::{Read, Write};

use lazy_regex::bytes_regex;

use crate::error::{XlsxError, XlsxResult};

const CHUNK_SIZE: usize = 64 * 1024;
/// Bytes carried between chunks; longer than the widest marker match
const OVERLAP: usize = 32;

fn contains_doctype(bytes: &[u8]) -> bool {
    bytes_regex!(r"\x00?<\x00?!\x00?D\x00?O\x00?C\x00?T\x00?Y\x00?P\x00?E\x00?").is_match(bytes)
}

/// Reject `bytes` if they contain a DOCTYPE marker.
pub fn scan_bytes(bytes: &[u8], part: &str) -> XlsxResult<()> {
    if contains_doctype(bytes) {
        log::warn!("DOCTYPE found in {}", part);
        return Err(XlsxError::Security(part.to_string()));
    }
    Ok(())
}

/// Copy `reader` into `writer`, scanning every byte on the way.
///
/// Returns the number of bytes copied. The copy stops at the first marker.
pub fn copy_scanned<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    part: &str,
) -> XlsxResult<u64> {
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut window: Vec<u8> = Vec::with_capacity(CHUNK_SIZE + OVERLAP);
    let mut copied = 0u64;

    loop {
        let n = match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        window.extend_from_slice(&chunk[..n]);
        scan_bytes(&window, part)?;
        writer.write_all(&chunk[..n])?;
        copied += n as u64;

        if window.len() > OVERLAP {
            window.drain(..window.len() - OVERLAP);
        }
    }

    writer.flush()?;
    Ok(copied)
}
