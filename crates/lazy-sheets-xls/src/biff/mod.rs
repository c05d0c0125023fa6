//! BIFF8 (Binary Interchange File Format) handling.
//!
//! A BIFF8 stream is a sequence of records, each with a 4-byte header
//! (2 bytes record type + 2 bytes body length) followed by the body.
//! CONTINUE records (type 0x003C) extend the body of the preceding record
//! beyond the 8224-byte per-record limit.

pub mod parser;
pub mod records;
pub mod strings;

use std::io::{ErrorKind, Read};

use crate::error::{XlsError, XlsResult};

/// A single BIFF8 record with its CONTINUE bodies merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiffRecord {
    /// Record type ID (e.g. `records::SST`, `records::NUMBER`).
    pub record_type: u16,
    /// Record body bytes (CONTINUE records concatenated).
    pub data: Vec<u8>,
    /// Offsets in `data` where each CONTINUE body starts.
    pub continue_offsets: Vec<usize>,
    /// Byte offset of this record's header in the stream.
    pub stream_offset: u64,
}

#[derive(Debug, Clone, Copy)]
struct Header {
    record_type: u16,
    len: usize,
    offset: u64,
}

/// Lazy record iterator over a BIFF8 stream.
///
/// Records are read one at a time; only the header following a record is
/// looked at ahead to merge CONTINUE bodies.
pub struct RecordReader<R> {
    inner: R,
    offset: u64,
    lookahead: Option<Header>,
    done: bool,
}

impl<R: Read> RecordReader<R> {
    /// Read records from `inner`, which is positioned at `start_offset` of
    /// the stream.
    pub fn new(inner: R, start_offset: u64) -> Self {
        Self {
            inner,
            offset: start_offset,
            lookahead: None,
            done: false,
        }
    }

    fn read_header(&mut self) -> XlsResult<Option<Header>> {
        let mut buf = [0u8; 4];
        match self.inner.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(XlsError::Io(e)),
        }
        let header = Header {
            record_type: u16::from_le_bytes([buf[0], buf[1]]),
            len: u16::from_le_bytes([buf[2], buf[3]]) as usize,
            offset: self.offset,
        };
        self.offset += 4;
        Ok(Some(header))
    }

    fn read_body(&mut self, header: Header) -> XlsResult<Vec<u8>> {
        let mut body = Vec::with_capacity(header.len);
        (&mut self.inner)
            .take(header.len as u64)
            .read_to_end(&mut body)?;
        self.offset += body.len() as u64;
        if body.len() < header.len {
            log::warn!(
                "record 0x{:04X} at offset {} truncated ({} of {} bytes)",
                header.record_type,
                header.offset,
                body.len(),
                header.len
            );
            self.done = true;
        }
        Ok(body)
    }

    /// Read the next record, or `None` at the end of the stream.
    pub fn next_record(&mut self) -> XlsResult<Option<BiffRecord>> {
        let header = match self.lookahead.take() {
            Some(header) => header,
            None => {
                if self.done {
                    return Ok(None);
                }
                match self.read_header()? {
                    Some(header) => header,
                    None => {
                        self.done = true;
                        return Ok(None);
                    }
                }
            }
        };

        let mut data = self.read_body(header)?;
        let mut continue_offsets = Vec::new();

        while !self.done {
            match self.read_header()? {
                Some(next) if next.record_type == records::CONTINUE => {
                    continue_offsets.push(data.len());
                    let body = self.read_body(next)?;
                    data.extend_from_slice(&body);
                }
                Some(next) => {
                    self.lookahead = Some(next);
                    break;
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }

        Ok(Some(BiffRecord {
            record_type: header.record_type,
            data,
            continue_offsets,
            stream_offset: header.offset,
        }))
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = XlsResult<BiffRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_record().transpose()
    }
}

/// Extract the BOF record fields from a record body.
///
/// Returns `(version, substream_type)`.
pub fn parse_bof(data: &[u8]) -> XlsResult<(u16, u16)> {
    if data.len() < 4 {
        return Err(XlsError::InvalidFormat("BOF record too short".into()));
    }
    let version = u16::from_le_bytes([data[0], data[1]]);
    let dt = u16::from_le_bytes([data[2], data[3]]);
    Ok((version, dt))
}
