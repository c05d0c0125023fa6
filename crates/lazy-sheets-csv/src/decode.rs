//! Transcoding reader
//!
//! Wraps a byte stream in any supported encoding and yields UTF-8, so the
//! CSV parser only ever sees UTF-8 (delimiters in UTF-16 input are not
//! single bytes).

use std::io::{self, Read};

use crate::detect::TextEncoding;

const CHUNK_SIZE: usize = 8 * 1024;

enum Decoder {
    Standard(encoding_rs::Decoder),
    Utf32 { big_endian: bool },
}

/// `Read` adapter decoding `inner` to UTF-8.
///
/// The byte-order mark must already have been skipped. Malformed sequences
/// become U+FFFD.
pub struct DecodingReader<R> {
    inner: R,
    decoder: Decoder,
    /// Bytes read but not decoded yet (a character split across chunks)
    pending: Vec<u8>,
    output: Vec<u8>,
    out_pos: usize,
    eof: bool,
}

impl<R: Read> DecodingReader<R> {
    pub fn new(inner: R, encoding: TextEncoding) -> Self {
        let decoder = match encoding {
            TextEncoding::Standard(encoding) => {
                Decoder::Standard(encoding.new_decoder_without_bom_handling())
            }
            TextEncoding::Utf32Le => Decoder::Utf32 { big_endian: false },
            TextEncoding::Utf32Be => Decoder::Utf32 { big_endian: true },
        };
        Self {
            inner,
            decoder,
            pending: Vec::new(),
            output: Vec::new(),
            out_pos: 0,
            eof: false,
        }
    }

    fn read_chunk(&mut self) -> io::Result<usize> {
        let mut chunk = [0u8; CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(n) => {
                    self.pending.extend_from_slice(&chunk[..n]);
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Decode the next chunk into `output`.
    fn fill(&mut self) -> io::Result<()> {
        self.output.clear();
        self.out_pos = 0;

        let last = self.read_chunk()? == 0;

        match &mut self.decoder {
            Decoder::Standard(decoder) => {
                let capacity = decoder
                    .max_utf8_buffer_length(self.pending.len())
                    .unwrap_or(self.pending.len() * 3 + 16);
                let mut text = String::with_capacity(capacity);
                let (_, consumed, _) = decoder.decode_to_string(&self.pending, &mut text, last);
                self.pending.drain(..consumed);
                self.output.extend_from_slice(text.as_bytes());
            }
            Decoder::Utf32 { big_endian } => {
                let whole = self.pending.len() / 4 * 4;
                let mut utf8 = [0u8; 4];
                for unit in self.pending[..whole].chunks_exact(4) {
                    let bytes = [unit[0], unit[1], unit[2], unit[3]];
                    let scalar = if *big_endian {
                        u32::from_be_bytes(bytes)
                    } else {
                        u32::from_le_bytes(bytes)
                    };
                    let c = char::from_u32(scalar).unwrap_or(char::REPLACEMENT_CHARACTER);
                    self.output.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                }
                self.pending.drain(..whole);
                if last && !self.pending.is_empty() {
                    self.pending.clear();
                    self.output
                        .extend_from_slice(char::REPLACEMENT_CHARACTER.encode_utf8(&mut utf8).as_bytes());
                }
            }
        }

        if last {
            self.eof = true;
        }
        Ok(())
    }
}

impl<R: Read> Read for DecodingReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.out_pos >= self.output.len() {
            if self.eof {
                return Ok(0);
            }
            self.fill()?;
        }

        let available = &self.output[self.out_pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.out_pos += n;
        Ok(n)
    }
}
