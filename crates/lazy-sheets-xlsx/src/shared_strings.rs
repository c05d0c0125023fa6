//! Shared-string table (`sharedStrings.xml`)
//!
//! Small tables are read once into memory. Tables declaring more strings than
//! the cache limit are never loaded; each lookup scans forward through the
//! extracted part instead, reopening it when asked for an earlier index.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::escape::decode_excel_escapes;

type XmlReader = Reader<BufReader<File>>;

fn open_reader(path: &Path) -> XlsxResult<XmlReader> {
    let mut reader = Reader::from_reader(BufReader::new(File::open(path)?));
    // Leading and trailing spaces are part of the strings
    reader.trim_text(false);
    Ok(reader)
}

/// Read the next `<si>` entry, concatenating its text runs.
///
/// Phonetic runs (`<rPh>`) are not part of the displayed text.
fn read_next_item<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>) -> XlsxResult<Option<String>> {
    let mut text = String::new();
    let mut in_item = false;
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        buf.clear();
        match reader.read_event_into(buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_item = true;
                    text.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_item && !in_phonetic => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"si" => {
                return Ok(Some(String::new()));
            }
            Ok(Event::Text(e)) if in_text => {
                text.push_str(&e.unescape()?);
            }
            Ok(Event::CData(e)) if in_text => {
                text.push_str(&String::from_utf8_lossy(&e));
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"rPh" => in_phonetic = false,
                b"si" => return Ok(Some(decode_excel_escapes(&text).into_owned())),
                _ => {}
            },
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
    }
}

/// Read the declared `count` of the root `sst` element.
fn read_declared_count<R: BufRead>(reader: &mut Reader<R>, buf: &mut Vec<u8>) -> XlsxResult<usize> {
    loop {
        buf.clear();
        match reader.read_event_into(buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"sst" => {
                let count = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.as_ref() == b"count")
                    .and_then(|a| a.unescape_value().ok().and_then(|v| v.trim().parse().ok()))
                    .unwrap_or(0);
                return Ok(count);
            }
            Ok(Event::Eof) => return Ok(0),
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
    }
}

/// Forward-only lookup state for uncached tables
struct ScanCursor {
    reader: XmlReader,
    buf: Vec<u8>,
    /// Index of the next `<si>` the reader will produce
    next_index: usize,
    /// Most recent lookup
    last: Option<(usize, String)>,
}

/// Shared-string lookup for one package
pub struct SharedStrings {
    path: Option<PathBuf>,
    declared_count: usize,
    cache: Option<Vec<String>>,
    cursor: Option<ScanCursor>,
}

impl std::fmt::Debug for SharedStrings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedStrings")
            .field("path", &self.path)
            .field("declared_count", &self.declared_count)
            .field("cached", &self.cache.as_ref().map(Vec::len))
            .finish()
    }
}

impl SharedStrings {
    /// A package without a shared-string table
    pub fn empty() -> Self {
        Self {
            path: None,
            declared_count: 0,
            cache: Some(Vec::new()),
            cursor: None,
        }
    }

    /// Open an extracted `sharedStrings.xml`.
    ///
    /// The table is cached in one pass when its declared count is non-zero
    /// and within `limit` (`None` = no limit); otherwise nothing beyond the
    /// root element is read.
    pub fn open(path: &Path, limit: Option<usize>) -> XlsxResult<Self> {
        let mut reader = open_reader(path)?;
        let mut buf = Vec::new();
        let declared_count = read_declared_count(&mut reader, &mut buf)?;

        let mut strings = Self {
            path: Some(path.to_path_buf()),
            declared_count,
            cache: None,
            cursor: None,
        };

        if declared_count == 0 || limit.map_or(false, |limit| declared_count > limit) {
            log::debug!(
                "shared string cache disabled ({} strings declared, limit {:?})",
                declared_count,
                limit
            );
            return Ok(strings);
        }

        let mut cache = Vec::new();
        while let Some(item) = read_next_item(&mut reader, &mut buf)? {
            cache.push(item);
        }
        log::debug!("cached {} shared strings", cache.len());
        strings.cache = Some(cache);
        Ok(strings)
    }

    /// `count` declared by the table
    pub fn declared_count(&self) -> usize {
        self.declared_count
    }

    /// Whether lookups are served from memory
    pub fn is_cached(&self) -> bool {
        self.cache.is_some()
    }

    /// Look up a string by 0-based index. `None` if the table has no such
    /// entry.
    pub fn get(&mut self, index: usize) -> XlsxResult<Option<String>> {
        if let Some(cache) = &self.cache {
            return Ok(cache.get(index).cloned());
        }
        let Some(path) = &self.path else {
            return Ok(None);
        };

        if let Some(ScanCursor {
            last: Some((last, text)),
            ..
        }) = &self.cursor
        {
            if *last == index {
                return Ok(Some(text.clone()));
            }
        }

        let restart = self
            .cursor
            .as_ref()
            .map_or(true, |cursor| index < cursor.next_index);
        if restart {
            log::trace!("rescanning shared strings for index {}", index);
            self.cursor = Some(ScanCursor {
                reader: open_reader(path)?,
                buf: Vec::new(),
                next_index: 0,
                last: None,
            });
        }

        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        while cursor.next_index <= index {
            let Some(item) = read_next_item(&mut cursor.reader, &mut cursor.buf)? else {
                return Ok(None);
            };
            let current = cursor.next_index;
            cursor.next_index += 1;
            if current == index {
                cursor.last = Some((current, item.clone()));
                return Ok(Some(item));
            }
        }
        Ok(None)
    }
}
