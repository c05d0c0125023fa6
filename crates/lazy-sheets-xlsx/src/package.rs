//! The zip package behind an XLSX file
//!
//! Parts are extracted on demand into a private temporary directory and
//! scanned for DOCTYPE declarations on the way. The directory (and every
//! extracted part) is removed when the package is dropped.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, Read};
use std::path::{Component, Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tempfile::TempDir;
use zip::ZipArchive;

use crate::error::{XlsxError, XlsxResult};
use crate::security::{copy_scanned, scan_bytes};

/// Package relationships part
pub const ROOT_RELS: &str = "_rels/.rels";
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// An open XLSX package.
pub struct Package {
    path: PathBuf,
    archive: ZipArchive<BufReader<File>>,
    temp: TempDir,
    /// Extracted part name → file in `temp`
    extracted: HashMap<String, PathBuf>,
    /// Part name of the workbook (usually `xl/workbook.xml`)
    workbook_part: String,
}

impl std::fmt::Debug for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Package")
            .field("path", &self.path)
            .field("temp", &self.temp.path())
            .field("workbook_part", &self.workbook_part)
            .finish()
    }
}

impl Package {
    /// Open and validate a package.
    ///
    /// Fails with `NotFound` for a missing file and `InvalidFormat` when the
    /// file is not a zip archive or has no office document pointing at a
    /// `workbook.xml`.
    pub fn open(path: &Path, temp_dir: Option<&Path>) -> XlsxResult<Self> {
        let mut archive = open_archive(path)?;
        let workbook_part = office_document(&mut archive)?;

        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix("lazy-sheets-");
            builder
        };
        let temp = match temp_dir {
            Some(dir) => builder.tempdir_in(dir)?,
            None => builder.tempdir()?,
        };

        log::debug!(
            "opened {} (workbook at {}, extracting to {})",
            path.display(),
            workbook_part,
            temp.path().display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            archive,
            temp,
            extracted: HashMap::new(),
            workbook_part,
        })
    }

    /// Path of the package file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding extracted parts
    pub fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    /// Part name of the workbook
    pub fn workbook_part(&self) -> &str {
        &self.workbook_part
    }

    /// Directory of the workbook part (`xl` for `xl/workbook.xml`)
    pub fn workbook_dir(&self) -> &str {
        self.workbook_part
            .rsplit_once('/')
            .map_or("", |(dir, _)| dir)
    }

    /// Whether the package contains a part
    pub fn has_part(&self, name: &str) -> bool {
        self.archive.index_for_name(name).is_some()
    }

    /// Extract a part to the temp directory, returning its path.
    ///
    /// Returns `None` if the package has no such part. Parts are extracted
    /// once; later calls return the same file.
    pub fn extract(&mut self, name: &str) -> XlsxResult<Option<PathBuf>> {
        if let Some(path) = self.extracted.get(name) {
            return Ok(Some(path.clone()));
        }
        if !self.has_part(name) {
            return Ok(None);
        }

        let target = self.temp.path().join(sanitize(name));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }

        let part = self.archive.by_name(name)?;
        let out = File::create(&target)?;
        let size = copy_scanned(part, out, name)?;
        log::trace!("extracted {} ({} bytes)", name, size);

        self.extracted.insert(name.to_string(), target.clone());
        Ok(Some(target))
    }
}

fn open_archive(path: &Path) -> XlsxResult<ZipArchive<BufReader<File>>> {
    if !path.is_file() {
        return Err(XlsxError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(|_| XlsxError::NotFound(path.to_path_buf()))?;

    ZipArchive::new(BufReader::new(file)).map_err(|e| {
        XlsxError::InvalidFormat(format!(
            "The file [{}] is not recognised as a zip archive: {}",
            path.display(),
            e
        ))
    })
}

/// Find the office document relationship in `_rels/.rels` and return the
/// workbook part it points at.
fn office_document<R: Read + std::io::Seek>(archive: &mut ZipArchive<R>) -> XlsxResult<String> {
    let mut rels = Vec::new();
    archive
        .by_name(ROOT_RELS)
        .map_err(|_| XlsxError::InvalidFormat(format!("missing {}", ROOT_RELS)))?
        .read_to_end(&mut rels)?;
    scan_bytes(&rels, ROOT_RELS)?;

    let mut xml_reader = Reader::from_reader(rels.as_slice());
    xml_reader.trim_text(true);
    let mut buf = Vec::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut target = None;
                let mut rel_type = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Target" => target = attr.unescape_value().ok().map(|s| s.to_string()),
                        b"Type" => rel_type = attr.unescape_value().ok().map(|s| s.to_string()),
                        _ => {}
                    }
                }

                if let (Some(target), Some(rel_type)) = (target, rel_type) {
                    let basename = target.rsplit('/').next().unwrap_or_default();
                    if rel_type.ends_with(OFFICE_DOCUMENT_REL) && basename == "workbook.xml" {
                        return Ok(target.trim_start_matches('/').to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(XlsxError::InvalidFormat(format!(
                    "unparsable {}: {}",
                    ROOT_RELS, e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    Err(XlsxError::InvalidFormat(
        "no office document relationship to workbook.xml".into(),
    ))
}

/// Whether `path` looks like an XLSX package (readable zip with an office
/// document pointing at a workbook).
pub fn is_package(path: &Path) -> bool {
    open_archive(path)
        .and_then(|mut archive| office_document(&mut archive))
        .is_ok()
}

/// Resolve a relationship target against the directory of its source part.
pub fn resolve_target(base_dir: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut parts: Vec<&str> = base_dir.split('/').filter(|p| !p.is_empty()).collect();
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// Map a part name onto a relative path that stays inside the temp dir.
fn sanitize(name: &str) -> PathBuf {
    Path::new(name)
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("xl", "worksheets/sheet1.xml"), "xl/worksheets/sheet1.xml");
        assert_eq!(resolve_target("xl", "/xl/worksheets/sheet2.xml"), "xl/worksheets/sheet2.xml");
        assert_eq!(resolve_target("xl/worksheets", "../sharedStrings.xml"), "xl/sharedStrings.xml");
        assert_eq!(resolve_target("", "xl/workbook.xml"), "xl/workbook.xml");
    }

    #[test]
    fn test_sanitize_stays_relative() {
        assert_eq!(sanitize("xl/worksheets/sheet1.xml"), PathBuf::from("xl/worksheets/sheet1.xml"));
        assert_eq!(sanitize("../../etc/passwd"), PathBuf::from("etc/passwd"));
        assert_eq!(sanitize("/abs/part.xml"), PathBuf::from("abs/part.xml"));
    }
}
