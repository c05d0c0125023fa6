//! Workbook manifest (`workbook.xml`) and its relationships

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use crate::package::resolve_target;

/// A `<sheet>` declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetDecl {
    pub name: String,
    /// Relationship id (`rId3`)
    pub r_id: String,
}

impl SheetDecl {
    /// Numeric suffix of the relationship id (`rId3` → 3)
    pub fn rel_number(&self) -> Option<u32> {
        let digits = self.r_id.trim_start_matches(|c: char| !c.is_ascii_digit());
        digits.parse().ok().filter(|&n| n > 0)
    }
}

/// Sheets and settings declared in `workbook.xml`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbookManifest {
    /// Sheets in declaration order
    pub sheets: Vec<SheetDecl>,
    /// `workbookPr date1904`
    pub date1904: bool,
}

/// A relationship from `*.rels`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    /// Resolved part name
    pub target: String,
    pub rel_type: String,
}

impl Relationship {
    /// Whether the relationship type ends with `/kind` (`worksheet`, `styles`, ...)
    pub fn is(&self, kind: &str) -> bool {
        self.rel_type
            .rsplit('/')
            .next()
            .map_or(false, |t| t == kind)
    }
}

fn attr_value(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.local_name().as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().map(|s| s.to_string()))
}

fn is_true(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

/// Read sheet declarations and the date system from `workbook.xml`.
pub fn read_workbook<R: BufRead>(reader: R) -> XlsxResult<WorkbookManifest> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut manifest = WorkbookManifest::default();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"sheet" => {
                    let name = attr_value(&e, b"name");
                    // `r:id`; the local name is unique among sheet attributes
                    let r_id = attr_value(&e, b"id");
                    if let (Some(name), Some(r_id)) = (name, r_id) {
                        manifest.sheets.push(SheetDecl { name, r_id });
                    }
                }
                b"workbookPr" => {
                    manifest.date1904 = attr_value(&e, b"date1904").map_or(false, |v| is_true(&v));
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(manifest)
}

/// Read a relationships part, resolving targets against `base_dir`.
pub fn read_relationships<R: BufRead>(
    reader: R,
    base_dir: &str,
) -> XlsxResult<HashMap<String, Relationship>> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut rels = HashMap::new();

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let id = attr_value(&e, b"Id");
                let target = attr_value(&e, b"Target");
                let rel_type = attr_value(&e, b"Type");

                if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                    rels.insert(
                        id,
                        Relationship {
                            target: resolve_target(base_dir, &target),
                            rel_type,
                        },
                    );
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_workbook() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <workbookPr date1904="1"/>
  <sheets>
    <sheet name="Data" sheetId="1" r:id="rId3"/>
    <sheet name="R&amp;D" sheetId="2" r:id="rId1"/>
  </sheets>
</workbook>"#;

        let manifest = read_workbook(&xml[..]).unwrap();
        assert!(manifest.date1904);
        assert_eq!(
            manifest.sheets,
            vec![
                SheetDecl {
                    name: "Data".into(),
                    r_id: "rId3".into()
                },
                SheetDecl {
                    name: "R&D".into(),
                    r_id: "rId1".into()
                },
            ]
        );
        assert_eq!(manifest.sheets[0].rel_number(), Some(3));
    }

    #[test]
    fn test_rel_number_unresolvable() {
        let decl = SheetDecl {
            name: "x".into(),
            r_id: "rIdX".into(),
        };
        assert_eq!(decl.rel_number(), None);
    }

    #[test]
    fn test_read_relationships() {
        let xml = br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="/xl/styles.xml"/>
</Relationships>"#;

        let rels = read_relationships(&xml[..], "xl").unwrap();
        assert_eq!(rels["rId1"].target, "xl/worksheets/sheet1.xml");
        assert!(rels["rId1"].is("worksheet"));
        assert_eq!(rels["rId2"].target, "xl/styles.xml");
        assert!(rels["rId2"].is("styles"));
    }
}
