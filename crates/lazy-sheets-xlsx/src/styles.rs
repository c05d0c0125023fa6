//! Style table (`styles.xml`)
//!
//! Only number formats matter for reading values: the `cellXfs` list maps a
//! cell's `s` attribute to a number-format id, and `numFmts` holds the codes
//! of workbook-defined formats.

use std::collections::HashMap;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};

/// Number-format view of `styles.xml`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleTable {
    /// Position = `cellXfs` index, value = number-format id
    pub formats: Vec<u32>,
    /// Workbook-defined format codes by id
    pub custom_formats: HashMap<u32, String>,
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|s| s.to_string()))
}

fn handle_element(e: &BytesStart<'_>, in_cell_xfs: bool, table: &mut StyleTable) {
    match e.local_name().as_ref() {
        b"xf" if in_cell_xfs => {
            // The declared id applies whether or not applyNumberFormat is set
            let id = attr(e, b"numFmtId")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            table.formats.push(id);
        }
        b"numFmt" => {
            let id = attr(e, b"numFmtId").and_then(|v| v.parse::<u32>().ok());
            let code = attr(e, b"formatCode");
            if let (Some(id), Some(code)) = (id, code) {
                table.custom_formats.insert(id, code);
            }
        }
        _ => {}
    }
}

/// Read the style table from `styles.xml`.
pub fn read_styles<R: BufRead>(reader: R) -> XlsxResult<StyleTable> {
    let mut xml_reader = Reader::from_reader(reader);
    xml_reader.trim_text(true);

    let mut buf = Vec::new();
    let mut table = StyleTable::default();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                if e.local_name().as_ref() == b"cellXfs" {
                    in_cell_xfs = true;
                } else {
                    handle_element(&e, in_cell_xfs, &mut table);
                }
            }
            Ok(Event::Empty(e)) => handle_element(&e, in_cell_xfs, &mut table),
            Ok(Event::End(e)) if e.local_name().as_ref() == b"cellXfs" => in_cell_xfs = false,
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }
        buf.clear();
    }

    log::debug!(
        "style table: {} cell formats, {} custom codes",
        table.formats.len(),
        table.custom_formats.len()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_styles() {
        let xml = br#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1">
    <numFmt numFmtId="164" formatCode="&quot;$&quot;#,##0.00"/>
  </numFmts>
  <cellStyleXfs count="1">
    <xf numFmtId="7" fontId="0"/>
  </cellStyleXfs>
  <cellXfs count="4">
    <xf numFmtId="0" fontId="0"/>
    <xf numFmtId="10" fontId="0" applyNumberFormat="1"/>
    <xf numFmtId="164" applyNumberFormat="1"><alignment horizontal="left"/></xf>
    <xf numFmtId="14"/>
  </cellXfs>
</styleSheet>"#;

        let table = read_styles(&xml[..]).unwrap();
        assert_eq!(table.formats, vec![0, 10, 164, 14]);
        assert_eq!(table.custom_formats[&164], "\"$\"#,##0.00");
    }

    #[test]
    fn test_empty_styles() {
        let table = read_styles(&b"<styleSheet/>"[..]).unwrap();
        assert!(table.formats.is_empty());
    }
}
