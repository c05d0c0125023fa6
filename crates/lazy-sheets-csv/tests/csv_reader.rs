//! End-to-end tests for lazy-sheets-csv.

use std::path::{Path, PathBuf};

use lazy_sheets_core::{Error, ReadOptions, SheetReader};
use lazy_sheets_csv::{can_read, open, CsvOptions, CsvReader};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn reader(path: &Path) -> CsvReader {
    open(path, CsvOptions::default(), ReadOptions::default()).unwrap()
}

fn read_all(reader: &mut CsvReader) -> Vec<Vec<String>> {
    reader.rows().collect::<Result<_, _>>().unwrap()
}

fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}

#[test]
fn test_read_quoted_fields() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "data.csv",
        b"name,note\r\n\"Smith, J\",\"two\nlines\"\r\nplain,\"say \"\"hi\"\"\"\r\n",
    );

    let mut reader = reader(&path);
    assert_eq!(reader.source().input_encoding(), "UTF-8");
    assert_eq!(
        read_all(&mut reader),
        vec![
            row(&["name", "note"]),
            row(&["Smith, J", "two\nlines"]),
            row(&["plain", "say \"hi\""]),
        ]
    );
}

#[test]
fn test_values_stay_text() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "numbers.csv", b"007,1.50,1e3\n");

    let mut reader = reader(&path);
    assert_eq!(read_all(&mut reader), vec![row(&["007", "1.50", "1e3"])]);
}

#[test]
fn test_sep_line_sets_delimiter() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "sep.csv", b"sep=;\r\na;b,c\r\n1;2\r\n");

    let mut reader = reader(&path);
    assert_eq!(reader.source().delimiter(), b';');
    assert_eq!(read_all(&mut reader), vec![row(&["a", "b,c"]), row(&["1", "2"])]);
    assert_eq!(reader.count().unwrap(), 2);
}

#[test]
fn test_explicit_delimiter_wins_over_sep_line() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "tabs.txt", b"sep=;\na\tb;c\n");

    let options = CsvOptions {
        delimiter: Some(b'\t'),
        ..CsvOptions::default()
    };
    let mut reader = open(&path, options, ReadOptions::default()).unwrap();
    assert_eq!(read_all(&mut reader), vec![row(&["a", "b;c"])]);
}

#[test]
fn test_utf8_bom_is_skipped() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("café,ok\n".as_bytes());
    let path = write(dir.path(), "bom.csv", &bytes);

    let mut reader = reader(&path);
    assert_eq!(read_all(&mut reader), vec![row(&["café", "ok"])]);
}

#[test]
fn test_utf16_with_bom() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![0xFF, 0xFE];
    for unit in "sep=\t\r\n名前\t値\r\nx\ty\r\n".encode_utf16() {
        bytes.extend_from_slice(&unit.to_le_bytes());
    }
    let path = write(dir.path(), "utf16.csv", &bytes);

    let mut reader = reader(&path);
    assert_eq!(reader.source().input_encoding(), "UTF-16LE");
    assert_eq!(reader.source().delimiter(), b'\t');
    assert_eq!(read_all(&mut reader), vec![row(&["名前", "値"]), row(&["x", "y"])]);
}

#[test]
fn test_utf32_big_endian_with_bom() {
    let dir = TempDir::new().unwrap();
    let mut bytes = vec![0x00, 0x00, 0xFE, 0xFF];
    for c in "a,ß\n".chars() {
        bytes.extend_from_slice(&(c as u32).to_be_bytes());
    }
    let path = write(dir.path(), "utf32.csv", &bytes);

    let mut reader = reader(&path);
    assert_eq!(reader.source().input_encoding(), "UTF-32BE");
    assert_eq!(read_all(&mut reader), vec![row(&["a", "ß"])]);
}

#[test]
fn test_gbk_detected_without_bom() {
    let dir = TempDir::new().unwrap();
    let (bytes, _, _) = encoding_rs::GBK.encode("姓名,城市\n张三,北京\n");
    let path = write(dir.path(), "gbk.csv", &bytes);

    let mut reader = reader(&path);
    assert_eq!(reader.source().input_encoding(), "GBK");
    assert_eq!(
        read_all(&mut reader),
        vec![row(&["姓名", "城市"]), row(&["张三", "北京"])]
    );
}

#[test]
fn test_set_input_encoding() {
    let dir = TempDir::new().unwrap();
    let (bytes, _, _) = encoding_rs::WINDOWS_1252.encode("naïve,€5\n");
    let path = write(dir.path(), "latin.csv", &bytes);

    let mut reader = reader(&path);
    reader.source_mut().set_input_encoding("windows-1252").unwrap();
    assert_eq!(read_all(&mut reader), vec![row(&["naïve", "€5"])]);

    let err = reader.source_mut().set_input_encoding("klingon").unwrap_err();
    assert!(matches!(err, lazy_sheets_csv::CsvError::UnknownEncoding(_)));
}

#[test]
fn test_custom_enclosure() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "quotes.csv", b"'a,b',c\n");

    let mut reader = reader(&path);
    reader.source_mut().set_enclosure(b'\'').unwrap();
    assert_eq!(read_all(&mut reader), vec![row(&["a,b", "c"])]);
}

#[test]
fn test_limits_padding_and_count() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "wide.csv", b"a,b,c,d,e,f\n1\n2,3\n4\n");

    let options = ReadOptions {
        row_limit: Some(3),
        column_limit: Some(4),
        read_empty_cells: true,
    };
    let mut reader = open(&path, CsvOptions::default(), options).unwrap();
    assert_eq!(reader.dimensions().unwrap(), (3, 4));
    assert_eq!(
        read_all(&mut reader),
        vec![
            row(&["a", "b", "c", "d"]),
            row(&["1", "", "", ""]),
            row(&["2", "3", "", ""]),
        ]
    );
}

#[test]
fn test_empty_rows_ignored() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "gaps.csv", b"a,b\n,\n  , \nc,d\n");

    let mut reader = reader(&path);
    assert_eq!(reader.count().unwrap(), 4);

    reader.set_read_empty_cells(false);
    assert_eq!(reader.count().unwrap(), 2);
    reader.seek(2).unwrap();
    assert_eq!(reader.current(), Some(&row(&["c", "d"])));
}

#[test]
fn test_seek_and_rewind() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "seq.csv", b"1\n2\n3\n4\n5\n");

    let mut reader = reader(&path);
    reader.seek(50).unwrap();
    assert!(!reader.is_valid());

    reader.seek(4).unwrap();
    assert_eq!(reader.current(), Some(&row(&["4"])));
    reader.seek(2).unwrap();
    assert_eq!(reader.position(), Some(1));
    assert_eq!(reader.current(), Some(&row(&["2"])));

    assert!(matches!(reader.seek(0), Err(Error::SeekInvalid(0))));
    assert_eq!(reader.current(), Some(&row(&["2"])));

    reader.rewind().unwrap();
    assert_eq!(reader.current(), Some(&row(&["1"])));
}

#[test]
fn test_single_sheet() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "report.csv", b"a,b,c\nd\n");

    let mut reader = reader(&path);
    let sheets = reader.sheets().unwrap();
    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].name, "report");
    assert_eq!(sheets[0].total_rows, 2);
    assert_eq!(sheets[0].last_column_letter, "C");

    reader.set_sheet_index(0).unwrap();
    assert!(matches!(
        reader.set_sheet_index(1),
        Err(Error::SheetOutOfBounds(1, 1))
    ));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("none.csv");

    assert!(!can_read(&path));
    let err = open(&path, CsvOptions::default(), ReadOptions::default()).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "{:?}", err);
}

#[test]
fn test_can_read() {
    let dir = TempDir::new().unwrap();
    let path = write(dir.path(), "any.txt", b"x");
    assert!(can_read(&path));
    assert!(!can_read(dir.path()));
}
