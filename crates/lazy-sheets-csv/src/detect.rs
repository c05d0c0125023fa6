//! Encoding and delimiter detection
//!
//! A byte-order mark decides the encoding outright. Without one, the first
//! line is checked: valid UTF-8 (plain ASCII included) stays UTF-8, text that
//! only decodes as GBK is read as GBK, anything else falls back to lossy
//! UTF-8.

use encoding_rs::{Encoding, GBK, UTF_16BE, UTF_16LE, UTF_8};

/// Text encoding of a delimited file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    /// An encoding known to `encoding_rs`
    Standard(&'static Encoding),
    Utf32Le,
    Utf32Be,
}

impl TextEncoding {
    /// UTF-8
    pub fn utf8() -> Self {
        TextEncoding::Standard(UTF_8)
    }

    /// Resolve an encoding label. UTF-32 is not part of the WHATWG set and
    /// is recognized here.
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "utf-32" | "utf32" | "utf-32le" | "utf32le" => Some(TextEncoding::Utf32Le),
            "utf-32be" | "utf32be" => Some(TextEncoding::Utf32Be),
            other => Encoding::for_label(other.as_bytes()).map(TextEncoding::Standard),
        }
    }

    /// Canonical name
    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Standard(encoding) => encoding.name(),
            TextEncoding::Utf32Le => "UTF-32LE",
            TextEncoding::Utf32Be => "UTF-32BE",
        }
    }

    /// Whether bytes can be handed to the CSV parser unchanged
    pub fn is_utf8(&self) -> bool {
        *self == TextEncoding::utf8()
    }
}

/// Encoding announced by a byte-order mark, and the mark's length.
pub fn sniff_bom(head: &[u8]) -> Option<(TextEncoding, usize)> {
    // UTF-32LE must be checked before UTF-16LE, which shares its first bytes
    if head.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        Some((TextEncoding::Utf32Le, 4))
    } else if head.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        Some((TextEncoding::Utf32Be, 4))
    } else if head.starts_with(&[0xFF, 0xFE]) {
        Some((TextEncoding::Standard(UTF_16LE), 2))
    } else if head.starts_with(&[0xFE, 0xFF]) {
        Some((TextEncoding::Standard(UTF_16BE), 2))
    } else if head.starts_with(&[0xEF, 0xBB, 0xBF]) {
        Some((TextEncoding::utf8(), 3))
    } else {
        None
    }
}

fn first_line(head: &[u8]) -> &[u8] {
    match head.iter().position(|&b| b == b'\n') {
        Some(end) => &head[..end],
        None => head,
    }
}

/// Guess the encoding of BOM-less input from its first line.
pub fn guess_encoding(head: &[u8]) -> TextEncoding {
    let line = first_line(head);
    match std::str::from_utf8(line) {
        Ok(_) => TextEncoding::utf8(),
        // Sample cut in the middle of a character
        Err(e) if e.error_len().is_none() => TextEncoding::utf8(),
        Err(_) => {
            if GBK
                .decode_without_bom_handling_and_without_replacement(line)
                .is_some()
            {
                TextEncoding::Standard(GBK)
            } else {
                log::debug!("first line is neither UTF-8 nor GBK, reading as lossy UTF-8");
                TextEncoding::utf8()
            }
        }
    }
}

/// The delimiter declared by a `sep=X` line, if `line` is one.
pub fn parse_sep_line(line: &str) -> Option<char> {
    let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
    let mut chars = line.chars();
    let prefix: String = chars.by_ref().take(4).collect();
    if !prefix.eq_ignore_ascii_case("sep=") {
        return None;
    }
    let sep = chars.next()?;
    chars.next().is_none().then_some(sep)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sniff_bom() {
        assert_eq!(
            sniff_bom(&[0xFF, 0xFE, 0x00, 0x00, b'a']),
            Some((TextEncoding::Utf32Le, 4))
        );
        assert_eq!(
            sniff_bom(&[0x00, 0x00, 0xFE, 0xFF]),
            Some((TextEncoding::Utf32Be, 4))
        );
        assert_eq!(
            sniff_bom(&[0xFF, 0xFE, b'a', 0x00]),
            Some((TextEncoding::Standard(UTF_16LE), 2))
        );
        assert_eq!(
            sniff_bom(&[0xFE, 0xFF, 0x00, b'a']),
            Some((TextEncoding::Standard(UTF_16BE), 2))
        );
        assert_eq!(
            sniff_bom(&[0xEF, 0xBB, 0xBF, b'a']),
            Some((TextEncoding::utf8(), 3))
        );
        assert_eq!(sniff_bom(b"a,b"), None);
    }

    #[test]
    fn test_guess_encoding() {
        assert_eq!(guess_encoding(b"plain,ascii\n"), TextEncoding::utf8());
        assert_eq!(guess_encoding("名前,値\n".as_bytes()), TextEncoding::utf8());

        let (gbk, _, _) = GBK.encode("中文,测试\nmore");
        assert_eq!(guess_encoding(&gbk), TextEncoding::Standard(GBK));

        // Truncated UTF-8 sequence at the end of the sample
        let mut cut = "ab,é".as_bytes().to_vec();
        cut.pop();
        assert_eq!(guess_encoding(&cut), TextEncoding::utf8());

        // Latin-1 "café," is neither
        assert_eq!(guess_encoding(&[b'c', b'a', b'f', 0xE9, b',']), TextEncoding::utf8());
    }

    #[test]
    fn test_from_label() {
        assert_eq!(TextEncoding::from_label("utf-8"), Some(TextEncoding::utf8()));
        assert_eq!(
            TextEncoding::from_label(" GB2312 "),
            Some(TextEncoding::Standard(GBK))
        );
        assert_eq!(TextEncoding::from_label("UTF-32"), Some(TextEncoding::Utf32Le));
        assert_eq!(TextEncoding::from_label("UTF-32BE").map(|e| e.name()), Some("UTF-32BE"));
        assert_eq!(TextEncoding::from_label("klingon"), None);
    }

    #[test]
    fn test_parse_sep_line() {
        assert_eq!(parse_sep_line("sep=;\r\n"), Some(';'));
        assert_eq!(parse_sep_line("SEP=|"), Some('|'));
        assert_eq!(parse_sep_line("sep=\t\n"), Some('\t'));
        assert_eq!(parse_sep_line("sep=;;"), None);
        assert_eq!(parse_sep_line("sep="), None);
        assert_eq!(parse_sep_line("a,b,c"), None);
    }
}
