//! `_xHHHH_` escapes in cell text

use std::borrow::Cow;

use lazy_regex::regex_replace_all;

/// Decode the `_xHHHH_` sequences Excel writes for control characters
/// (`_x000D_` = CR, `_x005F_` = literal underscore).
///
/// Sequences that do not name a valid character are kept as written.
pub fn decode_excel_escapes(text: &str) -> Cow<'_, str> {
    if !text.contains("_x") {
        return Cow::Borrowed(text);
    }

    regex_replace_all!(r"_x([0-9A-Fa-f]{4})_", text, |whole: &str, hex: &str| {
        u32::from_str_radix(hex, 16)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(|| whole.to_string(), |c| c.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_characters() {
        assert_eq!(decode_excel_escapes("a_x000D__x000A_b"), "a\r\nb");
        assert_eq!(decode_excel_escapes("tab_x0009_here"), "tab\there");
    }

    #[test]
    fn test_escaped_underscore() {
        assert_eq!(decode_excel_escapes("_x005F_x0041_"), "_x0041_");
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(decode_excel_escapes("snake_case"), "snake_case");
        assert_eq!(decode_excel_escapes("_xZZZZ_"), "_xZZZZ_");
        assert!(matches!(decode_excel_escapes("plain"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_surrogate_kept() {
        assert_eq!(decode_excel_escapes("_xD800_"), "_xD800_");
    }
}
