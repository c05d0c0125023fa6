//! Built-in number formats

/// First id available to workbook-defined formats
pub const FIRST_CUSTOM_ID: u32 = 164;

/// Format code for a built-in format id.
///
/// Ids 5-8 and 23-36 are locale-dependent and have no fixed code; workbooks
/// that use them declare the code explicitly.
pub fn builtin_format_code(id: u32) -> Option<&'static str> {
    let code = match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0 ;(#,##0)",
        38 => "#,##0 ;[Red](#,##0)",
        39 => "#,##0.00;(#,##0.00)",
        40 => "#,##0.00;[Red](#,##0.00)",
        44 => r#"_("$"* #,##0.00_);_("$"* \(#,##0.00\);_("$"* "-"??_);_(@_)"#,
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mmss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_ids() {
        assert_eq!(builtin_format_code(0), Some("General"));
        assert_eq!(builtin_format_code(10), Some("0.00%"));
        assert_eq!(builtin_format_code(49), Some("@"));
    }

    #[test]
    fn test_locale_and_custom_ids_are_absent() {
        assert_eq!(builtin_format_code(5), None);
        assert_eq!(builtin_format_code(30), None);
        assert_eq!(builtin_format_code(FIRST_CUSTOM_ID), None);
    }
}
