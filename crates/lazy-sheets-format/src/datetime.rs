//! Date and time format codes
//!
//! Spreadsheet date codes (`yyyy-mm-dd`, `h:mm AM/PM`, ...) are translated
//! into chrono strftime patterns once per format, then applied to serial day
//! numbers.

use chrono::format::{Item, StrftimeItems};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::error::{FormatError, Result};
use crate::settings::DateSystem;

const SECONDS_PER_DAY: f64 = 86_400.0;
/// Serial of 9999-12-31 in the 1900 system
const MAX_SERIAL: f64 = 2_958_465.0;
/// First serial after the phantom 1900-02-29
const PHANTOM_LEAP_DAY: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Year(usize),
    /// `m` is a month unless it sits next to an hour or second
    MonthOrMinute(usize),
    Day(usize),
    Hour(usize),
    Second(usize),
    AmPm,
    Literal(String),
}

fn push_literal(tokens: &mut Vec<Token>, c: char) {
    if let Some(Token::Literal(text)) = tokens.last_mut() {
        text.push(c);
    } else {
        tokens.push(Token::Literal(c.to_string()));
    }
}

fn tokenize(code: &str) -> Vec<Token> {
    let chars: Vec<char> = code.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '"' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&c| c == '"')
                    .map_or(chars.len(), |p| i + 1 + p);
                for &literal in &chars[i + 1..end] {
                    push_literal(&mut tokens, literal);
                }
                i = end + 1;
            }
            '\\' => {
                if let Some(&escaped) = chars.get(i + 1) {
                    push_literal(&mut tokens, escaped);
                }
                i += 2;
            }
            // Width padding and fill characters
            '_' | '*' => i += 2,
            '[' => {
                let end = chars[i + 1..]
                    .iter()
                    .position(|&c| c == ']')
                    .map_or(chars.len(), |p| i + 1 + p);
                let inner: String = chars[i + 1..end].iter().collect::<String>().to_lowercase();
                // Elapsed-time brackets keep their token, everything else
                // (locale, currency, colors, conditions) is dropped
                match inner.chars().next() {
                    Some(first @ ('h' | 'm' | 's')) if inner.chars().all(|c| c == first) => {
                        tokens.push(date_token(first, inner.len()));
                    }
                    _ => {}
                }
                i = end + 1;
            }
            _ => {
                let ahead: String = chars[i..].iter().take(5).collect::<String>().to_lowercase();
                if ahead.starts_with("am/pm") {
                    tokens.push(Token::AmPm);
                    i += 5;
                } else if ahead.starts_with("a/p") {
                    tokens.push(Token::AmPm);
                    i += 3;
                } else {
                    let lower = c.to_ascii_lowercase();
                    if matches!(lower, 'y' | 'm' | 'd' | 'h' | 's') {
                        let run = chars[i..]
                            .iter()
                            .take_while(|c| c.to_ascii_lowercase() == lower)
                            .count();
                        tokens.push(date_token(lower, run));
                        i += run;
                    } else {
                        push_literal(&mut tokens, c);
                        i += 1;
                    }
                }
            }
        }
    }

    tokens
}

fn date_token(c: char, len: usize) -> Token {
    match c {
        'y' => Token::Year(len),
        'm' => Token::MonthOrMinute(len),
        'd' => Token::Day(len),
        'h' => Token::Hour(len),
        _ => Token::Second(len),
    }
}

/// Whether a format code contains date or time placeholders outside quotes,
/// escapes and bracket tags.
pub fn has_date_tokens(code: &str) -> bool {
    tokenize(code)
        .iter()
        .any(|token| !matches!(token, Token::Literal(_)))
}

fn is_minute(tokens: &[Token], index: usize) -> bool {
    let previous = tokens[..index]
        .iter()
        .rev()
        .find(|t| !matches!(t, Token::Literal(_)));
    let next = tokens[index + 1..]
        .iter()
        .find(|t| !matches!(t, Token::Literal(_)));

    matches!(previous, Some(Token::Hour(_))) || matches!(next, Some(Token::Second(_)))
}

/// Translate a date/time format code into a chrono strftime pattern.
///
/// Hours are 12-hour when the code has an AM/PM marker, 24-hour otherwise.
pub fn translate(code: &str) -> Result<String> {
    let tokens = tokenize(code);
    let twelve_hour = tokens.contains(&Token::AmPm);
    let mut pattern = String::new();

    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::Literal(text) => {
                for c in text.chars() {
                    if c == '%' {
                        pattern.push_str("%%");
                    } else {
                        pattern.push(c);
                    }
                }
            }
            Token::Year(len) => pattern.push_str(if *len <= 2 { "%y" } else { "%Y" }),
            Token::MonthOrMinute(len) if is_minute(&tokens, index) => {
                pattern.push_str(if *len == 1 { "%-M" } else { "%M" })
            }
            Token::MonthOrMinute(len) => pattern.push_str(match len {
                1 => "%-m",
                2 => "%m",
                4 => "%B",
                _ => "%b",
            }),
            Token::Day(len) => pattern.push_str(match len {
                1 => "%-d",
                2 => "%d",
                3 => "%a",
                _ => "%A",
            }),
            Token::Hour(len) => pattern.push_str(match (twelve_hour, *len == 1) {
                (true, true) => "%-I",
                (true, false) => "%I",
                (false, true) => "%-H",
                (false, false) => "%H",
            }),
            Token::Second(len) => pattern.push_str(if *len == 1 { "%-S" } else { "%S" }),
            Token::AmPm => pattern.push_str("%p"),
        }
    }

    if StrftimeItems::new(&pattern).any(|item| matches!(item, Item::Error)) {
        return Err(FormatError::malformed(code, "untranslatable date pattern"));
    }

    Ok(pattern)
}

/// Convert a serial day number to a date and time.
///
/// The fractional part is the time of day, truncated to whole seconds.
/// Negative or out-of-range serials give `None`.
pub fn serial_to_datetime(serial: f64, system: DateSystem) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_SERIAL {
        return None;
    }

    let mut days = serial.trunc() as i64;
    let seconds = (serial.fract() * SECONDS_PER_DAY) as i64;

    let base = match system {
        DateSystem::Excel1900 => {
            // 1900 is treated as a leap year: everything from the phantom
            // Feb 29 on is one day ahead of the calendar
            if days >= PHANTOM_LEAP_DAY {
                days -= 1;
            }
            NaiveDate::from_ymd_opt(1899, 12, 31)?
        }
        DateSystem::Excel1904 => NaiveDate::from_ymd_opt(1904, 1, 1)?,
    };

    base.checked_add_signed(Duration::days(days))?
        .and_hms_opt(0, 0, 0)?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Render a serial with a translated pattern.
pub fn render_serial(serial: f64, pattern: &str, system: DateSystem) -> Option<String> {
    let datetime = serial_to_datetime(serial, system)?;
    Some(
        datetime
            .format_with_items(StrftimeItems::new(pattern))
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(serial: f64, code: &str) -> String {
        let pattern = translate(code).unwrap();
        render_serial(serial, &pattern, DateSystem::Excel1900).unwrap()
    }

    #[test]
    fn test_translate_dates() {
        assert_eq!(translate("yyyy-mm-dd").unwrap(), "%Y-%m-%d");
        assert_eq!(translate("mm-dd-yy").unwrap(), "%m-%d-%y");
        assert_eq!(translate("d-mmm-yy").unwrap(), "%-d-%b-%y");
        assert_eq!(translate("dddd, mmmm d").unwrap(), "%A, %B %-d");
    }

    #[test]
    fn test_translate_minutes_vs_months() {
        assert_eq!(translate("h:mm").unwrap(), "%-H:%M");
        assert_eq!(translate("mm:ss").unwrap(), "%M:%S");
        assert_eq!(translate("m/d/yy h:mm").unwrap(), "%-m/%-d/%y %-H:%M");
    }

    #[test]
    fn test_translate_twelve_hour() {
        assert_eq!(translate("h:mm AM/PM").unwrap(), "%-I:%M %p");
        assert_eq!(translate("hh:mm:ss a/p").unwrap(), "%I:%M:%S %p");
    }

    #[test]
    fn test_translate_strips_tags_and_keeps_literals() {
        assert_eq!(translate("[$-409]yyyy\\-mm").unwrap(), "%Y-%m");
        assert_eq!(translate("\"Day \"d").unwrap(), "Day %-d");
        assert_eq!(translate("[h]:mm:ss").unwrap(), "%-H:%M:%S");
        assert_eq!(translate("yyyy 100%").unwrap(), "%Y 100%%");
    }

    #[test]
    fn test_has_date_tokens() {
        assert!(has_date_tokens("yyyy-mm-dd"));
        assert!(has_date_tokens("[$-409]h:mm"));
        assert!(!has_date_tokens("#,##0.00"));
        assert!(!has_date_tokens("0.00E+00"));
        assert!(!has_date_tokens("#,##0 \"days\""));
        assert!(!has_date_tokens("[$USD-409] #,##0"));
    }

    #[test]
    fn test_phantom_leap_day() {
        assert_eq!(render(59.0, "yyyy-mm-dd"), "1900-02-28");
        assert_eq!(render(60.0, "yyyy-mm-dd"), "1900-02-28");
        assert_eq!(render(61.0, "yyyy-mm-dd"), "1900-03-01");
        assert_eq!(render(1.0, "yyyy-mm-dd"), "1900-01-01");
    }

    #[test]
    fn test_serial_60_and_61_are_one_day_apart() {
        let a = serial_to_datetime(60.0, DateSystem::Excel1900).unwrap();
        let b = serial_to_datetime(61.0, DateSystem::Excel1900).unwrap();
        assert_eq!(b - a, Duration::days(1));
    }

    #[test]
    fn test_modern_dates_and_times() {
        assert_eq!(render(45000.0, "yyyy-mm-dd"), "2023-03-15");
        assert_eq!(render(45000.5, "yyyy-mm-dd hh:mm:ss"), "2023-03-15 12:00:00");
        assert_eq!(render(0.75, "h:mm AM/PM"), "6:00 PM");
        assert_eq!(render(45000.0, "mm-dd-yy"), "03-15-23");
    }

    #[test]
    fn test_1904_system() {
        let dt = serial_to_datetime(0.0, DateSystem::Excel1904).unwrap();
        assert_eq!(dt.to_string(), "1904-01-01 00:00:00");
        let dt = serial_to_datetime(60.0, DateSystem::Excel1904).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(1904, 3, 1).unwrap());
    }

    #[test]
    fn test_negative_serial() {
        assert_eq!(serial_to_datetime(-1.0, DateSystem::Excel1900), None);
    }
}
