//! The "General" format

use crate::settings::FormatSettings;

/// Largest magnitude rendered without an exponent
const GENERAL_MAX: f64 = 1e11;
/// Smallest magnitude rendered without an exponent
const GENERAL_MIN: f64 = 1e-9;
/// Characters available for digits and the decimal point
const GENERAL_WIDTH: usize = 11;
/// Past this magnitude every f64 is an integer
const EXACT_INTEGER_LIMIT: f64 = 4_503_599_627_370_496.0;
const MAX_ROUNDING_DECIMALS: usize = 15;

/// Render a number the way the General format does.
///
/// Integers below 10^11 print as-is. Other values in `[1e-9, 1e11)` get as
/// many decimals as fit in 11 characters with trailing zeros removed; values
/// outside that range switch to `d.ddddE+XX`.
pub fn format_general(value: f64, settings: &FormatSettings) -> String {
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if abs < GENERAL_MAX && value.fract() == 0.0 {
        return format!("{}", value as i64);
    }

    if (GENERAL_MIN..GENERAL_MAX).contains(&abs) {
        let int_digits = format!("{}", abs.trunc() as u64).len();
        let decimals = GENERAL_WIDTH.saturating_sub(int_digits + 1);
        let fixed = format!("{:.*}", decimals, round_half_away(value, decimals));
        let trimmed = trim_fraction(&fixed);
        return trimmed.replace('.', &settings.decimal_separator);
    }

    let scientific = format_scientific(value, 5, 2, ".");
    match scientific.split_once('E') {
        Some((mantissa, exponent)) => format!(
            "{}E{}",
            trim_fraction(mantissa).replace('.', &settings.decimal_separator),
            exponent
        ),
        None => scientific,
    }
}

/// Round to `decimals` places, ties away from zero.
///
/// A zero result is always positive zero.
pub fn round_half_away(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals.min(MAX_ROUNDING_DECIMALS) as i32);
    let scaled = value * factor;
    // Already exact at this precision
    if !scaled.is_finite() || scaled.abs() >= EXACT_INTEGER_LIMIT {
        return value;
    }
    let rounded = scaled.round() / factor;
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Split a non-zero finite value into a mantissa in `[1, 10)` and a power of
/// ten.
fn decompose(value: f64) -> Option<(f64, i32)> {
    if value == 0.0 || !value.is_finite() {
        return None;
    }
    let mut exponent = value.abs().log10().floor() as i32;
    let scale = |exponent: i32| {
        if exponent >= 0 {
            value / 10f64.powi(exponent)
        } else {
            value * 10f64.powi(-exponent)
        }
    };
    let mut mantissa = scale(exponent);
    if mantissa.abs() >= 10.0 {
        exponent += 1;
        mantissa = scale(exponent);
    } else if mantissa.abs() < 1.0 {
        exponent -= 1;
        mantissa = scale(exponent);
    }
    mantissa.is_finite().then_some((mantissa, exponent))
}

/// Render `value` as `d.dddE+XX` with `decimals` mantissa digits and at least
/// `exponent_digits` exponent digits.
pub fn format_scientific(
    value: f64,
    decimals: usize,
    exponent_digits: usize,
    decimal_separator: &str,
) -> String {
    let (mantissa, exponent) = match decompose(value) {
        Some((mantissa, exponent)) => {
            let mantissa = round_half_away(mantissa, decimals);
            if mantissa.abs() >= 10.0 {
                (mantissa / 10.0, exponent + 1)
            } else {
                (mantissa, exponent)
            }
        }
        None => (value, 0),
    };
    let sign = if exponent < 0 { '-' } else { '+' };

    format!(
        "{}E{}{:0width$}",
        format!("{:.*}", decimals, mantissa).replace('.', decimal_separator),
        sign,
        exponent.unsigned_abs(),
        width = exponent_digits
    )
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general(value: f64) -> String {
        format_general(value, &FormatSettings::default())
    }

    #[test]
    fn test_integers() {
        assert_eq!(general(0.0), "0");
        assert_eq!(general(42.0), "42");
        assert_eq!(general(-7.0), "-7");
        assert_eq!(general(99_999_999_999.0), "99999999999");
    }

    #[test]
    fn test_decimals_fit_eleven_characters() {
        assert_eq!(general(0.5), "0.5");
        assert_eq!(general(0.1 + 0.2), "0.3");
        assert_eq!(general(1234.5678), "1234.5678");
        assert_eq!(general(3.141592653589793), "3.141592654");
        assert_eq!(general(-2.25), "-2.25");
    }

    #[test]
    fn test_scientific_outside_range() {
        assert_eq!(general(123_456_789_012.0), "1.23457E+11");
        assert_eq!(general(1e20), "1E+20");
        assert_eq!(general(0.000_000_000_12), "1.2E-10");
    }

    #[test]
    fn test_decimal_separator() {
        let settings = FormatSettings {
            decimal_separator: ",".into(),
            ..FormatSettings::default()
        };
        assert_eq!(format_general(1.5, &settings), "1,5");
    }

    #[test]
    fn test_format_scientific() {
        assert_eq!(format_scientific(12345.0, 2, 2, "."), "1.23E+04");
        assert_eq!(format_scientific(0.00123, 1, 1, "."), "1.2E-3");
        assert_eq!(format_scientific(-98764.0, 3, 2, "."), "-9.876E+04");
        assert_eq!(format_scientific(0.0, 2, 2, "."), "0.00E+00");
    }

    #[test]
    fn test_round_half_away() {
        assert_eq!(round_half_away(2.5, 0), 3.0);
        assert_eq!(round_half_away(-2.5, 0), -3.0);
        assert_eq!(round_half_away(0.125, 2), 0.13);
        assert_eq!(round_half_away(1234.5, 0), 1235.0);
        assert_eq!(round_half_away(-0.001, 2).to_string(), "0");
        assert_eq!(round_half_away(1e300, 2), 1e300);
    }

    #[test]
    fn test_ties_round_away_from_zero() {
        assert_eq!(format_scientific(12500.0, 1, 2, "."), "1.3E+04");
        assert_eq!(format_scientific(99999.0, 2, 2, "."), "1.00E+05");
        assert_eq!(general(0.000_000_000_125), "1.25E-10");
    }
}
