//! Fraction rendering (`# ?/?` and friends)

/// Decimal digits kept from the fractional part before reducing
const FRACTION_PRECISION: u32 = 9;

/// Greatest common divisor (Euclid)
pub fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// Render a non-integer value as a reduced fraction.
///
/// The decimal part becomes `digits / 10^len`, reduced by the GCD. With
/// `whole` set the integer part is printed separately (`1 1/2`), otherwise it
/// is folded into an improper fraction (`3/2`). Returns `None` when the value
/// is too large to express this way.
pub fn render_fraction(value: f64, whole: bool) -> Option<String> {
    let sign = if value < 0.0 { "-" } else { "" };
    let abs = value.abs();
    if !abs.is_finite() || abs >= u64::MAX as f64 {
        return None;
    }
    let denominator = 10u64.pow(FRACTION_PRECISION);

    let mut integer = abs.trunc() as u128;
    let mut numerator = (abs.fract() * denominator as f64).round() as u64;
    if numerator == denominator {
        integer += 1;
        numerator = 0;
    }
    if numerator == 0 {
        return Some(format!("{}{}", sign, integer));
    }

    let divisor = gcd(numerator, denominator);
    let numerator = u128::from(numerator / divisor);
    let denominator = u128::from(denominator / divisor);

    if whole {
        if integer > 0 {
            Some(format!("{}{} {}/{}", sign, integer, numerator, denominator))
        } else {
            Some(format!("{}{}/{}", sign, numerator, denominator))
        }
    } else {
        let improper = integer.checked_mul(denominator)?.checked_add(numerator)?;
        Some(format!("{}{}/{}", sign, improper, denominator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(75, 100), 25);
        assert_eq!(gcd(17, 5), 1);
        assert_eq!(gcd(0, 9), 9);
        assert_eq!(gcd(9, 0), 9);
    }

    #[test]
    fn test_proper_fractions() {
        assert_eq!(render_fraction(0.75, true).unwrap(), "3/4");
        assert_eq!(render_fraction(0.5, false).unwrap(), "1/2");
        assert_eq!(render_fraction(0.125, true).unwrap(), "1/8");
    }

    #[test]
    fn test_mixed_and_improper() {
        assert_eq!(render_fraction(1.5, true).unwrap(), "1 1/2");
        assert_eq!(render_fraction(1.5, false).unwrap(), "3/2");
        assert_eq!(render_fraction(-2.25, true).unwrap(), "-2 1/4");
        assert_eq!(render_fraction(-2.25, false).unwrap(), "-9/4");
    }

    #[test]
    fn test_rounding_to_next_integer() {
        assert_eq!(render_fraction(1.9999999999, true).unwrap(), "2");
    }

    #[test]
    fn test_large_values_do_not_overflow() {
        let value = 100_000_000_000.123;
        let improper = render_fraction(value, false).unwrap();
        let (numerator, denominator) = improper.split_once('/').unwrap();
        let ratio = numerator.parse::<f64>().unwrap() / denominator.parse::<f64>().unwrap();
        assert!((ratio - value).abs() < 1e-3, "{}", improper);

        let mixed = render_fraction(value, true).unwrap();
        assert!(mixed.starts_with("100000000000 "), "{}", mixed);
    }

    #[test]
    fn test_out_of_range_values() {
        assert_eq!(render_fraction(f64::MAX, true), None);
        assert_eq!(render_fraction(f64::INFINITY, false), None);
        assert_eq!(render_fraction(f64::NAN, false), None);
    }
}
