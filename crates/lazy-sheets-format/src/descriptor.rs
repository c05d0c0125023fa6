//! Parsed number-format codes

use lazy_regex::{regex, regex_captures, regex_is_match};
use regex::{NoExpand, Regex};

use crate::datetime;
use crate::error::{FormatError, Result};
use crate::fraction::render_fraction;
use crate::general::{format_general, format_scientific, round_half_away};
use crate::settings::FormatSettings;

/// The one currency code rendered with a fixed prefix
const EURO_CODE: &str = "[$EUR ]#,##0.00_-";

/// How a format section renders its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    General,
    Percentage,
    DateTime,
    Euro,
    Fraction,
    Numeric,
    Text,
}

/// Digit template extracted from a numeric code (`000.00` → width 6, 2 decimals)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitTemplate {
    /// Integer digits, decimal point and decimal digits
    pub min_width: usize,
    /// Number of decimal places
    pub decimal_digits: usize,
}

/// One section of a format code, ready to render values.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatDescriptor {
    /// The section as written in the workbook
    pub raw_code: String,
    pub kind: FormatKind,
    /// Divisor from trailing thousands commas (`0,` = 1000)
    pub scale: f64,
    pub uses_thousands_separator: bool,
    /// Currency tag code; an empty code means the configured default
    pub currency_code: Option<String>,
    pub template: Option<DigitTemplate>,
    /// Minimum exponent digits for scientific codes
    pub exponent_digits: Option<usize>,
    /// Fractions print their integer part separately
    pub fraction_whole: bool,
    /// Cleaned code the digits are substituted into (a strftime pattern for
    /// date/time sections)
    pub print_pattern: String,
}

impl FormatDescriptor {
    fn new(raw_code: &str, kind: FormatKind, print_pattern: String) -> Self {
        Self {
            raw_code: raw_code.to_string(),
            kind,
            scale: 1.0,
            uses_thousands_separator: false,
            currency_code: None,
            template: None,
            exponent_digits: None,
            fraction_whole: false,
            print_pattern,
        }
    }

    /// Parse a single section of a format code.
    pub fn parse(section: &str) -> Result<Self> {
        let code = regex!(r"^(?:\[[a-zA-Z]+\])+").replace(section.trim(), "");
        let code = code.trim();

        if code.is_empty() || code.eq_ignore_ascii_case("general") {
            return Ok(Self::new(section, FormatKind::General, String::new()));
        }
        if code == "@" {
            return Ok(Self::new(section, FormatKind::Text, code.to_string()));
        }
        if code.ends_with('%') {
            return Ok(Self::new(section, FormatKind::Percentage, code.to_string()));
        }
        if code == EURO_CODE {
            return Ok(Self::new(section, FormatKind::Euro, code.to_string()));
        }
        if datetime::has_date_tokens(code) {
            let pattern = datetime::translate(code)?;
            return Ok(Self::new(section, FormatKind::DateTime, pattern));
        }

        Ok(Self::parse_numeric(section, code))
    }

    fn parse_numeric(section: &str, code: &str) -> Self {
        let mut code = regex!("_.").replace_all(code, "").into_owned();
        code.retain(|c| !matches!(c, '\\' | '"' | '*'));

        let uses_thousands_separator = code.contains("0,0") || code.contains("#,#");
        code = code.replace("0,0", "00").replace("#,#", "##");

        let mut scale = 1.0;
        let commas = regex_captures!(r"([0#])(,+)", &code).map(|(_, _, commas)| commas.len());
        if let Some(commas) = commas {
            scale = 1000f64.powi(commas as i32);
            code = regex!(r"([0#]),+").replace_all(&code, "$1").into_owned();
        }

        let currency_code = regex_captures!(r"\[\$(.*)\]", &code).map(|(_, tag)| {
            tag.split('-').next().unwrap_or_default().to_string()
        });

        let mut descriptor = Self::new(section, FormatKind::Numeric, String::new());
        descriptor.scale = scale;
        descriptor.uses_thousands_separator = uses_thousands_separator;
        descriptor.currency_code = currency_code;

        if regex_is_match!(r"#?.*\?/\?", &code) {
            descriptor.kind = FormatKind::Fraction;
            descriptor.fraction_whole =
                code.contains('0') || code.contains('#') || code.starts_with("? ?");
        } else {
            code = code.replace('#', "");
            let digits_only = regex!(r"\[[^\]]+\]").replace_all(&code, "");
            if let Some((_, integer, point, decimals)) =
                regex_captures!(r"(0+)(\.?)(0*)", &digits_only)
            {
                descriptor.template = Some(DigitTemplate {
                    min_width: integer.len() + point.len() + decimals.len(),
                    decimal_digits: decimals.len(),
                });
            }
            if let Some((_, exponent)) = regex_captures!(r"0[eE][+-](0+)", &digits_only) {
                descriptor.exponent_digits = Some(exponent.len());
            }
        }

        descriptor.print_pattern = code.trim().to_string();
        descriptor
    }

    /// Render `value` (already made absolute for signed sections).
    ///
    /// `raw` is the original cell text, returned for text sections.
    pub fn render(&self, value: f64, raw: &str, settings: &FormatSettings) -> Result<String> {
        match self.kind {
            FormatKind::General => Ok(format_general(value, settings)),
            FormatKind::Text => Ok(raw.to_string()),
            FormatKind::Percentage => {
                if self.print_pattern == "0%" {
                    Ok(format!("{}%", round_half_away(100.0 * value, 0)))
                } else {
                    Ok(format!("{:.2}%", round_half_away(100.0 * value, 2)))
                }
            }
            FormatKind::DateTime => {
                datetime::render_serial(value, &self.print_pattern, settings.date_system)
                    .ok_or_else(|| FormatError::OutOfRange {
                        code: self.raw_code.clone(),
                        value,
                    })
            }
            FormatKind::Euro => Ok(format!("EUR {:.2}", round_half_away(value, 2))),
            FormatKind::Fraction if value.fract() != 0.0 => {
                let rendered = render_fraction(value, self.fraction_whole)
                    .unwrap_or_else(|| format_general(value, settings));
                Ok(self.with_currency(rendered, settings))
            }
            FormatKind::Fraction => Ok(format_general(value / self.scale, settings)),
            FormatKind::Numeric => {
                Ok(self.with_currency(self.render_number(value / self.scale, settings), settings))
            }
        }
    }

    fn render_number(&self, value: f64, settings: &FormatSettings) -> String {
        let Some(template) = self.template else {
            // Sections without digit placeholders show only their literal text
            if self.print_pattern.is_empty() {
                return format_general(value, settings);
            }
            return self.print_pattern.replace('?', "").trim().to_string();
        };

        if let Some(exponent_digits) = self.exponent_digits {
            let scientific = format_scientific(
                value,
                template.decimal_digits,
                exponent_digits,
                &settings.decimal_separator,
            );
            return substitute(
                &self.print_pattern,
                regex!(r"0+\.?0*[eE][+-]0+"),
                &scientific,
            );
        }

        let digits = if self.uses_thousands_separator {
            group_thousands(value, template.decimal_digits, settings)
        } else {
            format!(
                "{:0width$.prec$}",
                round_half_away(value, template.decimal_digits),
                width = template.min_width,
                prec = template.decimal_digits
            )
            .replace('.', &settings.decimal_separator)
        };

        substitute(&self.print_pattern, regex!(r"0+\.?0*"), &digits)
    }

    fn with_currency(&self, rendered: String, settings: &FormatSettings) -> String {
        let rendered = match &self.currency_code {
            Some(code) => {
                let code = if code.is_empty() {
                    settings.currency_code.as_str()
                } else {
                    code.as_str()
                };
                regex!(r"\[\$[^\]]*\]")
                    .replace_all(&rendered, NoExpand(code))
                    .into_owned()
            }
            None => rendered,
        };
        // Conditions and other bracket tags are not display text
        regex!(r"\[[^\]]*\]").replace_all(&rendered, "").into_owned()
    }
}

/// Replace the first match of `placeholder` outside bracket tags with `digits`.
fn substitute(pattern: &str, placeholder: &Regex, digits: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + digits.len());
    let mut rest = pattern;
    let mut done = false;

    while !rest.is_empty() {
        let (plain, tag, tail) = match rest.find('[') {
            Some(start) => {
                let end = rest[start..].find(']').map_or(rest.len(), |e| start + e + 1);
                (&rest[..start], &rest[start..end], &rest[end..])
            }
            None => (rest, "", ""),
        };

        if !done && placeholder.is_match(plain) {
            out.push_str(&placeholder.replacen(plain, 1, NoExpand(digits)));
            done = true;
        } else {
            out.push_str(plain);
        }
        out.push_str(tag);
        rest = tail;
    }

    if !done {
        out.push_str(digits);
    }
    out
}

/// Fixed decimals with grouped thousands (`1234567.891` → `1,234,567.89`).
fn group_thousands(value: f64, decimals: usize, settings: &FormatSettings) -> String {
    let fixed = format!("{:.*}", decimals, round_half_away(value.abs(), decimals));
    let (integer, fraction) = fixed.split_once('.').unwrap_or((&fixed, ""));

    let mut grouped = String::new();
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push_str(&settings.thousands_separator);
        }
        grouped.push(digit);
    }
    if !fraction.is_empty() {
        grouped.push_str(&settings.decimal_separator);
        grouped.push_str(fraction);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !is_zero {
        grouped.insert(0, '-');
    }
    grouped
}

/// All sections of one format code.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFormat {
    pub sections: Vec<FormatDescriptor>,
}

impl ParsedFormat {
    /// Parse a format code into up to four `;`-separated sections.
    pub fn parse(code: &str) -> Result<Self> {
        let sections = split_sections(code)
            .into_iter()
            .take(4)
            .map(FormatDescriptor::parse)
            .collect::<Result<Vec<_>>>()?;

        if sections.is_empty() {
            return Err(FormatError::malformed(code, "no sections"));
        }
        Ok(Self { sections })
    }

    /// Pick the section for `value`, returning it with the value to render.
    ///
    /// With two sections negatives use the second; with three or four, zero
    /// uses the third. Signed sections render the absolute value.
    pub fn select(&self, value: f64) -> (&FormatDescriptor, f64) {
        let section = match self.sections.len() {
            1 => return (&self.sections[0], value),
            2 if value < 0.0 => 1,
            n if n >= 3 && value < 0.0 => 1,
            n if n >= 3 && value == 0.0 => 2,
            _ => 0,
        };
        (&self.sections[section], value.abs())
    }
}

/// Split on `;` outside quotes, escapes and bracket tags.
fn split_sections(code: &str) -> Vec<&str> {
    let mut sections = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut escaped = false;

    for (i, c) in code.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if !in_quotes => escaped = true,
            '"' if !in_brackets => in_quotes = !in_quotes,
            '[' if !in_quotes => in_brackets = true,
            ']' if !in_quotes => in_brackets = false,
            ';' if !in_quotes && !in_brackets => {
                sections.push(&code[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    sections.push(&code[start..]);
    sections
}
