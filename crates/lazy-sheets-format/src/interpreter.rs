//! Style-aware value formatting

use std::collections::HashMap;

use lazy_regex::regex_is_match;

use crate::builtin::builtin_format_code;
use crate::descriptor::ParsedFormat;
use crate::general::format_general;
use crate::settings::{DateSystem, FormatSettings};

/// Parse a cell value as a number if it looks like one.
///
/// Only plain decimal notation is accepted (optional sign, fraction and
/// exponent); `inf`, `NaN` and hex are left alone.
pub fn parse_numeric(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if !regex_is_match!(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$", trimmed) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Formats raw cell values according to a workbook's styles.
///
/// Holds the style table (position = cell style index, value = number-format
/// id), the workbook's custom format codes and a cache of parsed formats. The
/// cache lives as long as the interpreter; one interpreter serves one
/// workbook.
#[derive(Debug, Default)]
pub struct FormatInterpreter {
    styles: Vec<u32>,
    custom_formats: HashMap<u32, String>,
    /// Parsed formats by id; `None` for ids with no usable code
    parsed: HashMap<u32, Option<ParsedFormat>>,
    settings: FormatSettings,
}

impl FormatInterpreter {
    /// Create an interpreter with default settings.
    pub fn new(styles: Vec<u32>, custom_formats: HashMap<u32, String>) -> Self {
        Self::with_settings(styles, custom_formats, FormatSettings::default())
    }

    /// Create an interpreter with explicit settings.
    pub fn with_settings(
        styles: Vec<u32>,
        custom_formats: HashMap<u32, String>,
        settings: FormatSettings,
    ) -> Self {
        Self {
            styles,
            custom_formats,
            parsed: HashMap::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &FormatSettings {
        &self.settings
    }

    /// Mutable settings. Parsed formats do not depend on settings, so the
    /// cache stays valid.
    pub fn settings_mut(&mut self) -> &mut FormatSettings {
        &mut self.settings
    }

    pub fn set_date_system(&mut self, system: DateSystem) {
        self.settings.date_system = system;
    }

    /// Number of styles in the style table
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }

    /// Number-format id of a style
    pub fn format_id(&self, style_index: usize) -> Option<u32> {
        self.styles.get(style_index).copied()
    }

    /// Format code for a format id: built-in codes first, then the
    /// workbook's own.
    pub fn format_code(&self, format_id: u32) -> Option<&str> {
        builtin_format_code(format_id).or_else(|| {
            self.custom_formats
                .get(&format_id)
                .map(String::as_str)
        })
    }

    /// Render `value` with the style at `style_index`.
    ///
    /// Non-numeric values, unknown styles and unusable format codes return
    /// the value unchanged.
    pub fn apply(&mut self, value: &str, style_index: usize) -> String {
        match self.format_id(style_index) {
            Some(format_id) => self.apply_format(value, format_id),
            None => value.to_string(),
        }
    }

    /// Render `value` with a number-format id directly.
    pub fn apply_format(&mut self, value: &str, format_id: u32) -> String {
        let Some(number) = parse_numeric(value) else {
            return value.to_string();
        };
        if format_id == 0 {
            return format_general(number, &self.settings);
        }

        if !self.parsed.contains_key(&format_id) {
            let parsed = self.parse_format(format_id);
            self.parsed.insert(format_id, parsed);
        }
        let Some(Some(parsed)) = self.parsed.get(&format_id) else {
            return value.to_string();
        };

        let (section, number) = parsed.select(number);
        match section.render(number, value, &self.settings) {
            Ok(rendered) => rendered,
            Err(e) => {
                log::warn!("{}", e);
                value.to_string()
            }
        }
    }

    fn parse_format(&self, format_id: u32) -> Option<ParsedFormat> {
        let Some(code) = self.format_code(format_id) else {
            log::debug!("no format code for id {}", format_id);
            return None;
        };

        match ParsedFormat::parse(code) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                log::warn!("format id {}: {}", format_id, e);
                None
            }
        }
    }
}
