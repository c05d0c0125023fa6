//! Locale-like settings used when rendering numbers

/// Epoch used to interpret date serials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateSystem {
    /// Day 1 is 1900-01-01, with the phantom 1900-02-29 at serial 60
    #[default]
    Excel1900,
    /// Day 0 is 1904-01-01
    Excel1904,
}

/// Separators, default currency and date system for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSettings {
    /// Decimal separator (default `.`)
    pub decimal_separator: String,
    /// Thousands separator for grouped formats (default `,`)
    pub thousands_separator: String,
    /// Code substituted for currency tags without an explicit code
    pub currency_code: String,
    /// Date epoch
    pub date_system: DateSystem,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            decimal_separator: ".".into(),
            thousands_separator: ",".into(),
            currency_code: String::new(),
            date_system: DateSystem::Excel1900,
        }
    }
}
