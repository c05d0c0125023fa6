//! XLSX reader options

use std::path::PathBuf;

use lazy_sheets_format::FormatSettings;

/// Default number of shared strings kept in memory
pub const SHARED_STRING_CACHE_LIMIT: usize = 50_000;

/// Options for opening an XLSX package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XlsxOptions {
    /// Shared-string tables declaring more entries than this are not cached;
    /// strings are then looked up by scanning the table. `None` caches every
    /// table regardless of size.
    pub shared_string_cache_limit: Option<usize>,
    /// Directory for extracted package parts (system temp dir by default)
    pub temp_dir: Option<PathBuf>,
    /// Separators, currency and date settings for number formats
    pub format: FormatSettings,
}

impl Default for XlsxOptions {
    fn default() -> Self {
        Self {
            shared_string_cache_limit: Some(SHARED_STRING_CACHE_LIMIT),
            temp_dir: None,
            format: FormatSettings::default(),
        }
    }
}
