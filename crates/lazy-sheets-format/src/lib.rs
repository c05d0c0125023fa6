//! # lazy-sheets-format
//!
//! Turns raw cell values into the text a spreadsheet application would show.
//!
//! A [`FormatInterpreter`] owns the style table of one workbook (style index →
//! number-format id) and the workbook's custom format codes. Format codes are
//! parsed into [`FormatDescriptor`]s on first use and cached per format id.
//!
//! ```rust
//! use std::collections::HashMap;
//! use lazy_sheets_format::FormatInterpreter;
//!
//! // style 0 = General, style 1 = built-in 10 (0.00%)
//! let mut interpreter = FormatInterpreter::new(vec![0, 10], HashMap::new());
//! assert_eq!(interpreter.apply("0.256", 1), "25.60%");
//! assert_eq!(interpreter.apply("hello", 1), "hello");
//! ```

pub mod builtin;
pub mod datetime;
pub mod descriptor;
pub mod error;
pub mod fraction;
pub mod general;
pub mod interpreter;
pub mod settings;

pub use builtin::builtin_format_code;
pub use descriptor::{DigitTemplate, FormatDescriptor, FormatKind, ParsedFormat};
pub use error::{FormatError, Result};
pub use general::format_general;
pub use interpreter::{parse_numeric, FormatInterpreter};
pub use settings::{DateSystem, FormatSettings};
