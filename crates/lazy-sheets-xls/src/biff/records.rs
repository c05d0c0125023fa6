//! BIFF8 record type constants.
//!
//! Reference: [MS-XLS] §2.3 (Record Enumeration). Only the records the
//! reader looks at are listed.

// Stream structure
pub const BOF: u16 = 0x0809;
pub const EOF: u16 = 0x000A;
pub const CONTINUE: u16 = 0x003C;

// Workbook globals
pub const BOUNDSHEET: u16 = 0x0085; // Sheet name, type, stream offset
pub const SST: u16 = 0x00FC; // Shared String Table
pub const DATEMODE: u16 = 0x0022; // 1900 vs 1904 date system
pub const FORMAT: u16 = 0x041E; // Number format string
pub const XF: u16 = 0x00E0; // Extended Format (cell format record)

// Cell records
pub const DIMENSION: u16 = 0x0200; // Used range
pub const LABELSST: u16 = 0x00FD; // Cell containing SST string index
pub const LABEL: u16 = 0x0204; // Cell with inline string
pub const NUMBER: u16 = 0x0203; // Cell with IEEE 754 double
pub const RK: u16 = 0x027E; // Cell with compressed number
pub const MULRK: u16 = 0x00BD; // Multiple RK values in one row
pub const BOOLERR: u16 = 0x0205; // Boolean or error cell
pub const FORMULA: u16 = 0x0006; // Formula cell with cached result
pub const STRING: u16 = 0x0207; // Cached string result for preceding FORMULA

// BOF subtypes (the `dt` field)
pub const BOF_WORKBOOK_GLOBALS: u16 = 0x0005;
pub const BOF_WORKSHEET: u16 = 0x0010;

/// Sheet type of a worksheet in BOUNDSHEET
pub const SHEET_TYPE_WORKSHEET: u8 = 0x00;

/// BIFF version we support.
pub const BIFF8_VERSION: u16 = 0x0600;
