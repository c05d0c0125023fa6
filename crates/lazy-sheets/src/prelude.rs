//! Prelude module - common imports for lazy-sheets users
//!
//! ```rust
//! use lazy_sheets::prelude::*;
//! ```

pub use crate::{
    load,
    // Errors
    Error,
    Format,
    LoadOptions,
    ReadOptions,
    Reader,
    Result,
    Row,
    SheetInfo,
    // Uniform reader surface
    SheetReader,
};
