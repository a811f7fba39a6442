//! CRISM header parsing.
//!
//! This module provides:
//! - `HeaderRecord`: ordered mapping from field name to typed value
//! - `HeaderValue`: integer, float, string or brace-delimited composite
//! - `parse_header` / `parse_lines`: the text-to-record tokenizer

mod parser;
mod value;

use std::path::Path;

use crate::error::Result;

pub use parser::{parse_header, parse_lines};
pub use value::{HeaderRecord, HeaderValue};

/// Read and parse a header file (UTF-8).
pub fn read_header(path: impl AsRef<Path>) -> Result<HeaderRecord> {
    let path = path.as_ref();
    log::debug!("Reading header {}", path.display());
    let text = std::fs::read_to_string(path)?;
    parse_header(&text)
}
