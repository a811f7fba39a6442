//! Error types for header parsing and raster loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while parsing a CRISM header or loading its raster.
#[derive(Error, Debug)]
pub enum CrismError {
    /// I/O error while reading the header or binary file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unterminated header syntax
    #[error("Invalid header at line {line}: {message}")]
    Format {
        /// 1-based line number where the problem was detected
        line: usize,
        /// Description of the problem
        message: String,
    },

    /// A field the loader needs is absent from the header
    #[error("Missing required header field: '{field}'")]
    MissingField {
        /// Name of the missing field
        field: String,
    },

    /// A header field holds a value of the wrong kind
    #[error("Header field '{field}' has an invalid value: expected {expected}")]
    FieldType {
        /// Name of the offending field
        field: String,
        /// What kind of value was expected
        expected: &'static str,
    },

    /// Binary file extension not in the known set
    #[error("Unsupported binary extension '{extension}' (known extensions: {known:?})")]
    UnsupportedFormat {
        /// The extension that was found
        extension: String,
        /// Extensions the loader accepts
        known: Vec<String>,
    },

    /// Derived binary path does not reference an existing file
    #[error("Binary raster file not found: {path:?}")]
    FileNotFound {
        /// The derived path
        path: PathBuf,
    },

    /// `data type` code outside the supported 1..=11 range
    #[error("Invalid data type code {0} (expected 1..=11)")]
    InvalidDataType(i64),

    /// Binary file size does not match the declared shape
    #[error("Binary size mismatch: expected {expected} bytes, found {actual} bytes")]
    ShapeMismatch {
        /// Byte length implied by `lines * bands * samples * element size`
        expected: u64,
        /// Actual byte length of the file
        actual: u64,
    },

    /// Band index outside `[0, bands)`
    #[error("Band {band} out of range (image has {bands} bands)")]
    BandOutOfRange {
        /// Requested band
        band: usize,
        /// Number of bands in the raster
        bands: usize,
    },

    /// Bad accessor argument other than a single out-of-range band
    #[error("Index error: {message}")]
    Index {
        /// Description of the problem
        message: String,
    },

    /// Configuration could not be (de)serialized
    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),

    /// Configuration written by a newer version of this crate
    #[error("Unsupported config version {found} (newest supported is {supported})")]
    UnsupportedConfigVersion {
        /// Version found in the file
        found: u32,
        /// Newest version this build understands
        supported: u32,
    },
}

impl CrismError {
    /// Create a header format error.
    pub fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    /// Create a missing field error.
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a field type error.
    pub fn field_type(field: impl Into<String>, expected: &'static str) -> Self {
        Self::FieldType {
            field: field.into(),
            expected,
        }
    }

    /// Create an index error with a message.
    pub fn index(message: impl Into<String>) -> Self {
        Self::Index {
            message: message.into(),
        }
    }

    /// Whether this error belongs to the index family (bad accessor arguments).
    pub fn is_index_error(&self) -> bool {
        matches!(self, Self::BandOutOfRange { .. } | Self::Index { .. })
    }
}

/// Result type alias for CRISM operations
pub type Result<T> = std::result::Result<T, CrismError>;
