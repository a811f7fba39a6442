//! CRISM - reader for CRISM hyperspectral cubes
//!
//! A CRISM product is an ENVI-style text header plus a raw binary raster.
//! The header is parsed into a `HeaderRecord`; a few of its fields locate
//! the companion `.img` file and describe its element type and
//! `(lines, bands, samples)` shape.

pub mod config;
pub mod constants;
pub mod data;
pub mod error;
pub mod header;

pub use config::{ByteOrder, LoaderConfig};
pub use data::{
    BandSelection, CrismImage, DataType, Raster, RasterData, RasterDescriptor, Sample,
};
pub use error::{CrismError, Result};
pub use header::{HeaderRecord, HeaderValue, parse_header, parse_lines, read_header};
