//! Raster layout, loading and display helpers.
//!
//! This module provides:
//! - `DataType`: the fixed `data type` code table
//! - `RasterDescriptor`: binary path, element type and shape derived from a header
//! - `Raster<T>` / `RasterData`: the `(lines, bands, samples)` cube
//! - `CrismImage`: header + descriptor + cube, with band and composite accessors
//! - `render`: band and composite conversion to 8-bit images

mod band;
mod data_type;
mod loader;
mod raster;
pub mod render;

#[cfg(test)]
mod tests;

pub use band::BandSelection;
pub use data_type::DataType;
pub use loader::{CrismImage, RasterDescriptor, binary_file_name};
pub use raster::{Raster, RasterData, Sample};
