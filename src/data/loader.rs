//! Two-stage loading of a CRISM cube.
//!
//! 1. `RasterDescriptor::from_header` derives the binary file path, element
//!    type, byte order and shape from a parsed header and validates them.
//! 2. `RasterDescriptor::load` reads the binary file and reshapes it.
//!
//! `CrismImage` runs both stages and keeps the header, descriptor and cube
//! together.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use crism::CrismImage;
//!
//! let image = CrismImage::from_header_file("data/frt0001_07_if165j_trr3.hdr", "data")?;
//! let band = image.band_slice(10)?;
//! let rgb = image.composite(&[233, 78, 13], 5.0)?;
//! # Ok::<(), crism::CrismError>(())
//! ```

use std::path::{Path, PathBuf};

use image::{GrayImage, RgbImage};
use ndarray::{Array1, Array2, Array3};

use crate::config::{ByteOrder, LoaderConfig};
use crate::constants::{
    KEY_BAND_NAMES, KEY_BANDS, KEY_BYTE_ORDER, KEY_CAT_HISTORY, KEY_CAT_INPUT_FILES,
    KEY_DATA_TYPE, KEY_LINES, KEY_SAMPLES, KEY_WAVELENGTH,
};
use crate::data::band::BandSelection;
use crate::data::data_type::DataType;
use crate::data::raster::{Raster, RasterData, Sample, expected_len};
use crate::data::render;
use crate::error::{CrismError, Result};
use crate::header::{self, HeaderRecord, HeaderValue};

/// Binary layout derived from a header. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterDescriptor {
    /// Samples per line (fastest-varying axis)
    pub samples: usize,
    /// Number of lines
    pub lines: usize,
    /// Number of spectral bands
    pub bands: usize,
    /// Raw `data type` code from the header
    pub data_type_code: i64,
    /// Element type for `data_type_code`
    pub data_type: DataType,
    /// Byte order of the binary file
    pub byte_order: ByteOrder,
    /// Path of the companion binary file
    pub binary_path: PathBuf,
    /// Center wavelength per band, when the header lists one per band
    pub wavelengths: Option<Vec<f64>>,
    /// Name per band, when the header lists one per band
    pub band_names: Option<Vec<String>>,
}

impl RasterDescriptor {
    /// Derive and validate the binary layout described by `header`.
    ///
    /// The binary file is looked up in `base_path`.
    pub fn from_header(
        header: &HeaderRecord,
        base_path: impl AsRef<Path>,
        config: &LoaderConfig,
    ) -> Result<Self> {
        let file_name = binary_file_name(header, config)?;
        let binary_path = base_path.as_ref().join(file_name);
        if !binary_path.is_file() {
            return Err(CrismError::FileNotFound { path: binary_path });
        }

        let samples = dimension(header, KEY_SAMPLES)?;
        let lines = dimension(header, KEY_LINES)?;
        let bands = dimension(header, KEY_BANDS)?;

        let data_type_code = header.require_int(KEY_DATA_TYPE)?;
        let data_type = DataType::from_code(data_type_code)?;

        let byte_order = match header.get(KEY_BYTE_ORDER) {
            None => config.default_byte_order,
            Some(HeaderValue::Int(code)) => ByteOrder::from_code(*code)
                .ok_or_else(|| CrismError::field_type(KEY_BYTE_ORDER, "0 or 1"))?,
            Some(_) => return Err(CrismError::field_type(KEY_BYTE_ORDER, "0 or 1")),
        };

        let wavelengths = match header.float_list(KEY_WAVELENGTH) {
            Ok(list) => per_band(list, bands, KEY_WAVELENGTH),
            Err(e) => {
                log::warn!("Ignoring wavelengths: {}", e);
                None
            }
        };
        let band_names = per_band(header.string_list(KEY_BAND_NAMES), bands, KEY_BAND_NAMES);

        Ok(Self {
            samples,
            lines,
            bands,
            data_type_code,
            data_type,
            byte_order,
            binary_path,
            wavelengths,
            band_names,
        })
    }

    /// `(lines, bands, samples)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.lines, self.bands, self.samples)
    }

    /// Byte length the binary file must have, `None` if it overflows.
    pub fn expected_byte_len(&self) -> Option<u64> {
        expected_len(self.shape(), self.data_type.size_bytes()).map(|n| n as u64)
    }

    /// Read the binary file and reshape it.
    pub fn load(&self, config: &LoaderConfig) -> Result<RasterData> {
        let actual = std::fs::metadata(&self.binary_path)?.len();
        let expected = self.expected_byte_len().ok_or(CrismError::ShapeMismatch {
            expected: u64::MAX,
            actual,
        })?;

        if actual != expected {
            if config.verify_file_size || actual < expected {
                return Err(CrismError::ShapeMismatch { expected, actual });
            }
            log::warn!(
                "{} has {} bytes, reading only the first {}",
                self.binary_path.display(),
                actual,
                expected
            );
        }

        let bytes = std::fs::read(&self.binary_path)?;
        RasterData::decode(&bytes, self.shape(), self.data_type, self.byte_order)
    }
}

/// File name of the binary raster: input base name, history suffix and
/// lowercased extension.
///
/// `cat input files = scene.img` with `cat history = _suffix` gives
/// `scene_suffix.img`.
pub fn binary_file_name(header: &HeaderRecord, config: &LoaderConfig) -> Result<String> {
    let input = header.require_str(KEY_CAT_INPUT_FILES)?.trim();
    let history = header.require_str(KEY_CAT_HISTORY)?.trim_matches(' ');

    let (base, extension) = match input.find('.') {
        Some(dot) => (input[..dot].trim_end(), &input[dot..]),
        None => (input, ""),
    };
    if !config.is_known_extension(extension) {
        return Err(CrismError::UnsupportedFormat {
            extension: extension.to_string(),
            known: config.known_extensions.clone(),
        });
    }

    Ok(format!("{}{}{}", base, history, extension.to_lowercase()))
}

fn dimension(header: &HeaderRecord, key: &str) -> Result<usize> {
    usize::try_from(header.require_int(key)?)
        .map_err(|_| CrismError::field_type(key, "a non-negative integer"))
}

fn per_band<T>(list: Option<Vec<T>>, bands: usize, key: &str) -> Option<Vec<T>> {
    let list = list?;
    if list.len() != bands {
        log::warn!(
            "Header field {:?} has {} entries for {} bands, ignoring it",
            key,
            list.len(),
            bands
        );
        return None;
    }
    Some(list)
}

/// A loaded CRISM cube with its header.
#[derive(Debug, Clone)]
pub struct CrismImage {
    header: HeaderRecord,
    descriptor: RasterDescriptor,
    data: RasterData,
    brightness_multiplier: f32,
}

impl CrismImage {
    /// Load the cube described by a parsed header, with default settings.
    pub fn open(header: HeaderRecord, base_path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(header, base_path, &LoaderConfig::default())
    }

    /// Load the cube described by a parsed header.
    pub fn open_with_config(
        header: HeaderRecord,
        base_path: impl AsRef<Path>,
        config: &LoaderConfig,
    ) -> Result<Self> {
        let descriptor = RasterDescriptor::from_header(&header, base_path, config)?;
        let data = descriptor.load(config)?;

        log::info!(
            "Loaded {}: {} lines x {} bands x {} samples ({}, {})",
            descriptor.binary_path.display(),
            descriptor.lines,
            descriptor.bands,
            descriptor.samples,
            descriptor.data_type.name(),
            descriptor.byte_order.name()
        );

        Ok(Self {
            header,
            descriptor,
            data,
            brightness_multiplier: config.brightness_multiplier,
        })
    }

    /// Read a header file and load its cube, with default settings.
    pub fn from_header_file(
        header_path: impl AsRef<Path>,
        base_path: impl AsRef<Path>,
    ) -> Result<Self> {
        Self::from_header_file_with_config(header_path, base_path, &LoaderConfig::default())
    }

    /// Read a header file and load its cube.
    pub fn from_header_file_with_config(
        header_path: impl AsRef<Path>,
        base_path: impl AsRef<Path>,
        config: &LoaderConfig,
    ) -> Result<Self> {
        let header = header::read_header(header_path)?;
        Self::open_with_config(header, base_path, config)
    }

    pub fn header(&self) -> &HeaderRecord {
        &self.header
    }

    pub fn descriptor(&self) -> &RasterDescriptor {
        &self.descriptor
    }

    /// The cube, type-erased.
    pub fn data(&self) -> &RasterData {
        &self.data
    }

    /// The cube as its concrete element type, `None` if `T` does not match.
    pub fn raster<T: Sample>(&self) -> Option<&Raster<T>> {
        self.data.as_raster()
    }

    /// `(lines, bands, samples)`
    pub fn shape(&self) -> (usize, usize, usize) {
        self.descriptor.shape()
    }

    pub fn data_type(&self) -> DataType {
        self.descriptor.data_type
    }

    /// One band, shape `(lines, samples)`, converted to f32 for display.
    ///
    /// 64-bit and complex cubes lose precision (complex keeps the real part);
    /// use [`CrismImage::raster`] and [`Raster::band_slice`] for exact values.
    pub fn band_slice(&self, band: usize) -> Result<Array2<f32>> {
        self.data.band_f32(band)
    }

    /// Band values at one pixel, length `bands`, converted to f32 like
    /// [`CrismImage::band_slice`]. Exact values: [`Raster::pixel_spectrum`].
    pub fn pixel_spectrum(&self, sample: usize, line: usize) -> Result<Array1<f32>> {
        self.data.spectrum_f32(sample, line)
    }

    /// Three bands stacked as `(lines, samples, 3)` and scaled by `multiplier`.
    pub fn composite(&self, bands: &[usize], multiplier: f32) -> Result<Array3<f32>> {
        self.data.composite(bands, multiplier)
    }

    /// Composite scaled by the configured brightness multiplier.
    pub fn composite_default(&self, selection: BandSelection) -> Result<Array3<f32>> {
        self.composite(&selection.as_array(), self.brightness_multiplier)
    }

    /// Label for a band: its name, else its wavelength, else `Band N`.
    pub fn band_label(&self, band: usize) -> Option<String> {
        if band >= self.descriptor.bands {
            return None;
        }
        if let Some(name) = self.descriptor.band_names.as_ref().map(|n| &n[band]) {
            return Some(name.clone());
        }
        if let Some(wavelength) = self.descriptor.wavelengths.as_ref().map(|w| w[band]) {
            return Some(format!("{}", wavelength));
        }
        Some(format!("Band {}", band + 1))
    }

    /// One band rendered as an auto-stretched grayscale image.
    pub fn band_image(&self, band: usize) -> Result<GrayImage> {
        Ok(render::band_to_gray(self.band_slice(band)?.view()))
    }

    /// Three bands rendered as an RGB image.
    pub fn composite_image(&self, bands: &[usize], multiplier: f32) -> Result<RgbImage> {
        Ok(render::composite_to_rgb(&self.composite(bands, multiplier)?))
    }
}
