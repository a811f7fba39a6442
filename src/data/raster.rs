//! In-memory raster cube and its accessors.
//!
//! A CRISM cube is stored band-interleaved-by-line: the array shape is
//! `(lines, bands, samples)`, with samples varying fastest.

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView2, Axis};
use num_complex::{Complex32, Complex64};

use crate::config::ByteOrder;
use crate::data::data_type::DataType;
use crate::error::{CrismError, Result};

/// Numeric element that can be decoded from the binary raster.
pub trait Sample: Copy + Send + Sync + std::fmt::Debug + 'static {
    /// The header element type this Rust type represents.
    const DATA_TYPE: DataType;

    /// Decode one element from exactly `DATA_TYPE.size_bytes()` bytes.
    fn from_bytes(chunk: &[u8], order: ByteOrder) -> Self;

    /// Convert to f32 for display. Complex values keep their real part.
    fn to_f32(self) -> f32;

    /// Borrow the typed raster out of a type-erased one.
    fn downcast(data: &RasterData) -> Option<&Raster<Self>>;
}

macro_rules! impl_sample {
    ($t:ty, $variant:ident, $to_f32:expr) => {
        impl Sample for $t {
            const DATA_TYPE: DataType = DataType::$variant;

            fn from_bytes(chunk: &[u8], order: ByteOrder) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(chunk);
                match order {
                    ByteOrder::Little => <$t>::from_le_bytes(buf),
                    ByteOrder::Big => <$t>::from_be_bytes(buf),
                }
            }

            fn to_f32(self) -> f32 {
                ($to_f32)(self)
            }

            fn downcast(data: &RasterData) -> Option<&Raster<Self>> {
                match data {
                    RasterData::$variant(raster) => Some(raster),
                    _ => None,
                }
            }
        }
    };
}

impl_sample!(u8, U8, f32::from);
impl_sample!(i16, I16, f32::from);
impl_sample!(i32, I32, |v: i32| v as f32);
impl_sample!(f32, F32, |v: f32| v);
impl_sample!(f64, F64, |v: f64| v as f32);
impl_sample!(u16, U16, f32::from);
impl_sample!(u32, U32, |v: u32| v as f32);
impl_sample!(i64, I64, |v: i64| v as f32);
impl_sample!(u64, U64, |v: u64| v as f32);

impl Sample for Complex32 {
    const DATA_TYPE: DataType = DataType::Complex64;

    fn from_bytes(chunk: &[u8], order: ByteOrder) -> Self {
        let (re, im) = chunk.split_at(4);
        Complex32::new(
            <f32 as Sample>::from_bytes(re, order),
            <f32 as Sample>::from_bytes(im, order),
        )
    }

    fn to_f32(self) -> f32 {
        self.re
    }

    fn downcast(data: &RasterData) -> Option<&Raster<Self>> {
        match data {
            RasterData::Complex64(raster) => Some(raster),
            _ => None,
        }
    }
}

impl Sample for Complex64 {
    const DATA_TYPE: DataType = DataType::Complex128;

    fn from_bytes(chunk: &[u8], order: ByteOrder) -> Self {
        let (re, im) = chunk.split_at(8);
        Complex64::new(
            <f64 as Sample>::from_bytes(re, order),
            <f64 as Sample>::from_bytes(im, order),
        )
    }

    fn to_f32(self) -> f32 {
        self.re as f32
    }

    fn downcast(data: &RasterData) -> Option<&Raster<Self>> {
        match data {
            RasterData::Complex128(raster) => Some(raster),
            _ => None,
        }
    }
}

/// Dense `(lines, bands, samples)` cube of one element type.
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T> {
    data: Array3<T>,
}

impl<T: Sample> Raster<T> {
    /// Wrap an existing `(lines, bands, samples)` array.
    pub fn from_array(data: Array3<T>) -> Self {
        Self { data }
    }

    /// Decode packed elements into a cube of the given `(lines, bands, samples)` shape.
    ///
    /// Bytes beyond the declared element count are ignored; too few bytes
    /// is a shape mismatch.
    pub fn from_bytes(bytes: &[u8], shape: (usize, usize, usize), order: ByteOrder) -> Result<Self> {
        let size = T::DATA_TYPE.size_bytes();
        let needed = expected_len(shape, size).ok_or(CrismError::ShapeMismatch {
            expected: u64::MAX,
            actual: bytes.len() as u64,
        })?;
        if bytes.len() < needed {
            return Err(CrismError::ShapeMismatch {
                expected: needed as u64,
                actual: bytes.len() as u64,
            });
        }

        let values: Vec<T> = bytes[..needed]
            .chunks_exact(size)
            .map(|chunk| T::from_bytes(chunk, order))
            .collect();
        let data = Array3::from_shape_vec(shape, values).map_err(|_| CrismError::ShapeMismatch {
            expected: needed as u64,
            actual: bytes.len() as u64,
        })?;
        Ok(Self { data })
    }

    /// The underlying array.
    pub fn array(&self) -> &Array3<T> {
        &self.data
    }

    /// `(lines, bands, samples)`
    pub fn shape(&self) -> (usize, usize, usize) {
        self.data.dim()
    }

    pub fn lines(&self) -> usize {
        self.shape().0
    }

    pub fn bands(&self) -> usize {
        self.shape().1
    }

    pub fn samples(&self) -> usize {
        self.shape().2
    }

    /// One spectral band as a `(lines, samples)` view.
    pub fn band_slice(&self, band: usize) -> Result<ArrayView2<'_, T>> {
        self.check_band(band)?;
        Ok(self.data.index_axis(Axis(1), band))
    }

    /// All band values at one spatial location, length `bands`.
    pub fn pixel_spectrum(&self, sample: usize, line: usize) -> Result<ArrayView1<'_, T>> {
        let (lines, _, samples) = self.shape();
        if sample >= samples || line >= lines {
            return Err(CrismError::index(format!(
                "pixel (sample {}, line {}) outside {}x{} image",
                sample, line, samples, lines
            )));
        }
        Ok(self
            .data
            .index_axis(Axis(0), line)
            .index_axis_move(Axis(1), sample))
    }

    /// Stack three bands as channels of a `(lines, samples, 3)` image, scaled
    /// by `multiplier`.
    pub fn composite(&self, bands: &[usize], multiplier: f32) -> Result<Array3<f32>> {
        let [r, g, b] = <[usize; 3]>::try_from(bands).map_err(|_| {
            CrismError::index(format!("a composite needs 3 bands, got {}", bands.len()))
        })?;
        for band in [r, g, b] {
            self.check_band(band)?;
        }
        if r == g && g == b {
            log::info!("All bands are the same ({}), output will be grayscale", r);
        }

        let channels = [r, g, b];
        let (lines, _, samples) = self.shape();
        let composite = Array3::from_shape_fn((lines, samples, 3), |(line, sample, c)| {
            self.data[[line, channels[c], sample]].to_f32() * multiplier
        });

        let non_finite = composite.iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            log::warn!(
                "Composite of bands {:?} has {} non-finite values",
                channels,
                non_finite
            );
        }
        Ok(composite)
    }

    fn check_band(&self, band: usize) -> Result<()> {
        if band >= self.bands() {
            return Err(CrismError::BandOutOfRange {
                band,
                bands: self.bands(),
            });
        }
        Ok(())
    }
}

/// Byte length of a `(lines, bands, samples)` cube, `None` on overflow.
pub(crate) fn expected_len(shape: (usize, usize, usize), element_size: usize) -> Option<usize> {
    shape
        .0
        .checked_mul(shape.1)?
        .checked_mul(shape.2)?
        .checked_mul(element_size)
}

/// A raster whose element type is only known at runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum RasterData {
    U8(Raster<u8>),
    I16(Raster<i16>),
    I32(Raster<i32>),
    F32(Raster<f32>),
    F64(Raster<f64>),
    /// numpy `complex64`: two f32
    Complex64(Raster<Complex32>),
    /// numpy `complex128`: two f64
    Complex128(Raster<Complex64>),
    U16(Raster<u16>),
    U32(Raster<u32>),
    I64(Raster<i64>),
    U64(Raster<u64>),
}

macro_rules! with_raster {
    ($data:expr, $raster:ident => $body:expr) => {
        match $data {
            RasterData::U8($raster) => $body,
            RasterData::I16($raster) => $body,
            RasterData::I32($raster) => $body,
            RasterData::F32($raster) => $body,
            RasterData::F64($raster) => $body,
            RasterData::Complex64($raster) => $body,
            RasterData::Complex128($raster) => $body,
            RasterData::U16($raster) => $body,
            RasterData::U32($raster) => $body,
            RasterData::I64($raster) => $body,
            RasterData::U64($raster) => $body,
        }
    };
}

impl RasterData {
    /// Decode packed bytes as `data_type` into a `(lines, bands, samples)` cube.
    pub fn decode(
        bytes: &[u8],
        shape: (usize, usize, usize),
        data_type: DataType,
        order: ByteOrder,
    ) -> Result<Self> {
        Ok(match data_type {
            DataType::U8 => RasterData::U8(Raster::from_bytes(bytes, shape, order)?),
            DataType::I16 => RasterData::I16(Raster::from_bytes(bytes, shape, order)?),
            DataType::I32 => RasterData::I32(Raster::from_bytes(bytes, shape, order)?),
            DataType::F32 => RasterData::F32(Raster::from_bytes(bytes, shape, order)?),
            DataType::F64 => RasterData::F64(Raster::from_bytes(bytes, shape, order)?),
            DataType::Complex64 => RasterData::Complex64(Raster::from_bytes(bytes, shape, order)?),
            DataType::Complex128 => {
                RasterData::Complex128(Raster::from_bytes(bytes, shape, order)?)
            }
            DataType::U16 => RasterData::U16(Raster::from_bytes(bytes, shape, order)?),
            DataType::U32 => RasterData::U32(Raster::from_bytes(bytes, shape, order)?),
            DataType::I64 => RasterData::I64(Raster::from_bytes(bytes, shape, order)?),
            DataType::U64 => RasterData::U64(Raster::from_bytes(bytes, shape, order)?),
        })
    }

    /// Element type of the cube.
    pub fn data_type(&self) -> DataType {
        fn type_of<T: Sample>(_: &Raster<T>) -> DataType {
            T::DATA_TYPE
        }
        with_raster!(self, r => type_of(r))
    }

    /// `(lines, bands, samples)`
    pub fn shape(&self) -> (usize, usize, usize) {
        with_raster!(self, r => r.shape())
    }

    /// Typed access to the cube.
    pub fn as_raster<T: Sample>(&self) -> Option<&Raster<T>> {
        T::downcast(self)
    }

    /// One band as f32, shape `(lines, samples)`.
    pub fn band_f32(&self, band: usize) -> Result<Array2<f32>> {
        with_raster!(self, r => Ok(r.band_slice(band)?.mapv(|v| v.to_f32())))
    }

    /// Spectrum at one pixel as f32, length `bands`.
    pub fn spectrum_f32(&self, sample: usize, line: usize) -> Result<Array1<f32>> {
        with_raster!(self, r => Ok(r.pixel_spectrum(sample, line)?.mapv(|v| v.to_f32())))
    }

    /// Three-band composite, see [`Raster::composite`].
    pub fn composite(&self, bands: &[usize], multiplier: f32) -> Result<Array3<f32>> {
        with_raster!(self, r => r.composite(bands, multiplier))
    }
}
