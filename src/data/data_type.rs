//! Element types of the binary raster and the `data type` code table.

use crate::error::{CrismError, Result};

/// Numeric encoding of one raster element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Unsigned byte
    U8,
    /// 16-bit signed integer
    I16,
    /// 32-bit signed integer
    I32,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
    /// Pair of 32-bit floats (real, imaginary)
    Complex64,
    /// Pair of 64-bit floats (real, imaginary)
    Complex128,
    /// 16-bit unsigned integer
    U16,
    /// 32-bit unsigned integer
    U32,
    /// 64-bit signed integer
    I64,
    /// 64-bit unsigned integer
    U64,
}

/// `data type` codes 1..=11, in order.
static DATA_TYPES: [DataType; 11] = [
    DataType::U8,
    DataType::I16,
    DataType::I32,
    DataType::F32,
    DataType::F64,
    DataType::Complex64,
    DataType::Complex128,
    DataType::U16,
    DataType::U32,
    DataType::I64,
    DataType::U64,
];

impl DataType {
    /// Look up the element type for a header `data type` code.
    pub fn from_code(code: i64) -> Result<Self> {
        usize::try_from(code)
            .ok()
            .and_then(|c| c.checked_sub(1))
            .and_then(|i| DATA_TYPES.get(i).copied())
            .ok_or(CrismError::InvalidDataType(code))
    }

    /// The header code for this type.
    pub fn code(&self) -> i64 {
        DATA_TYPES
            .iter()
            .position(|t| t == self)
            .map_or(0, |i| i as i64 + 1)
    }

    /// Size of one element in bytes.
    pub fn size_bytes(&self) -> usize {
        match self {
            DataType::U8 => 1,
            DataType::I16 | DataType::U16 => 2,
            DataType::I32 | DataType::U32 | DataType::F32 => 4,
            DataType::F64 | DataType::I64 | DataType::U64 | DataType::Complex64 => 8,
            DataType::Complex128 => 16,
        }
    }

    /// Conventional short name (`uint8`, `float32`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            DataType::U8 => "uint8",
            DataType::I16 => "int16",
            DataType::I32 => "int32",
            DataType::F32 => "float32",
            DataType::F64 => "float64",
            DataType::Complex64 => "complex64",
            DataType::Complex128 => "complex128",
            DataType::U16 => "uint16",
            DataType::U32 => "uint32",
            DataType::I64 => "int64",
            DataType::U64 => "uint64",
        }
    }

    /// Whether elements carry an imaginary part.
    pub fn is_complex(&self) -> bool {
        matches!(self, DataType::Complex64 | DataType::Complex128)
    }
}
