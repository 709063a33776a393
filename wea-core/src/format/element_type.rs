//! Element type registry
//!
//! Closed bidirectional mapping between the 16-bit wire ordinal stored in
//! a segment header and the numeric element type of the payload.

use crate::{Result, WeaError};

/// Numeric element types of the exchange format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[repr(u16)]
pub enum ElementType {
    /// Signed 8-bit integer
    Int8 = 1,
    /// Unsigned 8-bit integer
    UInt8 = 2,
    /// Signed 16-bit integer
    Int16 = 3,
    /// Unsigned 16-bit integer
    UInt16 = 4,
    /// Signed 32-bit integer
    Int32 = 5,
    /// Unsigned 32-bit integer
    UInt32 = 6,
    /// Signed 64-bit integer
    Int64 = 7,
    /// Unsigned 64-bit integer
    UInt64 = 8,
    /// 32-bit floating point
    Float32 = 9,
    /// 64-bit floating point
    Float64 = 10,
    /// Complex number with 32-bit float components.
    ///
    /// Registered so the ordinal is recognised, but never exchanged:
    /// encoding or decoding it fails with `UnsupportedType`.
    #[cfg_attr(feature = "serde", serde(rename = "complex64"))]
    ComplexF32 = 11,
    /// Complex number with 64-bit float components
    #[cfg_attr(feature = "serde", serde(rename = "complex128"))]
    ComplexF64 = 12,
}

impl ElementType {
    /// Every registered type, in ordinal order
    pub const ALL: [ElementType; 12] = [
        ElementType::Int8,
        ElementType::UInt8,
        ElementType::Int16,
        ElementType::UInt16,
        ElementType::Int32,
        ElementType::UInt32,
        ElementType::Int64,
        ElementType::UInt64,
        ElementType::Float32,
        ElementType::Float64,
        ElementType::ComplexF32,
        ElementType::ComplexF64,
    ];

    /// Look up the type registered under a wire ordinal
    pub const fn from_code(code: u16) -> Result<Self> {
        match code {
            1 => Ok(ElementType::Int8),
            2 => Ok(ElementType::UInt8),
            3 => Ok(ElementType::Int16),
            4 => Ok(ElementType::UInt16),
            5 => Ok(ElementType::Int32),
            6 => Ok(ElementType::UInt32),
            7 => Ok(ElementType::Int64),
            8 => Ok(ElementType::UInt64),
            9 => Ok(ElementType::Float32),
            10 => Ok(ElementType::Float64),
            11 => Ok(ElementType::ComplexF32),
            12 => Ok(ElementType::ComplexF64),
            _ => Err(WeaError::UnsupportedType { code }),
        }
    }

    /// Wire ordinal of this type
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Size of one element in bytes
    pub const fn byte_width(self) -> usize {
        match self {
            ElementType::Int8 | ElementType::UInt8 => 1,
            ElementType::Int16 | ElementType::UInt16 => 2,
            ElementType::Int32 | ElementType::UInt32 | ElementType::Float32 => 4,
            ElementType::Int64
            | ElementType::UInt64
            | ElementType::Float64
            | ElementType::ComplexF32 => 8,
            ElementType::ComplexF64 => 16,
        }
    }

    /// Whether segments of this type may be encoded or decoded
    pub const fn is_supported(self) -> bool {
        !matches!(self, ElementType::ComplexF32)
    }

    /// Resolve a wire ordinal to a type that can actually be exchanged
    pub const fn supported_from_code(code: u16) -> Result<Self> {
        match Self::from_code(code) {
            Ok(ty) if ty.is_supported() => Ok(ty),
            Ok(_) => Err(WeaError::UnsupportedType { code }),
            Err(e) => Err(e),
        }
    }

    /// Conventional dtype name
    pub const fn name(self) -> &'static str {
        match self {
            ElementType::Int8 => "int8",
            ElementType::UInt8 => "uint8",
            ElementType::Int16 => "int16",
            ElementType::UInt16 => "uint16",
            ElementType::Int32 => "int32",
            ElementType::UInt32 => "uint32",
            ElementType::Int64 => "int64",
            ElementType::UInt64 => "uint64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::ComplexF32 => "complex64",
            ElementType::ComplexF64 => "complex128",
        }
    }
}

impl core::fmt::Display for ElementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u16> for ElementType {
    type Error = WeaError;

    fn try_from(code: u16) -> Result<Self> {
        Self::from_code(code)
    }
}

impl From<ElementType> for u16 {
    fn from(ty: ElementType) -> Self {
        ty.code()
    }
}

/// Error returned when parsing an unknown dtype name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownElementType;

impl core::fmt::Display for UnknownElementType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Unknown element type name")
    }
}

impl core::error::Error for UnknownElementType {}

impl core::str::FromStr for ElementType {
    type Err = UnknownElementType;

    fn from_str(s: &str) -> core::result::Result<Self, Self::Err> {
        let ty = match s {
            "int8" | "i8" => ElementType::Int8,
            "uint8" | "u8" => ElementType::UInt8,
            "int16" | "i16" => ElementType::Int16,
            "uint16" | "u16" => ElementType::UInt16,
            "int32" | "i32" => ElementType::Int32,
            "uint32" | "u32" => ElementType::UInt32,
            "int64" | "i64" => ElementType::Int64,
            "uint64" | "u64" => ElementType::UInt64,
            "float32" | "f32" => ElementType::Float32,
            "float64" | "f64" => ElementType::Float64,
            "complex64" | "c64" => ElementType::ComplexF32,
            "complex128" | "c128" => ElementType::ComplexF64,
            _ => return Err(UnknownElementType),
        };
        Ok(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn test_codes_are_dense_and_bijective() {
        for (i, ty) in ElementType::ALL.iter().enumerate() {
            let code = (i + 1) as u16;
            assert_eq!(ty.code(), code);
            assert_eq!(ElementType::from_code(code), Ok(*ty));
        }
    }

    #[test]
    fn test_out_of_range_codes() {
        assert_eq!(
            ElementType::from_code(0),
            Err(WeaError::UnsupportedType { code: 0 })
        );
        assert_eq!(
            ElementType::from_code(13),
            Err(WeaError::UnsupportedType { code: 13 })
        );
        assert_eq!(
            ElementType::from_code(u16::MAX),
            Err(WeaError::UnsupportedType { code: u16::MAX })
        );
    }

    #[test]
    fn test_complex_f32_is_registered_but_unsupported() {
        assert_eq!(ElementType::from_code(11), Ok(ElementType::ComplexF32));
        assert!(!ElementType::ComplexF32.is_supported());
        assert_eq!(
            ElementType::supported_from_code(11),
            Err(WeaError::UnsupportedType { code: 11 })
        );
        assert_eq!(
            ElementType::supported_from_code(12),
            Ok(ElementType::ComplexF64)
        );
    }

    #[test]
    fn test_byte_widths() {
        assert_eq!(ElementType::Int8.byte_width(), 1);
        assert_eq!(ElementType::UInt16.byte_width(), 2);
        assert_eq!(ElementType::Float32.byte_width(), 4);
        assert_eq!(ElementType::Float64.byte_width(), 8);
        assert_eq!(ElementType::ComplexF64.byte_width(), 16);
    }

    #[test]
    fn test_names_parse_back() {
        for ty in ElementType::ALL {
            assert_eq!(ElementType::from_str(ty.name()), Ok(ty));
        }
        assert_eq!(ElementType::from_str("f64"), Ok(ElementType::Float64));
        assert_eq!(ElementType::from_str("float16"), Err(UnknownElementType));
    }
}
