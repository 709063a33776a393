//! Error types for exchange segment encoding and decoding

/// Errors that can occur while encoding, decoding or sizing an exchange segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeaError {
    /// Leading magic number is not the exchange array constant
    BadMagic {
        /// The 32-bit value found at offset 0
        found: u32,
    },
    /// Type code is outside the registry or has no usable element type
    UnsupportedType {
        /// The offending wire ordinal
        code: u16,
    },
    /// A dimension or dimension count the wire fields cannot hold
    InvalidShape,
    /// Element count or segment size does not fit in the address space
    SizeOverflow,
    /// Buffer is shorter than the header or segment it must hold
    BufferTooSmall {
        /// Bytes needed
        required: usize,
        /// Bytes available
        actual: usize,
    },
    /// Stored payload offset points inside the header or is negative
    InvalidPayloadOffset {
        /// The raw offset field
        offset: i64,
    },
}

impl core::fmt::Display for WeaError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            WeaError::BadMagic { found } => {
                write!(f, "Not an exchange array segment (magic {found:#010x})")
            }
            WeaError::UnsupportedType { code } => write!(f, "Unsupported element type code {code}"),
            WeaError::InvalidShape => write!(f, "Invalid array shape"),
            WeaError::SizeOverflow => write!(f, "Segment size overflows the address space"),
            WeaError::BufferTooSmall { required, actual } => write!(
                f,
                "Buffer too small: {required} bytes required, {actual} available"
            ),
            WeaError::InvalidPayloadOffset { offset } => {
                write!(f, "Invalid payload offset {offset}")
            }
        }
    }
}

impl core::error::Error for WeaError {}

/// Result type for exchange format operations
pub type Result<T> = core::result::Result<T, WeaError>;
