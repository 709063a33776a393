//! Segment header encoding and decoding
//!
//! Layout (host byte order):
//!
//! ```text
//! offset  size  field
//!      0     4  magic           u32  = 0x57412D31
//!      4     2  type code       u16  1..=12
//!      6     2  dimension count u16  N
//!      8     8  payload offset  i64
//!     16   8*N  dimensions      i64 each
//!      …        padding up to the payload offset
//! ```
//!
//! The payload is the column-major element data starting at the payload
//! offset. Byte order is the host's; segments are not portable across
//! hosts of different endianness.

use super::constants::{offsets, BASE_HEADER_SIZE, DIM_SIZE, MAGIC};
use crate::layout::{header_fields_size, SegmentLayout};
use crate::{ElementType, Result, WeaError};

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_ne_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_ne_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_i64(bytes: &[u8], at: usize) -> i64 {
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[at..at + 8]);
    i64::from_ne_bytes(raw)
}

/// Write the header for `shape` elements of `element_type` into the front of `buffer`.
///
/// `buffer` must be at least as large as the whole segment. Bytes between
/// the last header field and the payload offset are zeroed, so encoding the
/// same inputs always yields identical header bytes. The payload is left
/// untouched. Returns the payload offset.
pub fn encode(buffer: &mut [u8], element_type: ElementType, shape: &[usize]) -> Result<usize> {
    let layout = SegmentLayout::compute(shape, element_type)?;
    if !element_type.is_supported() {
        return Err(WeaError::UnsupportedType {
            code: element_type.code(),
        });
    }
    if buffer.len() < layout.total_size {
        return Err(WeaError::BufferTooSmall {
            required: layout.total_size,
            actual: buffer.len(),
        });
    }

    let header = &mut buffer[..layout.payload_offset];
    header[offsets::MAGIC..offsets::MAGIC + 4].copy_from_slice(&MAGIC.to_ne_bytes());
    header[offsets::TYPE_CODE..offsets::TYPE_CODE + 2]
        .copy_from_slice(&element_type.code().to_ne_bytes());
    header[offsets::NDIMS..offsets::NDIMS + 2]
        .copy_from_slice(&(layout.ndims as u16).to_ne_bytes());
    header[offsets::PAYLOAD_OFFSET..offsets::PAYLOAD_OFFSET + 8]
        .copy_from_slice(&(layout.payload_offset as i64).to_ne_bytes());

    for (i, &dim) in shape.iter().enumerate() {
        let at = offsets::DIMS + i * DIM_SIZE;
        header[at..at + DIM_SIZE].copy_from_slice(&(dim as i64).to_ne_bytes());
    }

    header[header_fields_size(layout.ndims)..].fill(0);

    Ok(layout.payload_offset)
}

fn read_fixed_fields(buffer: &[u8]) -> Result<(ElementType, usize)> {
    if buffer.len() < BASE_HEADER_SIZE {
        return Err(WeaError::BufferTooSmall {
            required: BASE_HEADER_SIZE,
            actual: buffer.len(),
        });
    }

    let magic = read_u32(buffer, offsets::MAGIC);
    if magic != MAGIC {
        return Err(WeaError::BadMagic { found: magic });
    }

    let element_type = ElementType::supported_from_code(read_u16(buffer, offsets::TYPE_CODE))?;
    Ok((element_type, read_u16(buffer, offsets::NDIMS) as usize))
}

/// Length of the header fields declared by the fixed fields at the front of `buffer`.
///
/// Only the magic number and type code are checked. Stream readers use
/// this to learn how many more bytes to read before [`HeaderRef::parse`].
pub fn declared_fields_size(buffer: &[u8]) -> Result<usize> {
    read_fixed_fields(buffer).map(|(_, ndims)| header_fields_size(ndims))
}

/// Borrowed, allocation-free view of a validated header
#[derive(Debug, Clone, Copy)]
pub struct HeaderRef<'a> {
    bytes: &'a [u8],
    element_type: ElementType,
    ndims: usize,
    payload_offset: usize,
}

impl<'a> HeaderRef<'a> {
    /// Parse and validate the header at the front of `buffer`.
    ///
    /// Checks, in order: room for the fixed fields, the magic number, the
    /// type code, room for the declared dimensions, a payload offset that
    /// lies past the dimensions, then non-negative dimensions.
    pub fn parse(buffer: &'a [u8]) -> Result<Self> {
        let (element_type, ndims) = read_fixed_fields(buffer)?;

        let fields = header_fields_size(ndims);
        if buffer.len() < fields {
            return Err(WeaError::BufferTooSmall {
                required: fields,
                actual: buffer.len(),
            });
        }

        let raw_offset = read_i64(buffer, offsets::PAYLOAD_OFFSET);
        if raw_offset < fields as i64 || raw_offset as u64 > usize::MAX as u64 {
            return Err(WeaError::InvalidPayloadOffset { offset: raw_offset });
        }

        let header = Self {
            bytes: &buffer[..fields],
            element_type,
            ndims,
            payload_offset: raw_offset as usize,
        };
        if header.raw_dims().any(|dim| dim < 0) {
            return Err(WeaError::InvalidShape);
        }
        Ok(header)
    }

    /// Element type of the payload
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of dimensions
    pub fn ndims(&self) -> usize {
        self.ndims
    }

    /// Offset of the first payload byte from the segment start
    pub fn payload_offset(&self) -> usize {
        self.payload_offset
    }

    /// Size of dimension `index`, if it exists
    pub fn dim(&self, index: usize) -> Option<usize> {
        (index < self.ndims).then(|| read_i64(self.bytes, offsets::DIMS + index * DIM_SIZE) as usize)
    }

    /// Iterate over the dimension sizes in storage order
    pub fn dims(&self) -> impl Iterator<Item = usize> + 'a {
        let bytes = self.bytes;
        (0..self.ndims).map(move |i| read_i64(bytes, offsets::DIMS + i * DIM_SIZE) as usize)
    }

    fn raw_dims(&self) -> impl Iterator<Item = i64> + 'a {
        let bytes = self.bytes;
        (0..self.ndims).map(move |i| read_i64(bytes, offsets::DIMS + i * DIM_SIZE))
    }

    /// Number of payload elements
    pub fn element_count(&self) -> Result<usize> {
        self.dims()
            .try_fold(1usize, |acc, dim| acc.checked_mul(dim))
            .ok_or(WeaError::SizeOverflow)
    }

    /// Bytes the whole segment must span: payload offset plus payload
    pub fn required_size(&self) -> Result<usize> {
        self.element_count()?
            .checked_mul(self.element_type.byte_width())
            .and_then(|payload| payload.checked_add(self.payload_offset))
            .ok_or(WeaError::SizeOverflow)
    }

    /// Copy into an owned header
    #[cfg(feature = "alloc")]
    pub fn to_header(&self) -> ExchangeHeader {
        ExchangeHeader {
            element_type: self.element_type,
            shape: self.dims().collect(),
            payload_offset: self.payload_offset,
        }
    }
}

/// Owned, decoded segment header
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExchangeHeader {
    /// Element type of the payload
    pub element_type: ElementType,
    /// Dimension sizes, first dimension varies fastest in the payload
    pub shape: Vec<usize>,
    /// Offset of the first payload byte
    pub payload_offset: usize,
}

#[cfg(feature = "alloc")]
impl ExchangeHeader {
    /// Header a fresh segment of `shape` elements of `element_type` gets
    pub fn new(element_type: ElementType, shape: &[usize]) -> Result<Self> {
        let layout = SegmentLayout::compute(shape, element_type)?;
        Ok(Self {
            element_type,
            shape: shape.to_vec(),
            payload_offset: layout.payload_offset,
        })
    }

    /// Number of dimensions
    pub fn ndims(&self) -> usize {
        self.shape.len()
    }

    /// Number of payload elements
    pub fn element_count(&self) -> Result<usize> {
        crate::layout::element_count(&self.shape)
    }

    /// Payload size in bytes
    pub fn payload_size(&self) -> Result<usize> {
        self.element_count()?
            .checked_mul(self.element_type.byte_width())
            .ok_or(WeaError::SizeOverflow)
    }

    /// Bytes the whole segment must span
    pub fn segment_size(&self) -> Result<usize> {
        self.payload_size()?
            .checked_add(self.payload_offset)
            .ok_or(WeaError::SizeOverflow)
    }
}

/// Decode the header at the front of `buffer` into `(type, shape, payload_offset)` form
#[cfg(feature = "alloc")]
pub fn decode(buffer: &[u8]) -> Result<ExchangeHeader> {
    HeaderRef::parse(buffer).map(|header| header.to_header())
}
