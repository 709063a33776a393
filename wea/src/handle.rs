//! Exchange handle: a segment region plus its decoded header
//!
//! The header range `[0, payload_offset)` and the payload range
//! `[payload_offset, payload_offset + payload_len)` are two fixed,
//! non-overlapping windows into one storage region. The header is written
//! once when the segment is created; afterwards only the payload changes.

use crate::error::{Error, Result};
use wea_core::{
    encode, ElementType, ExchangeElement, ExchangeHeader, HeaderRef, SegmentStorage,
    SegmentStorageMut,
};

/// A segment region with its validated header
#[derive(Debug)]
pub struct ExchangeHandle<S> {
    storage: S,
    header: ExchangeHeader,
    payload_len: usize,
}

impl<S: SegmentStorage> ExchangeHandle<S> {
    /// Wrap a region that already holds a segment.
    ///
    /// The header is decoded and the region must be large enough for the
    /// payload it declares.
    pub fn from_storage(storage: S) -> Result<Self> {
        let bytes = storage.as_slice();
        let parsed = HeaderRef::parse(bytes)?;
        let required = parsed.required_size()?;
        if bytes.len() < required {
            return Err(Error::MemoryTooSmall {
                required,
                actual: bytes.len(),
            });
        }
        let header = parsed.to_header();
        let payload_len = required - header.payload_offset;

        Ok(Self {
            storage,
            header,
            payload_len,
        })
    }

    /// Decoded header
    pub fn header(&self) -> &ExchangeHeader {
        &self.header
    }

    /// Element type of the payload
    pub fn element_type(&self) -> ElementType {
        self.header.element_type
    }

    /// Dimension sizes, first dimension varies fastest
    pub fn shape(&self) -> &[usize] {
        &self.header.shape
    }

    /// Number of dimensions
    pub fn ndims(&self) -> usize {
        self.header.shape.len()
    }

    /// Number of payload elements
    pub fn len(&self) -> usize {
        self.payload_len / self.header.element_type.byte_width()
    }

    /// Whether the payload holds no elements
    pub fn is_empty(&self) -> bool {
        self.payload_len == 0
    }

    /// Offset of the first payload byte
    pub fn payload_offset(&self) -> usize {
        self.header.payload_offset
    }

    /// Header plus payload size in bytes.
    ///
    /// May be smaller than the storage region, which can be padded (for
    /// example to a page boundary).
    pub fn segment_size(&self) -> usize {
        self.header.payload_offset + self.payload_len
    }

    /// Raw header region
    pub fn header_bytes(&self) -> &[u8] {
        &self.storage.as_slice()[..self.header.payload_offset]
    }

    /// Raw payload bytes in column-major order
    pub fn payload(&self) -> &[u8] {
        &self.storage.as_slice()[self.header.payload_offset..self.segment_size()]
    }

    /// Header and payload as one contiguous slice
    pub fn segment_bytes(&self) -> &[u8] {
        &self.storage.as_slice()[..self.segment_size()]
    }

    /// Payload as a typed slice
    pub fn as_slice<T: ExchangeElement>(&self) -> Result<&[T]> {
        self.check_element::<T>()?;
        bytemuck::try_cast_slice(self.payload()).map_err(|_| Error::Misaligned)
    }

    /// Underlying storage
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Give up the header and return the storage
    pub fn into_storage(self) -> S {
        self.storage
    }

    fn check_element<T: ExchangeElement>(&self) -> Result<()> {
        let requested = T::element_type();
        if requested != self.header.element_type {
            return Err(Error::ElementMismatch {
                stored: self.header.element_type,
                requested,
            });
        }
        Ok(())
    }
}

impl<S: SegmentStorageMut> ExchangeHandle<S> {
    /// Write a fresh header for `shape` into `storage` and wrap it.
    ///
    /// The payload bytes are left as they are; zeroed storage yields a
    /// zeroed array.
    pub fn create_in(mut storage: S, element_type: ElementType, shape: &[usize]) -> Result<Self> {
        encode(storage.as_mut_slice(), element_type, shape)?;
        Self::from_storage(storage)
    }

    /// Mutable payload bytes
    pub fn payload_mut(&mut self) -> &mut [u8] {
        let start = self.header.payload_offset;
        let end = self.segment_size();
        &mut self.storage.as_mut_slice()[start..end]
    }

    /// Payload as a mutable typed slice
    pub fn as_slice_mut<T: ExchangeElement>(&mut self) -> Result<&mut [T]> {
        self.check_element::<T>()?;
        bytemuck::try_cast_slice_mut(self.payload_mut()).map_err(|_| Error::Misaligned)
    }
}
