//! In-process segments backed by an owned buffer
//!
//! A buffered segment has no external name; it is handed around whole,
//! written to a file or socket with [`ExchangeHandle::write_to`] and
//! rebuilt on the other side with [`ExchangeHandle::read_from`] or
//! [`ExchangeHandle::load`].

use crate::error::{Error, Result};
use crate::handle::ExchangeHandle;
use bytemuck::{Pod, Zeroable};
use ndarray::{ArrayBase, Data, Dimension};
use std::io::{Read, Write};
use tracing::debug;
use wea_core::format::constants::{ALIGNMENT, BASE_HEADER_SIZE};
use wea_core::{
    declared_fields_size, ElementType, ExchangeElement, HeaderRef, SegmentLayout, SegmentStorage,
    SegmentStorageMut,
};

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C, align(64))]
struct CacheLine([u8; ALIGNMENT]);

/// Owned byte buffer whose start is aligned to a cache line
///
/// Payload offsets are multiples of 64, so every payload in one of these
/// buffers is aligned for any element type.
#[derive(Clone)]
pub struct AlignedBuffer {
    lines: Vec<CacheLine>,
    len: usize,
}

impl AlignedBuffer {
    /// Zero-filled buffer of `len` bytes.
    ///
    /// Fails with [`Error::AllocationFailed`] instead of aborting when the
    /// allocator cannot provide `len` bytes.
    pub fn zeroed(len: usize) -> Result<Self> {
        let mut buffer = Self {
            lines: Vec::new(),
            len: 0,
        };
        buffer.grow_to(len)?;
        Ok(buffer)
    }

    /// Aligned copy of `bytes`
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut buffer = Self::zeroed(bytes.len())?;
        buffer.as_mut_slice().copy_from_slice(bytes);
        Ok(buffer)
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Extend with zeroes up to `len` bytes. Never shrinks.
    fn grow_to(&mut self, len: usize) -> Result<()> {
        if len <= self.len {
            return Ok(());
        }
        let lines = len.div_ceil(ALIGNMENT);
        self.lines
            .try_reserve(lines - self.lines.len())
            .map_err(|_| Error::AllocationFailed { size: len })?;
        self.lines.resize(lines, CacheLine::zeroed());
        self.len = len;
        Ok(())
    }
}

impl std::fmt::Debug for AlignedBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer").field("len", &self.len).finish()
    }
}

impl SegmentStorage for AlignedBuffer {
    fn as_slice(&self) -> &[u8] {
        &bytemuck::cast_slice::<CacheLine, u8>(&self.lines)[..self.len]
    }
}

impl SegmentStorageMut for AlignedBuffer {
    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut bytemuck::cast_slice_mut::<CacheLine, u8>(&mut self.lines)[..self.len]
    }
}

/// Largest payload step [`ExchangeHandle::read_from`] allocates ahead of the
/// bytes it has actually received
const READ_CHUNK: usize = 1 << 20;

/// Segment held in process memory
pub type BufferedExchange = ExchangeHandle<AlignedBuffer>;

impl ExchangeHandle<AlignedBuffer> {
    /// Allocate a zeroed segment for `shape` elements of `element_type`
    pub fn create(element_type: ElementType, shape: &[usize]) -> Result<Self> {
        let layout = SegmentLayout::compute(shape, element_type)?;
        debug!(
            %element_type,
            ?shape,
            size = layout.total_size,
            "Creating buffered segment"
        );
        Self::create_in(AlignedBuffer::zeroed(layout.total_size)?, element_type, shape)
    }

    /// Decode a segment from `bytes`, copying them into an aligned buffer
    pub fn load(bytes: &[u8]) -> Result<Self> {
        Self::from_storage(AlignedBuffer::from_bytes(bytes)?)
    }

    /// Create a segment holding a copy of `array`
    pub fn from_array<T, S, D>(array: &ArrayBase<S, D>) -> Result<Self>
    where
        T: ExchangeElement,
        S: Data<Elem = T>,
        D: Dimension,
    {
        let mut handle = Self::create(T::element_type(), array.shape())?;
        handle.assign_from(array)?;
        Ok(handle)
    }

    /// Header bytes followed by the current payload, as one buffer
    pub fn exchange_buffer(&self) -> Vec<u8> {
        self.segment_bytes().to_vec()
    }

    /// Write the whole segment to `writer`
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer
            .write_all(self.segment_bytes())
            .map_err(|e| Error::io("Failed to write segment", e))
    }

    /// Read one segment from `reader`.
    ///
    /// Reads exactly the header and the payload it declares, so several
    /// segments can be read back to back from one stream. The declared size
    /// is untrusted: the buffer grows in bounded steps as payload arrives,
    /// so a short stream fails with [`Error::Io`] before a large allocation.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut prefix = vec![0u8; BASE_HEADER_SIZE];
        reader
            .read_exact(&mut prefix)
            .map_err(|e| Error::io("Failed to read segment header", e))?;

        prefix.resize(declared_fields_size(&prefix)?, 0);
        reader
            .read_exact(&mut prefix[BASE_HEADER_SIZE..])
            .map_err(|e| Error::io("Failed to read segment header", e))?;
        let required = HeaderRef::parse(&prefix)?.required_size()?;

        let mut buffer = AlignedBuffer::from_bytes(&prefix)?;
        while buffer.len() < required {
            let start = buffer.len();
            let end = required.min(start.saturating_add(READ_CHUNK));
            buffer.grow_to(end)?;
            reader
                .read_exact(&mut buffer.as_mut_slice()[start..end])
                .map_err(|e| Error::io("Failed to read segment payload", e))?;
        }

        Self::from_storage(buffer)
    }
}
