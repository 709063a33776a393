//! Storage traits for segment regions

/// A contiguous byte region holding one segment
///
/// This trait provides a minimal interface for accessing the underlying
/// bytes regardless of where they live (shared memory, an owned buffer,
/// a mapped file).
pub trait SegmentStorage {
    /// Get the raw bytes of the region
    fn as_slice(&self) -> &[u8];

    /// Get the size of the region in bytes
    ///
    /// Default implementation uses the slice length.
    fn size(&self) -> usize {
        self.as_slice().len()
    }
}

/// A segment region that can be written in place
pub trait SegmentStorageMut: SegmentStorage {
    /// Get the raw bytes of the region mutably
    fn as_mut_slice(&mut self) -> &mut [u8];
}

impl SegmentStorage for [u8] {
    fn as_slice(&self) -> &[u8] {
        self
    }
}

impl SegmentStorageMut for [u8] {
    fn as_mut_slice(&mut self) -> &mut [u8] {
        self
    }
}

impl<T: SegmentStorage + ?Sized> SegmentStorage for &T {
    fn as_slice(&self) -> &[u8] {
        (**self).as_slice()
    }
}

impl<T: SegmentStorage + ?Sized> SegmentStorage for &mut T {
    fn as_slice(&self) -> &[u8] {
        (**self).as_slice()
    }
}

impl<T: SegmentStorageMut + ?Sized> SegmentStorageMut for &mut T {
    fn as_mut_slice(&mut self) -> &mut [u8] {
        (**self).as_mut_slice()
    }
}

#[cfg(feature = "alloc")]
impl SegmentStorage for alloc::vec::Vec<u8> {
    fn as_slice(&self) -> &[u8] {
        self
    }
}

#[cfg(feature = "alloc")]
impl SegmentStorageMut for alloc::vec::Vec<u8> {
    fn as_mut_slice(&mut self) -> &mut [u8] {
        self
    }
}
