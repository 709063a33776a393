//! Memory-mapped file backend
//!
//! An exported segment written to disk can be mapped straight back into
//! an exchange handle with no copy. Mapped files start on a page
//! boundary, so payloads are aligned for every element type.

use crate::error::{Error, Result};
use crate::handle::ExchangeHandle;
use memmap2::{Mmap, MmapMut, MmapOptions};
use std::fs::{File, OpenOptions};
use std::path::Path;
use tracing::debug;
use wea_core::{ElementType, SegmentLayout, SegmentStorage, SegmentStorageMut};

/// Read-only mapping of a segment file
#[derive(Debug)]
pub struct MappedFile {
    mmap: Mmap,
}

/// Writable mapping of a segment file
#[derive(Debug)]
pub struct MappedFileMut {
    mmap: MmapMut,
}

impl SegmentStorage for MappedFile {
    fn as_slice(&self) -> &[u8] {
        &self.mmap
    }
}

impl SegmentStorage for MappedFileMut {
    fn as_slice(&self) -> &[u8] {
        &self.mmap
    }
}

impl SegmentStorageMut for MappedFileMut {
    fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.mmap
    }
}

/// Map an existing segment file read-only
pub fn open_exchange_file<P: AsRef<Path>>(path: P) -> Result<ExchangeHandle<MappedFile>> {
    let file = File::open(&path).map_err(|e| Error::io("Failed to open segment file", e))?;

    // SAFETY: read-only mapping; the header is validated before any access
    // and the file is expected not to be truncated while mapped
    let mmap = unsafe {
        MmapOptions::new()
            .map(&file)
            .map_err(|e| Error::io("Failed to memory map segment file", e))?
    };

    let handle = ExchangeHandle::from_storage(MappedFile { mmap })?;
    debug!(
        path = %path.as_ref().display(),
        element_type = %handle.element_type(),
        shape = ?handle.shape(),
        "Mapped segment file"
    );
    Ok(handle)
}

/// Create (or truncate) a segment file and map it writable
pub fn create_exchange_file<P: AsRef<Path>>(
    path: P,
    element_type: ElementType,
    shape: &[usize],
) -> Result<ExchangeHandle<MappedFileMut>> {
    let layout = SegmentLayout::compute(shape, element_type)?;

    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .map_err(|e| Error::io("Failed to create segment file", e))?;
    file.set_len(layout.total_size as u64)
        .map_err(|e| Error::io("Failed to size segment file", e))?;

    // SAFETY: the file was just created by us with the exact mapped length
    let mmap = unsafe {
        MmapOptions::new()
            .map_mut(&file)
            .map_err(|e| Error::io("Failed to memory map segment file", e))?
    };

    let handle = ExchangeHandle::create_in(MappedFileMut { mmap }, element_type, shape)?;
    debug!(
        path = %path.as_ref().display(),
        %element_type,
        ?shape,
        size = layout.total_size,
        "Created segment file"
    );
    Ok(handle)
}

impl ExchangeHandle<MappedFileMut> {
    /// Write dirty pages back to the file
    pub fn flush(&self) -> Result<()> {
        self.storage()
            .mmap
            .flush()
            .map_err(|e| Error::io("Failed to flush segment file", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wea_core::WeaError;

    #[test]
    fn test_create_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grid.wea");

        let mut created = create_exchange_file(&path, ElementType::Float64, &[5, 2]).unwrap();
        created
            .as_slice_mut::<f64>()
            .unwrap()
            .iter_mut()
            .enumerate()
            .for_each(|(i, v)| *v = i as f64);
        created.flush().unwrap();
        drop(created);

        assert_eq!(std::fs::metadata(&path).unwrap().len(), 208);

        let opened = open_exchange_file(&path).unwrap();
        assert_eq!(opened.shape(), &[5, 2]);
        let values = opened.as_slice::<f64>().unwrap();
        assert_eq!(values[0], 0.0);
        assert_eq!(values[9], 9.0);
    }

    #[test]
    fn test_open_foreign_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"this is not an exchange segment").unwrap();

        assert!(matches!(
            open_exchange_file(&path),
            Err(Error::Format(WeaError::BadMagic { .. }))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            open_exchange_file(dir.path().join("missing.wea")),
            Err(Error::Io { .. })
        ));
    }
}
